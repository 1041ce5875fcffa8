//! # Cart
//!
//! A named cart: its line items, its cart-level conditions and an optional
//! expiration.
//!
//! ## Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cart "default"                                                         │
//! │                                                                         │
//! │  conditions: [ "Shipping" +10 (subtotal), "Promo" -5% (products 1,2) ] │
//! │                                           │ clone per item              │
//! │  items:                                   ▼                             │
//! │    row a1f… product 1 ×2   conditions: [ "Promo" -5% ]                  │
//! │    row 7c0… product 2 ×1   conditions: [ "Promo" -5% ]                  │
//! │    row 93b… product 3 ×4   conditions: [ ]          (out of scope)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failure Reporting
//! Business outcomes are never errors. Invalid input, unknown rows and
//! vetoed mutations come back as `None`, `false` or an [`UpdateOutcome`],
//! and leave the cart exactly as it was.
//!
//! ## Concurrency
//! One writer per cart. The session layer persists whole carts, so the last
//! write wins.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use ts_rs::TS;

use crate::condition::Condition;
use crate::error::ValidationError;
use crate::events::{CartEvent, EventDispatcher};
use crate::item::{ItemUpdate, LineItem, NewItem};
use crate::items::ItemStore;
use crate::money::Money;
use crate::pricing::{price, price_with, NestedTotals, PriceBreakdown, PricingSubject};
use crate::registry::ConditionRegistry;
use crate::types::{ProductId, RowId, Target};
use crate::validation::{
    validate_line_subtotal, validate_name, validate_price_cents, validate_quantity, ValidationResult,
};

// =============================================================================
// Outcomes & Summaries
// =============================================================================

/// Result of [`Cart::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The row was changed (and possibly re-keyed or merged).
    Updated(RowId),
    /// The new quantity was zero or less, so the row was removed.
    Removed,
    /// No row with that id.
    NotFound,
    /// An event hook cancelled the update or the removal.
    Vetoed,
    /// The update carried an invalid name or price.
    Invalid(ValidationError),
}

impl UpdateOutcome {
    /// True when the cart changed.
    pub fn is_applied(&self) -> bool {
        matches!(self, UpdateOutcome::Updated(_) | UpdateOutcome::Removed)
    }
}

/// Cart figures for a presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    /// Number of rows.
    pub rows: usize,
    /// Sum of row quantities.
    pub quantity: i64,
    pub weight: f64,
    pub subtotal: Money,
    /// All pre-tax adjustments, item-level and cart-level.
    pub adjustments: Money,
    /// All taxes, item-level and cart-level.
    pub taxes: Money,
    pub total: Money,
}

// =============================================================================
// Cart
// =============================================================================

/// A shopping cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    name: String,
    #[serde(default)]
    expiration: Option<DateTime<Utc>>,
    #[serde(default)]
    items: ItemStore,
    #[serde(default)]
    conditions: ConditionRegistry,
    #[serde(skip)]
    events: EventDispatcher,
}

impl Cart {
    /// Creates an empty cart without expiration or event hook.
    pub fn new(name: impl Into<String>) -> Self {
        Cart {
            name: name.into(),
            expiration: None,
            items: ItemStore::new(),
            conditions: ConditionRegistry::new(),
            events: EventDispatcher::none(),
        }
    }

    /// Sets the (advisory) expiration.
    pub fn expires_at(mut self, expiration: Option<DateTime<Utc>>) -> Self {
        self.expiration = expiration;
        self
    }

    /// Attaches an event dispatcher.
    pub fn with_events(mut self, events: EventDispatcher) -> Self {
        self.events = events;
        self
    }

    /// Re-attaches an event dispatcher, e.g. after loading from a store.
    pub fn set_events(&mut self, events: EventDispatcher) {
        self.events = events;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // -------------------------------------------------------------------------
    // Item Mutations
    // -------------------------------------------------------------------------

    /// Adds a line item, or increases the quantity of the matching row.
    ///
    /// Returns the row id, or `None` when the input is invalid (quantity not
    /// positive, negative price, empty name) or `cart.adding` was vetoed.
    ///
    /// ## Example
    /// ```rust
    /// use easycart_core::{Cart, Money, NewItem};
    ///
    /// let mut cart = Cart::new("default");
    /// let first = cart.add(NewItem::new(1, "Shirt", Money::from_cents(1099), 2));
    /// let again = cart.add(NewItem::new(1, "Shirt", Money::from_cents(1099), 4));
    ///
    /// assert_eq!(first, again);
    /// assert_eq!(cart.qty(), 6);
    /// assert_eq!(cart.subtotal(), Money::from_cents(6594));
    /// ```
    pub fn add(&mut self, item: NewItem) -> Option<RowId> {
        if let Err(error) = validate_new_item(&item) {
            debug!(cart = %self.name, product_id = %item.id, %error, "Ignoring invalid item");
            return None;
        }

        let mut candidate = LineItem::from_new(item);
        if let Some(existing) = self.items.get(candidate.row_id()) {
            let mut merged = existing.clone();
            merged.add_qty(candidate.quantity());
            candidate = merged;
        }

        if let Err(error) = validate_line_subtotal(candidate.price().cents(), candidate.quantity()) {
            debug!(cart = %self.name, row_id = %candidate.row_id(), %error, "Ignoring oversized row");
            return None;
        }

        if !self.events.allows(CartEvent::Adding {
            cart: &self.name,
            item: &candidate,
        }) {
            return None;
        }

        let row_id = candidate.row_id().clone();
        info!(
            cart = %self.name,
            row_id = %row_id,
            product_id = %candidate.product_id(),
            quantity = candidate.quantity(),
            "Item stored"
        );
        self.items.put(candidate);
        self.propagate_scoped_conditions();

        self.events.notify(CartEvent::Added {
            cart: &self.name,
            row_id: &row_id,
        });
        Some(row_id)
    }

    /// Adds several items in order. Returns the row id of each accepted item.
    pub fn add_many<I>(&mut self, items: I) -> Vec<RowId>
    where
        I: IntoIterator<Item = NewItem>,
    {
        items.into_iter().filter_map(|item| self.add(item)).collect()
    }

    /// Merges `update` into a row.
    ///
    /// Accepts a full [`ItemUpdate`] or a bare quantity. A resulting quantity
    /// of zero or less removes the row, firing only the removal events.
    /// Changing the attributes re-keys the row; if the new key already
    /// exists, the quantity is merged into that row.
    pub fn update(&mut self, row_id: &RowId, update: impl Into<ItemUpdate>) -> UpdateOutcome {
        let update = update.into();
        if let Err(error) = update.validate() {
            debug!(cart = %self.name, row_id = %row_id, %error, "Rejected item update");
            return UpdateOutcome::Invalid(error);
        }

        let Some(current) = self.items.get(row_id) else {
            return UpdateOutcome::NotFound;
        };

        // removal goes through cart.deleting only; no update is announced
        let quantity = update.quantity.unwrap_or(current.quantity());
        if quantity <= 0 {
            return if self.remove(row_id) {
                UpdateOutcome::Removed
            } else {
                UpdateOutcome::Vetoed
            };
        }

        let price = update.price.unwrap_or(current.price());
        if let Err(error) = validate_line_subtotal(price.cents(), quantity) {
            debug!(cart = %self.name, row_id = %row_id, %error, "Rejected item update");
            return UpdateOutcome::Invalid(error);
        }

        // work on a copy so a veto leaves the stored row untouched
        let mut updated = current.clone();
        if !updated.merge(&update, &self.events) {
            return UpdateOutcome::Vetoed;
        }

        let new_id = updated.row_id().clone();
        if &new_id == row_id {
            self.items.put(updated);
        } else if let Some(existing) = self.items.get_mut(&new_id) {
            existing.add_qty(updated.quantity());
            self.items.remove(row_id);
            debug!(cart = %self.name, from = %row_id, into = %new_id, "Merged re-keyed row");
        } else {
            self.items.replace(row_id, updated);
        }

        info!(cart = %self.name, row_id = %new_id, "Item updated");
        UpdateOutcome::Updated(new_id)
    }

    /// Removes a row. Returns `false` for an unknown row or a veto.
    pub fn remove(&mut self, row_id: &RowId) -> bool {
        let Some(item) = self.items.get(row_id) else {
            return false;
        };

        if !self.events.allows(CartEvent::Deleting {
            cart: &self.name,
            item,
        }) {
            return false;
        }

        let Some(removed) = self.items.remove(row_id) else {
            return false;
        };

        info!(cart = %self.name, row_id = %row_id, "Item removed");
        self.events.notify(CartEvent::Deleted {
            cart: &self.name,
            row_id,
            item: &removed,
        });
        true
    }

    /// Drops every row. Cart-level conditions are kept.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    // -------------------------------------------------------------------------
    // Conditions
    // -------------------------------------------------------------------------

    /// Adds a cart-level condition.
    ///
    /// Product conditions are also propagated to every current item in
    /// scope, even when the cart already held an equal condition. Returns
    /// `true` when the cart-level registry changed; a veto on
    /// `cart.condition.adding` stops both steps.
    pub fn condition(&mut self, condition: Condition) -> bool {
        if !self.events.allows(CartEvent::ConditionAdding {
            cart: &self.name,
            condition: &condition,
        }) {
            return false;
        }

        let added = self.conditions.add(condition.clone());

        if condition.target() == Target::Products {
            for item in self.items.iter_mut() {
                item.apply_condition(condition.clone(), &self.events);
            }
        }

        if added {
            debug!(cart = %self.name, condition = condition.name(), kind = condition.kind(), "Condition added");
            self.events.notify(CartEvent::ConditionAdded {
                cart: &self.name,
                condition: &condition,
            });
        }
        added
    }

    /// Adds several conditions in order. Returns how many were new.
    pub fn conditions_from<I>(&mut self, conditions: I) -> usize
    where
        I: IntoIterator<Item = Condition>,
    {
        conditions
            .into_iter()
            .map(|condition| self.condition(condition))
            .filter(|added| *added)
            .count()
    }

    /// Cart-level conditions in insertion order.
    pub fn conditions(&self) -> &ConditionRegistry {
        &self.conditions
    }

    /// Removes conditions of type `kind` from the cart and from every item.
    pub fn remove_condition_by_type(&mut self, kind: &str) -> usize {
        for item in self.items.iter_mut() {
            item.remove_conditions_by_type(kind);
        }
        self.conditions.remove(|c| c.kind() == kind)
    }

    /// Removes conditions named `name` from the cart and from every item.
    pub fn remove_condition_by_name(&mut self, name: &str) -> usize {
        for item in self.items.iter_mut() {
            item.remove_conditions_by_name(name);
        }
        self.conditions.remove(|c| c.name() == name)
    }

    /// Removes every condition from the cart and from every item.
    pub fn remove_all_conditions(&mut self) {
        for item in self.items.iter_mut() {
            item.remove_all_conditions();
        }
        self.conditions.clear();
    }

    /// Re-applies scoped product conditions to every item.
    ///
    /// Runs after each insertion so a condition registered before its
    /// product was added still reaches it. Item registries ignore repeats.
    fn propagate_scoped_conditions(&mut self) {
        for condition in self.conditions.iter().filter(|c| c.is_scoped()) {
            for item in self.items.iter_mut() {
                item.apply_condition(condition.clone(), &self.events);
            }
        }
    }

    /// Rows whose own registry holds `condition`.
    fn items_holding<'a>(&'a self, condition: &'a Condition) -> impl Iterator<Item = &'a LineItem> + 'a {
        self.items.iter().filter(move |item| item.conditions().has(condition))
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn items(&self) -> &ItemStore {
        &self.items
    }

    pub fn get(&self, row_id: &RowId) -> Option<&LineItem> {
        self.items.get(row_id)
    }

    /// First row for `product_id`.
    pub fn find(&self, product_id: impl Into<ProductId>) -> Option<&LineItem> {
        let product_id = product_id.into();
        self.items.iter().find(|item| item.product_id() == &product_id)
    }

    /// Every row matching `predicate`.
    pub fn find_by<F>(&self, predicate: F) -> Vec<&LineItem>
    where
        F: Fn(&LineItem) -> bool,
    {
        self.items.iter().filter(|item| predicate(item)).collect()
    }

    /// Every row whose product id is in `ids`.
    pub fn find_by_ids<I, P>(&self, ids: I) -> Vec<&LineItem>
    where
        I: IntoIterator<Item = P>,
        P: Into<ProductId>,
    {
        let ids: Vec<ProductId> = ids.into_iter().map(Into::into).collect();
        self.find_by(|item| ids.contains(item.product_id()))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of row quantities.
    pub fn qty(&self) -> i64 {
        self.items.iter().map(LineItem::quantity).sum()
    }

    pub fn weight(&self) -> f64 {
        self.items.iter().map(LineItem::total_weight).sum()
    }

    /// Sum of item subtotals, before any condition.
    pub fn subtotal(&self) -> Money {
        self.items.iter().map(LineItem::subtotal).sum()
    }

    /// Grand total: item conditions, cart conditions, then cart taxes.
    pub fn total(&self) -> Money {
        self.breakdown().total
    }

    /// Grand total ignoring cart-level conditions of type `kind`.
    pub fn total_without_type(&self, kind: &str) -> Money {
        price_with(self, |c| c.kind() != kind).total
    }

    pub fn breakdown(&self) -> PriceBreakdown {
        price(self)
    }

    pub fn totals(&self) -> CartTotals {
        let breakdown = self.breakdown();
        CartTotals {
            rows: self.items.len(),
            quantity: self.qty(),
            weight: self.weight(),
            subtotal: breakdown.subtotal,
            adjustments: breakdown.adjustment_total(),
            taxes: breakdown.tax_total(),
            total: breakdown.total,
        }
    }

    // -------------------------------------------------------------------------
    // Expiration
    // -------------------------------------------------------------------------

    pub fn expiration(&self) -> Option<DateTime<Utc>> {
        self.expiration
    }

    /// Expiration as a Unix timestamp (seconds).
    pub fn expiration_timestamp(&self) -> Option<i64> {
        self.expiration.map(|at| at.timestamp())
    }

    /// Advisory; an expired cart still accepts mutations.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiration.map_or(false, |at| at <= now)
    }
}

impl PricingSubject for Cart {
    fn subtotal(&self) -> Money {
        Cart::subtotal(self)
    }

    fn conditions(&self) -> &ConditionRegistry {
        &self.conditions
    }

    fn condition_base(&self, condition: &Condition) -> Option<Money> {
        let subtotal = Cart::subtotal(self);
        match condition.target() {
            Target::Subtotal => condition.meets_minimum(subtotal).then_some(subtotal),
            // other product conditions live on the items
            Target::Products if condition.is_cart_gated() && condition.meets_minimum(subtotal) => {
                let mut holders = self.items_holding(condition).peekable();
                holders.peek()?;
                Some(holders.map(LineItem::subtotal).sum())
            }
            Target::Products => None,
        }
    }

    /// Cart-gated product taxes only see the items that carry them.
    fn tax_base(&self, condition: &Condition, running: Money) -> Option<Money> {
        self.condition_base(condition)?;
        if !condition.is_cart_gated() {
            return Some(running);
        }
        Some(self.items_holding(condition).map(|item| item.breakdown().pre_tax).sum())
    }

    fn nested(&self) -> NestedTotals {
        self.items
            .iter()
            .map(LineItem::breakdown)
            .fold(NestedTotals::default(), |mut nested, item| {
                nested.adjustments += item.pre_tax - item.subtotal;
                nested.taxes += item.tax_total();
                nested
            })
    }
}

fn validate_new_item(item: &NewItem) -> ValidationResult<()> {
    validate_name("name", &item.name)?;
    validate_quantity(item.quantity)?;
    validate_price_cents(item.price.cents())?;
    validate_line_subtotal(item.price.cents(), item.quantity)
}

// =============================================================================
// Unit Tests
// =============================================================================
