//! # Line Items
//!
//! One row of a cart: a product, its quantity, its attributes and the
//! product conditions that reached it.
//!
//! ## Item Lifecycle
//! ```text
//! NewItem::new(1, "Shirt", price, 2)          caller input (unvalidated)
//!      │
//!      ▼  Cart::add validates qty > 0, price ≥ 0
//! LineItem { row_id = derive(1, attrs), .. }  stored in the cart
//!      │
//!      ├── add_qty(n)        same row added again (n ≥ 1 only)
//!      ├── merge(update)     name / price / qty / attributes
//!      ├── apply_condition   product condition propagated from the cart
//!      │
//!      ▼  qty ≤ 0 or Cart::remove
//! dropped (no tombstone)
//! ```

use serde::{Deserialize, Serialize};

use crate::condition::Condition;
use crate::events::{CartEvent, EventDispatcher};
use crate::money::Money;
use crate::pricing::{price, price_with, PriceBreakdown, PricingSubject};
use crate::registry::ConditionRegistry;
use crate::row_id::derive_row_id;
use crate::types::{Attributes, ProductId, RowId};
use crate::validation::{validate_name, validate_price_cents, ValidationResult};

// =============================================================================
// Line Item
// =============================================================================

/// A product line stored in a cart.
///
/// `row_id` is always `derive_row_id(product_id, attributes)`; every mutation
/// that touches the attributes re-derives it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    row_id: RowId,
    product_id: ProductId,
    name: String,
    price: Money,
    quantity: i64,
    #[serde(default)]
    attributes: Attributes,
    #[serde(default)]
    weight: f64,
    #[serde(default)]
    conditions: ConditionRegistry,
}

impl LineItem {
    /// Builds a line item from caller input.
    ///
    /// Does not validate; [`crate::Cart::add`] does that before storing.
    pub fn from_new(item: NewItem) -> Self {
        let row_id = derive_row_id(&item.id, &item.attributes);
        LineItem {
            row_id,
            product_id: item.id,
            name: item.name,
            price: item.price,
            quantity: item.quantity,
            attributes: item.attributes,
            weight: item.weight,
            conditions: ConditionRegistry::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn row_id(&self) -> &RowId {
        &self.row_id
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unit price.
    pub fn price(&self) -> Money {
        self.price
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Unit weight.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Product conditions applied to this item, in insertion order.
    pub fn conditions(&self) -> &ConditionRegistry {
        &self.conditions
    }

    // -------------------------------------------------------------------------
    // Amounts
    // -------------------------------------------------------------------------

    /// `price * quantity`, before any condition.
    pub fn subtotal(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }

    /// `weight * quantity`.
    pub fn total_weight(&self) -> f64 {
        self.weight * self.quantity as f64
    }

    /// Item total after its own conditions.
    ///
    /// Product conditions gated on the whole cart subtotal are not part of
    /// this amount; the cart applies those once at its own level.
    pub fn total(&self) -> Money {
        self.breakdown().total
    }

    /// Every step of the item total.
    pub fn breakdown(&self) -> PriceBreakdown {
        price(self)
    }

    /// Item total ignoring conditions of type `kind`.
    pub fn total_without_type(&self, kind: &str) -> Money {
        price_with(self, |c| c.kind() != kind).total
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Increases the quantity by `qty`.
    ///
    /// Only positive increments are applied; anything else is ignored and
    /// `false` is returned.
    pub fn add_qty(&mut self, qty: i64) -> bool {
        if qty < 1 {
            tracing::debug!(row_id = %self.row_id, qty, "Ignoring non-positive quantity increment");
            return false;
        }
        self.quantity = self.quantity.saturating_add(qty);
        true
    }

    /// Applies a product condition to this item.
    ///
    /// Returns `false` when the condition does not target this product, is
    /// already present, or was vetoed by the `cart_item.condition.adding`
    /// hook.
    pub fn apply_condition(&mut self, condition: Condition, events: &EventDispatcher) -> bool {
        if !condition.applies_to_product(&self.product_id) || self.conditions.has(&condition) {
            return false;
        }

        if !events.allows(CartEvent::ItemConditionAdding {
            item: self,
            condition: &condition,
        }) {
            return false;
        }

        tracing::debug!(
            row_id = %self.row_id,
            condition = condition.name(),
            "Applied condition to item"
        );
        self.conditions.add(condition.clone());
        events.notify(CartEvent::ItemConditionAdded {
            item: self,
            condition: &condition,
        });
        true
    }

    /// Merges the provided fields into this item.
    ///
    /// Fires `cart_item.updating` (vetoable) and `cart_item.updated`. The row
    /// id is re-derived when the attributes change. A quantity of zero or
    /// less is stored as-is; the cart removes such rows.
    pub fn merge(&mut self, update: &ItemUpdate, events: &EventDispatcher) -> bool {
        if !events.allows(CartEvent::ItemUpdating { item: self }) {
            return false;
        }

        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(quantity) = update.quantity {
            self.quantity = quantity;
        }
        if let Some(attributes) = &update.attributes {
            self.attributes = attributes.clone();
            self.row_id = derive_row_id(&self.product_id, &self.attributes);
        }

        events.notify(CartEvent::ItemUpdated { item: self });
        true
    }

    pub fn remove_conditions_by_type(&mut self, kind: &str) -> usize {
        self.conditions.remove(|c| c.kind() == kind)
    }

    pub fn remove_conditions_by_name(&mut self, name: &str) -> usize {
        self.conditions.remove(|c| c.name() == name)
    }

    pub fn remove_all_conditions(&mut self) {
        self.conditions.clear();
    }
}

impl PricingSubject for LineItem {
    fn subtotal(&self) -> Money {
        LineItem::subtotal(self)
    }

    fn conditions(&self) -> &ConditionRegistry {
        &self.conditions
    }

    fn condition_base(&self, condition: &Condition) -> Option<Money> {
        if condition.is_cart_gated() {
            return None;
        }

        let subtotal = LineItem::subtotal(self);
        condition.meets_minimum(subtotal).then_some(subtotal)
    }
}

// =============================================================================
// New Item
// =============================================================================

/// Input for [`crate::Cart::add`].
///
/// ## Example
/// ```rust
/// use easycart_core::{Attributes, Money, NewItem};
///
/// let shirt = NewItem::new(1, "Shirt", Money::from_cents(1099), 2)
///     .attributes(Attributes::new().with("size", "M"))
///     .weight(0.3);
/// assert_eq!(shirt.quantity, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    #[serde(alias = "qty")]
    pub quantity: i64,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    pub weight: f64,
}

impl NewItem {
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Money, quantity: i64) -> Self {
        NewItem {
            id: id.into(),
            name: name.into(),
            price,
            quantity,
            attributes: Attributes::new(),
            weight: 0.0,
        }
    }

    pub fn attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

// =============================================================================
// Item Update
// =============================================================================

/// Fields accepted by [`crate::Cart::update`].
///
/// Only these four fields can change; anything else in a deserialized update
/// is ignored. A bare quantity converts into an update via `From<i64>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<Money>,
    #[serde(default, alias = "qty")]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub attributes: Option<Attributes>,
}

impl ItemUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn price(mut self, price: Money) -> Self {
        self.price = Some(price);
        self
    }

    pub fn quantity(mut self, quantity: i64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = Some(attributes);
        self
    }

    /// Checks the name and price fields. Quantity is not checked here: zero
    /// or less means "remove the row".
    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(name) = &self.name {
            validate_name("name", name)?;
        }
        if let Some(price) = self.price {
            validate_price_cents(price.cents())?;
        }
        Ok(())
    }
}

impl From<i64> for ItemUpdate {
    fn from(quantity: i64) -> Self {
        ItemUpdate::new().quantity(quantity)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::testing::RecordingHook;
    use std::sync::Arc;

    fn shirt(qty: i64) -> LineItem {
        LineItem::from_new(NewItem::new(1, "Shirt", Money::from_cents(1099), qty))
    }

    #[test]
    fn test_subtotal_and_weight() {
        let item = LineItem::from_new(NewItem::new(1, "Shirt", Money::from_cents(1099), 3).weight(0.5));
        assert_eq!(item.subtotal(), Money::from_cents(3297));
        assert!((item.total_weight() - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_add_qty_ignores_non_positive() {
        let mut item = shirt(2);
        assert!(!item.add_qty(0));
        assert!(!item.add_qty(-3));
        assert_eq!(item.quantity(), 2);
        assert!(item.add_qty(4));
        assert_eq!(item.quantity(), 6);
    }

    #[test]
    fn test_apply_condition_respects_scope() {
        let mut item = shirt(1);
        let events = EventDispatcher::none();

        let in_scope = Condition::new("Promo", "-1", "discount").unwrap().on_products([1, 2]);
        let out_of_scope = Condition::new("Other", "-1", "discount").unwrap().on_products([3]);
        let cart_level = Condition::new("Cart", "-1", "discount").unwrap();

        assert!(item.apply_condition(in_scope.clone(), &events));
        assert!(!item.apply_condition(in_scope, &events));
        assert!(!item.apply_condition(out_of_scope, &events));
        assert!(!item.apply_condition(cart_level, &events));
        assert_eq!(item.conditions().len(), 1);
    }

    #[test]
    fn test_apply_condition_can_be_vetoed() {
        let hook = Arc::new(RecordingHook::vetoing(&["cart_item.condition.adding"]));
        let events = EventDispatcher::new(hook.clone());
        let mut item = shirt(1);

        let promo = Condition::new("Promo", "-1", "discount").unwrap().on_products([1]);
        assert!(!item.apply_condition(promo, &events));
        assert!(item.conditions().is_empty());
        assert!(!hook.saw("cart_item.condition.added"));
    }

    #[test]
    fn test_item_total_applies_discount_then_tax() {
        let mut item = LineItem::from_new(NewItem::new(1, "Lamp", Money::from_units(100), 2));
        let events = EventDispatcher::none();
        item.apply_condition(Condition::tax("VAT", "+10%").unwrap().on_products([1]), &events);
        item.apply_condition(
            Condition::new("Promo", "-10%", "discount").unwrap().on_products([1]),
            &events,
        );

        // 200 - 20 = 180, + 10% = 198
        assert_eq!(item.total(), Money::from_units(198));
        assert_eq!(item.total_without_type("tax"), Money::from_units(180));
    }

    #[test]
    fn test_per_item_minimum_gate() {
        let events = EventDispatcher::none();
        let gated = Condition::new("Bulk", "-10", "discount")
            .unwrap()
            .on_products([1])
            .with_minimum(Money::from_units(300), true);

        let mut small = LineItem::from_new(NewItem::new(1, "Lamp", Money::from_units(100), 2));
        small.apply_condition(gated.clone(), &events);
        assert_eq!(small.total(), Money::from_units(200));

        let mut large = LineItem::from_new(NewItem::new(1, "Lamp", Money::from_units(100), 3));
        large.apply_condition(gated, &events);
        assert_eq!(large.total(), Money::from_units(290));
    }

    #[test]
    fn test_cart_gated_condition_excluded_from_item_total() {
        let mut item = LineItem::from_new(NewItem::new(1, "Lamp", Money::from_units(400), 1));
        item.apply_condition(
            Condition::new("Bulk", "-50", "discount")
                .unwrap()
                .on_products([1])
                .with_minimum(Money::from_units(300), false),
            &EventDispatcher::none(),
        );
        assert_eq!(item.conditions().len(), 1);
        assert_eq!(item.total(), Money::from_units(400));
    }

    #[test]
    fn test_merge_rederives_row_id_on_attribute_change() {
        let mut item = shirt(1);
        let original = item.row_id().clone();

        let update = ItemUpdate::new().name("Blue Shirt").quantity(3);
        assert!(item.merge(&update, &EventDispatcher::none()));
        assert_eq!(item.name(), "Blue Shirt");
        assert_eq!(item.quantity(), 3);
        assert_eq!(item.row_id(), &original);

        let update = ItemUpdate::new().attributes(Attributes::new().with("color", "blue"));
        assert!(item.merge(&update, &EventDispatcher::none()));
        assert_ne!(item.row_id(), &original);
        assert_eq!(item.row_id(), &derive_row_id(item.product_id(), item.attributes()));
    }

    #[test]
    fn test_merge_veto_leaves_item_unchanged() {
        let hook = Arc::new(RecordingHook::vetoing(&["cart_item.updating"]));
        let events = EventDispatcher::new(hook.clone());
        let mut item = shirt(1);
        let before = item.clone();

        assert!(!item.merge(&ItemUpdate::from(5), &events));
        assert_eq!(item, before);
        assert_eq!(hook.names(), vec!["cart_item.updating"]);
    }

    #[test]
    fn test_item_update_ignores_unknown_fields() {
        let update: ItemUpdate =
            serde_json::from_str(r#"{"qty": 4, "weight": 10, "product_id": 9}"#).unwrap();
        assert_eq!(update, ItemUpdate::from(4));
    }

    #[test]
    fn test_item_update_validation() {
        assert!(ItemUpdate::new().price(Money::from_cents(-1)).validate().is_err());
        assert!(ItemUpdate::new().name("").validate().is_err());
        assert!(ItemUpdate::from(-1).validate().is_ok());
    }

    #[test]
    fn test_remove_conditions() {
        let events = EventDispatcher::none();
        let mut item = shirt(1);
        item.apply_condition(Condition::new("A", "-1", "discount").unwrap().on_products([1]), &events);
        item.apply_condition(Condition::tax("VAT", "+5%").unwrap().on_products([1]), &events);

        assert_eq!(item.remove_conditions_by_type("tax"), 1);
        assert_eq!(item.remove_conditions_by_name("missing"), 0);
        item.remove_all_conditions();
        assert!(item.conditions().is_empty());
    }
}
