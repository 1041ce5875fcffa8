//! # Pricing Engine
//!
//! One total formula shared by line items and carts.
//!
//! ## Calculation Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      price(subject)                                     │
//! │                                                                         │
//! │  1. running = subtotal + nested adjustments (cart: item discounts)      │
//! │                                                                         │
//! │  2. for each NON-tax condition, in insertion order:                     │
//! │        gate passes? → running += resolve(value, base, cap)              │
//! │                       (base = the subject's subtotal, not running)      │
//! │                                                                         │
//! │  3. pre_tax = running                                                   │
//! │                                                                         │
//! │  4. for each TAX condition, in insertion order:                         │
//! │        running += resolve(value, tax_base, cap)  ← compounds            │
//! │        (tax_base = running, unless the subject narrows it)              │
//! │                                                                         │
//! │  5. total = running + nested taxes (cart: item-level product taxes)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Taxes always see the post-discount amount, whatever order the conditions
//! were registered in. Nested taxes are added after the subject's own tax
//! pass so a cart tax is never charged on an item tax.
//!
//! ## Example: Discount Then Tax
//! ```rust
//! use easycart_core::pricing::resolve_adjustment;
//! use easycart_core::{ConditionValue, Money};
//!
//! let subtotal = Money::from_units(1000);
//! let discount = resolve_adjustment(&"-100".parse::<ConditionValue>().unwrap(), subtotal, None);
//! let pre_tax = subtotal + discount;
//! let tax = resolve_adjustment(&"+10%".parse::<ConditionValue>().unwrap(), pre_tax, None);
//! assert_eq!(pre_tax + tax, Money::from_units(990));
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::condition::{Condition, ConditionValue};
use crate::money::Money;
use crate::registry::ConditionRegistry;

// =============================================================================
// Subject
// =============================================================================

/// Amounts contributed by a subject's children (items, for a cart).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NestedTotals {
    /// Signed sum of pre-tax adjustments already applied below.
    pub adjustments: Money,
    /// Sum of taxes already applied below.
    pub taxes: Money,
}

/// Anything with a subtotal and a set of conditions: a line item or a cart.
pub trait PricingSubject {
    /// Amount before any condition.
    fn subtotal(&self) -> Money;

    /// The subject's own conditions, in insertion order.
    fn conditions(&self) -> &ConditionRegistry;

    /// Gate for `condition` at this level.
    ///
    /// Returns the base amount a percentage resolves against, or `None` when
    /// the condition does not apply here. Tax conditions only use this as a
    /// gate; they resolve against the running amount.
    fn condition_base(&self, condition: &Condition) -> Option<Money>;

    /// Amount a tax condition resolves against, given the running total.
    ///
    /// Defaults to the running amount whenever the gate passes. A cart
    /// narrows this for product taxes it evaluates on behalf of its items.
    fn tax_base(&self, condition: &Condition, running: Money) -> Option<Money> {
        self.condition_base(condition).map(|_| running)
    }

    /// Totals already computed for children.
    fn nested(&self) -> NestedTotals {
        NestedTotals::default()
    }
}

// =============================================================================
// Breakdown
// =============================================================================

/// A condition that contributed to a total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AppliedCondition {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: Money,
}

impl AppliedCondition {
    fn new(condition: &Condition, amount: Money) -> Self {
        AppliedCondition {
            name: condition.name().to_string(),
            kind: condition.kind().to_string(),
            amount,
        }
    }
}

/// Every step of a total calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub subtotal: Money,
    /// Pre-tax adjustments contributed by children.
    pub nested_adjustments: Money,
    /// The subject's own non-tax adjustments, in application order.
    pub adjustments: Vec<AppliedCondition>,
    pub pre_tax: Money,
    /// The subject's own taxes, in application order.
    pub taxes: Vec<AppliedCondition>,
    /// Taxes contributed by children.
    pub nested_taxes: Money,
    pub total: Money,
}

impl PriceBreakdown {
    /// All pre-tax adjustments (own and nested).
    pub fn adjustment_total(&self) -> Money {
        self.nested_adjustments + self.adjustments.iter().map(|a| a.amount).sum::<Money>()
    }

    /// All taxes (own and nested).
    pub fn tax_total(&self) -> Money {
        self.nested_taxes + self.taxes.iter().map(|a| a.amount).sum::<Money>()
    }
}

// =============================================================================
// Value Resolution
// =============================================================================

/// Resolves a condition value into a signed adjustment.
///
/// ## Rules
/// 1. Percentages scale `base`; fixed amounts ignore it
/// 2. The magnitude is capped at `max_value` when one is set
/// 3. The sign follows the literal: `"-50%"` is negative even on a
///    negative base
///
/// ## Example
/// ```rust
/// use easycart_core::pricing::resolve_adjustment;
/// use easycart_core::{ConditionValue, Money};
///
/// let half_off: ConditionValue = "-50%".parse().unwrap();
/// let subtotal = Money::from_units(1800);
///
/// assert_eq!(resolve_adjustment(&half_off, subtotal, None), Money::from_units(-900));
/// assert_eq!(
///     resolve_adjustment(&half_off, subtotal, Some(Money::from_units(80))),
///     Money::from_units(-80)
/// );
/// ```
pub fn resolve_adjustment(value: &ConditionValue, base: Money, max_value: Option<Money>) -> Money {
    let raw = match value {
        ConditionValue::Percentage(bps) => base.percentage_magnitude(*bps),
        ConditionValue::Fixed(amount) => amount.abs(),
    };

    let capped = match max_value {
        Some(max) if raw > max.abs() => max.abs(),
        _ => raw,
    };

    capped.with_sign(value.is_negative())
}

// =============================================================================
// Total Computation
// =============================================================================

/// Computes the full breakdown for `subject`.
pub fn price<S: PricingSubject + ?Sized>(subject: &S) -> PriceBreakdown {
    price_with(subject, |_| true)
}

/// Computes the breakdown considering only conditions accepted by `include`.
pub fn price_with<S, F>(subject: &S, include: F) -> PriceBreakdown
where
    S: PricingSubject + ?Sized,
    F: Fn(&Condition) -> bool,
{
    let subtotal = subject.subtotal();
    let nested = subject.nested();
    let mut running = subtotal + nested.adjustments;

    let mut adjustments = Vec::new();
    for condition in subject.conditions().iter().filter(|c| !c.is_tax() && include(c)) {
        if let Some(base) = subject.condition_base(condition) {
            let amount = resolve_adjustment(condition.value(), base, condition.max_value());
            running += amount;
            adjustments.push(AppliedCondition::new(condition, amount));
        }
    }

    let pre_tax = running;

    let mut taxes = Vec::new();
    for condition in subject.conditions().iter().filter(|c| c.is_tax() && include(c)) {
        if let Some(base) = subject.tax_base(condition, running) {
            let amount = resolve_adjustment(condition.value(), base, condition.max_value());
            running += amount;
            taxes.push(AppliedCondition::new(condition, amount));
        }
    }

    PriceBreakdown {
        subtotal,
        nested_adjustments: nested.adjustments,
        adjustments,
        pre_tax,
        taxes,
        nested_taxes: nested.taxes,
        total: running + nested.taxes,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
