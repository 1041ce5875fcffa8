//! # Conditions
//!
//! A condition is a named pricing rule: a discount, a surcharge or a tax.
//!
//! ## Anatomy of a Condition
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Condition::new("Summer Sale", "-10%", "discount")                      │
//! │      .on_products([1, 2])          ← target + product scope             │
//! │      .max_at(Money::from_units(80)) ← cap on the adjustment magnitude   │
//! │      .with_minimum(Money::from_units(300), false)                       │
//! │                                     ← gate, cart-wide or per item       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Values
//! - `"-50"`, `"+4.99"`: fixed amounts in currency units
//! - `"-50%"`, `"+8.25%"`: percentages of the amount being adjusted
//!
//! Anything else is rejected when the condition is built, so a typo in a
//! promotion can never silently become a zero discount.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{ProductId, Target};
use crate::validation::{parse_scaled, validate_name};
use crate::TAX_CONDITION_TYPE;

// =============================================================================
// Condition Value
// =============================================================================

/// A parsed condition value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ConditionValue {
    /// Fixed signed amount, applied as-is.
    Fixed(Money),
    /// Signed percentage in basis points (`-5000` = -50%).
    Percentage(i64),
}

impl ConditionValue {
    /// True when the literal carried a `-` sign.
    pub fn is_negative(&self) -> bool {
        match self {
            ConditionValue::Fixed(amount) => amount.is_negative(),
            ConditionValue::Percentage(bps) => *bps < 0,
        }
    }

    pub fn is_percentage(&self) -> bool {
        matches!(self, ConditionValue::Percentage(_))
    }
}

impl FromStr for ConditionValue {
    type Err = ValidationError;

    /// Parses `"-50"`, `"-50%"`, `"+ 8.25 %"` (whitespace is ignored).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();

        match compact.strip_suffix('%') {
            Some(number) => {
                let parsed = parse_scaled(number, "value")?;
                Ok(ConditionValue::Percentage(parsed.signed()))
            }
            None => {
                let parsed = parse_scaled(&compact, "value")?;
                Ok(ConditionValue::Fixed(Money::from_cents(parsed.signed())))
            }
        }
    }
}

impl TryFrom<String> for ConditionValue {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ConditionValue> for String {
    fn from(value: ConditionValue) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ConditionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionValue::Fixed(amount) => write!(f, "{}", amount),
            ConditionValue::Percentage(bps) => {
                let sign = if *bps < 0 { "-" } else { "" };
                let bps = bps.abs();
                if bps % 100 == 0 {
                    write!(f, "{}{}%", sign, bps / 100)
                } else {
                    let fraction = format!("{:02}", bps % 100);
                    write!(f, "{}{}.{}%", sign, bps / 100, fraction.trim_end_matches('0'))
                }
            }
        }
    }
}

// =============================================================================
// Condition
// =============================================================================

/// A pricing rule applied to a cart subtotal or to product line items.
///
/// Two conditions are equal when every field matches. Conditions are values:
/// when a cart propagates one to its items, each item receives its own clone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    name: String,
    value: ConditionValue,
    #[serde(rename = "type")]
    kind: String,
    target: Target,
    #[serde(default)]
    products: BTreeSet<ProductId>,
    #[serde(default)]
    max_value: Option<Money>,
    #[serde(default)]
    minimum: Option<Money>,
    #[serde(default)]
    minimum_per_item: bool,
}

impl Condition {
    /// Builds a subtotal-targeted condition.
    ///
    /// ## Errors
    /// `CoreError::InvalidCondition` when the name is empty or the value is
    /// neither a fixed amount nor a percentage.
    ///
    /// ## Example
    /// ```rust
    /// use easycart_core::Condition;
    ///
    /// let half_off = Condition::new("50% Off", "-50%", "discount").unwrap();
    /// assert!(half_off.value().is_percentage());
    ///
    /// assert!(Condition::new("Typo", "-5O%", "discount").is_err());
    /// ```
    pub fn new(name: impl Into<String>, value: &str, kind: impl Into<String>) -> CoreResult<Self> {
        let name = name.into();
        let invalid = |source| CoreError::InvalidCondition {
            name: name.clone(),
            source,
        };

        validate_name("name", &name).map_err(invalid)?;
        let value = value.parse::<ConditionValue>().map_err(invalid)?;

        Ok(Self::from_value(name, value, kind))
    }

    /// Builds a condition from an already-parsed value.
    pub fn from_value(name: impl Into<String>, value: ConditionValue, kind: impl Into<String>) -> Self {
        Condition {
            name: name.into(),
            value,
            kind: kind.into(),
            target: Target::Subtotal,
            products: BTreeSet::new(),
            max_value: None,
            minimum: None,
            minimum_per_item: false,
        }
    }

    /// Shorthand for a condition of the reserved `"tax"` type.
    pub fn tax(name: impl Into<String>, value: &str) -> CoreResult<Self> {
        Self::new(name, value, TAX_CONDITION_TYPE)
    }

    // -------------------------------------------------------------------------
    // Fluent setters (construction time only)
    // -------------------------------------------------------------------------

    /// Targets the cart subtotal (the default).
    pub fn on_cart(mut self) -> Self {
        self.target = Target::Subtotal;
        self.products.clear();
        self
    }

    /// Targets product line items. An empty list means every product.
    pub fn on_products<I, P>(mut self, only: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<ProductId>,
    {
        self.target = Target::Products;
        self.products = only.into_iter().map(Into::into).collect();
        self
    }

    /// Caps the magnitude of the computed adjustment. A zero cap means
    /// uncapped.
    pub fn max_at(mut self, max: Money) -> Self {
        self.max_value = if max.is_zero() { None } else { Some(max.abs()) };
        self
    }

    /// Requires a minimum purchase before the condition applies.
    ///
    /// With `per_item` the gate is checked against each item's own subtotal;
    /// otherwise against the whole cart subtotal. A zero minimum means no
    /// gate.
    pub fn with_minimum(mut self, minimum: Money, per_item: bool) -> Self {
        self.minimum = if minimum.is_positive() { Some(minimum) } else { None };
        self.minimum_per_item = per_item;
        self
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &ConditionValue {
        &self.value
    }

    /// The free-form type tag (`"discount"`, `"shipping"`, `"tax"`, ...).
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn target(&self) -> Target {
        self.target
    }

    /// Product scope; empty means unrestricted.
    pub fn products(&self) -> &BTreeSet<ProductId> {
        &self.products
    }

    pub fn max_value(&self) -> Option<Money> {
        self.max_value
    }

    pub fn minimum(&self) -> Option<Money> {
        self.minimum
    }

    pub fn minimum_per_item(&self) -> bool {
        self.minimum_per_item
    }

    /// True for the reserved `"tax"` type, which is always applied last.
    pub fn is_tax(&self) -> bool {
        self.kind == TAX_CONDITION_TYPE
    }

    /// True when a product scope restricts this condition.
    pub fn is_scoped(&self) -> bool {
        !self.products.is_empty()
    }

    /// True when this is a product condition whose scope includes `product`.
    pub fn applies_to_product(&self, product: &ProductId) -> bool {
        self.target == Target::Products && (self.products.is_empty() || self.products.contains(product))
    }

    /// True when this product condition is gated on the whole cart subtotal.
    pub fn is_cart_gated(&self) -> bool {
        self.target == Target::Products && self.minimum.is_some() && !self.minimum_per_item
    }

    /// Checks the minimum-purchase gate against `amount`.
    pub fn meets_minimum(&self, amount: Money) -> bool {
        self.minimum.map_or(true, |minimum| amount >= minimum)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fixed_and_percentage_values() {
        assert_eq!("-50".parse::<ConditionValue>().unwrap(), ConditionValue::Fixed(Money::from_units(-50)));
        assert_eq!("+4.99".parse::<ConditionValue>().unwrap(), ConditionValue::Fixed(Money::from_cents(499)));
        assert_eq!("-50%".parse::<ConditionValue>().unwrap(), ConditionValue::Percentage(-5000));
        assert_eq!("8.25%".parse::<ConditionValue>().unwrap(), ConditionValue::Percentage(825));
    }

    #[test]
    fn test_parse_ignores_whitespace() {
        assert_eq!(" - 10 % ".parse::<ConditionValue>().unwrap(), ConditionValue::Percentage(-1000));
        assert_eq!("- 5".parse::<ConditionValue>().unwrap(), ConditionValue::Fixed(Money::from_units(-5)));
    }

    #[test]
    fn test_malformed_values_are_rejected() {
        for bad in ["", "abc", "%", "10%%", "-5O%", "1.234", "ten percent"] {
            assert!(bad.parse::<ConditionValue>().is_err(), "{bad:?} should be rejected");
        }
        assert!(matches!(
            Condition::new("Broken", "abc", "discount"),
            Err(CoreError::InvalidCondition { .. })
        ));
    }

    #[test]
    fn test_empty_name_is_rejected() {
        assert!(Condition::new("  ", "-5", "discount").is_err());
    }

    #[test]
    fn test_value_display_round_trips() {
        for text in ["-50%", "12.5%", "8.25%", "-50.00", "4.99"] {
            let value: ConditionValue = text.parse().unwrap();
            assert_eq!(value.to_string().parse::<ConditionValue>().unwrap(), value);
        }
        assert_eq!(ConditionValue::Percentage(-1250).to_string(), "-12.5%");
    }

    #[test]
    fn test_builder_defaults_to_subtotal() {
        let condition = Condition::new("Fee", "+5", "shipping").unwrap();
        assert_eq!(condition.target(), Target::Subtotal);
        assert!(condition.products().is_empty());
        assert_eq!(condition.max_value(), None);
        assert_eq!(condition.minimum(), None);
    }

    #[test]
    fn test_on_products_scope() {
        let scoped = Condition::new("Promo", "-5", "discount").unwrap().on_products([1, 2]);
        assert!(scoped.applies_to_product(&ProductId::from(1)));
        assert!(!scoped.applies_to_product(&ProductId::from(3)));

        let everything = Condition::new("Promo", "-5", "discount")
            .unwrap()
            .on_products(Vec::<ProductId>::new());
        assert!(everything.applies_to_product(&ProductId::from(3)));

        let cart = Condition::new("Promo", "-5", "discount").unwrap();
        assert!(!cart.applies_to_product(&ProductId::from(1)));
    }

    #[test]
    fn test_zero_cap_means_uncapped() {
        let condition = Condition::new("Half", "-50%", "discount").unwrap().max_at(Money::zero());
        assert_eq!(condition.max_value(), None);
    }

    #[test]
    fn test_equality_covers_all_fields() {
        let a = Condition::new("Promo", "-5", "discount").unwrap().on_products([1]);
        let b = Condition::new("Promo", "-5", "discount").unwrap().on_products([1]);
        let c = b.clone().max_at(Money::from_units(3));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_minimum_gate() {
        let gated = Condition::new("Bulk", "-10%", "discount")
            .unwrap()
            .on_products([1, 2])
            .with_minimum(Money::from_units(300), false);
        assert!(gated.is_cart_gated());
        assert!(gated.meets_minimum(Money::from_units(300)));
        assert!(!gated.meets_minimum(Money::from_units(299)));
    }

    #[test]
    fn test_zero_minimum_means_no_gate() {
        let open = Condition::new("Promo", "-5", "discount")
            .unwrap()
            .on_products([1, 2])
            .with_minimum(Money::zero(), false);
        assert_eq!(open.minimum(), None);
        assert!(!open.is_cart_gated());
    }

    #[test]
    fn test_tax_shorthand() {
        assert!(Condition::tax("VAT", "+10%").unwrap().is_tax());
        assert!(!Condition::new("VAT", "+10%", "vat").unwrap().is_tax());
    }

    #[test]
    fn test_condition_serde_validates_value() {
        let json = r#"{"name":"Bad","value":"oops","type":"discount","target":"subtotal"}"#;
        assert!(serde_json::from_str::<Condition>(json).is_err());

        let json = r#"{"name":"Ok","value":"-5%","type":"discount","target":"products","products":["1"]}"#;
        let condition: Condition = serde_json::from_str(json).unwrap();
        assert!(condition.applies_to_product(&ProductId::from(1)));
    }
}
