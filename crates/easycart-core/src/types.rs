//! # Domain Types
//!
//! Small value types shared by items, conditions and carts.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   ProductId     │   │     RowId       │   │   Attributes    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  caller's id    │   │  sha256 of id + │   │  ordered map    │       │
//! │  │  ("1", "SKU-9") │   │  sorted attrs   │   │  color → "red"  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐                                                   │
//! │  │     Target      │                                                   │
//! │  │  ─────────────  │                                                   │
//! │  │  Subtotal       │                                                   │
//! │  │  Products       │                                                   │
//! │  └─────────────────┘                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every line item has:
//! - `product_id`: the caller's product identifier (not unique in a cart)
//! - `row_id`: derived from product id + attributes (unique in a cart)

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use ts_rs::TS;

// =============================================================================
// Product Id
// =============================================================================

/// Identifier of the product a line item refers to.
///
/// Integer ids are stored in their decimal form, so `ProductId::from(1)` and
/// `ProductId::from("1")` are the same product.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct ProductId(String);

impl ProductId {
    /// Returns the id as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        ProductId(id.to_string())
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        ProductId(id)
    }
}

impl From<&ProductId> for ProductId {
    fn from(id: &ProductId) -> Self {
        id.clone()
    }
}

macro_rules! product_id_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for ProductId {
                fn from(id: $t) -> Self {
                    ProductId(id.to_string())
                }
            }
        )*
    };
}

product_id_from_int!(i32, i64, u32, u64);

// =============================================================================
// Row Id
// =============================================================================

/// Identity of a line item inside a cart.
///
/// Built by [`crate::row_id::derive_row_id`]; never constructed from
/// arbitrary strings except when looking a row up by a known id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct RowId(String);

impl RowId {
    /// Wraps an already-derived row identifier (e.g. one received from a UI).
    pub fn new(id: impl Into<String>) -> Self {
        RowId(id.into())
    }

    /// Returns the id as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Attributes
// =============================================================================

/// Free-form item attributes (`color`, `size`, ...), kept in insertion order.
///
/// Values keep their JSON type, so `1` and `"1"` are different values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(Map<String, Value>);

impl Attributes {
    /// Creates an empty attribute map.
    pub fn new() -> Self {
        Attributes(Map::new())
    }

    /// Builder-style insert.
    ///
    /// ## Example
    /// ```rust
    /// use easycart_core::Attributes;
    ///
    /// let attrs = Attributes::new().with("color", "red").with("size", "M");
    /// assert_eq!(attrs.get("color").and_then(|v| v.as_str()), Some("red"));
    /// ```
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts or replaces an attribute.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Returns the attribute value for `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Checks whether `key` is present.
    pub fn has(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Iterates in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the entries sorted by key (canonical order for hashing).
    pub fn sorted(&self) -> Vec<(&String, &Value)> {
        let mut entries: Vec<_> = self.0.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

impl<K, V> FromIterator<(K, V)> for Attributes
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Attributes(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl From<Map<String, Value>> for Attributes {
    fn from(map: Map<String, Value>) -> Self {
        Attributes(map)
    }
}

// =============================================================================
// Condition Target
// =============================================================================

/// What a condition adjusts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// Adjusts the cart subtotal.
    Subtotal,
    /// Adjusts the line items of (scoped) products.
    Products,
}

impl Default for Target {
    fn default() -> Self {
        Target::Subtotal
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Subtotal => write!(f, "subtotal"),
            Target::Products => write!(f, "products"),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_id_from_int_and_str_match() {
        assert_eq!(ProductId::from(1), ProductId::from("1"));
        assert_eq!(ProductId::from(42u64).as_str(), "42");
    }

    #[test]
    fn test_attributes_keep_insertion_order() {
        let attrs = Attributes::new().with("size", "M").with("color", "red");
        let keys: Vec<_> = attrs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["size", "color"]);

        let sorted: Vec<_> = attrs.sorted().into_iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(sorted, vec!["color", "size"]);
    }

    #[test]
    fn test_attributes_get_and_has() {
        let attrs: Attributes = [("color", "red")].into_iter().collect();
        assert!(attrs.has("color"));
        assert!(!attrs.has("size"));
        assert_eq!(attrs.get("color"), Some(&Value::from("red")));
        assert_eq!(attrs.len(), 1);
    }

    #[test]
    fn test_target_default_and_display() {
        assert_eq!(Target::default(), Target::Subtotal);
        assert_eq!(Target::Products.to_string(), "products");
    }
}
