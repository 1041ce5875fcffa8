//! # Row Identity
//!
//! Derives the stable identifier that decides merge-vs-insert on `add`.
//!
//! ## Canonical Encoding
//! ```text
//! product 1, { size: "M", color: "red" }
//!      │
//!      ▼  sort attribute keys
//! ["1", [["color","red"], ["size","M"]]]      ← JSON text, typed values
//!      │
//!      ▼  SHA-256, lowercase hex
//! RowId("9f2c…")
//! ```
//!
//! JSON keeps value types apart, so `{a: 1}` and `{a: "1"}` hash differently.

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::types::{Attributes, ProductId, RowId};

/// Derives the row identifier for a product + attribute combination.
///
/// Deterministic and independent of attribute insertion order.
///
/// ## Example
/// ```rust
/// use easycart_core::row_id::derive_row_id;
/// use easycart_core::{Attributes, ProductId};
///
/// let a = derive_row_id(&ProductId::from(1), &Attributes::new().with("size", "M").with("color", "red"));
/// let b = derive_row_id(&ProductId::from(1), &Attributes::new().with("color", "red").with("size", "M"));
/// assert_eq!(a, b);
/// ```
pub fn derive_row_id(product_id: &ProductId, attributes: &Attributes) -> RowId {
    let pairs: Vec<Value> = attributes
        .sorted()
        .into_iter()
        .map(|(key, value)| Value::Array(vec![Value::String(key.clone()), value.clone()]))
        .collect();

    let canonical = Value::Array(vec![
        Value::String(product_id.as_str().to_string()),
        Value::Array(pairs),
    ]);

    let mut hasher = Sha256::new();
    hasher.update(canonical.to_string().as_bytes());
    RowId::new(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_input_same_row_id() {
        let attrs = Attributes::new().with("color", "red");
        assert_eq!(
            derive_row_id(&ProductId::from(1), &attrs),
            derive_row_id(&ProductId::from(1), &attrs)
        );
    }

    #[test]
    fn test_attribute_order_does_not_matter() {
        let a = Attributes::new().with("color", "red").with("size", "M");
        let b = Attributes::new().with("size", "M").with("color", "red");
        assert_eq!(
            derive_row_id(&ProductId::from(7), &a),
            derive_row_id(&ProductId::from(7), &b)
        );
    }

    #[test]
    fn test_value_types_are_distinguished() {
        let numeric = Attributes::new().with("a", 1).with("b", 2);
        let textual = Attributes::new().with("a", "1").with("b", "2");
        assert_ne!(
            derive_row_id(&ProductId::from(1), &numeric),
            derive_row_id(&ProductId::from(1), &textual)
        );
    }

    #[test]
    fn test_product_and_attributes_both_participate() {
        let attrs = Attributes::new().with("color", "red");
        let other = Attributes::new().with("color", "blue");
        let base = derive_row_id(&ProductId::from(1), &attrs);
        assert_ne!(base, derive_row_id(&ProductId::from(2), &attrs));
        assert_ne!(base, derive_row_id(&ProductId::from(1), &other));
        assert_ne!(base, derive_row_id(&ProductId::from(1), &Attributes::new()));
    }

    #[test]
    fn test_row_id_is_hex_sha256() {
        let id = derive_row_id(&ProductId::from(1), &Attributes::new());
        assert_eq!(id.as_str().len(), 64);
        assert!(id.as_str().bytes().all(|b| b.is_ascii_hexdigit()));
    }
}
