//! # Validation Module
//!
//! Input validation utilities for EasyCart.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Construction (Result)                                         │
//! │  ├── Condition values must be numbers or percentages                    │
//! │  └── Malformed configuration fails fast                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Mutation (silent no-op)                                       │
//! │  ├── Non-positive quantity deltas are ignored                           │
//! │  └── Cart state is never left half-updated                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use easycart_core::validation::{parse_scaled, validate_quantity};
//!
//! // "10.99" in hundredths
//! let amount = parse_scaled("10.99", "price").unwrap();
//! assert_eq!(amount.magnitude, 1099);
//!
//! assert!(validate_quantity(5).is_ok());
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum characters in a condition or product name.
const MAX_NAME_LEN: usize = 200;

/// Largest accepted `price * quantity` for one row, in cents.
pub const MAX_LINE_SUBTOTAL_CENTS: i64 = 1_000_000_000_000_000;

/// Fractional digits accepted in decimal input (cents / basis points).
const SCALE_DIGITS: usize = 2;

// =============================================================================
// Decimal Parsing
// =============================================================================

/// A decimal literal scaled to hundredths, with its sign kept separately.
///
/// The sign is tracked on its own so that `"-0"` and `"-0%"` still read as
/// negative adjustments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaledDecimal {
    /// True when the literal carried a leading `-`.
    pub negative: bool,
    /// Absolute value in hundredths (`"12.5"` => 1250).
    pub magnitude: i64,
}

impl ScaledDecimal {
    /// Returns the signed value in hundredths.
    #[inline]
    pub const fn signed(&self) -> i64 {
        if self.negative {
            -self.magnitude
        } else {
            self.magnitude
        }
    }
}

/// Parses a decimal literal with at most two fractional digits.
///
/// ## Rules
/// - Optional leading `+` or `-`
/// - At least one digit
/// - At most two digits after the decimal point
/// - No floating point is involved at any step
///
/// ## Example
/// ```rust
/// use easycart_core::validation::parse_scaled;
///
/// assert_eq!(parse_scaled("-50", "value").unwrap().signed(), -5000);
/// assert_eq!(parse_scaled("12.5", "value").unwrap().signed(), 1250);
/// assert!(parse_scaled("1.234", "value").is_err());
/// assert!(parse_scaled("abc", "value").is_err());
/// ```
pub fn parse_scaled(raw: &str, field: &str) -> ValidationResult<ScaledDecimal> {
    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: reason.to_string(),
    };

    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    let (negative, digits) = match raw.as_bytes()[0] {
        b'-' => (true, &raw[1..]),
        b'+' => (false, &raw[1..]),
        _ => (false, raw),
    };

    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (digits, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid("expected at least one digit"));
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("expected a number such as 10, -5.50 or 15%"));
    }
    if fraction.len() > SCALE_DIGITS {
        return Err(invalid("at most two decimal places are allowed"));
    }

    let overflow = || invalid("value is too large");

    let whole_value: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| overflow())?
    };
    let mut fraction_value: i64 = if fraction.is_empty() {
        0
    } else {
        fraction.parse().map_err(|_| overflow())?
    };
    if fraction.len() == 1 {
        fraction_value *= 10;
    }

    let magnitude = whole_value
        .checked_mul(100)
        .and_then(|v| v.checked_add(fraction_value))
        .ok_or_else(overflow)?;

    Ok(ScaledDecimal {
        negative,
        magnitude,
    })
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name (product or condition).
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 200 characters
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity value.
///
/// ## Rules
/// - Must be positive (> 0)
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Cart: Add Item (row already present)                                  │
/// │                                                                         │
/// │  add(id: 1, qty: 4)                                                    │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(4) ← THIS FUNCTION                                  │
/// │       │                                                                 │
/// │       ├── qty <= 0? → delta ignored, row unchanged                     │
/// │       │                                                                 │
/// │       └── OK → existing row quantity += 4                              │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free items)
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::Negative {
            field: "price".to_string(),
        });
    }

    Ok(())
}

/// Validates the subtotal of one row.
///
/// ## Rules
/// - `price * quantity` must not overflow
/// - and must stay at or below [`MAX_LINE_SUBTOTAL_CENTS`], so that a cart
///   of many such rows still sums safely
pub fn validate_line_subtotal(price_cents: i64, qty: i64) -> ValidationResult<()> {
    match price_cents.checked_mul(qty) {
        Some(subtotal) if subtotal <= MAX_LINE_SUBTOTAL_CENTS => Ok(()),
        _ => Err(ValidationError::OutOfRange {
            field: "subtotal".to_string(),
            max: MAX_LINE_SUBTOTAL_CENTS,
        }),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
