//! # Error Types
//!
//! Domain-specific error types for easycart-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  easycart-core errors (this file)                                      │
//! │  ├── CoreError        - Configuration / construction failures          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  easycart-session errors (separate crate)                              │
//! │  └── SessionError     - Store, serialization and config failures       │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → SessionError → Host application   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## What Is NOT an Error
//! Ordinary cart business outcomes never surface as errors:
//! - non-positive quantity deltas are ignored
//! - unknown row ids return `false` / `None`
//! - event hook vetoes return `false` / `None`
//!
//! Errors are reserved for malformed configuration, such as a condition value
//! that is neither a number nor a percentage.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core construction errors.
///
/// These represent a cart or condition that cannot be built from the given
/// input. Mutations on a well-formed cart never produce them.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A condition could not be constructed.
    ///
    /// ## When This Occurs
    /// - Value is neither a fixed amount nor a percentage (`"abc"`, `"10%%"`)
    /// - Name is empty
    #[error("Invalid condition '{name}': {source}")]
    InvalidCondition {
        name: String,
        #[source]
        source: ValidationError,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Value is above the accepted ceiling.
    #[error("{field} must be at most {max}")]
    OutOfRange { field: String, max: i64 },

    /// Invalid format (e.g., a condition value that is not a number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
