//! # Session Error Types
//!
//! Error types for cart persistence and manager configuration.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Session Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │     Store       │  │     Core                │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Store          │  │  Core (bad global       │ │
//! │  │  Config (toml)  │  │  Serialization  │  │        condition)       │ │
//! │  │  ConfigSave     │  │                 │  │                         │ │
//! │  │  Io             │  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cart business outcomes (vetoes, unknown rows) are not errors here either;
//! only a failing store or bad configuration is.

use easycart_core::CoreError;
use thiserror::Error;

/// Result type alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Session error type.
#[derive(Debug, Error)]
pub enum SessionError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Configuration values are present but unusable.
    #[error("Invalid session configuration: {0}")]
    InvalidConfig(String),

    /// Config file is not valid TOML for [`crate::SessionConfig`].
    #[error("Failed to parse config: {0}")]
    Config(#[from] toml::de::Error),

    /// Config could not be written.
    #[error("Failed to save config: {0}")]
    ConfigSave(#[from] toml::ser::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // =========================================================================
    // Store Errors
    // =========================================================================
    /// The backing store failed.
    #[error("Cart store error: {0}")]
    Store(String),

    /// A stored cart could not be encoded or decoded.
    #[error("Cart serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    // =========================================================================
    // Core Errors
    // =========================================================================
    /// A configured condition could not be built.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl SessionError {
    /// True for errors raised by the backing store rather than by config.
    pub fn is_store_error(&self) -> bool {
        matches!(self, SessionError::Store(_) | SessionError::Serialization(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use easycart_core::Condition;

    #[test]
    fn test_core_error_converts() {
        let core = Condition::new("Broken", "abc", "discount").unwrap_err();
        let error: SessionError = core.into();
        assert!(matches!(error, SessionError::Core(_)));
        assert!(error.to_string().contains("Broken"));
        assert!(!error.is_store_error());
    }

    #[test]
    fn test_serialization_error_is_store_error() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = SessionError::from(json_error);
        assert!(error.is_store_error());
    }
}
