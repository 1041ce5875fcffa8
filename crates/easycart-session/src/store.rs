//! # Cart Store
//!
//! Where carts live between requests.
//!
//! ## Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CartStore (keyed by namespaced instance name, e.g. "easycart_default") │
//! │                                                                         │
//! │   get(key)        → Some(cart) | None                                   │
//! │   put(key, cart)  → overwrite (last write wins)                         │
//! │   has(key)        → bool                                                │
//! │   forget(key)     → removed, missing keys are fine                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A store hands out independent copies: mutating a loaded cart never
//! changes the stored one until it is `put` back.

use std::collections::HashMap;

use easycart_core::Cart;
use tracing::debug;

use crate::error::SessionResult;

/// Persistence backend for carts.
pub trait CartStore {
    fn get(&self, key: &str) -> SessionResult<Option<Cart>>;

    fn put(&mut self, key: &str, cart: &Cart) -> SessionResult<()>;

    fn has(&self, key: &str) -> SessionResult<bool>;

    fn forget(&mut self, key: &str) -> SessionResult<()>;
}

/// Process-local store holding carts as JSON, like a session would.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored carts.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The serialized form of a stored cart.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl CartStore for MemoryStore {
    fn get(&self, key: &str) -> SessionResult<Option<Cart>> {
        match self.entries.get(key) {
            Some(json) => Ok(Some(serde_json::from_str(json)?)),
            None => Ok(None),
        }
    }

    fn put(&mut self, key: &str, cart: &Cart) -> SessionResult<()> {
        let json = serde_json::to_string(cart)?;
        debug!(key, bytes = json.len(), "Stored cart");
        self.entries.insert(key.to_string(), json);
        Ok(())
    }

    fn has(&self, key: &str) -> SessionResult<bool> {
        Ok(self.entries.contains_key(key))
    }

    fn forget(&mut self, key: &str) -> SessionResult<()> {
        if self.entries.remove(key).is_some() {
            debug!(key, "Forgot cart");
        }
        Ok(())
    }
}
