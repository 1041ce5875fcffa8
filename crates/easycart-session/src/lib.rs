//! # easycart-session: Cart Instances for EasyCart
//!
//! Named cart instances on top of a pluggable store.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Session Layer                                      │
//! │                                                                         │
//! │   SessionConfig ──► CartManager<S: CartStore> ◄── Arc<dyn EventHook>    │
//! │   (toml + env)            │                                             │
//! │                           │ get_or_create("default")                    │
//! │                           ▼                                             │
//! │                      CartHandle ──deref──► easycart_core::Cart          │
//! │                           │                                             │
//! │                           │ put after each mutation                     │
//! │                           ▼                                             │
//! │                      CartStore (MemoryStore, or a host session store)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//! ```rust
//! use easycart_core::{Money, NewItem};
//! use easycart_session::{CartManager, MemoryStore, SessionConfig};
//!
//! # fn main() -> Result<(), easycart_session::SessionError> {
//! let mut manager = CartManager::new(MemoryStore::new(), SessionConfig::default())?;
//!
//! let mut cart = manager.get_or_create(None, None)?;
//! cart.add(NewItem::new(1, "Mug", Money::from_cents(850), 2))?;
//! assert_eq!(cart.qty(), 2);
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod manager;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConditionConfig, SessionConfig};
pub use error::{SessionError, SessionResult};
pub use manager::{CartHandle, CartManager};
pub use store::{CartStore, MemoryStore};
