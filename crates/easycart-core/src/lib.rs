//! # easycart-core: Pure Cart Logic for EasyCart
//!
//! This crate is the **heart** of EasyCart. It holds the line item rules and
//! the condition (discount, surcharge, tax) engine, with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        EasyCart Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Host Application                             │   │
//! │  │    product pages ──► cart view ──► checkout                     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               easycart-session (Instances & Store)              │   │
//! │  │    CartManager ──► CartHandle ──► CartStore (get/put/forget)    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ easycart-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   cart    │  │ condition │  │  pricing  │  │  events   │  │   │
//! │  │   │   Cart    │  │ Condition │  │  price()  │  │ EventHook │  │   │
//! │  │   │ LineItem  │  │ Registry  │  │ Breakdown │  │  Verdict  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO SESSION • NO NETWORK • DETERMINISTIC TOTALS      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`types`] - Product ids, row ids, attributes, condition targets
//! - [`row_id`] - Row identity derivation (merge-vs-insert key)
//! - [`condition`] - Pricing rules and their values
//! - [`registry`] - Ordered condition collections
//! - [`pricing`] - The one total formula for items and carts
//! - [`item`] / [`items`] - Line items and their store
//! - [`cart`] - The cart and its operations
//! - [`events`] - Veto/observe hook for mutations
//! - [`error`] / [`validation`] - Error types and input rules
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: totals are recomputed on every query, never cached
//! 2. **No I/O**: persistence lives in `easycart-session`
//! 3. **Integer Money**: cents for amounts, basis points for percentages
//! 4. **Fail Fast on Config**: malformed condition values are rejected when built
//!
//! ## Example Usage
//!
//! ```rust
//! use easycart_core::{Cart, Condition, Money, NewItem};
//!
//! let mut cart = Cart::new("default");
//! cart.add(NewItem::new(1, "Desk", Money::from_units(1000), 1));
//!
//! cart.condition(Condition::tax("VAT", "+10%").unwrap());
//! cart.condition(Condition::new("Welcome", "-100", "discount").unwrap());
//!
//! // discount first, then tax: (1000 - 100) * 1.10
//! assert_eq!(cart.total(), Money::from_units(990));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod condition;
pub mod error;
pub mod events;
pub mod item;
pub mod items;
pub mod money;
pub mod pricing;
pub mod registry;
pub mod row_id;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use easycart_core::Cart` instead of
// `use easycart_core::cart::Cart`

pub use cart::{Cart, CartTotals, UpdateOutcome};
pub use condition::{Condition, ConditionValue};
pub use error::{CoreError, CoreResult, ValidationError};
pub use events::{CartEvent, EventDispatcher, EventHook, Verdict};
pub use item::{ItemUpdate, LineItem, NewItem};
pub use items::ItemStore;
pub use money::Money;
pub use pricing::{AppliedCondition, PriceBreakdown};
pub use registry::ConditionRegistry;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Reserved condition type that is always applied after every other
/// adjustment, compounding on the running amount.
pub const TAX_CONDITION_TYPE: &str = "tax";

/// Instance name used when the caller does not pick one.
pub const DEFAULT_INSTANCE_NAME: &str = "default";

/// Namespace prepended to instance names before store lookups.
pub const INSTANCE_PREFIX: &str = "easycart_";
