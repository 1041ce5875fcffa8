//! # Cart Events
//!
//! The hook through which a host application observes, and may veto, cart
//! mutations.
//!
//! ## Event Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  cart.add(...)                                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  "cart.adding"  ──► hook returns Veto? ──► yes: return None, no change │
//! │       │                                                                 │
//! │       ▼ Proceed                                                         │
//! │  item stored, conditions propagated                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  "cart.added"   ──► verdict ignored (already committed)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only the `*ing` events can cancel a mutation.

use std::fmt;
use std::sync::Arc;

use crate::condition::Condition;
use crate::item::LineItem;
use crate::types::RowId;

/// What a hook decides about a pending mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verdict {
    #[default]
    Proceed,
    Veto,
}

/// A cart lifecycle event with its payload.
#[derive(Debug, Clone, Copy)]
pub enum CartEvent<'a> {
    Adding { cart: &'a str, item: &'a LineItem },
    Added { cart: &'a str, row_id: &'a RowId },
    Deleting { cart: &'a str, item: &'a LineItem },
    Deleted { cart: &'a str, row_id: &'a RowId, item: &'a LineItem },
    ConditionAdding { cart: &'a str, condition: &'a Condition },
    ConditionAdded { cart: &'a str, condition: &'a Condition },
    ItemConditionAdding { item: &'a LineItem, condition: &'a Condition },
    ItemConditionAdded { item: &'a LineItem, condition: &'a Condition },
    ItemUpdating { item: &'a LineItem },
    ItemUpdated { item: &'a LineItem },
}

impl CartEvent<'_> {
    /// The stable event identifier (`"cart.adding"`, ...).
    pub fn name(&self) -> &'static str {
        match self {
            CartEvent::Adding { .. } => "cart.adding",
            CartEvent::Added { .. } => "cart.added",
            CartEvent::Deleting { .. } => "cart.deleting",
            CartEvent::Deleted { .. } => "cart.deleted",
            CartEvent::ConditionAdding { .. } => "cart.condition.adding",
            CartEvent::ConditionAdded { .. } => "cart.condition.added",
            CartEvent::ItemConditionAdding { .. } => "cart_item.condition.adding",
            CartEvent::ItemConditionAdded { .. } => "cart_item.condition.added",
            CartEvent::ItemUpdating { .. } => "cart_item.updating",
            CartEvent::ItemUpdated { .. } => "cart_item.updated",
        }
    }

    /// True for events fired before a mutation commits.
    pub fn is_cancelable(&self) -> bool {
        matches!(
            self,
            CartEvent::Adding { .. }
                | CartEvent::Deleting { .. }
                | CartEvent::ConditionAdding { .. }
                | CartEvent::ItemConditionAdding { .. }
                | CartEvent::ItemUpdating { .. }
        )
    }
}

/// Host-provided observer of cart events.
pub trait EventHook: Send + Sync {
    fn handle(&self, event: &CartEvent<'_>) -> Verdict;
}

impl<F> EventHook for F
where
    F: Fn(&CartEvent<'_>) -> Verdict + Send + Sync,
{
    fn handle(&self, event: &CartEvent<'_>) -> Verdict {
        self(event)
    }
}

/// Shared handle to an optional [`EventHook`].
///
/// Not serialized with the cart; the session layer re-attaches it on load.
#[derive(Clone, Default)]
pub struct EventDispatcher {
    hook: Option<Arc<dyn EventHook>>,
}

impl EventDispatcher {
    pub fn new(hook: Arc<dyn EventHook>) -> Self {
        EventDispatcher { hook: Some(hook) }
    }

    /// A dispatcher that lets everything through.
    pub fn none() -> Self {
        Self::default()
    }

    /// Fires a cancelable event. Returns `false` when the hook vetoed.
    pub fn allows(&self, event: CartEvent<'_>) -> bool {
        let Some(hook) = &self.hook else {
            return true;
        };

        let verdict = hook.handle(&event);
        if verdict == Verdict::Veto && event.is_cancelable() {
            tracing::debug!(event = event.name(), "Mutation vetoed by event hook");
            return false;
        }
        true
    }

    /// Fires a notification event; the verdict is ignored.
    pub fn notify(&self, event: CartEvent<'_>) {
        if let Some(hook) = &self.hook {
            hook.handle(&event);
        }
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("attached", &self.hook.is_some())
            .finish()
    }
}

// =============================================================================
// Test Support
// =============================================================================


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        let row_id = RowId::new("abc");
        let event = CartEvent::Added {
            cart: "default",
            row_id: &row_id,
        };
        assert_eq!(event.name(), "cart.added");
        assert!(!event.is_cancelable());
    }

    #[test]
    fn test_dispatcher_without_hook_allows_everything() {
        let condition = Condition::new("A", "-5", "discount").unwrap();
        let dispatcher = EventDispatcher::none();
        assert!(dispatcher.allows(CartEvent::ConditionAdding {
            cart: "default",
            condition: &condition,
        }));
    }

    #[test]
    fn test_function_hook_can_veto() {
        let condition = Condition::new("A", "-5", "discount").unwrap();
        fn veto_conditions(event: &CartEvent<'_>) -> Verdict {
            if event.name() == "cart.condition.adding" {
                Verdict::Veto
            } else {
                Verdict::Proceed
            }
        }
        let dispatcher = EventDispatcher::new(Arc::new(veto_conditions));

        assert!(!dispatcher.allows(CartEvent::ConditionAdding {
            cart: "default",
            condition: &condition,
        }));
        // a veto on a notification is ignored
        assert!(dispatcher.allows(CartEvent::ConditionAdded {
            cart: "default",
            condition: &condition,
        }));
    }
}
