//! # Cart Manager
//!
//! Maps instance names to carts held in a [`CartStore`].
//!
//! ## Instance Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  manager.get_or_create(Some("wishlist"), None)                          │
//! │       │                                                                 │
//! │       ▼  key = prefix + name = "easycart_wishlist"                      │
//! │  store.get(key)                                                         │
//! │       ├── Some(cart) → re-attach event hook                             │
//! │       └── None       → new cart + global conditions, store.put(key)     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CartHandle ── add / update / remove / condition ──► store.put(key)     │
//! │       │                                                                 │
//! │       ▼  handle.destroy()                                               │
//! │  store.forget(key); the next get_or_create starts from an empty cart    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//! Single writer per instance. The handle writes the whole cart after every
//! mutation; two writers on one instance means the last `put` wins.

use std::ops::Deref;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use easycart_core::{
    Cart, Condition, EventDispatcher, EventHook, ItemUpdate, NewItem, RowId, UpdateOutcome,
};
use tracing::{debug, info};

use crate::config::SessionConfig;
use crate::error::SessionResult;
use crate::store::CartStore;

// =============================================================================
// Manager
// =============================================================================

/// Owns the store and the event hook, and hands out cart handles.
pub struct CartManager<S: CartStore> {
    store: S,
    events: EventDispatcher,
    global_conditions: Vec<Condition>,
    config: SessionConfig,
}

impl<S: CartStore> CartManager<S> {
    /// Creates a manager over `store`.
    ///
    /// ## Errors
    /// Fails when a global condition in `config` cannot be built.
    pub fn new(store: S, config: SessionConfig) -> SessionResult<Self> {
        let global_conditions = config.conditions()?;
        Ok(CartManager {
            store,
            events: EventDispatcher::none(),
            global_conditions,
            config,
        })
    }

    /// Attaches the event hook passed to every cart this manager hands out.
    pub fn with_hook(mut self, hook: Arc<dyn EventHook>) -> Self {
        self.events = EventDispatcher::new(hook);
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The store key for an instance name (`None` = default instance).
    pub fn instance_key(&self, name: Option<&str>) -> String {
        format!("{}{}", self.config.prefix, self.instance_name(name))
    }

    fn instance_name<'a>(&'a self, name: Option<&'a str>) -> &'a str {
        name.unwrap_or(&self.config.default_instance)
    }

    /// Conditions applied to carts created from now on.
    pub fn add_global_condition(&mut self, condition: Condition) {
        if !self.global_conditions.contains(&condition) {
            self.global_conditions.push(condition);
        }
    }

    pub fn global_conditions(&self) -> &[Condition] {
        &self.global_conditions
    }

    /// Loads the named cart, or creates and stores a new one.
    ///
    /// `expiration` only applies when the cart is created.
    pub fn get_or_create(
        &mut self,
        name: Option<&str>,
        expiration: Option<DateTime<Utc>>,
    ) -> SessionResult<CartHandle<'_, S>> {
        let key = self.instance_key(name);
        let instance = self.instance_name(name).to_string();

        let cart = match self.store.get(&key)? {
            Some(mut cart) => {
                debug!(key = %key, "Loaded cart");
                cart.set_events(self.events.clone());
                cart
            }
            None => {
                let mut cart = Cart::new(instance)
                    .expires_at(expiration)
                    .with_events(self.events.clone());
                for condition in &self.global_conditions {
                    cart.condition(condition.clone());
                }
                self.store.put(&key, &cart)?;
                info!(key = %key, globals = self.global_conditions.len(), "Created cart");
                cart
            }
        };

        Ok(CartHandle {
            store: &mut self.store,
            key,
            cart,
        })
    }

    pub fn has(&self, name: Option<&str>) -> SessionResult<bool> {
        self.store.has(&self.instance_key(name))
    }

    /// Removes the named cart from the store.
    pub fn destroy(&mut self, name: Option<&str>) -> SessionResult<()> {
        let key = self.instance_key(name);
        self.store.forget(&key)?;
        info!(key = %key, "Destroyed cart");
        Ok(())
    }
}

// =============================================================================
// Handle
// =============================================================================

/// A loaded cart bound to its store key.
///
/// Derefs to [`Cart`] for queries. Every mutation that changes the cart is
/// written back to the store before returning.
pub struct CartHandle<'m, S: CartStore> {
    store: &'m mut S,
    key: String,
    cart: Cart,
}

impl<S: CartStore> CartHandle<'_, S> {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn add(&mut self, item: NewItem) -> SessionResult<Option<RowId>> {
        let row_id = self.cart.add(item);
        if row_id.is_some() {
            self.persist()?;
        }
        Ok(row_id)
    }

    pub fn add_many<I>(&mut self, items: I) -> SessionResult<Vec<RowId>>
    where
        I: IntoIterator<Item = NewItem>,
    {
        let rows = self.cart.add_many(items);
        if !rows.is_empty() {
            self.persist()?;
        }
        Ok(rows)
    }

    pub fn update(&mut self, row_id: &RowId, update: impl Into<ItemUpdate>) -> SessionResult<UpdateOutcome> {
        let outcome = self.cart.update(row_id, update);
        if outcome.is_applied() {
            self.persist()?;
        }
        Ok(outcome)
    }

    pub fn remove(&mut self, row_id: &RowId) -> SessionResult<bool> {
        let removed = self.cart.remove(row_id);
        if removed {
            self.persist()?;
        }
        Ok(removed)
    }

    /// Adds a cart condition; persisted even when only item registries
    /// changed.
    pub fn condition(&mut self, condition: Condition) -> SessionResult<bool> {
        let added = self.cart.condition(condition);
        self.persist()?;
        Ok(added)
    }

    pub fn conditions_from<I>(&mut self, conditions: I) -> SessionResult<usize>
    where
        I: IntoIterator<Item = Condition>,
    {
        let added = self.cart.conditions_from(conditions);
        self.persist()?;
        Ok(added)
    }

    pub fn remove_condition_by_type(&mut self, kind: &str) -> SessionResult<usize> {
        let removed = self.cart.remove_condition_by_type(kind);
        self.persist()?;
        Ok(removed)
    }

    pub fn remove_condition_by_name(&mut self, name: &str) -> SessionResult<usize> {
        let removed = self.cart.remove_condition_by_name(name);
        self.persist()?;
        Ok(removed)
    }

    pub fn remove_all_conditions(&mut self) -> SessionResult<()> {
        self.cart.remove_all_conditions();
        self.persist()
    }

    /// Empties the cart (conditions stay) and stores it.
    pub fn clear(&mut self) -> SessionResult<()> {
        self.cart.clear();
        self.persist()
    }

    /// Removes this instance from the store.
    pub fn destroy(self) -> SessionResult<()> {
        self.store.forget(&self.key)?;
        info!(key = %self.key, "Destroyed cart");
        Ok(())
    }

    fn persist(&mut self) -> SessionResult<()> {
        self.store.put(&self.key, &self.cart)
    }
}

impl<S: CartStore> Deref for CartHandle<'_, S> {
    type Target = Cart;

    fn deref(&self) -> &Cart {
        &self.cart
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::Duration;
    use easycart_core::{CartEvent, Money, Verdict};
    use std::sync::Mutex;

    #[derive(Default)]
    struct EventLog {
        names: Mutex<Vec<String>>,
    }

    impl EventLog {
        fn names(&self) -> Vec<String> {
            self.names.lock().unwrap().clone()
        }
    }

    impl EventHook for EventLog {
        fn handle(&self, event: &CartEvent<'_>) -> Verdict {
            self.names.lock().unwrap().push(event.name().to_string());
            Verdict::Proceed
        }
    }

    fn manager() -> CartManager<MemoryStore> {
        CartManager::new(MemoryStore::new(), SessionConfig::default()).unwrap()
    }

    fn mug(qty: i64) -> NewItem {
        NewItem::new(1, "Mug", Money::from_cents(850), qty)
    }

    #[test]
    fn test_instance_keys_are_prefixed() {
        let manager = manager();
        assert_eq!(manager.instance_key(None), "easycart_default");
        assert_eq!(manager.instance_key(Some("wishlist")), "easycart_wishlist");
    }

    #[test]
    fn test_mutations_are_persisted() {
        let mut manager = manager();
        {
            let mut cart = manager.get_or_create(None, None).unwrap();
            cart.add(mug(2)).unwrap();
            cart.add(mug(1)).unwrap();
        }

        let cart = manager.get_or_create(None, None).unwrap();
        assert_eq!(cart.qty(), 3);
        assert_eq!(cart.name(), "default");
    }

    #[test]
    fn test_update_and_remove_are_persisted() {
        let mut manager = manager();
        let row = manager.get_or_create(None, None).unwrap().add(mug(2)).unwrap().unwrap();

        let outcome = manager.get_or_create(None, None).unwrap().update(&row, 5).unwrap();
        assert_eq!(outcome, UpdateOutcome::Updated(row.clone()));
        assert_eq!(manager.get_or_create(None, None).unwrap().qty(), 5);

        assert!(manager.get_or_create(None, None).unwrap().remove(&row).unwrap());
        assert!(manager.get_or_create(None, None).unwrap().is_empty());
    }

    #[test]
    fn test_global_conditions_apply_to_new_carts() {
        let mut manager = manager();
        manager.add_global_condition(Condition::tax("VAT", "+10%").unwrap());
        manager.add_global_condition(Condition::tax("VAT", "+10%").unwrap());
        assert_eq!(manager.global_conditions().len(), 1);

        let mut cart = manager.get_or_create(Some("shop"), None).unwrap();
        cart.add(NewItem::new(1, "Desk", Money::from_units(100), 1)).unwrap();
        assert_eq!(cart.total(), Money::from_units(110));
    }

    #[test]
    fn test_global_conditions_from_config() {
        let config = SessionConfig::from_toml_str(
            r#"
[[global_conditions]]
name = "Welcome"
value = "-5"
"#,
        )
        .unwrap();
        let mut manager = CartManager::new(MemoryStore::new(), config).unwrap();
        let cart = manager.get_or_create(None, None).unwrap();
        assert_eq!(cart.conditions().len(), 1);
    }

    #[test]
    fn test_destroy_only_affects_one_instance() {
        let mut manager = manager();
        manager.get_or_create(Some("a"), None).unwrap().add(mug(1)).unwrap();
        manager.get_or_create(Some("b"), None).unwrap().add(mug(2)).unwrap();

        manager.get_or_create(Some("a"), None).unwrap().destroy().unwrap();

        assert!(!manager.has(Some("a")).unwrap());
        assert!(manager.has(Some("b")).unwrap());
        assert_eq!(manager.get_or_create(Some("b"), None).unwrap().qty(), 2);
        // a destroyed instance comes back empty
        assert!(manager.get_or_create(Some("a"), None).unwrap().is_empty());
    }

    #[test]
    fn test_destroy_by_name() {
        let mut manager = manager();
        manager.get_or_create(None, None).unwrap();
        assert!(manager.has(None).unwrap());
        manager.destroy(None).unwrap();
        assert!(!manager.has(None).unwrap());
    }

    #[test]
    fn test_expiration_set_on_creation_only() {
        let mut manager = manager();
        let past = Utc::now() - Duration::hours(1);

        assert!(manager.get_or_create(None, Some(past)).unwrap().is_expired());

        // the stored expiration wins over a new argument
        let later = Utc::now() + Duration::hours(1);
        let cart = manager.get_or_create(None, Some(later)).unwrap();
        assert_eq!(cart.expiration_timestamp(), Some(past.timestamp()));
    }

    #[test]
    fn test_hook_reattached_after_load() {
        let log = Arc::new(EventLog::default());
        let mut manager = manager().with_hook(log.clone());

        manager.get_or_create(None, None).unwrap().add(mug(1)).unwrap();
        manager.get_or_create(None, None).unwrap().add(mug(1)).unwrap();

        let adds = log.names().iter().filter(|n| *n == "cart.added").count();
        assert_eq!(adds, 2);
    }

    #[test]
    fn test_custom_prefix_and_default_instance() {
        let config = SessionConfig {
            prefix: "shop_".into(),
            default_instance: "main".into(),
            ..SessionConfig::default()
        };
        let mut manager = CartManager::new(MemoryStore::new(), config).unwrap();
        manager.get_or_create(None, None).unwrap();

        assert!(manager.store().has("shop_main").unwrap());
    }
}
