//! # Condition Registry
//!
//! An ordered, deduplicated list of conditions. Carts and line items each own
//! one; adjustment order follows insertion order.

use serde::{Deserialize, Serialize};

use crate::condition::Condition;
use crate::types::Target;

/// Ordered set of conditions (equality-deduplicated).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConditionRegistry {
    conditions: Vec<Condition>,
}

impl ConditionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `condition` unless an equal one is already present.
    ///
    /// Returns `true` when the condition was inserted.
    pub fn add(&mut self, condition: Condition) -> bool {
        if self.has(&condition) {
            return false;
        }
        self.conditions.push(condition);
        true
    }

    /// Checks membership by full equality.
    pub fn has(&self, condition: &Condition) -> bool {
        self.conditions.iter().any(|c| c == condition)
    }

    /// Removes every condition matching `predicate`, returning how many went.
    pub fn remove<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&Condition) -> bool,
    {
        let before = self.conditions.len();
        self.conditions.retain(|c| !predicate(c));
        before - self.conditions.len()
    }

    /// Keeps only the conditions matching `predicate`.
    pub fn retain<F>(&mut self, predicate: F)
    where
        F: FnMut(&Condition) -> bool,
    {
        self.conditions.retain(predicate);
    }

    pub fn clear(&mut self) {
        self.conditions.clear();
    }

    pub fn filter_by_type(&self, kind: &str) -> Vec<&Condition> {
        self.conditions.iter().filter(|c| c.kind() == kind).collect()
    }

    pub fn filter_by_name(&self, name: &str) -> Vec<&Condition> {
        self.conditions.iter().filter(|c| c.name() == name).collect()
    }

    /// Conditions targeting product line items.
    pub fn product_conditions(&self) -> Vec<&Condition> {
        self.conditions
            .iter()
            .filter(|c| c.target() == Target::Products)
            .collect()
    }

    /// All conditions in insertion order.
    pub fn all(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Condition> {
        self.conditions.iter()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

impl<'a> IntoIterator for &'a ConditionRegistry {
    type Item = &'a Condition;
    type IntoIter = std::slice::Iter<'a, Condition>;

    fn into_iter(self) -> Self::IntoIter {
        self.conditions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn discount(name: &str, value: &str) -> Condition {
        Condition::new(name, value, "discount").unwrap()
    }

    #[test]
    fn test_add_deduplicates_by_equality() {
        let mut registry = ConditionRegistry::new();
        assert!(registry.add(discount("A", "-5")));
        assert!(!registry.add(discount("A", "-5")));
        // same name, different value is a different condition
        assert!(registry.add(discount("A", "-6")));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_insertion_order_is_preserved() {
        let mut registry = ConditionRegistry::new();
        registry.add(discount("B", "-1"));
        registry.add(discount("A", "-2"));
        registry.add(Condition::tax("Tax", "+10%").unwrap());

        let names: Vec<_> = registry.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["B", "A", "Tax"]);
    }

    #[test]
    fn test_filters() {
        let mut registry = ConditionRegistry::new();
        registry.add(discount("A", "-5"));
        registry.add(discount("B", "-5").on_products([1]));
        registry.add(Condition::tax("VAT", "+20%").unwrap());

        assert_eq!(registry.filter_by_type("discount").len(), 2);
        assert_eq!(registry.filter_by_name("VAT").len(), 1);
        assert_eq!(registry.filter_by_name("missing").len(), 0);
        assert_eq!(registry.product_conditions().len(), 1);
    }

    #[test]
    fn test_remove_by_predicate() {
        let mut registry = ConditionRegistry::new();
        registry.add(discount("A", "-5"));
        registry.add(discount("B", "-5"));
        registry.add(Condition::tax("VAT", "+20%").unwrap());

        assert_eq!(registry.remove(|c| c.kind() == "discount"), 2);
        assert_eq!(registry.len(), 1);
        assert!(registry.has(&Condition::tax("VAT", "+20%").unwrap()));

        registry.clear();
        assert!(registry.is_empty());
    }
}
