//! # Item Store
//!
//! Line items keyed by row id, kept in insertion order.

use serde::{Deserialize, Serialize};

use crate::item::LineItem;
use crate::types::RowId;

/// Insertion-ordered map of `RowId → LineItem`.
///
/// Carts hold a handful of rows, so lookups scan a `Vec`; that keeps the
/// serialized form a plain ordered list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemStore {
    items: Vec<LineItem>,
}

impl ItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `item`, replacing in place any row with the same id.
    pub fn put(&mut self, item: LineItem) {
        match self.position(item.row_id()) {
            Some(index) => self.items[index] = item,
            None => self.items.push(item),
        }
    }

    /// Swaps the row stored under `row_id` for `item`, keeping its position.
    ///
    /// Used when an update re-keys a row. Returns `false` if `row_id` is
    /// unknown.
    pub fn replace(&mut self, row_id: &RowId, item: LineItem) -> bool {
        match self.position(row_id) {
            Some(index) => {
                self.items[index] = item;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, row_id: &RowId) -> Option<&LineItem> {
        self.items.iter().find(|item| item.row_id() == row_id)
    }

    pub fn get_mut(&mut self, row_id: &RowId) -> Option<&mut LineItem> {
        self.items.iter_mut().find(|item| item.row_id() == row_id)
    }

    pub fn remove(&mut self, row_id: &RowId) -> Option<LineItem> {
        self.position(row_id).map(|index| self.items.remove(index))
    }

    pub fn contains(&self, row_id: &RowId) -> bool {
        self.position(row_id).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LineItem> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, LineItem> {
        self.items.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    fn position(&self, row_id: &RowId) -> Option<usize> {
        self.items.iter().position(|item| item.row_id() == row_id)
    }
}

impl<'a> IntoIterator for &'a ItemStore {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
