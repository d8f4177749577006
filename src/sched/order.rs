//! Rotating order list
//!
//! Fixed-size permutation of all categories plus the cursor where the next
//! scan resumes. Moving an entry to the tail is the only mutation.

use super::category::{CATEGORY_COUNT, CategoryKind};
use crate::error::ConfigError;

#[derive(Debug, Clone)]
pub struct OrderList {
    slots: [CategoryKind; CATEGORY_COUNT],
    cursor: usize,
}

impl Default for OrderList {
    fn default() -> Self {
        Self {
            slots: CategoryKind::ALL,
            cursor: 0,
        }
    }
}

impl OrderList {
    /// Build from an explicit permutation of every category.
    pub fn new(order: &[CategoryKind]) -> Result<Self, ConfigError> {
        if order.len() != CATEGORY_COUNT {
            return Err(ConfigError::BadOrder(format!(
                "expected {CATEGORY_COUNT} entries, got {}",
                order.len()
            )));
        }
        let mut seen = [false; CATEGORY_COUNT];
        for kind in order {
            if std::mem::replace(&mut seen[kind.index()], true) {
                return Err(ConfigError::BadOrder(format!("{kind} listed twice")));
            }
        }
        let mut slots = CategoryKind::ALL;
        slots.copy_from_slice(order);
        Ok(Self { slots, cursor: 0 })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn at(&self, pos: usize) -> CategoryKind {
        self.slots[pos]
    }

    pub fn position(&self, kind: CategoryKind) -> Option<usize> {
        self.slots.iter().position(|&k| k == kind)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub(crate) fn set_cursor(&mut self, pos: usize) {
        self.cursor = pos % self.slots.len();
    }

    pub fn as_slice(&self) -> &[CategoryKind] {
        &self.slots
    }

    /// Categories in visiting order, starting at the cursor and wrapping.
    pub fn from_cursor(&self) -> [CategoryKind; CATEGORY_COUNT] {
        let mut out = self.slots;
        out.rotate_left(self.cursor);
        out
    }

    /// Remove the entry at `pos`, shift the rest left and append it at the end.
    pub(crate) fn rotate_to_tail(&mut self, pos: usize) {
        self.slots[pos..].rotate_left(1);
    }
}
