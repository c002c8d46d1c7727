//! Fixed-capacity slot table.

use std::ops::Deref;

/// Pre-allocated table of at most `N` items.
///
/// Pushing into a full table drops the item and bumps the overflow counter;
/// the table never grows.
#[derive(Clone, Debug)]
pub struct SlotTable<T, const N: usize> {
    slots: heapless::Vec<T, N>,
    overflow: usize,
}

impl<T, const N: usize> SlotTable<T, N> {
    /// Empty table
    pub const fn new() -> Self {
        Self {
            slots: heapless::Vec::new(),
            overflow: 0,
        }
    }

    /// Append an item; returns `false` when the table was full and it got dropped.
    pub fn push(&mut self, item: T) -> bool {
        match self.slots.push(item) {
            Ok(()) => true,
            Err(_) => {
                self.overflow += 1;
                false
            }
        }
    }

    /// Whether no further item fits.
    pub fn is_full(&self) -> bool {
        self.slots.is_full()
    }

    /// Fixed capacity `N`.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Free slots left.
    pub fn remaining(&self) -> usize {
        N - self.slots.len()
    }

    /// Items dropped since the last [`SlotTable::clear`].
    pub fn overflow(&self) -> usize {
        self.overflow
    }

    /// Remove every item and reset the overflow counter.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.overflow = 0;
    }

    /// Mutable view of the occupied slots.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.slots
    }

    /// Move the items out, leaving the table empty.
    pub fn drain(&mut self) -> impl Iterator<Item = T> + use<T, N> {
        self.overflow = 0;
        std::mem::take(&mut self.slots).into_iter()
    }
}

impl<T, const N: usize> Default for SlotTable<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> Deref for SlotTable<T, N> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.slots
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a SlotTable<T, N> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.iter()
    }
}
