//! Slot Tables
//!
//! Terms and types live in slot tables indexed by handle. Freed slots go on a
//! free list and are handed out again, most recently freed first, so a handle
//! number is reused once its entry has been reclaimed.

use entities_data_handling::handle::{handle_index, index_handle, Handle};

#[derive(Debug, Clone)]
pub(crate) struct Table<E> {
    slots: Vec<Option<E>>,
    free: Vec<usize>,
    live: usize,
}

impl<E> Table<E> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    /// Store `entry` and return its handle
    ///
    /// Returns `None` once the 32-bit handle space is exhausted.
    pub(crate) fn insert(&mut self, entry: E) -> Option<Handle> {
        if let Some(index) = self.free.pop() {
            self.slots[index] = Some(entry);
            self.live += 1;
            return index_handle(index);
        }
        let handle = index_handle(self.slots.len())?;
        self.slots.push(Some(entry));
        self.live += 1;
        Some(handle)
    }

    pub(crate) fn get(&self, handle: Handle) -> Option<&E> {
        handle_index(handle)
            .and_then(|index| self.slots.get(index))
            .and_then(Option::as_ref)
    }

    pub(crate) fn get_index(&self, index: usize) -> Option<&E> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub(crate) fn remove_index(&mut self, index: usize) -> Option<E> {
        let entry = self.slots.get_mut(index)?.take()?;
        self.free.push(index);
        self.live -= 1;
        Some(entry)
    }

    pub(crate) fn slots(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn live(&self) -> usize {
        self.live
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_slots_are_reused() {
        let mut table = Table::new();
        let a = table.insert("a").unwrap();
        let b = table.insert("b").unwrap();
        assert_eq!((a, b), (0, 1));

        assert_eq!(table.remove_index(0), Some("a"));
        assert_eq!(table.get(a), None);
        assert_eq!(table.live(), 1);

        let c = table.insert("c").unwrap();
        assert_eq!(c, a);
        assert_eq!(table.get(c), Some(&"c"));
        assert_eq!(table.slots(), 2);
    }

    #[test]
    fn test_negative_handles() {
        let mut table = Table::new();
        table.insert(1u8);
        assert_eq!(table.get(-1), None);
        assert_eq!(table.remove_index(5), None);
    }
}
