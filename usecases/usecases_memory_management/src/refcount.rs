//! Reference Counts
//!
//! The managed side keeps native handles alive across collections by
//! incrementing a per-handle counter. The counter table grows lazily: a handle
//! that was never referenced has no slot, so the first increment may allocate
//! and the caller has to charge for it. Decrements never allocate.

/// Reference count errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefCountError {
    /// Decrement of a counter that is already zero
    Underflow,
}

/// Per-index reference counters
#[derive(Debug, Clone, Default)]
pub struct RefCounts {
    counts: Vec<u32>,
    positive: usize,
}

impl RefCounts {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Current count for `index`
    pub fn count(&self, index: usize) -> u32 {
        self.counts.get(index).copied().unwrap_or(0)
    }

    /// Whether `index` has a positive count
    pub fn is_referenced(&self, index: usize) -> bool {
        self.count(index) > 0
    }

    /// Number of slots an increment of `index` would add to the table
    pub fn growth_for(&self, index: usize) -> usize {
        (index + 1).saturating_sub(self.counts.len())
    }

    /// Increment and return the new count
    pub fn incref(&mut self, index: usize) -> u32 {
        if index >= self.counts.len() {
            self.counts.resize(index + 1, 0);
        }
        let slot = &mut self.counts[index];
        if *slot == 0 {
            self.positive += 1;
        }
        *slot = slot.saturating_add(1);
        *slot
    }

    /// Decrement and return the new count
    ///
    /// # Errors
    ///
    /// Returns `RefCountError::Underflow` if the count is already zero; the
    /// table is left unchanged.
    pub fn decref(&mut self, index: usize) -> Result<u32, RefCountError> {
        match self.counts.get_mut(index) {
            Some(slot) if *slot > 0 => {
                *slot -= 1;
                if *slot == 0 {
                    self.positive -= 1;
                }
                Ok(*slot)
            }
            _ => Err(RefCountError::Underflow),
        }
    }

    /// Drop the count of a reclaimed entry
    pub fn forget(&mut self, index: usize) {
        if let Some(slot) = self.counts.get_mut(index) {
            if *slot > 0 {
                self.positive -= 1;
            }
            *slot = 0;
        }
    }

    /// Number of entries with a positive count
    pub fn num_positive(&self) -> usize {
        self.positive
    }

    /// Indices with a positive count
    pub fn referenced(&self) -> impl Iterator<Item = usize> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(|(index, _)| index)
    }
}
