//! Allocator Trait and Types
//!
//! Defines the allocation interface the native engine charges its tables
//! against, and the budgeted allocator it uses by default.
//!
//! ## Overview
//!
//! An allocator here does not hand out pointers. The engine stores its entries in
//! ordinary Rust collections; what the allocator tracks is the *budget* those
//! entries consume. Every mutation first calls [`Allocator::charge`] with the
//! size it is about to add. If the budget cannot cover it, the process-wide
//! out-of-memory hook runs before anything has been mutated.
//!
//! Two failure sources are supported:
//!
//! - a hard limit on bytes in use (`engine_memory_limit` in the bridge
//!   configuration);
//! - an injected failure that fires on the n-th next charge, used to force an
//!   allocation failure inside one specific call.
//!
//! ## Examples
//!
//! ```rust
//! use usecases_memory_management::{Allocator, AllocationError, BudgetAllocator};
//!
//! let mut allocator = BudgetAllocator::with_limit(64);
//! assert!(allocator.try_charge(48).is_ok());
//! assert_eq!(allocator.try_charge(32), Err(AllocationError::OutOfMemory));
//! allocator.credit(48);
//! assert_eq!(allocator.in_use(), 0);
//! ```
//!
//! ## See Also
//!
//! - [`out_of_memory`](super::out_of_memory/index.html): what happens when a charge fails

use crate::out_of_memory;

/// Allocation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationError {
    /// Budget exhausted, or an injected failure fired
    OutOfMemory,
    /// Requested size overflows the address space
    InvalidSize,
}

/// Allocator interface charged by the engine
///
/// Implementations must leave their state untouched when `try_charge` fails.
pub trait Allocator {
    /// Charge `bytes` against the allocator
    ///
    /// # Errors
    ///
    /// Returns `AllocationError::OutOfMemory` if the charge cannot be covered and
    /// `AllocationError::InvalidSize` if the running total would overflow.
    fn try_charge(&mut self, bytes: usize) -> Result<(), AllocationError>;

    /// Give back `bytes` previously charged
    fn credit(&mut self, bytes: usize);

    /// Bytes currently charged
    fn in_use(&self) -> usize;

    /// Charge `bytes`, diverting to the out-of-memory hook on failure
    ///
    /// This is the entry point used by engine mutations. It only returns when the
    /// charge succeeded.
    fn charge(&mut self, bytes: usize) {
        if let Err(error) = self.try_charge(bytes) {
            tracing::debug!(bytes, ?error, "engine allocation failed");
            out_of_memory::out_of_memory();
        }
    }
}

/// Budgeted allocator
#[derive(Debug, Clone, Default)]
pub struct BudgetAllocator {
    limit: Option<usize>,
    in_use: usize,
    peak: usize,
    failure_countdown: Option<usize>,
}

impl BudgetAllocator {
    /// Allocator without a limit
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Allocator that fails once more than `limit` bytes are in use
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Current limit
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Replace the limit; bytes already in use stay charged
    pub fn set_limit(&mut self, limit: Option<usize>) {
        self.limit = limit;
    }

    /// Highest number of bytes in use so far
    pub fn peak(&self) -> usize {
        self.peak
    }

    /// Make the charge after the next `successes` charges fail
    ///
    /// `inject_failure(0)` fails the very next charge. The injection is
    /// consumed when it fires.
    pub fn inject_failure(&mut self, successes: usize) {
        self.failure_countdown = Some(successes);
    }

    /// Cancel a pending injected failure
    pub fn clear_injected_failure(&mut self) {
        self.failure_countdown = None;
    }

    /// Whether an injected failure is still pending
    pub fn has_injected_failure(&self) -> bool {
        self.failure_countdown.is_some()
    }
}

impl Allocator for BudgetAllocator {
    fn try_charge(&mut self, bytes: usize) -> Result<(), AllocationError> {
        if let Some(remaining) = self.failure_countdown {
            if remaining == 0 {
                self.failure_countdown = None;
                return Err(AllocationError::OutOfMemory);
            }
            self.failure_countdown = Some(remaining - 1);
        }

        let total = self
            .in_use
            .checked_add(bytes)
            .ok_or(AllocationError::InvalidSize)?;
        if let Some(limit) = self.limit {
            if total > limit {
                return Err(AllocationError::OutOfMemory);
            }
        }
        self.in_use = total;
        self.peak = self.peak.max(total);
        Ok(())
    }

    fn credit(&mut self, bytes: usize) {
        self.in_use = self.in_use.saturating_sub(bytes);
    }

    fn in_use(&self) -> usize {
        self.in_use
    }
}
