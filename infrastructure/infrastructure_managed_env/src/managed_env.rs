//! Managed Environment
//!
//! Model of the managed runtime as the bridge sees it during one call: managed
//! arrays, the exception slot and the pinning policy for array access.
//!
//! One environment belongs to one calling thread. Its counters record every
//! array acquisition and release, so callers can check that each acquisition
//! was released exactly once.

use crate::array_view::ArrayView;
use crate::error::BridgeError;
use std::cell::{Cell, RefCell};
use std::collections::HashSet;

/// Exception class raised when the engine runs out of memory
pub const BRIDGE_OUT_OF_MEMORY_CLASS: &str = "TermBridge.OutOfMemory";

/// The runtime's own out-of-memory class, used as a fallback
pub const GENERIC_OUT_OF_MEMORY_CLASS: &str = "OutOfMemoryError";

/// How the runtime hands array elements to native code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PinPolicy {
    /// Native code works on the managed storage itself
    #[default]
    Borrow,
    /// Native code works on a copy
    Copy,
}

/// Exception waiting to be thrown on the managed side
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedException {
    pub class: String,
    pub message: String,
}

/// Array on the managed heap
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ManagedArray<T> {
    pub(crate) elements: Vec<T>,
}

impl<T: Copy> ManagedArray<T> {
    pub fn from_vec(elements: Vec<T>) -> Self {
        Self { elements }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.elements
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.elements.clone()
    }
}

impl<T: Copy> From<Vec<T>> for ManagedArray<T> {
    fn from(elements: Vec<T>) -> Self {
        Self::from_vec(elements)
    }
}

pub type IntArray = ManagedArray<i32>;
pub type BoolArray = ManagedArray<bool>;
pub type ByteArray = ManagedArray<i8>;

#[derive(Debug)]
pub struct ManagedEnv {
    pin_policy: Cell<PinPolicy>,
    known_classes: RefCell<HashSet<String>>,
    pending: RefCell<Option<ManagedException>>,
    /// Elements the managed heap can still allocate; `None` is unlimited
    capacity: Cell<Option<usize>>,
    acquired: Cell<usize>,
    released: Cell<usize>,
}

impl Default for ManagedEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl ManagedEnv {
    pub fn new() -> Self {
        Self::with_pin_policy(PinPolicy::default())
    }

    pub fn with_pin_policy(pin_policy: PinPolicy) -> Self {
        let known_classes = [BRIDGE_OUT_OF_MEMORY_CLASS, GENERIC_OUT_OF_MEMORY_CLASS]
            .into_iter()
            .map(String::from)
            .collect();
        Self {
            pin_policy: Cell::new(pin_policy),
            known_classes: RefCell::new(known_classes),
            pending: RefCell::new(None),
            capacity: Cell::new(None),
            acquired: Cell::new(0),
            released: Cell::new(0),
        }
    }

    pub fn pin_policy(&self) -> PinPolicy {
        self.pin_policy.get()
    }

    pub fn set_pin_policy(&self, pin_policy: PinPolicy) {
        self.pin_policy.set(pin_policy);
    }

    // ------------------------------------------------------------------
    // Exceptions
    // ------------------------------------------------------------------

    /// Make `class` unavailable, as if it could not be loaded
    pub fn unload_class(&self, class: &str) {
        self.known_classes.borrow_mut().remove(class);
    }

    pub fn load_class(&self, class: &str) {
        self.known_classes.borrow_mut().insert(class.to_string());
    }

    /// Set the pending exception, replacing any earlier one
    pub fn throw_new(&self, class: &str, message: &str) -> Result<(), BridgeError> {
        if !self.known_classes.borrow().contains(class) {
            return Err(BridgeError::ClassNotFound(class.to_string()));
        }
        *self.pending.borrow_mut() = Some(ManagedException {
            class: class.to_string(),
            message: message.to_string(),
        });
        Ok(())
    }

    pub fn exception_check(&self) -> bool {
        self.pending.borrow().is_some()
    }

    pub fn pending_exception(&self) -> Option<ManagedException> {
        self.pending.borrow().clone()
    }

    /// Remove and return the pending exception
    pub fn take_exception(&self) -> Option<ManagedException> {
        self.pending.borrow_mut().take()
    }

    // ------------------------------------------------------------------
    // Managed heap
    // ------------------------------------------------------------------

    /// Limit the elements later array allocations may use in total
    pub fn set_capacity(&self, elements: Option<usize>) {
        self.capacity.set(elements);
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity.get()
    }

    /// Allocate a managed array holding `elements`
    ///
    /// When the managed heap is exhausted the runtime's out-of-memory
    /// exception becomes pending, if its class is loaded, and no array is
    /// returned.
    pub fn new_array<T: Copy>(&self, elements: Vec<T>) -> Result<ManagedArray<T>, BridgeError> {
        if let Some(remaining) = self.capacity.get() {
            if elements.len() > remaining {
                if let Err(error) = self.throw_new(GENERIC_OUT_OF_MEMORY_CLASS, "managed heap exhausted") {
                    tracing::debug!(%error, "managed heap exhausted with nothing raised");
                }
                return Err(BridgeError::OutOfMemory);
            }
            self.capacity.set(Some(remaining - elements.len()));
        }
        Ok(ManagedArray::from_vec(elements))
    }

    // ------------------------------------------------------------------
    // Array access
    // ------------------------------------------------------------------

    /// Give native code access to the elements, borrowed or copied per policy
    pub fn acquire<'a, T: Copy>(
        &'a self,
        array: &'a mut ManagedArray<T>,
    ) -> Result<ArrayView<'a, T>, BridgeError> {
        match self.pin_policy.get() {
            PinPolicy::Borrow => Ok(self.record_acquire(ArrayView::borrowed(self, array))),
            PinPolicy::Copy => self.acquire_defensive(array),
        }
    }

    /// Give native code a private copy of the elements
    pub fn acquire_defensive<'a, T: Copy>(
        &'a self,
        array: &'a mut ManagedArray<T>,
    ) -> Result<ArrayView<'a, T>, BridgeError> {
        let mut copy = Vec::new();
        copy.try_reserve_exact(array.len())
            .map_err(|_| BridgeError::OutOfMemory)?;
        copy.extend_from_slice(&array.elements);
        Ok(self.record_acquire(ArrayView::copied(self, array, copy)))
    }

    fn record_acquire<'a, T: Copy>(&self, view: ArrayView<'a, T>) -> ArrayView<'a, T> {
        self.acquired.set(self.acquired.get() + 1);
        view
    }

    pub(crate) fn record_release(&self) {
        self.released.set(self.released.get() + 1);
    }

    pub fn acquired_count(&self) -> usize {
        self.acquired.get()
    }

    pub fn released_count(&self) -> usize {
        self.released.get()
    }

    /// Acquisitions not yet released
    pub fn outstanding(&self) -> usize {
        self.acquired.get().saturating_sub(self.released.get())
    }
}
