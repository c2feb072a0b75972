//! Array Views
//!
//! Native access to a managed array between one acquisition and its release.
//! A view either borrows the managed storage or owns a copy of it. Releasing a
//! copy with [`ReleaseMode::Commit`] writes it back; [`ReleaseMode::Abort`]
//! discards it. A view that is dropped without an explicit release is released
//! with `Abort`, so every acquisition is released exactly once, unwinding
//! included.

use crate::managed_env::{ManagedArray, ManagedEnv};
use std::ops::{Deref, DerefMut};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseMode {
    /// Copy native changes back into the managed array
    Commit,
    /// Discard native changes made to a copy
    Abort,
}

enum Storage<T> {
    Borrowed,
    Copied(Vec<T>),
}

pub struct ArrayView<'a, T: Copy> {
    env: &'a ManagedEnv,
    array: &'a mut ManagedArray<T>,
    storage: Storage<T>,
    released: bool,
}

impl<'a, T: Copy> ArrayView<'a, T> {
    pub(crate) fn borrowed(env: &'a ManagedEnv, array: &'a mut ManagedArray<T>) -> Self {
        Self {
            env,
            array,
            storage: Storage::Borrowed,
            released: false,
        }
    }

    pub(crate) fn copied(env: &'a ManagedEnv, array: &'a mut ManagedArray<T>, copy: Vec<T>) -> Self {
        Self {
            env,
            array,
            storage: Storage::Copied(copy),
            released: false,
        }
    }

    /// Whether native code works on a copy
    pub fn is_copy(&self) -> bool {
        matches!(self.storage, Storage::Copied(_))
    }

    /// End native access
    pub fn release(mut self, mode: ReleaseMode) {
        self.finish(mode);
    }

    fn finish(&mut self, mode: ReleaseMode) {
        if self.released {
            return;
        }
        self.released = true;
        if let (ReleaseMode::Commit, Storage::Copied(copy)) = (mode, &self.storage) {
            self.array.elements.copy_from_slice(copy);
        }
        self.env.record_release();
    }
}

impl<T: Copy> Deref for ArrayView<'_, T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        match &self.storage {
            Storage::Borrowed => &self.array.elements,
            Storage::Copied(copy) => copy,
        }
    }
}

impl<T: Copy> DerefMut for ArrayView<'_, T> {
    fn deref_mut(&mut self) -> &mut [T] {
        match &mut self.storage {
            Storage::Borrowed => &mut self.array.elements,
            Storage::Copied(copy) => copy,
        }
    }
}

impl<T: Copy> Drop for ArrayView<'_, T> {
    fn drop(&mut self) {
        self.finish(ReleaseMode::Abort);
    }
}
