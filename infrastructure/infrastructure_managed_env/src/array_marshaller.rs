//! Array Marshaller
//!
//! Moves fixed-length arrays of handles and flags between the managed side and
//! native code. Each entry point runs a closure over the elements and releases
//! the array before returning, whichever way the closure exits.
//!
//! Arrays of at most `small_array_limit` elements are copied into a buffer on
//! the stack without negotiating with the runtime; they never appear in the
//! acquire/release counters.

use crate::array_view::ReleaseMode;
use crate::error::BridgeError;
use crate::managed_env::{ManagedArray, ManagedEnv};

/// Size of the on-stack buffer of the small-array path
pub const SMALL_ARRAY_CAPACITY: usize = 16;

/// Default length limit of the small-array path
pub const DEFAULT_SMALL_ARRAY_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayMarshaller {
    small_array_limit: usize,
}

impl Default for ArrayMarshaller {
    fn default() -> Self {
        Self::new(DEFAULT_SMALL_ARRAY_LIMIT)
    }
}

impl ArrayMarshaller {
    /// Marshaller with the given fast-path limit, capped by the stack buffer
    pub fn new(small_array_limit: usize) -> Self {
        Self {
            small_array_limit: small_array_limit.min(SMALL_ARRAY_CAPACITY),
        }
    }

    pub fn small_array_limit(&self) -> usize {
        self.small_array_limit
    }

    fn fits_stack(&self, len: usize) -> bool {
        len <= self.small_array_limit
    }

    /// Run `f` over the elements without changing the managed array
    pub fn with_elements<T, R>(
        &self,
        env: &ManagedEnv,
        array: &mut ManagedArray<T>,
        f: impl FnOnce(&[T]) -> R,
    ) -> Result<R, BridgeError>
    where
        T: Copy + Default,
    {
        if self.fits_stack(array.len()) {
            let mut buffer = [T::default(); SMALL_ARRAY_CAPACITY];
            let elements = &mut buffer[..array.len()];
            elements.copy_from_slice(array.as_slice());
            return Ok(f(elements));
        }
        let view = env.acquire(array)?;
        let result = f(&view);
        view.release(ReleaseMode::Abort);
        Ok(result)
    }

    /// Run `f` over a private copy the callee may reorder
    pub fn with_copy<T, R>(
        &self,
        env: &ManagedEnv,
        array: &mut ManagedArray<T>,
        f: impl FnOnce(&mut [T]) -> R,
    ) -> Result<R, BridgeError>
    where
        T: Copy + Default,
    {
        if self.fits_stack(array.len()) {
            let mut buffer = [T::default(); SMALL_ARRAY_CAPACITY];
            let elements = &mut buffer[..array.len()];
            elements.copy_from_slice(array.as_slice());
            return Ok(f(elements));
        }
        let mut view = env.acquire_defensive(array)?;
        let result = f(&mut view);
        view.release(ReleaseMode::Abort);
        Ok(result)
    }

    /// Run `f` over the elements and write them back only if it succeeds
    pub fn with_elements_mut<T, R, E>(
        &self,
        env: &ManagedEnv,
        array: &mut ManagedArray<T>,
        f: impl FnOnce(&mut [T]) -> Result<R, E>,
    ) -> Result<Result<R, E>, BridgeError>
    where
        T: Copy,
    {
        let mut view = env.acquire_defensive(array)?;
        let result = f(&mut view);
        let mode = if result.is_ok() {
            ReleaseMode::Commit
        } else {
            ReleaseMode::Abort
        };
        view.release(mode);
        Ok(result)
    }

    /// Run `f` over the elements of an optional array; an absent array is empty
    pub fn with_optional<T, R>(
        &self,
        env: &ManagedEnv,
        array: Option<&mut ManagedArray<T>>,
        f: impl FnOnce(&[T]) -> R,
    ) -> Result<R, BridgeError>
    where
        T: Copy + Default,
    {
        match array {
            Some(array) => self.with_elements(env, array, f),
            None => Ok(f(&[])),
        }
    }

    /// Run `f` over two arrays that must have the same length
    ///
    /// A length mismatch is reported before either array is acquired.
    pub fn with_pair<T, U, R>(
        &self,
        env: &ManagedEnv,
        first: &mut ManagedArray<T>,
        second: &mut ManagedArray<U>,
        f: impl FnOnce(&[T], &[U]) -> R,
    ) -> Result<R, BridgeError>
    where
        T: Copy + Default,
        U: Copy + Default,
    {
        if first.len() != second.len() {
            return Err(BridgeError::InvalidArgument(format!(
                "array lengths differ: {} and {}",
                first.len(),
                second.len()
            )));
        }
        self.with_elements(env, first, |a| self.with_elements(env, second, |b| f(a, b)))?
    }
}

/// New managed int array holding `values`
pub fn to_managed_int_array(env: &ManagedEnv, values: &[i32]) -> Result<ManagedArray<i32>, BridgeError> {
    env.new_array(values.to_vec())
}

/// New managed boolean array; nonzero values become `true`
pub fn to_managed_bool_array(env: &ManagedEnv, flags: &[i32]) -> Result<ManagedArray<bool>, BridgeError> {
    env.new_array(flags.iter().map(|&flag| flag != 0).collect())
}

/// New managed byte array holding an encoding
pub fn to_managed_byte_array(env: &ManagedEnv, bytes: Vec<i8>) -> Result<ManagedArray<i8>, BridgeError> {
    env.new_array(bytes)
}
