//! Common Encoding/Decoding Utilities
//!
//! Shared pieces of the integer and rational codecs: the error types, the
//! scratch buffer and the two's complement helpers.
//!
//! ## Scratch buffers
//!
//! Both directions work in a scratch buffer one byte longer than the magnitude.
//! Buffers up to the configured threshold live on the stack. Larger ones are
//! charged to the engine [`Allocator`] and reserved fallibly, so an exhausted
//! budget surfaces as [`EncodeError::OutOfMemory`] instead of aborting. The
//! charge is returned when the buffer is dropped, on every exit path.

use thiserror::Error;
use usecases_memory_management::{AllocationError, Allocator};

/// Scratch bytes kept on the stack unless configured otherwise
pub const DEFAULT_STACK_SCRATCH_BYTES: usize = 32;

/// Largest stack threshold a caller may configure
pub const MAX_STACK_SCRATCH_BYTES: usize = 64;

/// Largest encoding a managed byte array can hold
pub const MAX_ENCODING_BYTES: u64 = i32::MAX as u64;

/// Encoding errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// The encoding would not fit a managed byte array
    #[error("encoding needs {bytes} bytes, more than a managed array can hold")]
    EncodingTooLarge { bytes: u64 },
    /// The scratch buffer could not be allocated
    #[error("out of memory while encoding")]
    OutOfMemory,
}

/// Decoding errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("zero denominator")]
    ZeroDenominator,
    /// The scratch buffer could not be allocated
    #[error("out of memory while decoding")]
    OutOfMemory,
}

impl From<AllocationError> for EncodeError {
    fn from(_: AllocationError) -> Self {
        EncodeError::OutOfMemory
    }
}

impl From<AllocationError> for DecodeError {
    fn from(_: AllocationError) -> Self {
        DecodeError::OutOfMemory
    }
}

/// Scratch length for a magnitude of `bits` significant bits
///
/// Zero counts as one bit. The extra leading byte leaves room for the sign.
pub(crate) fn scratch_len(bits: u64) -> Result<usize, EncodeError> {
    let bytes = bits.max(1).div_ceil(8) + 1;
    if bytes > MAX_ENCODING_BYTES {
        return Err(EncodeError::EncodingTooLarge { bytes });
    }
    usize::try_from(bytes).map_err(|_| EncodeError::EncodingTooLarge { bytes })
}

/// Two's complement negation of a big-endian byte string
pub(crate) fn negate_in_place(bytes: &mut [u8]) {
    let mut carry = true;
    for byte in bytes.iter_mut().rev() {
        let (sum, overflow) = (!*byte).overflowing_add(u8::from(carry));
        *byte = sum;
        carry = overflow;
    }
}

/// Whether `first` only repeats the sign already carried by `second`
pub(crate) fn is_redundant(first: u8, second: u8) -> bool {
    let second_negative = second & 0x80 != 0;
    (first == 0x00 && !second_negative) || (first == 0xFF && second_negative)
}

/// Zeroed scratch bytes, on the stack or charged to an allocator
pub(crate) struct Scratch<'a> {
    stack: [u8; MAX_STACK_SCRATCH_BYTES],
    heap: Vec<u8>,
    len: usize,
    charged: usize,
    allocator: &'a mut dyn Allocator,
}

impl<'a> Scratch<'a> {
    pub(crate) fn new(
        len: usize,
        stack_bytes: usize,
        allocator: &'a mut dyn Allocator,
    ) -> Result<Self, AllocationError> {
        let mut scratch = Scratch {
            stack: [0; MAX_STACK_SCRATCH_BYTES],
            heap: Vec::new(),
            len,
            charged: 0,
            allocator,
        };
        if len > stack_bytes.min(MAX_STACK_SCRATCH_BYTES) {
            scratch.allocator.try_charge(len)?;
            scratch.charged = len;
            scratch
                .heap
                .try_reserve_exact(len)
                .map_err(|_| AllocationError::OutOfMemory)?;
            scratch.heap.resize(len, 0);
        }
        Ok(scratch)
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        if self.charged > 0 {
            &self.heap
        } else {
            &self.stack[..self.len]
        }
    }

    pub(crate) fn bytes_mut(&mut self) -> &mut [u8] {
        if self.charged > 0 {
            &mut self.heap
        } else {
            &mut self.stack[..self.len]
        }
    }
}

impl Drop for Scratch<'_> {
    fn drop(&mut self) {
        if self.charged > 0 {
            self.allocator.credit(self.charged);
        }
    }
}
