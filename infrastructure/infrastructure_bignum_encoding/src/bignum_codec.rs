//! Bignum Codec Module
//!
//! Converts [`BigNumber`] values to and from the managed byte encoding:
//! big-endian two's complement of minimal length, with bytes signed as the
//! managed side sees them.
//!
//! | value | bytes        |
//! |-------|--------------|
//! | 0     | `[0]`        |
//! | 127   | `[127]`      |
//! | 128   | `[0, -128]`  |
//! | -128  | `[-128]`     |
//! | 255   | `[0, -1]`    |
//! | -255  | `[-1, 1]`    |
//! | 256   | `[1, 0]`     |

use crate::common::{
    is_redundant, negate_in_place, scratch_len, DecodeError, EncodeError, Scratch,
    DEFAULT_STACK_SCRATCH_BYTES,
};
use entities_utilities::BigNumber;
use usecases_memory_management::{Allocator, BudgetAllocator};

/// Bignum codec
pub struct BignumCodec;

impl BignumCodec {
    /// Encode with an unbounded scratch allocator
    pub fn encode(value: &BigNumber) -> Result<Vec<i8>, EncodeError> {
        Self::encode_in(value, &mut BudgetAllocator::unbounded(), DEFAULT_STACK_SCRATCH_BYTES)
    }

    /// Encode, charging scratch buffers above `stack_bytes` to `allocator`
    pub fn encode_in(
        value: &BigNumber,
        allocator: &mut dyn Allocator,
        stack_bytes: usize,
    ) -> Result<Vec<i8>, EncodeError> {
        let len = scratch_len(value.significant_bits())?;
        let mut scratch = Scratch::new(len, stack_bytes, allocator)?;
        let bytes = scratch.bytes_mut();

        // bytes[0] stays zero; the magnitude fills the rest, most significant first
        value.write_magnitude_be(&mut bytes[1..]);
        if value.is_negative() {
            negate_in_place(bytes);
        }
        let start = usize::from(is_redundant(bytes[0], bytes[1]));
        Ok(bytes[start..].iter().map(|&b| b as i8).collect())
    }

    /// Decode with an unbounded scratch allocator
    pub fn decode(bytes: &[i8]) -> Result<BigNumber, DecodeError> {
        Self::decode_in(bytes, &mut BudgetAllocator::unbounded(), DEFAULT_STACK_SCRATCH_BYTES)
    }

    /// Decode a byte encoding; the empty sequence is zero
    ///
    /// Non-minimal encodings are accepted.
    pub fn decode_in(
        bytes: &[i8],
        allocator: &mut dyn Allocator,
        stack_bytes: usize,
    ) -> Result<BigNumber, DecodeError> {
        let negative = match bytes.first() {
            None => return Ok(BigNumber::zero()),
            Some(&first) => first < 0,
        };
        let mut scratch = Scratch::new(bytes.len(), stack_bytes, allocator)?;
        let copy = scratch.bytes_mut();
        for (slot, &b) in copy.iter_mut().zip(bytes) {
            *slot = b as u8;
        }
        if negative {
            negate_in_place(copy);
        }
        Ok(BigNumber::from_magnitude_be(scratch.bytes(), negative))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(value: i64) -> Vec<i8> {
        BignumCodec::encode(&BigNumber::from_i64(value)).unwrap()
    }

    #[test]
    fn test_boundary_table() {
        let table: &[(i64, &[i8])] = &[
            (127, &[127]),
            (-127, &[-127]),
            (128, &[0, -128]),
            (-128, &[-128]),
            (255, &[0, -1]),
            (-255, &[-1, 1]),
            (256, &[1, 0]),
            (-256, &[-1, 0]),
            (0, &[0]),
        ];
        for &(value, bytes) in table {
            assert_eq!(encode(value), bytes, "encoding {}", value);
            assert_eq!(
                BignumCodec::decode(bytes).unwrap(),
                BigNumber::from_i64(value),
                "decoding {:?}",
                bytes
            );
        }
    }

    #[test]
    fn test_extremes_of_i64() {
        assert_eq!(encode(i64::MIN), vec![-128, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(encode(i64::MAX), vec![127, -1, -1, -1, -1, -1, -1, -1]);
        assert_eq!(encode(-1), vec![-1]);
        assert_eq!(encode(1), vec![1]);
    }

    #[test]
    fn test_decode_empty_is_zero() {
        assert_eq!(BignumCodec::decode(&[]).unwrap(), BigNumber::zero());
    }

    #[test]
    fn test_decode_accepts_padding() {
        assert_eq!(BignumCodec::decode(&[0, 0, 5]).unwrap(), BigNumber::from_i64(5));
        assert_eq!(BignumCodec::decode(&[-1, -1, -5]).unwrap(), BigNumber::from_i64(-5));
    }

    #[test]
    fn test_large_values_use_charged_scratch() {
        let big = BigNumber::parse_decimal(&format!("-1{}", "0".repeat(120))).unwrap();
        let mut allocator = BudgetAllocator::unbounded();
        let bytes = BignumCodec::encode_in(&big, &mut allocator, DEFAULT_STACK_SCRATCH_BYTES).unwrap();
        assert!(allocator.peak() > 0);
        assert_eq!(allocator.in_use(), 0);
        assert_eq!(BignumCodec::decode(&bytes).unwrap(), big);
    }

    #[test]
    fn test_out_of_memory_is_reported() {
        let big = BigNumber::parse_decimal(&"9".repeat(200)).unwrap();
        let mut allocator = BudgetAllocator::with_limit(16);
        assert_eq!(
            BignumCodec::encode_in(&big, &mut allocator, DEFAULT_STACK_SCRATCH_BYTES),
            Err(EncodeError::OutOfMemory)
        );
        let bytes = BignumCodec::encode(&big).unwrap();
        assert_eq!(
            BignumCodec::decode_in(&bytes, &mut allocator, DEFAULT_STACK_SCRATCH_BYTES),
            Err(DecodeError::OutOfMemory)
        );
        assert_eq!(allocator.in_use(), 0);
    }
}
