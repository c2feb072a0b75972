//! Rational Codec Module
//!
//! A rational crosses the boundary as two independently encoded integers, the
//! numerator and the denominator of its canonical form. The denominator is
//! always positive, so the sign travels with the numerator.

use crate::bignum_codec::BignumCodec;
use crate::common::{DecodeError, EncodeError, DEFAULT_STACK_SCRATCH_BYTES};
use entities_utilities::BigRational;
use usecases_memory_management::{Allocator, BudgetAllocator};

/// Numerator and denominator encodings
pub type EncodedRational = (Vec<i8>, Vec<i8>);

/// Rational codec for encoding/decoding BigRational values
pub struct RationalCodec;

impl RationalCodec {
    pub fn encode(value: &BigRational) -> Result<EncodedRational, EncodeError> {
        Self::encode_in(value, &mut BudgetAllocator::unbounded(), DEFAULT_STACK_SCRATCH_BYTES)
    }

    pub fn encode_in(
        value: &BigRational,
        allocator: &mut dyn Allocator,
        stack_bytes: usize,
    ) -> Result<EncodedRational, EncodeError> {
        let num = BignumCodec::encode_in(&value.numerator(), allocator, stack_bytes)?;
        let den = BignumCodec::encode_in(&value.denominator(), allocator, stack_bytes)?;
        Ok((num, den))
    }

    pub fn decode(num: &[i8], den: &[i8]) -> Result<BigRational, DecodeError> {
        Self::decode_in(num, den, &mut BudgetAllocator::unbounded(), DEFAULT_STACK_SCRATCH_BYTES)
    }

    /// Decode and canonicalize; a zero denominator is rejected
    pub fn decode_in(
        num: &[i8],
        den: &[i8],
        allocator: &mut dyn Allocator,
        stack_bytes: usize,
    ) -> Result<BigRational, DecodeError> {
        let numerator = BignumCodec::decode_in(num, allocator, stack_bytes)?;
        let denominator = BignumCodec::decode_in(den, allocator, stack_bytes)?;
        BigRational::from_parts(&numerator, &denominator).ok_or(DecodeError::ZeroDenominator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_canonicalizes() {
        let q = BigRational::from_fraction(-3, 6).unwrap();
        let (num, den) = RationalCodec::encode(&q).unwrap();
        assert_eq!(num, vec![-1]);
        assert_eq!(den, vec![2]);
    }

    #[test]
    fn test_integer_has_unit_denominator() {
        let (num, den) = RationalCodec::encode(&BigRational::from_i64(-128)).unwrap();
        assert_eq!(num, vec![-128]);
        assert_eq!(den, vec![1]);
    }

    #[test]
    fn test_decode_moves_sign_to_numerator() {
        let q = RationalCodec::decode(&[4], &[-8]).unwrap();
        assert_eq!(q, BigRational::from_fraction(-1, 2).unwrap());
        assert!(q.denominator().signum() > 0);
    }

    #[test]
    fn test_zero_denominator() {
        assert_eq!(RationalCodec::decode(&[1], &[0]), Err(DecodeError::ZeroDenominator));
        assert_eq!(RationalCodec::decode(&[1], &[]), Err(DecodeError::ZeroDenominator));
    }
}
