//! Integration tests for infrastructure_bignum_encoding crate
//!
//! These tests check round trips, minimality of the produced encodings and the
//! failure modes of both codecs.

use entities_utilities::{BigNumber, BigRational};
use infrastructure_bignum_encoding::*;
use usecases_memory_management::{Allocator, BudgetAllocator};

fn is_minimal(bytes: &[i8]) -> bool {
    match bytes {
        [first, second, ..] => !((*first == 0 && *second >= 0) || (*first == -1 && *second < 0)),
        _ => true,
    }
}

#[test]
fn test_round_trip_and_minimality() {
    let mut samples: Vec<BigNumber> = (-600..=600).map(BigNumber::from_i64).collect();
    for shift in [7u32, 8, 15, 16, 31, 32, 62] {
        let p = 1i64 << shift;
        samples.extend([p - 1, p, p + 1, -p - 1, -p, -p + 1].map(BigNumber::from_i64));
    }
    samples.push(BigNumber::parse_decimal(&"7".repeat(90)).unwrap());
    samples.push(BigNumber::parse_decimal(&format!("-{}", "3".repeat(90))).unwrap());

    for z in samples {
        let bytes = BignumCodec::encode(&z).unwrap();
        assert!(is_minimal(&bytes), "{} encoded as {:?}", z, bytes);
        assert_eq!(BignumCodec::decode(&bytes).unwrap(), z);
    }
}

#[test]
fn test_megabyte_values_round_trip() {
    let mut bytes: Vec<i8> = (0..1_000_000u32).map(|i| ((i % 200) as i16 - 100) as i8).collect();
    bytes[0] = -77;
    let value = BignumCodec::decode(&bytes).unwrap();
    assert!(value.is_negative());
    assert_eq!(BignumCodec::encode(&value).unwrap(), bytes);

    bytes[0] = 77;
    let value = BignumCodec::decode(&bytes).unwrap();
    assert_eq!(BignumCodec::encode(&value).unwrap(), bytes);
}

#[test]
fn test_documented_encodings() {
    assert_eq!(BignumCodec::encode(&BigNumber::from_i64(255)).unwrap(), vec![0, -1]);
    assert_eq!(BignumCodec::encode(&BigNumber::from_i64(-255)).unwrap(), vec![-1, 1]);
    assert_eq!(BignumCodec::decode(&[1, 0]).unwrap(), BigNumber::from_i64(256));

    let (num, den) = RationalCodec::encode(&BigRational::from_fraction(-3, 6).unwrap()).unwrap();
    assert_eq!(BignumCodec::decode(&num).unwrap(), BigNumber::from_i64(-1));
    assert_eq!(BignumCodec::decode(&den).unwrap(), BigNumber::from_i64(2));
}

#[test]
fn test_rational_round_trip() {
    for (n, d) in [(0, 5), (22, 7), (-22, 7), (1, -3), (i64::MAX, 2), (i64::MIN, 3)] {
        let q = BigRational::from_fraction(n, d).unwrap();
        let (num, den) = RationalCodec::encode(&q).unwrap();
        assert!(BignumCodec::decode(&den).unwrap().signum() > 0);
        assert_eq!(RationalCodec::decode(&num, &den).unwrap(), q);
    }
}

#[test]
fn test_rational_zero_denominator() {
    assert_eq!(
        RationalCodec::decode(&[3], &[0, 0]),
        Err(DecodeError::ZeroDenominator)
    );
}

#[test]
fn test_stack_threshold_is_configurable() {
    let z = BigNumber::from_u64(u64::MAX);
    let mut allocator = BudgetAllocator::unbounded();
    BignumCodec::encode_in(&z, &mut allocator, 4).unwrap();
    assert_eq!(allocator.peak(), 9);
    assert_eq!(allocator.in_use(), 0);

    let mut untouched = BudgetAllocator::with_limit(0);
    BignumCodec::encode_in(&z, &mut untouched, DEFAULT_STACK_SCRATCH_BYTES).unwrap();
    assert_eq!(untouched.peak(), 0);
}

#[test]
fn test_injected_failure_during_rational_encoding() {
    let q = BigRational::from_parts(
        &BigNumber::parse_decimal(&"1".repeat(100)).unwrap(),
        &BigNumber::parse_decimal(&"3".repeat(101)).unwrap(),
    )
    .unwrap();
    let mut allocator = BudgetAllocator::unbounded();
    allocator.inject_failure(1);
    assert_eq!(
        RationalCodec::encode_in(&q, &mut allocator, DEFAULT_STACK_SCRATCH_BYTES),
        Err(EncodeError::OutOfMemory)
    );
    assert_eq!(allocator.in_use(), 0);
    assert!(RationalCodec::encode_in(&q, &mut allocator, DEFAULT_STACK_SCRATCH_BYTES).is_ok());
}
