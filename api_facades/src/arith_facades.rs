//! Arithmetic and Bit-Vector Facades
//!
//! Constants cross the boundary as byte encodings: integers as one minimal
//! big-endian two's complement sequence, rationals as an encoded numerator and
//! denominator. Codec scratch space above the configured stack threshold is
//! charged to the engine budget, so a huge constant fails with out-of-memory
//! like any other allocation.

use crate::common_facades::{engine_call, guarded_call, recorded};
use entities_data_handling::{TermHandle, NULL_TERM};
use entities_utilities::{BigNumber, BigRational};
use frameworks_engine_init::EngineState;
use infrastructure_bignum_encoding::{BignumCodec, RationalCodec};
use infrastructure_managed_env::{
    raise_out_of_memory, to_managed_bool_array, to_managed_byte_array, BoolArray, BridgeError,
    ByteArray, IntArray, ManagedEnv,
};

/// Widths up to this many bits are unpacked into a stack buffer
const STACK_BV_BITS: usize = 64;

pub(crate) fn encode_integer(state: &mut EngineState, value: &BigNumber) -> Result<Vec<i8>, BridgeError> {
    let stack_bytes = state.stack_bytes();
    Ok(BignumCodec::encode_in(value, state.engine.allocator_mut(), stack_bytes)?)
}

pub(crate) fn encode_numerator(state: &mut EngineState, value: &BigRational) -> Result<Vec<i8>, BridgeError> {
    encode_integer(state, &value.numerator())
}

pub(crate) fn encode_denominator(state: &mut EngineState, value: &BigRational) -> Result<Vec<i8>, BridgeError> {
    encode_integer(state, &value.denominator())
}

/// Hand an encoding to the managed side
pub(crate) fn bytes_call(
    env: &ManagedEnv,
    f: impl FnOnce(&mut EngineState) -> Result<Vec<i8>, BridgeError>,
) -> Option<ByteArray> {
    guarded_call(env, |state| to_managed_byte_array(env, f(state)?))
}

/// Hand bit values to the managed side as a boolean array
pub(crate) fn bits_to_managed(env: &ManagedEnv, bits: &[bool]) -> Result<BoolArray, BridgeError> {
    if bits.len() <= STACK_BV_BITS {
        let mut flags = [0i32; STACK_BV_BITS];
        for (flag, &bit) in flags.iter_mut().zip(bits) {
            *flag = i32::from(bit);
        }
        return to_managed_bool_array(env, &flags[..bits.len()]);
    }
    let flags: Vec<i32> = bits.iter().map(|&bit| i32::from(bit)).collect();
    to_managed_bool_array(env, &flags)
}

pub fn int_constant(env: &ManagedEnv, value: i64) -> TermHandle {
    guarded_call(env, |state| Ok(state.engine.int_constant(value))).unwrap_or(NULL_TERM)
}

/// `num/den` in canonical form; a zero denominator is a division by zero
pub fn rational_constant(env: &ManagedEnv, num: i64, den: i64) -> TermHandle {
    guarded_call(env, |state| engine_call(state, |e| e.rational_constant(num, den))).unwrap_or(NULL_TERM)
}

/// Integer constant from its byte encoding; the empty sequence is zero
pub fn bytes_to_int_constant(env: &ManagedEnv, bytes: &mut ByteArray) -> TermHandle {
    guarded_call(env, |state| {
        let marshaller = state.marshaller;
        let stack_bytes = state.stack_bytes();
        let value = marshaller.with_elements(env, bytes, |bytes| {
            BignumCodec::decode_in(bytes, state.engine.allocator_mut(), stack_bytes)
        })??;
        Ok(state.engine.arith_constant(BigRational::from_big(&value)))
    })
    .unwrap_or(NULL_TERM)
}

/// Rational constant from encoded numerator and denominator
///
/// A zero denominator fails without raising anything.
pub fn bytes_to_rational_constant(env: &ManagedEnv, num: &mut ByteArray, den: &mut ByteArray) -> TermHandle {
    guarded_call(env, |state| {
        let marshaller = state.marshaller;
        let stack_bytes = state.stack_bytes();
        let value = marshaller.with_elements(env, num, |num| {
            marshaller.with_elements(env, den, |den| {
                RationalCodec::decode_in(num, den, state.engine.allocator_mut(), stack_bytes)
            })
        })???;
        Ok(state.engine.arith_constant(value))
    })
    .unwrap_or(NULL_TERM)
}

pub fn rational_const_num_as_bytes(env: &ManagedEnv, t: TermHandle) -> Option<ByteArray> {
    bytes_call(env, |state| {
        let value = engine_call(state, |e| e.rational_const_value(t))?;
        encode_numerator(state, &value)
    })
}

pub fn rational_const_den_as_bytes(env: &ManagedEnv, t: TermHandle) -> Option<ByteArray> {
    bytes_call(env, |state| {
        let value = engine_call(state, |e| e.rational_const_value(t))?;
        encode_denominator(state, &value)
    })
}

/// Bit-vector whose bits are the given Boolean terms, least significant first
pub fn bv_from_bool_array(env: &ManagedEnv, bits: &mut IntArray) -> TermHandle {
    guarded_call(env, |state| {
        let marshaller = state.marshaller;
        marshaller.with_elements(env, bits, |bits| engine_call(state, |e| e.bv_from_bool_array(bits)))?
    })
    .unwrap_or(NULL_TERM)
}

/// Bits of a bit-vector constant, least significant first
pub fn bv_const_value(env: &ManagedEnv, t: TermHandle) -> Option<BoolArray> {
    guarded_call(env, |state| {
        let bits = match state.engine.bv_const_bits(t) {
            Ok(bits) => bits,
            Err(report) => return recorded(&mut state.engine, Err(report)),
        };
        bits_to_managed(env, bits)
    })
}

/// Encoding of a decimal integer, for checking the codec from the managed side
pub fn test_mpz_to_bytes(env: &ManagedEnv, decimal: &str) -> Option<ByteArray> {
    bytes_call(env, |state| {
        let value = BigNumber::parse_decimal(decimal)
            .ok_or_else(|| BridgeError::InvalidArgument(format!("not a decimal integer: {decimal}")))?;
        encode_integer(state, &value)
    })
}

/// Raise the managed out-of-memory exception as an engine failure would
pub fn test_out_of_memory(env: &ManagedEnv) {
    raise_out_of_memory(env);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common_facades::error_code;
    use entities_data_handling::ErrorCode;
    use frameworks_engine_init::{exit, init_with_config, BridgeConfig};
    use infrastructure_managed_env::BRIDGE_OUT_OF_MEMORY_CLASS;
    use serial_test::serial;

    fn fresh() -> ManagedEnv {
        exit();
        init_with_config(BridgeConfig::default());
        ManagedEnv::new()
    }

    #[test]
    #[serial]
    fn test_integer_round_trip() {
        let env = fresh();
        let mut bytes = ByteArray::from_vec(vec![1, 0]);
        let t = bytes_to_int_constant(&env, &mut bytes);
        assert_eq!(t, int_constant(&env, 256));
        let num = rational_const_num_as_bytes(&env, t).unwrap();
        assert_eq!(num.as_slice(), &[1, 0]);
        let den = rational_const_den_as_bytes(&env, t).unwrap();
        assert_eq!(den.as_slice(), &[1]);

        let mut empty = ByteArray::from_vec(Vec::new());
        assert_eq!(bytes_to_int_constant(&env, &mut empty), int_constant(&env, 0));
        exit();
    }

    #[test]
    #[serial]
    fn test_rational_canonical_form() {
        let env = fresh();
        let t = rational_constant(&env, -3, 6);
        assert_eq!(rational_const_num_as_bytes(&env, t).unwrap().as_slice(), &[-1]);
        assert_eq!(rational_const_den_as_bytes(&env, t).unwrap().as_slice(), &[2]);

        let mut num = ByteArray::from_vec(vec![-3]);
        let mut den = ByteArray::from_vec(vec![6]);
        assert_eq!(bytes_to_rational_constant(&env, &mut num, &mut den), t);

        let mut zero = ByteArray::from_vec(vec![0]);
        assert_eq!(bytes_to_rational_constant(&env, &mut num, &mut zero), NULL_TERM);
        assert!(!env.exception_check());

        assert_eq!(rational_constant(&env, 1, 0), NULL_TERM);
        assert_eq!(error_code(), ErrorCode::DivisionByZero.code());
        exit();
    }

    #[test]
    #[serial]
    fn test_bit_vectors() {
        let env = fresh();
        let (t, f) = (0, 1);
        let mut bits = IntArray::from_vec(vec![t, f, t]);
        let bv = bv_from_bool_array(&env, &mut bits);
        assert_eq!(bv_const_value(&env, bv).unwrap().as_slice(), &[true, false, true]);

        let mut wide = IntArray::from_vec((0..70).map(|i| if i % 7 == 0 { t } else { f }).collect());
        let bv = bv_from_bool_array(&env, &mut wide);
        let value = bv_const_value(&env, bv).unwrap();
        assert_eq!(value.len(), 70);
        assert!(value.as_slice()[63]);

        assert!(bv_const_value(&env, t).is_none());
        assert_eq!(error_code(), ErrorCode::BitvectorConstantRequired.code());
        exit();
    }

    #[test]
    #[serial]
    fn test_codec_hooks() {
        let env = fresh();
        assert_eq!(test_mpz_to_bytes(&env, "-255").unwrap().as_slice(), &[-1, 1]);
        assert_eq!(test_mpz_to_bytes(&env, "255").unwrap().as_slice(), &[0, -1]);
        assert!(test_mpz_to_bytes(&env, "twelve").is_none());
        assert!(!env.exception_check());

        test_out_of_memory(&env);
        assert_eq!(
            env.take_exception().map(|e| e.class),
            Some(BRIDGE_OUT_OF_MEMORY_CLASS.to_string())
        );
        exit();
    }

    #[test]
    #[serial]
    fn test_large_encoding_charges_engine_budget() {
        let env = fresh();
        let digits = "9".repeat(200);
        let encoded = test_mpz_to_bytes(&env, &digits).unwrap();
        assert!(encoded.len() > 32);

        frameworks_engine_init::with_state(|state| state.engine.allocator_mut().inject_failure(0)).unwrap();
        assert!(test_mpz_to_bytes(&env, &digits).is_none());
        assert!(env.exception_check());
        exit();
    }
}
