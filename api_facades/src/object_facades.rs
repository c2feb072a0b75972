//! Native Object Facades
//!
//! Configurations, contexts, parameter records and models travel to the
//! managed side as raw 64-bit addresses. Constructors return `0` on failure.
//! The terms a context or model holds are collection roots until the object is
//! freed.

use crate::arith_facades::{bits_to_managed, bytes_call, encode_denominator, encode_integer, encode_numerator};
use crate::common_facades::{engine_call, guarded_call, recorded, status, unguarded_call, FAILURE};
use entities_data_handling::{NativeAddress, TermHandle};
use infrastructure_managed_env::{BoolArray, ByteArray, IntArray, ManagedEnv};

fn address(raw: u64) -> NativeAddress {
    NativeAddress::from_raw(raw)
}

fn raw_or_null(result: Option<NativeAddress>) -> u64 {
    result.unwrap_or(NativeAddress::NULL).raw()
}

// ----------------------------------------------------------------------
// Configurations
// ----------------------------------------------------------------------

pub fn new_config(env: &ManagedEnv) -> u64 {
    raw_or_null(guarded_call(env, |state| Ok(state.engine.new_config())))
}

pub fn set_config(env: &ManagedEnv, config: u64, name: &str, value: &str) -> i32 {
    status(guarded_call(env, |state| {
        engine_call(state, |e| e.set_config(address(config), name, value))
    }))
}

pub fn free_config(env: &ManagedEnv, config: u64) -> i32 {
    status(unguarded_call(env, |state| engine_call(state, |e| e.free_config(address(config)))))
}

// ----------------------------------------------------------------------
// Contexts
// ----------------------------------------------------------------------

/// New context; a null configuration selects the defaults
pub fn new_context(env: &ManagedEnv, config: u64) -> u64 {
    raw_or_null(guarded_call(env, |state| engine_call(state, |e| e.new_context(address(config)))))
}

pub fn free_context(env: &ManagedEnv, context: u64) -> i32 {
    status(unguarded_call(env, |state| engine_call(state, |e| e.free_context(address(context)))))
}

pub fn context_status(env: &ManagedEnv, context: u64) -> i32 {
    unguarded_call(env, |state| engine_call(state, |e| e.context_status(address(context))))
        .map_or(FAILURE, |s| s.code())
}

pub fn assert_formula(env: &ManagedEnv, context: u64, formula: TermHandle) -> i32 {
    status(guarded_call(env, |state| {
        engine_call(state, |e| e.assert_formula(address(context), formula))
    }))
}

pub fn assert_formulas(env: &ManagedEnv, context: u64, formulas: &mut IntArray) -> i32 {
    status(guarded_call(env, |state| {
        let marshaller = state.marshaller;
        marshaller.with_elements(env, formulas, |formulas| {
            engine_call(state, |e| e.assert_formulas(address(context), formulas))
        })?
    }))
}

pub fn push(env: &ManagedEnv, context: u64) -> i32 {
    status(guarded_call(env, |state| engine_call(state, |e| e.push(address(context)))))
}

pub fn pop(env: &ManagedEnv, context: u64) -> i32 {
    status(unguarded_call(env, |state| engine_call(state, |e| e.pop(address(context)))))
}

/// Interrupt a search in progress; never allocates
pub fn stop_search(env: &ManagedEnv, context: u64) {
    unguarded_call(env, |state| {
        state.engine.stop_search(address(context));
        Ok(())
    });
}

// ----------------------------------------------------------------------
// Parameter records
// ----------------------------------------------------------------------

pub fn new_param_record(env: &ManagedEnv) -> u64 {
    raw_or_null(guarded_call(env, |state| Ok(state.engine.new_param_record())))
}

pub fn set_param(env: &ManagedEnv, params: u64, name: &str, value: &str) -> i32 {
    status(guarded_call(env, |state| {
        engine_call(state, |e| e.set_param(address(params), name, value))
    }))
}

pub fn free_param_record(env: &ManagedEnv, params: u64) -> i32 {
    status(unguarded_call(env, |state| engine_call(state, |e| e.free_param_record(address(params)))))
}

// ----------------------------------------------------------------------
// Models
// ----------------------------------------------------------------------

/// Model assigning `vals[i]` to `vars[i]`
///
/// Arrays of different lengths fail before either is acquired.
pub fn model_from_map(env: &ManagedEnv, vars: &mut IntArray, vals: &mut IntArray) -> u64 {
    raw_or_null(guarded_call(env, |state| {
        let marshaller = state.marshaller;
        marshaller.with_pair(env, vars, vals, |vars, vals| {
            engine_call(state, |e| e.model_from_map(vars, vals))
        })?
    }))
}

pub fn free_model(env: &ManagedEnv, model: u64) -> i32 {
    status(unguarded_call(env, |state| engine_call(state, |e| e.free_model(address(model)))))
}

/// 1 for true, 0 for false, -1 on failure
pub fn get_bool_value(env: &ManagedEnv, model: u64, t: TermHandle) -> i32 {
    guarded_call(env, |state| engine_call(state, |e| e.get_bool_value(address(model), t)))
        .map_or(FAILURE, i32::from)
}

pub fn get_integer_value_as_bytes(env: &ManagedEnv, model: u64, t: TermHandle) -> Option<ByteArray> {
    bytes_call(env, |state| {
        let value = engine_call(state, |e| e.get_integer_value(address(model), t))?;
        encode_integer(state, &value)
    })
}

pub fn get_rational_value_num_as_bytes(env: &ManagedEnv, model: u64, t: TermHandle) -> Option<ByteArray> {
    bytes_call(env, |state| {
        let value = engine_call(state, |e| e.get_rational_value(address(model), t))?;
        encode_numerator(state, &value)
    })
}

pub fn get_rational_value_den_as_bytes(env: &ManagedEnv, model: u64, t: TermHandle) -> Option<ByteArray> {
    bytes_call(env, |state| {
        let value = engine_call(state, |e| e.get_rational_value(address(model), t))?;
        encode_denominator(state, &value)
    })
}

/// Bits of the value of a bit-vector term, least significant first
pub fn get_bv_value(env: &ManagedEnv, model: u64, t: TermHandle) -> Option<BoolArray> {
    guarded_call(env, |state| {
        let result = state.engine.get_bv_value(address(model), t);
        let bits = recorded(&mut state.engine, result)?;
        bits_to_managed(env, &bits)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arith_facades::{int_constant, rational_constant};
    use crate::common_facades::error_code;
    use crate::gc_facades::{collect, num_terms};
    use crate::term_facades::{mk_false, new_uninterpreted_term};
    use entities_data_handling::ErrorCode;
    use frameworks_engine_init::{exit, init_with_config, BridgeConfig};
    use serial_test::serial;

    fn fresh() -> ManagedEnv {
        exit();
        init_with_config(BridgeConfig::default());
        ManagedEnv::new()
    }

    #[test]
    #[serial]
    fn test_context_lifecycle() {
        let env = fresh();
        let config = new_config(&env);
        assert_ne!(config, 0);
        assert_eq!(set_config(&env, config, "mode", "push-pop"), 0);
        assert_eq!(set_config(&env, config, "mode", "sideways"), -1);
        assert_eq!(error_code(), ErrorCode::InvalidParameterValue.code());

        let ctx = new_context(&env, config);
        assert_eq!(free_config(&env, config), 0);
        assert_eq!(context_status(&env, ctx), 0);

        assert_eq!(push(&env, ctx), 0);
        assert_eq!(assert_formula(&env, ctx, mk_false(&env)), 0);
        assert_eq!(context_status(&env, ctx), 4);
        stop_search(&env, ctx);
        assert_eq!(pop(&env, ctx), 0);
        assert_eq!(context_status(&env, ctx), 0);
        assert_eq!(pop(&env, ctx), -1);

        assert_eq!(free_context(&env, ctx), 0);
        assert_eq!(context_status(&env, ctx), -1);
        assert_eq!(error_code(), ErrorCode::InvalidNativeObject.code());
        stop_search(&env, ctx);
        exit();
    }

    #[test]
    #[serial]
    fn test_asserted_terms_are_roots() {
        let env = fresh();
        let base = num_terms(&env);
        let ctx = new_context(&env, 0);
        let p = new_uninterpreted_term(&env, 0);
        let mut formulas = IntArray::from_vec(vec![p]);
        assert_eq!(assert_formulas(&env, ctx, &mut formulas), 0);
        collect(&env, None, None, false);
        assert_eq!(num_terms(&env), base + 1);

        free_context(&env, ctx);
        collect(&env, None, None, false);
        assert_eq!(num_terms(&env), base);
        exit();
    }

    #[test]
    #[serial]
    fn test_param_records() {
        let env = fresh();
        let params = new_param_record(&env);
        assert_eq!(set_param(&env, params, "random-seed", "7"), 0);
        assert_eq!(set_param(&env, params, "bogus", "1"), -1);
        assert_eq!(error_code(), ErrorCode::UnknownParameter.code());
        assert_eq!(free_param_record(&env, params), 0);
        assert_eq!(free_param_record(&env, params), -1);
        exit();
    }

    #[test]
    #[serial]
    fn test_model_values() {
        let env = fresh();
        let x = new_uninterpreted_term(&env, 1);
        let q = new_uninterpreted_term(&env, 2);
        let b = new_uninterpreted_term(&env, 0);
        let mut vars = IntArray::from_vec(vec![x, q, b]);
        let mut vals = IntArray::from_vec(vec![
            int_constant(&env, -255),
            rational_constant(&env, 3, -6),
            mk_false(&env),
        ]);
        let model = model_from_map(&env, &mut vars, &mut vals);
        assert_ne!(model, 0);

        assert_eq!(get_integer_value_as_bytes(&env, model, x).unwrap().as_slice(), &[-1, 1]);
        assert_eq!(get_rational_value_num_as_bytes(&env, model, q).unwrap().as_slice(), &[-1]);
        assert_eq!(get_rational_value_den_as_bytes(&env, model, q).unwrap().as_slice(), &[2]);
        assert!(get_integer_value_as_bytes(&env, model, q).is_none());
        assert_eq!(error_code(), ErrorCode::EvalConversionFailed.code());
        assert_eq!(get_bool_value(&env, model, b), 0);
        assert_eq!(get_bool_value(&env, model, x), -1);
        assert!(!env.exception_check());

        assert_eq!(free_model(&env, model), 0);
        assert_eq!(get_bool_value(&env, model, b), -1);
        exit();
    }

    #[test]
    #[serial]
    fn test_mismatched_model_map() {
        let env = fresh();
        let x = new_uninterpreted_term(&env, 1);
        let mut vars = IntArray::from_vec(vec![x; 12]);
        let mut vals = IntArray::from_vec(vec![x; 11]);
        assert_eq!(model_from_map(&env, &mut vars, &mut vals), 0);
        assert_eq!(env.acquired_count(), 0);
        exit();
    }
}
