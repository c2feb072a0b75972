//! Type Facades
//!
//! Type constructors. The predefined types are fixed handles and skip the
//! allocation guard.

use crate::common_facades::{engine_call, guarded_call, unguarded_call};
use entities_data_handling::{TypeHandle, NULL_TYPE};
use infrastructure_managed_env::{IntArray, ManagedEnv};

pub fn bool_type(env: &ManagedEnv) -> TypeHandle {
    unguarded_call(env, |state| Ok(state.engine.bool_type())).unwrap_or(NULL_TYPE)
}

pub fn int_type(env: &ManagedEnv) -> TypeHandle {
    unguarded_call(env, |state| Ok(state.engine.int_type())).unwrap_or(NULL_TYPE)
}

pub fn real_type(env: &ManagedEnv) -> TypeHandle {
    unguarded_call(env, |state| Ok(state.engine.real_type())).unwrap_or(NULL_TYPE)
}

/// Bit-vector type; a negative width is passed on as 0 and rejected there
pub fn bv_type(env: &ManagedEnv, size: i32) -> TypeHandle {
    let size = size.max(0);
    guarded_call(env, |state| engine_call(state, |e| e.bv_type(size))).unwrap_or(NULL_TYPE)
}

pub fn new_scalar_type(env: &ManagedEnv, card: i32) -> TypeHandle {
    guarded_call(env, |state| engine_call(state, |e| e.new_scalar_type(card))).unwrap_or(NULL_TYPE)
}

pub fn new_uninterpreted_type(env: &ManagedEnv) -> TypeHandle {
    guarded_call(env, |state| Ok(state.engine.new_uninterpreted_type())).unwrap_or(NULL_TYPE)
}

pub fn tuple_type(env: &ManagedEnv, components: &mut IntArray) -> TypeHandle {
    guarded_call(env, |state| {
        let marshaller = state.marshaller;
        marshaller.with_elements(env, components, |types| {
            engine_call(state, |e| e.tuple_type(types))
        })?
    })
    .unwrap_or(NULL_TYPE)
}

/// Function type; an empty domain reaches the engine, which reports it
pub fn function_type(env: &ManagedEnv, domain: &mut IntArray, range: TypeHandle) -> TypeHandle {
    guarded_call(env, |state| {
        let marshaller = state.marshaller;
        marshaller.with_elements(env, domain, |types| {
            engine_call(state, |e| e.function_type(types, range))
        })?
    })
    .unwrap_or(NULL_TYPE)
}
