//! Term Facades
//!
//! Term constructors and substitution. Constructors whose engine contract
//! reorders their input array (`and`, `or`, `xor`, `distinct` and the
//! quantifiers) always work on a private copy, so the caller's array is left
//! as it was.

use crate::common_facades::{engine_call, guarded_call, status, unguarded_call};
use adapters_term_engine::TermEngine;
use entities_data_handling::{TermHandle, TypeHandle, NULL_TERM};
use frameworks_engine_init::EngineState;
use infrastructure_managed_env::{BridgeError, IntArray, ManagedEnv};

type ArrayConstructor = fn(&mut TermEngine, &mut [TermHandle]) -> adapters_term_engine::EngineResult<TermHandle>;

fn handle(env: &ManagedEnv, f: impl FnOnce(&mut EngineState) -> Result<TermHandle, BridgeError>) -> TermHandle {
    guarded_call(env, f).unwrap_or(NULL_TERM)
}

fn over_copy(env: &ManagedEnv, args: &mut IntArray, build: ArrayConstructor) -> TermHandle {
    handle(env, |state| {
        let marshaller = state.marshaller;
        marshaller.with_copy(env, args, |args| engine_call(state, |e| build(e, args)))?
    })
}

pub fn mk_true(env: &ManagedEnv) -> TermHandle {
    unguarded_call(env, |state| Ok(state.engine.mk_true())).unwrap_or(NULL_TERM)
}

pub fn mk_false(env: &ManagedEnv) -> TermHandle {
    unguarded_call(env, |state| Ok(state.engine.mk_false())).unwrap_or(NULL_TERM)
}

pub fn constant(env: &ManagedEnv, ty: TypeHandle, index: i32) -> TermHandle {
    handle(env, |state| engine_call(state, |e| e.constant(ty, index)))
}

pub fn new_uninterpreted_term(env: &ManagedEnv, ty: TypeHandle) -> TermHandle {
    handle(env, |state| engine_call(state, |e| e.new_uninterpreted_term(ty)))
}

pub fn new_variable(env: &ManagedEnv, ty: TypeHandle) -> TermHandle {
    handle(env, |state| engine_call(state, |e| e.new_variable(ty)))
}

/// Negation; guarded because the engine interns a new term for it
pub fn mk_not(env: &ManagedEnv, t: TermHandle) -> TermHandle {
    handle(env, |state| engine_call(state, |e| e.not(t)))
}

pub fn and(env: &ManagedEnv, args: &mut IntArray) -> TermHandle {
    over_copy(env, args, TermEngine::and)
}

pub fn or(env: &ManagedEnv, args: &mut IntArray) -> TermHandle {
    over_copy(env, args, TermEngine::or)
}

pub fn xor(env: &ManagedEnv, args: &mut IntArray) -> TermHandle {
    over_copy(env, args, TermEngine::xor)
}

pub fn distinct(env: &ManagedEnv, args: &mut IntArray) -> TermHandle {
    over_copy(env, args, TermEngine::distinct)
}

pub fn eq(env: &ManagedEnv, a: TermHandle, b: TermHandle) -> TermHandle {
    handle(env, |state| engine_call(state, |e| e.eq(a, b)))
}

pub fn ite(env: &ManagedEnv, cond: TermHandle, then_term: TermHandle, else_term: TermHandle) -> TermHandle {
    handle(env, |state| engine_call(state, |e| e.ite(cond, then_term, else_term)))
}

pub fn forall(env: &ManagedEnv, vars: &mut IntArray, body: TermHandle) -> TermHandle {
    handle(env, |state| {
        let marshaller = state.marshaller;
        marshaller.with_copy(env, vars, |vars| engine_call(state, |e| e.forall(vars, body)))?
    })
}

pub fn exists(env: &ManagedEnv, vars: &mut IntArray, body: TermHandle) -> TermHandle {
    handle(env, |state| {
        let marshaller = state.marshaller;
        marshaller.with_copy(env, vars, |vars| engine_call(state, |e| e.exists(vars, body)))?
    })
}

pub fn lambda(env: &ManagedEnv, vars: &mut IntArray, body: TermHandle) -> TermHandle {
    handle(env, |state| {
        let marshaller = state.marshaller;
        marshaller.with_elements(env, vars, |vars| engine_call(state, |e| e.lambda(vars, body)))?
    })
}

pub fn tuple(env: &ManagedEnv, args: &mut IntArray) -> TermHandle {
    handle(env, |state| {
        let marshaller = state.marshaller;
        marshaller.with_elements(env, args, |args| engine_call(state, |e| e.tuple(args)))?
    })
}

/// Component `index` of a tuple, counting from 1
pub fn select(env: &ManagedEnv, index: i32, t: TermHandle) -> TermHandle {
    handle(env, |state| engine_call(state, |e| e.select(index, t)))
}

pub fn application(env: &ManagedEnv, f: TermHandle, args: &mut IntArray) -> TermHandle {
    handle(env, |state| {
        let marshaller = state.marshaller;
        marshaller.with_elements(env, args, |args| engine_call(state, |e| e.application(f, args)))?
    })
}

/// Replace `vars[i]` by `vals[i]` in `t`
///
/// Arrays of different lengths fail before either is acquired.
pub fn subst_term(env: &ManagedEnv, t: TermHandle, vars: &mut IntArray, vals: &mut IntArray) -> TermHandle {
    handle(env, |state| {
        let marshaller = state.marshaller;
        marshaller.with_pair(env, vars, vals, |vars, vals| {
            engine_call(state, |e| e.subst_term(vars, vals, t))
        })?
    })
}

/// Apply one substitution to every element of `terms` in place
///
/// `terms` is updated only when every substitution succeeds. Arrays of
/// different lengths fail before any of the three is acquired.
pub fn subst_term_array(
    env: &ManagedEnv,
    terms: &mut IntArray,
    vars: &mut IntArray,
    vals: &mut IntArray,
) -> i32 {
    status(guarded_call(env, |state| {
        let marshaller = state.marshaller;
        marshaller.with_pair(env, vars, vals, |vars, vals| {
            marshaller.with_elements_mut(env, terms, |terms| {
                engine_call(state, |e| e.subst_term_array(vars, vals, terms))
            })?
        })?
    }))
}
