//! Handle Lifecycle Facades
//!
//! Reference counting and collection. The managed side increments the count
//! of every handle it keeps and decrements it when its wrapper dies; a
//! collection then reclaims whatever is neither counted, rooted, named (when
//! asked) nor reachable from any of those.

use crate::common_facades::{engine_call, guarded_call, status, unguarded_call};
use entities_data_handling::{TermHandle, TypeHandle};
use infrastructure_managed_env::{IntArray, ManagedEnv};

/// First increment of a handle may grow the counter table
pub fn incref_term(env: &ManagedEnv, t: TermHandle) -> i32 {
    status(guarded_call(env, |state| engine_call(state, |e| e.incref_term(t))))
}

pub fn decref_term(env: &ManagedEnv, t: TermHandle) -> i32 {
    status(unguarded_call(env, |state| engine_call(state, |e| e.decref_term(t))))
}

pub fn incref_type(env: &ManagedEnv, ty: TypeHandle) -> i32 {
    status(guarded_call(env, |state| engine_call(state, |e| e.incref_type(ty))))
}

pub fn decref_type(env: &ManagedEnv, ty: TypeHandle) -> i32 {
    status(unguarded_call(env, |state| engine_call(state, |e| e.decref_type(ty))))
}

fn count(env: &ManagedEnv, read: impl FnOnce(&adapters_term_engine::TermEngine) -> usize) -> i32 {
    unguarded_call(env, |state| Ok(read(&state.engine)))
        .map_or(-1, |n| i32::try_from(n).unwrap_or(i32::MAX))
}

pub fn num_terms(env: &ManagedEnv) -> i32 {
    count(env, |e| e.num_terms())
}

pub fn num_types(env: &ManagedEnv) -> i32 {
    count(env, |e| e.num_types())
}

pub fn num_posref_terms(env: &ManagedEnv) -> i32 {
    count(env, |e| e.num_posref_terms())
}

pub fn num_posref_types(env: &ManagedEnv) -> i32 {
    count(env, |e| e.num_posref_types())
}

/// Collect garbage with the given extra roots
///
/// Either root array may be absent. Invalid handles among the roots are
/// ignored.
pub fn collect(
    env: &ManagedEnv,
    root_terms: Option<&mut IntArray>,
    root_types: Option<&mut IntArray>,
    keep_named: bool,
) -> i32 {
    status(guarded_call(env, |state| {
        let marshaller = state.marshaller;
        let stats = marshaller.with_optional(env, root_terms, |terms| {
            marshaller.with_optional(env, root_types, |types| {
                state.engine.collect(terms, types, keep_named)
            })
        })??;
        tracing::debug!(
            terms_reclaimed = stats.terms_reclaimed,
            types_reclaimed = stats.types_reclaimed,
            "collection finished"
        );
        Ok(())
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term_facades::new_uninterpreted_term;
    use frameworks_engine_init::{exit, init_with_config, BridgeConfig};
    use serial_test::serial;

    fn fresh() -> ManagedEnv {
        exit();
        init_with_config(BridgeConfig::default());
        ManagedEnv::new()
    }

    #[test]
    #[serial]
    fn test_refcounts_keep_terms_alive() {
        let env = fresh();
        let base = num_terms(&env);
        let x = new_uninterpreted_term(&env, 0);
        assert_eq!(incref_term(&env, x), 0);
        assert_eq!(num_posref_terms(&env), 1);

        assert_eq!(collect(&env, None, None, false), 0);
        assert_eq!(num_terms(&env), base + 1);

        assert_eq!(decref_term(&env, x), 0);
        assert_eq!(collect(&env, None, None, false), 0);
        assert_eq!(num_terms(&env), base);
        assert_eq!(incref_term(&env, x), -1);
        exit();
    }

    #[test]
    #[serial]
    fn test_roots_from_arrays() {
        let env = fresh();
        let base = num_terms(&env);
        let terms: Vec<i32> = (0..12).map(|_| new_uninterpreted_term(&env, 0)).collect();
        let mut roots = IntArray::from_vec(terms[..11].to_vec());
        let mut type_roots = IntArray::from_vec(vec![-7]);
        assert_eq!(collect(&env, Some(&mut roots), Some(&mut type_roots), false), 0);
        assert_eq!(num_terms(&env), base + 11);
        assert_eq!(env.acquired_count(), env.released_count());
        exit();
    }

    #[test]
    #[serial]
    fn test_type_refcounts() {
        let env = fresh();
        assert_eq!(incref_type(&env, 1), 0);
        assert_eq!(num_posref_types(&env), 1);
        assert_eq!(decref_type(&env, 1), 0);
        assert_eq!(decref_type(&env, 1), -1);
        assert_eq!(decref_type(&env, 99), -1);
        exit();
    }
}
