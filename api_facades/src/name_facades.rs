//! Name Facades
//!
//! Symbol tables for terms and types. Binding a name charges the engine
//! budget; lookups and removals never allocate.

use crate::common_facades::{engine_call, guarded_call, status, unguarded_call};
use entities_data_handling::{TermHandle, TypeHandle, NULL_TERM, NULL_TYPE};
use infrastructure_managed_env::ManagedEnv;

pub fn set_term_name(env: &ManagedEnv, t: TermHandle, name: &str) -> i32 {
    status(guarded_call(env, |state| engine_call(state, |e| e.set_term_name(t, name))))
}

/// Current name of `t`, if any
pub fn get_term_name(env: &ManagedEnv, t: TermHandle) -> Option<String> {
    unguarded_call(env, |state| Ok(state.engine.get_term_name(t).map(str::to_string))).flatten()
}

pub fn get_term_by_name(env: &ManagedEnv, name: &str) -> TermHandle {
    unguarded_call(env, |state| Ok(state.engine.get_term_by_name(name)))
        .flatten()
        .unwrap_or(NULL_TERM)
}

/// Unbind `name`; a previous binding of the name becomes visible again
pub fn remove_term_name(env: &ManagedEnv, name: &str) {
    unguarded_call(env, |state| {
        state.engine.remove_term_name(name);
        Ok(())
    });
}

pub fn clear_term_name(env: &ManagedEnv, t: TermHandle) -> i32 {
    status(unguarded_call(env, |state| engine_call(state, |e| e.clear_term_name(t))))
}

pub fn set_type_name(env: &ManagedEnv, ty: TypeHandle, name: &str) -> i32 {
    status(guarded_call(env, |state| engine_call(state, |e| e.set_type_name(ty, name))))
}

pub fn get_type_name(env: &ManagedEnv, ty: TypeHandle) -> Option<String> {
    unguarded_call(env, |state| Ok(state.engine.get_type_name(ty).map(str::to_string))).flatten()
}

pub fn get_type_by_name(env: &ManagedEnv, name: &str) -> TypeHandle {
    unguarded_call(env, |state| Ok(state.engine.get_type_by_name(name)))
        .flatten()
        .unwrap_or(NULL_TYPE)
}

pub fn remove_type_name(env: &ManagedEnv, name: &str) {
    unguarded_call(env, |state| {
        state.engine.remove_type_name(name);
        Ok(())
    });
}

pub fn clear_type_name(env: &ManagedEnv, ty: TypeHandle) -> i32 {
    status(unguarded_call(env, |state| engine_call(state, |e| e.clear_type_name(ty))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gc_facades::{collect, num_terms};
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
    fn test_term_names() {
        let env = fresh();
        let x = new_uninterpreted_term(&env, 0);
        let y = new_uninterpreted_term(&env, 0);
        assert_eq!(set_term_name(&env, x, "p"), 0);
        assert_eq!(set_term_name(&env, y, "p"), 0);
        assert_eq!(get_term_by_name(&env, "p"), y);
        remove_term_name(&env, "p");
        assert_eq!(get_term_by_name(&env, "p"), x);
        assert_eq!(get_term_name(&env, x).as_deref(), Some("p"));

        assert_eq!(clear_term_name(&env, x), 0);
        assert_eq!(get_term_name(&env, x), None);
        assert_eq!(get_term_by_name(&env, "p"), NULL_TERM);
        assert_eq!(set_term_name(&env, -3, "q"), -1);
        exit();
    }

    #[test]
    #[serial]
    fn test_names_survive_collection_when_kept() {
        let env = fresh();
        let base = num_terms(&env);
        let x = new_uninterpreted_term(&env, 0);
        set_term_name(&env, x, "kept");
        collect(&env, None, None, true);
        assert_eq!(num_terms(&env), base + 1);
        collect(&env, None, None, false);
        assert_eq!(num_terms(&env), base);
        assert_eq!(get_term_by_name(&env, "kept"), NULL_TERM);
        exit();
    }

    #[test]
    #[serial]
    fn test_type_names() {
        let env = fresh();
        assert_eq!(set_type_name(&env, 1, "nat"), 0);
        assert_eq!(get_type_by_name(&env, "nat"), 1);
        assert_eq!(get_type_name(&env, 1).as_deref(), Some("nat"));
        remove_type_name(&env, "nat");
        assert_eq!(get_type_by_name(&env, "nat"), NULL_TYPE);
        assert_eq!(clear_type_name(&env, 44), -1);
        exit();
    }
}
