//! Common API Facades
//!
//! Call plumbing shared by every facade, and the engine error queries.
//!
//! A facade never returns a Rust error to the managed side. Failures become a
//! sentinel (`-1` for handles and statuses, `0` for native addresses, `None`
//! for arrays); out-of-memory additionally leaves a managed exception pending,
//! and engine validation failures stay queryable through [`error_code`] and
//! [`error_string`].

use adapters_term_engine::{EngineResult, TermEngine};
use frameworks_engine_init::{with_state, with_state_guarded, EngineState};
use infrastructure_managed_env::{report, BridgeError, ManagedEnv};

/// Status returned by facades that succeed without a value
pub const SUCCESS: i32 = 0;

/// Status returned by facades that fail without a value
pub const FAILURE: i32 = -1;

fn settle<R>(env: &ManagedEnv, result: Result<R, BridgeError>) -> Option<R> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            tracing::debug!(%error, "boundary call failed");
            report(env, &error);
            None
        }
    }
}

/// Run a call that may allocate
pub(crate) fn guarded_call<R>(
    env: &ManagedEnv,
    f: impl FnOnce(&mut EngineState) -> Result<R, BridgeError>,
) -> Option<R> {
    settle(env, with_state_guarded(env, f).and_then(|result| result))
}

/// Run a call that cannot allocate
pub(crate) fn unguarded_call<R>(
    env: &ManagedEnv,
    f: impl FnOnce(&mut EngineState) -> Result<R, BridgeError>,
) -> Option<R> {
    settle(env, with_state(f).and_then(|result| result))
}

/// Store an engine failure as the last error
pub(crate) fn recorded<T>(engine: &mut TermEngine, result: EngineResult<T>) -> Result<T, BridgeError> {
    result.map_err(|report| {
        let code = report.code;
        engine.record::<()>(Err(report));
        BridgeError::Engine(code)
    })
}

pub(crate) fn engine_call<T>(
    state: &mut EngineState,
    f: impl FnOnce(&mut TermEngine) -> EngineResult<T>,
) -> Result<T, BridgeError> {
    let result = f(&mut state.engine);
    recorded(&mut state.engine, result)
}

pub(crate) fn status(outcome: Option<()>) -> i32 {
    match outcome {
        Some(()) => SUCCESS,
        None => FAILURE,
    }
}

/// Code of the engine's last error; 0 when there is none
pub fn error_code() -> i32 {
    with_state(|state| state.engine.error_code()).unwrap_or(0)
}

/// Message for the engine's last error
pub fn error_string() -> String {
    with_state(|state| state.engine.error_string()).unwrap_or_else(|error| error.to_string())
}

pub fn clear_error() {
    // nothing to clear before init
    let _ = with_state(|state| state.engine.clear_error());
}

#[cfg(test)]
mod tests {
    use super::*;
    use entities_data_handling::{ErrorCode, ErrorReport};
    use frameworks_engine_init::{exit, init_with_config, BridgeConfig};
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_engine_errors_are_recorded() {
        exit();
        init_with_config(BridgeConfig::default());
        let env = ManagedEnv::new();

        let result = guarded_call(&env, |state| {
            engine_call(state, |_| Err::<(), _>(ErrorReport::new(ErrorCode::InvalidTerm).with_term(77)))
        });
        assert_eq!(result, None);
        assert_eq!(error_code(), ErrorCode::InvalidTerm.code());
        assert!(!env.exception_check());

        clear_error();
        assert_eq!(error_code(), 0);
        exit();
    }

    #[test]
    #[serial]
    fn test_not_initialized() {
        exit();
        let env = ManagedEnv::new();
        assert_eq!(unguarded_call(&env, |_| Ok(1)), None);
        assert_eq!(error_code(), 0);
        assert_eq!(error_string(), "engine is not initialized");
    }

    #[test]
    fn test_status() {
        assert_eq!(status(Some(())), SUCCESS);
        assert_eq!(status(None), FAILURE);
    }
}
