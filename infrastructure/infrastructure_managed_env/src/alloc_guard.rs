//! Allocation Failure Guard
//!
//! The engine reports an exhausted allocation budget through its out-of-memory
//! hook. The bridge installs [`raise_out_of_memory_signal`] as that hook: it
//! unwinds with an [`OutOfMemorySignal`] payload, and [`guard`] catches exactly
//! that payload at the boundary, raises the managed out-of-memory exception and
//! reports [`BridgeError::OutOfMemory`]. Any other panic keeps unwinding.
//!
//! The engine charges its budget before mutating anything, so unwinding out of
//! a failed call leaves it consistent. Callers hold the engine lock outside the
//! guarded closure; the unwind never crosses the lock and cannot poison it.

use crate::error::BridgeError;
use crate::managed_env::{ManagedEnv, BRIDGE_OUT_OF_MEMORY_CLASS, GENERIC_OUT_OF_MEMORY_CLASS};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

/// Unwind payload of an engine allocation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfMemorySignal;

const OUT_OF_MEMORY_MESSAGE: &str = "out of memory";

/// Out-of-memory hook that unwinds to the nearest [`guard`]
pub fn raise_out_of_memory_signal() -> ! {
    panic::panic_any(OutOfMemorySignal)
}

static QUIET_HOOK: Once = Once::new();

/// Keep the panic hook from printing the out-of-memory signal
///
/// Other panics reach the previously installed hook. Installing twice is a no-op.
pub fn install_quiet_panic_hook() {
    QUIET_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if info.payload().downcast_ref::<OutOfMemorySignal>().is_none() {
                previous(info);
            }
        }));
    });
}

/// Run one boundary call, turning the out-of-memory signal into an error
pub fn guard<R>(env: &ManagedEnv, call: impl FnOnce() -> R) -> Result<R, BridgeError> {
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(value) => Ok(value),
        Err(payload) if payload.is::<OutOfMemorySignal>() => {
            tracing::warn!("engine allocation failed, raising managed out-of-memory");
            raise_out_of_memory(env);
            Err(BridgeError::OutOfMemory)
        }
        Err(payload) => panic::resume_unwind(payload),
    }
}

/// Leave an out-of-memory exception pending on the managed side
///
/// Falls back to the runtime's own class when the bridge class is missing. If
/// neither can be raised and nothing is pending the process aborts.
pub fn raise_out_of_memory(env: &ManagedEnv) {
    let raised = env
        .throw_new(BRIDGE_OUT_OF_MEMORY_CLASS, OUT_OF_MEMORY_MESSAGE)
        .or_else(|_| env.throw_new(GENERIC_OUT_OF_MEMORY_CLASS, OUT_OF_MEMORY_MESSAGE));
    if raised.is_err() && !env.exception_check() {
        fatal_error("out of memory and no exception class available to report it");
    }
}

/// Report through stderr and abort
pub fn fatal_error(message: &str) -> ! {
    tracing::error!(reason = message, "fatal bridge error");
    eprintln!("term bridge fatal error: {}", message);
    std::process::abort()
}

/// Report `error` on the managed side where that is its contract
///
/// Only out-of-memory raises a managed exception; the other errors are
/// reported through the failure sentinel and the engine error state.
pub fn report(env: &ManagedEnv, error: &BridgeError) {
    if *error == BridgeError::OutOfMemory && !env.exception_check() {
        raise_out_of_memory(env);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_becomes_out_of_memory() {
        install_quiet_panic_hook();
        let env = ManagedEnv::new();
        let result = guard(&env, || -> i32 { raise_out_of_memory_signal() });
        assert_eq!(result, Err(BridgeError::OutOfMemory));
        assert_eq!(
            env.take_exception().map(|e| e.class),
            Some(BRIDGE_OUT_OF_MEMORY_CLASS.to_string())
        );
    }

    #[test]
    fn test_value_passes_through() {
        let env = ManagedEnv::new();
        assert_eq!(guard(&env, || 7), Ok(7));
        assert!(!env.exception_check());
    }

    #[test]
    fn test_other_panics_resume() {
        let env = ManagedEnv::new();
        let outer = panic::catch_unwind(AssertUnwindSafe(|| {
            guard(&env, || -> i32 { panic!("unrelated") }).ok();
        }));
        let payload = outer.unwrap_err();
        assert_eq!(payload.downcast_ref::<&str>(), Some(&"unrelated"));
        assert!(!env.exception_check());
    }

    #[test]
    fn test_fallback_class() {
        let env = ManagedEnv::new();
        env.unload_class(BRIDGE_OUT_OF_MEMORY_CLASS);
        raise_out_of_memory(&env);
        assert_eq!(
            env.take_exception().map(|e| e.class),
            Some(GENERIC_OUT_OF_MEMORY_CLASS.to_string())
        );
    }

    #[test]
    fn test_report_keeps_existing_exception() {
        let env = ManagedEnv::new();
        env.throw_new(GENERIC_OUT_OF_MEMORY_CLASS, "managed heap").unwrap();
        report(&env, &BridgeError::OutOfMemory);
        assert_eq!(env.take_exception().map(|e| e.message), Some("managed heap".to_string()));

        report(&env, &BridgeError::InvalidArgument("x".to_string()));
        assert!(!env.exception_check());
    }
}
