//! Out-of-Memory Hook
//!
//! The engine reports allocation exhaustion through a single process-wide hook.
//! With no hook installed the default behaviour applies: the failure is logged
//! and the process terminates with exit status 1. A runtime that wants to
//! recover installs a hook that transfers control back to its own boundary.
//!
//! Hooks never return. A hook that wants the engine to continue has to unwind;
//! the engine charges its budget before mutating anything, so unwinding out of a
//! failed charge leaves the engine consistent.

use lazy_static::lazy_static;
use std::sync::{Mutex, MutexGuard};

/// Function called when the engine cannot satisfy an allocation
pub type OutOfMemoryHook = fn() -> !;

lazy_static! {
    static ref OUT_OF_MEMORY_HOOK: Mutex<Option<OutOfMemoryHook>> = Mutex::new(None);
}

fn lock_hook() -> MutexGuard<'static, Option<OutOfMemoryHook>> {
    OUT_OF_MEMORY_HOOK.lock().unwrap_or_else(|poisoned| {
        tracing::warn!("out-of-memory hook lock was poisoned; recovering");
        poisoned.into_inner()
    })
}

/// Install (or remove, with `None`) the out-of-memory hook
///
/// Returns the hook that was previously installed.
pub fn set_out_of_memory_hook(hook: Option<OutOfMemoryHook>) -> Option<OutOfMemoryHook> {
    std::mem::replace(&mut *lock_hook(), hook)
}

/// Currently installed hook
pub fn out_of_memory_hook() -> Option<OutOfMemoryHook> {
    *lock_hook()
}

/// Report allocation exhaustion
///
/// Runs the installed hook, or logs and exits with status 1 when there is none.
pub fn out_of_memory() -> ! {
    // Copy the hook out so the lock is not held while the hook unwinds.
    let hook = out_of_memory_hook();
    match hook {
        Some(hook) => hook(),
        None => {
            tracing::error!("out of memory");
            eprintln!("Out of memory");
            std::process::exit(1)
        }
    }
}
