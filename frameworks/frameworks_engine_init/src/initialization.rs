//! Engine Lifecycle
//!
//! The engine is one process-wide resource. It lives in a global slot behind a
//! single mutex between [`init`] and [`exit`]; every boundary call locks the slot
//! for its whole duration, so calls are serialized against each other and
//! against lifecycle transitions.
//!
//! Handles obtained before [`reset`] or [`exit`] are invalid afterwards.

use crate::config::BridgeConfig;
use adapters_term_engine::TermEngine;
use infrastructure_managed_env::{
    guard, install_quiet_panic_hook, raise_out_of_memory_signal, ArrayMarshaller, BridgeError,
    ManagedEnv,
};
use lazy_static::lazy_static;
use std::sync::{Mutex, MutexGuard};
use usecases_memory_management::{set_out_of_memory_hook, BudgetAllocator};

/// Everything a boundary call works on
#[derive(Debug)]
pub struct EngineState {
    pub engine: TermEngine,
    pub marshaller: ArrayMarshaller,
    config: BridgeConfig,
}

impl EngineState {
    fn new(config: BridgeConfig) -> Self {
        let allocator = match config.engine_memory_limit {
            Some(limit) => BudgetAllocator::with_limit(limit),
            None => BudgetAllocator::unbounded(),
        };
        Self {
            engine: TermEngine::with_allocator(allocator),
            marshaller: ArrayMarshaller::new(config.small_array_limit),
            config,
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Codec scratch threshold in bytes
    pub fn stack_bytes(&self) -> usize {
        self.config.effective_stack_scratch_bytes()
    }

    /// Environment for a call arriving from the managed side
    pub fn new_env(&self) -> ManagedEnv {
        ManagedEnv::with_pin_policy(self.config.pin_policy)
    }
}

lazy_static! {
    static ref ENGINE: Mutex<Option<EngineState>> = Mutex::new(None);
}

fn lock_engine() -> MutexGuard<'static, Option<EngineState>> {
    ENGINE.lock().unwrap_or_else(|poisoned| {
        tracing::warn!("engine lock was poisoned; recovering");
        poisoned.into_inner()
    })
}

/// Initialize with the configuration from the environment
pub fn init() {
    init_with_config(BridgeConfig::from_env());
}

/// Initialize with `config`
///
/// Installs the out-of-memory hook that makes engine allocation failures
/// recoverable. Initializing an initialized engine keeps the existing one.
pub fn init_with_config(config: BridgeConfig) {
    install_quiet_panic_hook();
    set_out_of_memory_hook(Some(raise_out_of_memory_signal));

    let mut slot = lock_engine();
    if slot.is_some() {
        tracing::debug!("engine already initialized");
        return;
    }
    tracing::debug!(?config, "initializing engine");
    *slot = Some(EngineState::new(config));
}

/// Drop every term, type, name and native object, keeping the configuration
pub fn reset() {
    let mut slot = lock_engine();
    if let Some(state) = slot.as_mut() {
        tracing::debug!(terms = state.engine.num_terms(), types = state.engine.num_types(), "resetting engine");
        *state = EngineState::new(state.config.clone());
    }
}

/// Release the engine
pub fn exit() {
    if lock_engine().take().is_some() {
        tracing::debug!("engine released");
    }
}

pub fn is_initialized() -> bool {
    lock_engine().is_some()
}

/// Version of the bridge
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Run `f` on the engine state without the allocation guard
///
/// For calls that cannot allocate.
pub fn with_state<R>(f: impl FnOnce(&mut EngineState) -> R) -> Result<R, BridgeError> {
    let mut slot = lock_engine();
    let state = slot.as_mut().ok_or(BridgeError::NotInitialized)?;
    Ok(f(state))
}

/// Run `f` on the engine state under the allocation guard
///
/// The lock is taken outside the guarded closure, so an allocation failure
/// unwinds to the guard without poisoning it.
pub fn with_state_guarded<R>(
    env: &ManagedEnv,
    f: impl FnOnce(&mut EngineState) -> R,
) -> Result<R, BridgeError> {
    let mut slot = lock_engine();
    let state = slot.as_mut().ok_or(BridgeError::NotInitialized)?;
    guard(env, || f(state))
}
