//! Frameworks Layer: Engine Initialization
//!
//! Owns the process-wide engine and its lifecycle. The boundary facades reach
//! the engine only through [`with_state`] and [`with_state_guarded`], which
//! serialize every call on one mutex.
//!
//! ## Modules
//!
//! - **[`config`](config/index.html)**: [`BridgeConfig`] and its environment overrides
//! - **[`initialization`](initialization/index.html)**: init, reset and exit of
//!   the global engine state
//!
//! ## Initialization Sequence
//!
//! 1. Wrap the panic hook so the out-of-memory signal stays quiet
//! 2. Install the out-of-memory hook in the engine allocator
//! 3. Create the engine with the configured allocation budget
//!
//! ## See Also
//!
//! - [`adapters_term_engine`](../adapters_term_engine/index.html): the engine
//! - [`infrastructure_managed_env`](../infrastructure_managed_env/index.html): the guard

pub mod config;
pub mod initialization;

pub use config::{BridgeConfig, MEMORY_LIMIT_VAR, PIN_POLICY_VAR};
pub use initialization::{
    exit, init, init_with_config, is_initialized, reset, version, with_state, with_state_guarded,
    EngineState,
};
