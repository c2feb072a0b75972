//! API Facades Layer
//!
//! Entry points called from the managed runtime. Each facade takes the
//! caller's [`ManagedEnv`](infrastructure_managed_env::ManagedEnv), locks the
//! process-wide engine for the whole call and reports failure through a
//! sentinel: `-1` for handles and statuses, `0` for native addresses and `None`
//! for arrays.
//!
//! Every facade that may allocate runs under the allocation guard, so engine
//! memory exhaustion surfaces as one pending managed out-of-memory exception
//! and the engine stays usable for the next call.

pub mod arith_facades;
pub mod common_facades;
pub mod gc_facades;
pub mod name_facades;
pub mod object_facades;
pub mod term_facades;
pub mod type_facades;

// Re-export main facade functions
pub use arith_facades::*;
pub use common_facades::{clear_error, error_code, error_string, FAILURE, SUCCESS};
pub use gc_facades::*;
pub use name_facades::*;
pub use object_facades::*;
pub use term_facades::*;
pub use type_facades::*;

pub use entities_data_handling::{NULL_TERM, NULL_TYPE};
pub use frameworks_engine_init::{exit, init, init_with_config, is_initialized, reset, version, BridgeConfig};
