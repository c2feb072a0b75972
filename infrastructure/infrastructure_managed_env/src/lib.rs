//! Infrastructure Layer: Managed Environment
//!
//! The managed side of the bridge: what a boundary call can see of the managed
//! runtime, and the machinery that keeps native failures from escaping it.
//!
//! ## Overview
//!
//! - **[`managed_env`]**: [`ManagedEnv`], managed arrays, the exception slot,
//!   the pinning policy and acquire/release accounting
//! - **[`array_view`]**: [`ArrayView`], native access to one acquired array
//! - **[`array_marshaller`]**: [`ArrayMarshaller`], closure-scoped array access
//!   with the small-array fast path
//! - **[`alloc_guard`]**: conversion of engine allocation failures into
//!   [`BridgeError::OutOfMemory`] and a pending managed exception
//! - **[`error`]**: [`BridgeError`]

pub mod alloc_guard;
pub mod array_marshaller;
pub mod array_view;
pub mod error;
pub mod managed_env;

pub use alloc_guard::{
    guard, install_quiet_panic_hook, raise_out_of_memory, raise_out_of_memory_signal, report,
    OutOfMemorySignal,
};
pub use array_marshaller::{
    to_managed_bool_array, to_managed_byte_array, to_managed_int_array, ArrayMarshaller,
    DEFAULT_SMALL_ARRAY_LIMIT, SMALL_ARRAY_CAPACITY,
};
pub use array_view::{ArrayView, ReleaseMode};
pub use error::BridgeError;
pub use managed_env::{
    BoolArray, ByteArray, IntArray, ManagedArray, ManagedEnv, ManagedException, PinPolicy,
    BRIDGE_OUT_OF_MEMORY_CLASS, GENERIC_OUT_OF_MEMORY_CLASS,
};
