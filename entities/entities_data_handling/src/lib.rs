//! Entities Layer: Data Handling
//!
//! Provides the plain data types that cross the managed/native boundary:
//! - **Handles**: opaque 32-bit identifiers for native terms and types
//! - **Native addresses**: 64-bit carriers for heavier native objects
//!   (configurations, contexts, parameter records, models)
//! - **Error codes**: the engine's own error taxonomy, reported through the
//!   error-code/error-string query pair
//!
//! Handles own no memory. A handle is valid between engine initialization and the
//! next reset or exit, and only until the collector reclaims it.

pub mod handle;
pub mod native_address;
pub mod error_code;

pub use handle::{Handle, TermHandle, TypeHandle, NULL_TERM, NULL_TYPE};
pub use native_address::NativeAddress;
pub use error_code::{ErrorCode, ErrorReport};
