//! Use Cases Layer: Memory Management
//!
//! Memory policy for the native term engine. The engine never calls the system
//! allocator directly for its tables; it charges every entry against an
//! [`Allocator`] first and only then mutates its state, so an allocation failure
//! can never leave a half-built entry behind.
//!
//! ## Overview
//!
//! - **[`allocator`](allocator/index.html)**: allocator interface and the budgeted
//!   allocator used by the engine, including failure injection for tests
//! - **[`out_of_memory`](out_of_memory/index.html)**: the process-wide failure hook.
//!   Without a hook, exhaustion logs and terminates the process with status 1
//! - **[`refcount`](refcount/index.html)**: per-handle reference counters driven by
//!   the managed side
//! - **[`collector`](collector/index.html)**: mark-and-sweep over terms and types with
//!   an explicit root set
//!
//! ## See Also
//!
//! - [`entities_data_handling`](../../entities/entities_data_handling/index.html): handles and error codes

pub mod allocator;
pub mod out_of_memory;
pub mod refcount;
pub mod collector;

pub use allocator::{Allocator, AllocationError, BudgetAllocator};
pub use collector::{collect, Collectable, CollectionStats, Node};
pub use out_of_memory::{out_of_memory, set_out_of_memory_hook, OutOfMemoryHook};
pub use refcount::{RefCountError, RefCounts};
