//! Adapters Layer: Term Engine
//!
//! In-process symbolic term engine behind the managed/native bridge. It owns
//! hash-consed term and type tables, name tables, external reference counts, a
//! mark-and-sweep collector and a registry of native objects addressed by
//! [`NativeAddress`](entities_data_handling::NativeAddress).
//!
//! The engine performs no solving. Contexts record assertions and detect only
//! trivially false ones; models are built from explicit assignments.
//!
//! ## Modules
//!
//! - **[`engine`]**: engine state, error reporting, reference counts, names, collection
//! - **[`types`]** / **[`terms`]**: table entries and the predefined handles
//! - **[`type_ops`]** / **[`term_ops`]**: constructors and queries
//! - **[`objects`]** / **[`object_ops`]**: configurations, contexts, parameters, models
//! - **[`eval`]**: evaluation of terms in a model

mod names;
mod table;

pub mod engine;
pub mod eval;
pub mod object_ops;
pub mod objects;
pub mod term_ops;
pub mod terms;
pub mod type_ops;
pub mod types;

pub use engine::{EngineResult, TermEngine};
pub use eval::Value;
pub use objects::{ContextStatus, Model};
pub use terms::{TermKind, FALSE_TERM, TRUE_TERM};
pub use types::{TypeKind, BOOL_TYPE, INT_TYPE, REAL_TYPE};
pub use usecases_memory_management::CollectionStats;
