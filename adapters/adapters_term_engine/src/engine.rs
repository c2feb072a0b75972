//! Term Engine
//!
//! The engine owns the term and type tables, the name tables, the reference
//! counts and the native object registry. Constructors live in
//! [`term_ops`](crate::term_ops), [`type_ops`](crate::type_ops) and
//! [`object_ops`](crate::object_ops); this module holds the state, error
//! reporting, reference counting, naming and collection.
//!
//! ## Memory
//!
//! Every mutation charges the engine's [`BudgetAllocator`] before it touches any
//! table. When a charge fails the process-wide out-of-memory hook runs. If that
//! hook unwinds, the engine is left exactly as it was before the failing
//! mutation, so it remains usable for the next call.
//!
//! ## Errors
//!
//! Operations return [`EngineResult`]. The boundary stores failures with
//! [`TermEngine::record`], after which they can be queried through
//! [`TermEngine::error_code`] and [`TermEngine::error_string`] until cleared or
//! replaced by the next failure.

use crate::names::NameTable;
use crate::objects::NativeObjects;
use crate::terms::{TermEntry, TermKind, TermTable, PREDEFINED_TERMS};
use crate::types::{TypeKind, TypeTable, BOOL_TYPE, PREDEFINED_TYPES};
use entities_data_handling::handle::{handle_index, index_handle};
use entities_data_handling::{ErrorCode, ErrorReport, TermHandle, TypeHandle};
use usecases_memory_management::collector::{self, Collectable, CollectionStats, Node};
use usecases_memory_management::{out_of_memory, Allocator, BudgetAllocator, RefCounts};

/// Result of an engine operation
pub type EngineResult<T> = Result<T, ErrorReport>;

pub(crate) fn invalid_term(t: TermHandle) -> ErrorReport {
    ErrorReport::new(ErrorCode::InvalidTerm).with_term(t)
}

pub(crate) fn invalid_type(ty: TypeHandle) -> ErrorReport {
    ErrorReport::new(ErrorCode::InvalidType).with_type(ty)
}

/// The native term engine
#[derive(Debug)]
pub struct TermEngine {
    pub(crate) allocator: BudgetAllocator,
    pub(crate) types: TypeTable,
    pub(crate) terms: TermTable,
    pub(crate) term_names: NameTable,
    pub(crate) type_names: NameTable,
    pub(crate) term_refs: RefCounts,
    pub(crate) type_refs: RefCounts,
    pub(crate) objects: NativeObjects,
    last_error: ErrorReport,
}

impl Default for TermEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TermEngine {
    /// Engine without a memory limit
    pub fn new() -> Self {
        Self::with_allocator(BudgetAllocator::unbounded())
    }

    /// Engine charging its tables against `allocator`
    ///
    /// The predefined types and terms are installed without charging.
    pub fn with_allocator(allocator: BudgetAllocator) -> Self {
        Self {
            allocator,
            types: TypeTable::new(),
            terms: TermTable::new(BOOL_TYPE),
            term_names: NameTable::new(),
            type_names: NameTable::new(),
            term_refs: RefCounts::new(),
            type_refs: RefCounts::new(),
            objects: NativeObjects::new(),
            last_error: ErrorReport::none(),
        }
    }

    pub fn allocator(&self) -> &BudgetAllocator {
        &self.allocator
    }

    pub fn allocator_mut(&mut self) -> &mut BudgetAllocator {
        &mut self.allocator
    }

    // ------------------------------------------------------------------
    // Error reporting
    // ------------------------------------------------------------------

    /// Store the error of a failed operation and return the value otherwise
    pub fn record<T>(&mut self, result: EngineResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(report) => {
                tracing::debug!(%report, "engine call failed");
                self.last_error = report;
                None
            }
        }
    }

    /// Code of the last recorded error; 0 when none
    pub fn error_code(&self) -> i32 {
        self.last_error.code.code()
    }

    /// Message for the last recorded error
    pub fn error_string(&self) -> String {
        self.last_error.to_string()
    }

    pub fn clear_error(&mut self) {
        self.last_error = ErrorReport::none();
    }

    // ------------------------------------------------------------------
    // Table access
    // ------------------------------------------------------------------

    pub fn is_valid_term(&self, t: TermHandle) -> bool {
        self.terms.get(t).is_some()
    }

    pub fn is_valid_type(&self, ty: TypeHandle) -> bool {
        self.types.get(ty).is_some()
    }

    pub(crate) fn term_entry(&self, t: TermHandle) -> EngineResult<&TermEntry> {
        self.terms.get(t).ok_or_else(|| invalid_term(t))
    }

    pub(crate) fn type_kind(&self, ty: TypeHandle) -> EngineResult<&TypeKind> {
        self.types.get(ty).ok_or_else(|| invalid_type(ty))
    }

    /// Structure of a live term
    pub fn term_kind(&self, t: TermHandle) -> EngineResult<&TermKind> {
        self.term_entry(t).map(|entry| &entry.kind)
    }

    /// Return the existing handle for `kind` or charge for and store a new type
    pub(crate) fn intern_type(&mut self, kind: TypeKind) -> TypeHandle {
        if let Some(existing) = self.types.lookup(&kind) {
            return existing;
        }
        let bytes = kind.footprint();
        self.allocator.charge(bytes);
        match self.types.insert(kind) {
            Some(handle) => handle,
            None => {
                self.allocator.credit(bytes);
                out_of_memory()
            }
        }
    }

    /// Return the existing handle for the term or charge for and store a new one
    pub(crate) fn intern_term(&mut self, kind: TermKind, ty: TypeHandle) -> TermHandle {
        let entry = TermEntry { kind, ty };
        if let Some(existing) = self.terms.lookup(&entry) {
            return existing;
        }
        let bytes = entry.kind.footprint();
        self.allocator.charge(bytes);
        match self.terms.insert(entry) {
            Some(handle) => handle,
            None => {
                self.allocator.credit(bytes);
                out_of_memory()
            }
        }
    }

    // ------------------------------------------------------------------
    // Reference counts
    // ------------------------------------------------------------------

    fn live_term_index(&self, t: TermHandle) -> EngineResult<usize> {
        self.term_entry(t)?;
        handle_index(t).ok_or_else(|| invalid_term(t))
    }

    fn live_type_index(&self, ty: TypeHandle) -> EngineResult<usize> {
        self.type_kind(ty)?;
        handle_index(ty).ok_or_else(|| invalid_type(ty))
    }

    /// Increment the reference count of a term
    ///
    /// The first increment of a handle may grow the counter table.
    pub fn incref_term(&mut self, t: TermHandle) -> EngineResult<()> {
        let index = self.live_term_index(t)?;
        let growth = self.term_refs.growth_for(index);
        if growth > 0 {
            self.allocator.charge(growth * std::mem::size_of::<u32>());
        }
        self.term_refs.incref(index);
        Ok(())
    }

    /// Decrement the reference count of a term; never allocates
    pub fn decref_term(&mut self, t: TermHandle) -> EngineResult<()> {
        let index = self.live_term_index(t)?;
        self.term_refs
            .decref(index)
            .map(|_| ())
            .map_err(|_| ErrorReport::new(ErrorCode::BadTermDecref).with_term(t))
    }

    pub fn incref_type(&mut self, ty: TypeHandle) -> EngineResult<()> {
        let index = self.live_type_index(ty)?;
        let growth = self.type_refs.growth_for(index);
        if growth > 0 {
            self.allocator.charge(growth * std::mem::size_of::<u32>());
        }
        self.type_refs.incref(index);
        Ok(())
    }

    pub fn decref_type(&mut self, ty: TypeHandle) -> EngineResult<()> {
        let index = self.live_type_index(ty)?;
        self.type_refs
            .decref(index)
            .map(|_| ())
            .map_err(|_| ErrorReport::new(ErrorCode::BadTypeDecref).with_type(ty))
    }

    /// Live terms, predefined ones included
    pub fn num_terms(&self) -> usize {
        self.terms.entries.live()
    }

    /// Live types, predefined ones included
    pub fn num_types(&self) -> usize {
        self.types.entries.live()
    }

    pub fn num_posref_terms(&self) -> usize {
        self.term_refs.num_positive()
    }

    pub fn num_posref_types(&self) -> usize {
        self.type_refs.num_positive()
    }

    // ------------------------------------------------------------------
    // Names
    // ------------------------------------------------------------------

    pub fn set_term_name(&mut self, t: TermHandle, name: &str) -> EngineResult<()> {
        self.term_entry(t)?;
        self.allocator.charge(NameTable::footprint(name));
        self.term_names.bind(t, name);
        Ok(())
    }

    pub fn get_term_name(&self, t: TermHandle) -> Option<&str> {
        self.term_names.base_name(t)
    }

    pub fn get_term_by_name(&self, name: &str) -> Option<TermHandle> {
        self.term_names.lookup(name)
    }

    pub fn remove_term_name(&mut self, name: &str) {
        let released = self.term_names.unbind(name);
        self.allocator.credit(released);
    }

    pub fn clear_term_name(&mut self, t: TermHandle) -> EngineResult<()> {
        self.term_entry(t)?;
        let released = self.term_names.clear(t);
        self.allocator.credit(released);
        Ok(())
    }

    pub fn set_type_name(&mut self, ty: TypeHandle, name: &str) -> EngineResult<()> {
        self.type_kind(ty)?;
        self.allocator.charge(NameTable::footprint(name));
        self.type_names.bind(ty, name);
        Ok(())
    }

    pub fn get_type_name(&self, ty: TypeHandle) -> Option<&str> {
        self.type_names.base_name(ty)
    }

    pub fn get_type_by_name(&self, name: &str) -> Option<TypeHandle> {
        self.type_names.lookup(name)
    }

    pub fn remove_type_name(&mut self, name: &str) {
        let released = self.type_names.unbind(name);
        self.allocator.credit(released);
    }

    pub fn clear_type_name(&mut self, ty: TypeHandle) -> EngineResult<()> {
        self.type_kind(ty)?;
        let released = self.type_names.clear(ty);
        self.allocator.credit(released);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Collection
    // ------------------------------------------------------------------

    /// Reclaim every term and type that is not live
    ///
    /// Invalid handles in either root list are ignored.
    pub fn collect(
        &mut self,
        root_terms: &[TermHandle],
        root_types: &[TypeHandle],
        keep_named: bool,
    ) -> CollectionStats {
        let scratch =
            collector::scratch_bytes(self.terms.entries.slots(), self.types.entries.slots());
        self.allocator.charge(scratch);
        let stats = collector::collect(self, root_terms, root_types, keep_named);
        self.allocator.credit(scratch);
        stats
    }
}

fn named_nodes(names: &NameTable, node: fn(usize) -> Node, roots: &mut Vec<Node>) {
    roots.extend(
        names
            .named_handles()
            .into_iter()
            .filter_map(handle_index)
            .map(node),
    );
}

impl Collectable for TermEngine {
    fn term_slots(&self) -> usize {
        self.terms.entries.slots()
    }

    fn type_slots(&self) -> usize {
        self.types.entries.slots()
    }

    fn term_in_use(&self, index: usize) -> bool {
        self.terms.entries.get_index(index).is_some()
    }

    fn type_in_use(&self, index: usize) -> bool {
        self.types.entries.get_index(index).is_some()
    }

    fn push_roots(&self, keep_named: bool, roots: &mut Vec<Node>) {
        roots.extend((0..PREDEFINED_TYPES).map(Node::Type));
        roots.extend((0..PREDEFINED_TERMS).map(Node::Term));
        roots.extend(self.term_refs.referenced().map(Node::Term));
        roots.extend(self.type_refs.referenced().map(Node::Type));
        roots.extend(
            self.objects
                .held_terms()
                .into_iter()
                .filter_map(handle_index)
                .map(Node::Term),
        );
        if keep_named {
            named_nodes(&self.term_names, Node::Term, roots);
            named_nodes(&self.type_names, Node::Type, roots);
        }
    }

    fn term_edges(&self, index: usize, edges: &mut Vec<Node>) {
        if let Some(entry) = self.terms.entries.get_index(index) {
            if let Some(ty) = handle_index(entry.ty) {
                edges.push(Node::Type(ty));
            }
            edges.extend(
                entry
                    .kind
                    .children()
                    .into_iter()
                    .filter_map(handle_index)
                    .map(Node::Term),
            );
        }
    }

    fn type_edges(&self, index: usize, edges: &mut Vec<Node>) {
        if let Some(kind) = self.types.entries.get_index(index) {
            edges.extend(
                kind.children()
                    .into_iter()
                    .filter_map(handle_index)
                    .map(Node::Type),
            );
        }
    }

    fn reclaim_term(&mut self, index: usize) {
        if let Some(entry) = self.terms.remove(index) {
            self.allocator.credit(entry.kind.footprint());
            self.term_refs.forget(index);
            if let Some(handle) = index_handle(index) {
                let released = self.term_names.forget(handle);
                self.allocator.credit(released);
            }
        }
    }

    fn reclaim_type(&mut self, index: usize) {
        if let Some(kind) = self.types.remove(index) {
            self.allocator.credit(kind.footprint());
            self.type_refs.forget(index);
            if let Some(handle) = index_handle(index) {
                let released = self.type_names.forget(handle);
                self.allocator.credit(released);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terms::{FALSE_TERM, TRUE_TERM};
    use crate::types::INT_TYPE;

    #[test]
    fn test_fresh_engine() {
        let engine = TermEngine::new();
        assert_eq!(engine.num_types(), 3);
        assert_eq!(engine.num_terms(), 2);
        assert_eq!(engine.error_code(), 0);
        assert!(engine.is_valid_term(TRUE_TERM));
        assert!(engine.is_valid_term(FALSE_TERM));
        assert!(!engine.is_valid_term(-1));
    }

    #[test]
    fn test_record_keeps_last_error() {
        let mut engine = TermEngine::new();
        let result: EngineResult<i32> = Err(invalid_term(77));
        assert_eq!(engine.record(result), None);
        assert_eq!(engine.error_code(), ErrorCode::InvalidTerm.code());
        assert_eq!(engine.error_string(), "invalid term (term 77)");

        assert_eq!(engine.record(Ok(5)), Some(5));
        assert_eq!(engine.error_code(), ErrorCode::InvalidTerm.code());

        engine.clear_error();
        assert_eq!(engine.error_code(), 0);
    }

    #[test]
    fn test_refcounts() {
        let mut engine = TermEngine::new();
        let x = engine.new_uninterpreted_term(INT_TYPE).unwrap();
        engine.incref_term(x).unwrap();
        assert_eq!(engine.num_posref_terms(), 1);
        engine.decref_term(x).unwrap();
        assert_eq!(engine.num_posref_terms(), 0);

        let err = engine.decref_term(x).unwrap_err();
        assert_eq!(err.code, ErrorCode::BadTermDecref);
        assert_eq!(engine.incref_term(12345).unwrap_err().code, ErrorCode::InvalidTerm);
        assert_eq!(engine.decref_type(-1).unwrap_err().code, ErrorCode::InvalidType);
    }

    #[test]
    fn test_collect_respects_refcounts() {
        let mut engine = TermEngine::new();
        let x = engine.new_uninterpreted_term(INT_TYPE).unwrap();
        engine.incref_term(x).unwrap();
        engine.collect(&[], &[], false);
        assert!(engine.is_valid_term(x));

        engine.decref_term(x).unwrap();
        let stats = engine.collect(&[], &[], false);
        assert_eq!(stats.terms_reclaimed, 1);
        assert!(!engine.is_valid_term(x));
        assert_eq!(engine.num_terms(), 2);
    }

    #[test]
    fn test_names_follow_reclaim() {
        let mut engine = TermEngine::new();
        let x = engine.new_uninterpreted_term(INT_TYPE).unwrap();
        engine.set_term_name(x, "x").unwrap();

        engine.collect(&[], &[], true);
        assert_eq!(engine.get_term_by_name("x"), Some(x));

        engine.collect(&[], &[], false);
        assert_eq!(engine.get_term_by_name("x"), None);
        assert_eq!(engine.get_term_name(x), None);
    }

    #[test]
    fn test_name_bindings_give_back_their_bytes() {
        let mut engine = TermEngine::with_allocator(BudgetAllocator::with_limit(8192));
        let empty = engine.allocator().in_use();
        let x = engine.new_uninterpreted_term(INT_TYPE).unwrap();
        let before = engine.allocator().in_use();
        for _ in 0..1000 {
            engine.set_term_name(x, "some_name").unwrap();
            engine.set_term_name(x, "some_name").unwrap();
            engine.remove_term_name("some_name");
            engine.clear_term_name(x).unwrap();
            engine.set_type_name(INT_TYPE, "nat").unwrap();
            engine.remove_type_name("nat");
        }
        assert_eq!(engine.allocator().in_use(), before);

        engine.set_term_name(x, "a").unwrap();
        engine.set_term_name(x, "b").unwrap();
        engine.collect(&[], &[], false);
        assert!(!engine.is_valid_term(x));
        assert_eq!(engine.allocator().in_use(), empty);
    }

    #[test]
    fn test_allocator_is_balanced_after_collection() {
        let mut engine = TermEngine::new();
        let before = engine.allocator().in_use();
        let bv = engine.bv_type(8).unwrap();
        engine.new_uninterpreted_term(bv).unwrap();
        assert!(engine.allocator().in_use() > before);
        engine.collect(&[], &[], false);
        assert_eq!(engine.allocator().in_use(), before);
    }
}
