//! Integration tests for usecases_memory_management crate
//!
//! These tests drive the allocator, reference counts and collector together the
//! way the engine does: charge before mutating, pin with reference counts, then
//! collect.

use usecases_memory_management::collector::scratch_bytes;
use usecases_memory_management::{
    collect, Allocator, AllocationError, BudgetAllocator, Collectable, Node, RefCounts,
};

/// Flat table of terms with optional children, pinned by reference counts
struct CountedTable {
    allocator: BudgetAllocator,
    entries: Vec<Option<Vec<usize>>>,
    refcounts: RefCounts,
}

const ENTRY_BYTES: usize = 16;

impl CountedTable {
    fn new(limit: Option<usize>) -> Self {
        Self {
            allocator: match limit {
                Some(limit) => BudgetAllocator::with_limit(limit),
                None => BudgetAllocator::unbounded(),
            },
            entries: Vec::new(),
            refcounts: RefCounts::new(),
        }
    }

    fn add(&mut self, children: Vec<usize>) -> Result<usize, AllocationError> {
        self.allocator.try_charge(ENTRY_BYTES)?;
        if let Some(index) = self.entries.iter().position(|e| e.is_none()) {
            self.entries[index] = Some(children);
            Ok(index)
        } else {
            self.entries.push(Some(children));
            Ok(self.entries.len() - 1)
        }
    }
}

impl Collectable for CountedTable {
    fn term_slots(&self) -> usize {
        self.entries.len()
    }
    fn type_slots(&self) -> usize {
        0
    }
    fn term_in_use(&self, index: usize) -> bool {
        self.entries[index].is_some()
    }
    fn type_in_use(&self, _index: usize) -> bool {
        false
    }
    fn push_roots(&self, _keep_named: bool, roots: &mut Vec<Node>) {
        roots.extend(self.refcounts.referenced().map(Node::Term));
    }
    fn term_edges(&self, index: usize, edges: &mut Vec<Node>) {
        if let Some(children) = &self.entries[index] {
            edges.extend(children.iter().map(|&c| Node::Term(c)));
        }
    }
    fn type_edges(&self, _index: usize, _edges: &mut Vec<Node>) {}
    fn reclaim_term(&mut self, index: usize) {
        self.entries[index] = None;
        self.refcounts.forget(index);
        self.allocator.credit(ENTRY_BYTES);
    }
    fn reclaim_type(&mut self, _index: usize) {}
}

#[test]
fn test_incref_keeps_decref_reclaims() {
    let mut table = CountedTable::new(None);
    let leaf = table.add(vec![]).unwrap();
    let node = table.add(vec![leaf]).unwrap();

    table.refcounts.incref(node);
    let stats = collect(&mut table, &[], &[], false);
    assert_eq!(stats.terms_kept, 2);
    assert_eq!(stats.terms_reclaimed, 0);

    table.refcounts.decref(node).unwrap();
    let stats = collect(&mut table, &[], &[], false);
    assert_eq!(stats.terms_reclaimed, 2);
    assert_eq!(table.allocator.in_use(), 0);
}

#[test]
fn test_reclaimed_slots_are_reused() {
    let mut table = CountedTable::new(None);
    let a = table.add(vec![]).unwrap();
    let b = table.add(vec![]).unwrap();
    collect(&mut table, &[b as i32], &[], false);

    let c = table.add(vec![]).unwrap();
    assert_eq!(c, a);
}

#[test]
fn test_budget_frees_up_after_collection() {
    let mut table = CountedTable::new(Some(2 * ENTRY_BYTES));
    table.add(vec![]).unwrap();
    table.add(vec![]).unwrap();
    assert_eq!(table.add(vec![]), Err(AllocationError::OutOfMemory));

    collect(&mut table, &[], &[], false);
    assert!(table.add(vec![]).is_ok());
}

#[test]
fn test_scratch_bytes() {
    assert_eq!(scratch_bytes(10, 5), 15);
    assert_eq!(scratch_bytes(usize::MAX, 1), usize::MAX);
}
