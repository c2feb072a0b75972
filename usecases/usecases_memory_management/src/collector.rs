//! Mark-and-Sweep Collection
//!
//! Reclaims engine terms and types that are no longer needed. The collector
//! only knows the shape of the object graph through the [`Collectable`] trait,
//! so the same algorithm drives any engine table layout.
//!
//! ## Liveness
//!
//! An entry survives a collection if it is
//!
//! - one of the explicit roots passed to [`collect`],
//! - contributed by the graph itself through [`Collectable::push_roots`]
//!   (positive reference counts, predefined entries, entries held by native
//!   objects, and named entries when `keep_named` is set),
//! - or reachable from any of the above through term children, term types and
//!   type children.
//!
//! Every other entry in use is handed to the graph to reclaim. Root handles that
//! are negative, out of range or already free are ignored.

use entities_data_handling::handle::{handle_index, Handle};

/// An entry in the object graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Node {
    /// Term table index
    Term(usize),
    /// Type table index
    Type(usize),
}

/// Object graph the collector runs over
pub trait Collectable {
    /// Length of the term table, free slots included
    fn term_slots(&self) -> usize;

    /// Length of the type table, free slots included
    fn type_slots(&self) -> usize;

    /// Whether the term slot holds a live entry
    fn term_in_use(&self, index: usize) -> bool;

    /// Whether the type slot holds a live entry
    fn type_in_use(&self, index: usize) -> bool;

    /// Push the entries that are live regardless of the explicit roots
    fn push_roots(&self, keep_named: bool, roots: &mut Vec<Node>);

    /// Push the entries a term refers to: its children and its type
    fn term_edges(&self, index: usize, edges: &mut Vec<Node>);

    /// Push the entries a type refers to
    fn type_edges(&self, index: usize, edges: &mut Vec<Node>);

    /// Free a term slot
    fn reclaim_term(&mut self, index: usize);

    /// Free a type slot
    fn reclaim_type(&mut self, index: usize);
}

/// Result of one collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionStats {
    /// Terms that survived
    pub terms_kept: usize,
    /// Types that survived
    pub types_kept: usize,
    /// Terms reclaimed
    pub terms_reclaimed: usize,
    /// Types reclaimed
    pub types_reclaimed: usize,
}

struct Marks {
    terms: Vec<bool>,
    types: Vec<bool>,
}

impl Marks {
    fn new(term_slots: usize, type_slots: usize) -> Self {
        Self {
            terms: vec![false; term_slots],
            types: vec![false; type_slots],
        }
    }

    /// Mark `node`; returns false if it was already marked or is out of range
    fn mark(&mut self, node: Node) -> bool {
        let slot = match node {
            Node::Term(index) => self.terms.get_mut(index),
            Node::Type(index) => self.types.get_mut(index),
        };
        match slot {
            Some(marked) if !*marked => {
                *marked = true;
                true
            }
            _ => false,
        }
    }
}

/// Bytes of scratch a collection over the given table sizes needs
pub fn scratch_bytes(term_slots: usize, type_slots: usize) -> usize {
    term_slots.saturating_add(type_slots)
}

/// Run one mark-and-sweep collection
pub fn collect<G: Collectable>(
    graph: &mut G,
    root_terms: &[Handle],
    root_types: &[Handle],
    keep_named: bool,
) -> CollectionStats {
    let term_slots = graph.term_slots();
    let type_slots = graph.type_slots();
    let mut marks = Marks::new(term_slots, type_slots);

    let mut stack = Vec::new();
    graph.push_roots(keep_named, &mut stack);
    stack.extend(
        root_terms
            .iter()
            .filter_map(|&h| handle_index(h))
            .map(Node::Term),
    );
    stack.extend(
        root_types
            .iter()
            .filter_map(|&h| handle_index(h))
            .map(Node::Type),
    );

    while let Some(node) = stack.pop() {
        let in_use = match node {
            Node::Term(index) => index < term_slots && graph.term_in_use(index),
            Node::Type(index) => index < type_slots && graph.type_in_use(index),
        };
        if !in_use || !marks.mark(node) {
            continue;
        }
        match node {
            Node::Term(index) => graph.term_edges(index, &mut stack),
            Node::Type(index) => graph.type_edges(index, &mut stack),
        }
    }

    let mut stats = CollectionStats::default();
    for index in 0..term_slots {
        if !graph.term_in_use(index) {
            continue;
        }
        if marks.terms[index] {
            stats.terms_kept += 1;
        } else {
            graph.reclaim_term(index);
            stats.terms_reclaimed += 1;
        }
    }
    for index in 0..type_slots {
        if !graph.type_in_use(index) {
            continue;
        }
        if marks.types[index] {
            stats.types_kept += 1;
        } else {
            graph.reclaim_type(index);
            stats.types_reclaimed += 1;
        }
    }

    tracing::debug!(
        terms_kept = stats.terms_kept,
        terms_reclaimed = stats.terms_reclaimed,
        types_kept = stats.types_kept,
        types_reclaimed = stats.types_reclaimed,
        "collection finished"
    );
    stats
}
