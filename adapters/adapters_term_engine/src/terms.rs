//! Term Table
//!
//! Every term records its kind and its type. Terms other than uninterpreted
//! terms and variables are hash-consed on (kind, type), so structurally equal
//! terms share one handle. Slots 0 and 1 hold the predefined `true` and `false`
//! constants.

use crate::table::Table;
use entities_data_handling::{Handle, TermHandle, TypeHandle};
use entities_utilities::BigRational;
use std::collections::HashMap;

/// Handle of the predefined `true` term
pub const TRUE_TERM: TermHandle = 0;
/// Handle of the predefined `false` term
pub const FALSE_TERM: TermHandle = 1;

pub(crate) const PREDEFINED_TERMS: usize = 2;

/// Structure of a term
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TermKind {
    BoolConst(bool),
    ArithConst(BigRational),
    /// Bit-vector constant, least significant bit first
    BvConst(Vec<bool>),
    /// Constant of a scalar or uninterpreted type
    ScalarConst(u32),
    Uninterpreted,
    Variable,
    Not(TermHandle),
    And(Vec<TermHandle>),
    Or(Vec<TermHandle>),
    Xor(Vec<TermHandle>),
    Eq(TermHandle, TermHandle),
    Ite(TermHandle, TermHandle, TermHandle),
    Distinct(Vec<TermHandle>),
    Forall(Vec<TermHandle>, TermHandle),
    Exists(Vec<TermHandle>, TermHandle),
    Lambda(Vec<TermHandle>, TermHandle),
    Tuple(Vec<TermHandle>),
    /// One-based component index and tuple
    Select(u32, TermHandle),
    Application(TermHandle, Vec<TermHandle>),
    /// Bit-vector built from Boolean terms, least significant bit first
    BvArray(Vec<TermHandle>),
}

impl TermKind {
    pub fn is_hash_consed(&self) -> bool {
        !matches!(self, TermKind::Uninterpreted | TermKind::Variable)
    }

    /// Whether the term is a constant value
    pub fn is_constant(&self) -> bool {
        matches!(
            self,
            TermKind::BoolConst(_)
                | TermKind::ArithConst(_)
                | TermKind::BvConst(_)
                | TermKind::ScalarConst(_)
        )
    }

    /// Sub-terms, in order; binders list their variables before the body
    pub fn children(&self) -> Vec<TermHandle> {
        match self {
            TermKind::BoolConst(_)
            | TermKind::ArithConst(_)
            | TermKind::BvConst(_)
            | TermKind::ScalarConst(_)
            | TermKind::Uninterpreted
            | TermKind::Variable => Vec::new(),
            TermKind::Not(t) | TermKind::Select(_, t) => vec![*t],
            TermKind::And(args)
            | TermKind::Or(args)
            | TermKind::Xor(args)
            | TermKind::Distinct(args)
            | TermKind::Tuple(args)
            | TermKind::BvArray(args) => args.clone(),
            TermKind::Eq(a, b) => vec![*a, *b],
            TermKind::Ite(c, a, b) => vec![*c, *a, *b],
            TermKind::Forall(vars, body)
            | TermKind::Exists(vars, body)
            | TermKind::Lambda(vars, body) => {
                let mut children = vars.clone();
                children.push(*body);
                children
            }
            TermKind::Application(f, args) => {
                let mut children = Vec::with_capacity(args.len() + 1);
                children.push(*f);
                children.extend_from_slice(args);
                children
            }
        }
    }

    pub(crate) fn footprint(&self) -> usize {
        const ENTRY_BYTES: usize = 40;
        let payload = match self {
            TermKind::ArithConst(q) => {
                let bits = q.numerator().significant_bits() + q.denominator().significant_bits();
                usize::try_from(bits / 8).unwrap_or(usize::MAX)
            }
            TermKind::BvConst(bits) => bits.len(),
            _ => self.children().len() * std::mem::size_of::<Handle>(),
        };
        ENTRY_BYTES.saturating_add(payload)
    }
}

/// A term and its type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TermEntry {
    pub kind: TermKind,
    pub ty: TypeHandle,
}

#[derive(Debug)]
pub(crate) struct TermTable {
    pub(crate) entries: Table<TermEntry>,
    index: HashMap<TermEntry, TermHandle>,
}

impl TermTable {
    pub(crate) fn new(bool_type: TypeHandle) -> Self {
        let mut table = Self {
            entries: Table::new(),
            index: HashMap::new(),
        };
        for value in [true, false] {
            table.insert(TermEntry {
                kind: TermKind::BoolConst(value),
                ty: bool_type,
            });
        }
        table
    }

    pub(crate) fn get(&self, t: TermHandle) -> Option<&TermEntry> {
        self.entries.get(t)
    }

    pub(crate) fn lookup(&self, entry: &TermEntry) -> Option<TermHandle> {
        self.index.get(entry).copied()
    }

    /// Store a term the caller has already charged for
    pub(crate) fn insert(&mut self, entry: TermEntry) -> Option<TermHandle> {
        let key = entry.kind.is_hash_consed().then(|| entry.clone());
        let handle = self.entries.insert(entry)?;
        if let Some(key) = key {
            self.index.insert(key, handle);
        }
        Some(handle)
    }

    pub(crate) fn remove(&mut self, index: usize) -> Option<TermEntry> {
        let entry = self.entries.remove_index(index)?;
        if entry.kind.is_hash_consed() {
            self.index.remove(&entry);
        }
        Some(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BOOL_TYPE;

    #[test]
    fn test_predefined_constants() {
        let table = TermTable::new(BOOL_TYPE);
        assert_eq!(table.get(TRUE_TERM).unwrap().kind, TermKind::BoolConst(true));
        assert_eq!(table.get(FALSE_TERM).unwrap().kind, TermKind::BoolConst(false));
    }

    #[test]
    fn test_children_order() {
        let kind = TermKind::Forall(vec![5, 6], 7);
        assert_eq!(kind.children(), vec![5, 6, 7]);
        let kind = TermKind::Application(9, vec![1, 2]);
        assert_eq!(kind.children(), vec![9, 1, 2]);
        assert!(TermKind::ArithConst(BigRational::from_i64(3)).children().is_empty());
    }

    #[test]
    fn test_hash_consing_key_includes_type() {
        let mut table = TermTable::new(BOOL_TYPE);
        let entry = TermEntry {
            kind: TermKind::ScalarConst(0),
            ty: 7,
        };
        let a = table.insert(entry.clone()).unwrap();
        assert_eq!(table.lookup(&entry), Some(a));
        let other = TermEntry {
            kind: TermKind::ScalarConst(0),
            ty: 8,
        };
        assert_eq!(table.lookup(&other), None);
    }
}
