//! Type Table
//!
//! Types are hash-consed: building a bit-vector, tuple or function type twice
//! yields the same handle. Scalar and uninterpreted types are fresh on every
//! call. The first three slots hold the predefined `bool`, `int` and `real`
//! types, which are never reclaimed.

use crate::table::Table;
use entities_data_handling::{Handle, TypeHandle};
use std::collections::HashMap;

/// Handle of the predefined Boolean type
pub const BOOL_TYPE: TypeHandle = 0;
/// Handle of the predefined integer type
pub const INT_TYPE: TypeHandle = 1;
/// Handle of the predefined real type
pub const REAL_TYPE: TypeHandle = 2;

pub(crate) const PREDEFINED_TYPES: usize = 3;

/// Structure of a type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Bool,
    Int,
    Real,
    /// Bit-vectors of the given width
    BitVector(u32),
    /// Finite type with the given cardinality
    Scalar(u32),
    Uninterpreted,
    Tuple(Vec<TypeHandle>),
    /// Domain and range
    Function(Vec<TypeHandle>, TypeHandle),
}

impl TypeKind {
    /// Whether two calls with the same structure must return the same handle
    pub fn is_hash_consed(&self) -> bool {
        !matches!(self, TypeKind::Scalar(_) | TypeKind::Uninterpreted)
    }

    /// Component types, in order
    pub fn children(&self) -> Vec<TypeHandle> {
        match self {
            TypeKind::Tuple(components) => components.clone(),
            TypeKind::Function(domain, range) => {
                let mut children = domain.clone();
                children.push(*range);
                children
            }
            _ => Vec::new(),
        }
    }

    pub(crate) fn footprint(&self) -> usize {
        const ENTRY_BYTES: usize = 32;
        let children = match self {
            TypeKind::Tuple(components) => components.len(),
            TypeKind::Function(domain, _) => domain.len() + 1,
            _ => 0,
        };
        ENTRY_BYTES + children * std::mem::size_of::<Handle>()
    }
}

#[derive(Debug)]
pub(crate) struct TypeTable {
    pub(crate) entries: Table<TypeKind>,
    index: HashMap<TypeKind, TypeHandle>,
}

impl TypeTable {
    pub(crate) fn new() -> Self {
        let mut table = Self {
            entries: Table::new(),
            index: HashMap::new(),
        };
        for kind in [TypeKind::Bool, TypeKind::Int, TypeKind::Real] {
            table.insert(kind);
        }
        table
    }

    pub(crate) fn get(&self, ty: TypeHandle) -> Option<&TypeKind> {
        self.entries.get(ty)
    }

    pub(crate) fn lookup(&self, kind: &TypeKind) -> Option<TypeHandle> {
        self.index.get(kind).copied()
    }

    /// Store a type the caller has already charged for
    pub(crate) fn insert(&mut self, kind: TypeKind) -> Option<TypeHandle> {
        let key = kind.is_hash_consed().then(|| kind.clone());
        let handle = self.entries.insert(kind)?;
        if let Some(key) = key {
            self.index.insert(key, handle);
        }
        Some(handle)
    }

    /// Free a slot and drop its hash-consing entry
    pub(crate) fn remove(&mut self, index: usize) -> Option<TypeKind> {
        let kind = self.entries.remove_index(index)?;
        if kind.is_hash_consed() {
            self.index.remove(&kind);
        }
        Some(kind)
    }
}
