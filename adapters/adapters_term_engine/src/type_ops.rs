//! Type Constructors and Queries

use crate::engine::{invalid_type, EngineResult, TermEngine};
use crate::types::{TypeKind, BOOL_TYPE, INT_TYPE, REAL_TYPE};
use entities_data_handling::{ErrorCode, ErrorReport, TypeHandle};

fn positive(value: i32) -> EngineResult<u32> {
    u32::try_from(value)
        .ok()
        .filter(|&v| v > 0)
        .ok_or_else(|| ErrorReport::new(ErrorCode::PosIntRequired).with_value(i64::from(value)))
}

impl TermEngine {
    pub fn bool_type(&self) -> TypeHandle {
        BOOL_TYPE
    }

    pub fn int_type(&self) -> TypeHandle {
        INT_TYPE
    }

    pub fn real_type(&self) -> TypeHandle {
        REAL_TYPE
    }

    /// Bit-vector type of the given width
    pub fn bv_type(&mut self, width: i32) -> EngineResult<TypeHandle> {
        let width = positive(width)?;
        Ok(self.intern_type(TypeKind::BitVector(width)))
    }

    /// Fresh scalar type with `card` elements
    pub fn new_scalar_type(&mut self, card: i32) -> EngineResult<TypeHandle> {
        let card = positive(card)?;
        Ok(self.intern_type(TypeKind::Scalar(card)))
    }

    pub fn new_uninterpreted_type(&mut self) -> TypeHandle {
        self.intern_type(TypeKind::Uninterpreted)
    }

    fn check_types(&self, types: &[TypeHandle]) -> EngineResult<()> {
        types.iter().try_for_each(|&ty| self.type_kind(ty).map(|_| ()))
    }

    pub fn tuple_type(&mut self, components: &[TypeHandle]) -> EngineResult<TypeHandle> {
        if components.is_empty() {
            return Err(ErrorReport::new(ErrorCode::PosIntRequired).with_value(0));
        }
        self.check_types(components)?;
        Ok(self.intern_type(TypeKind::Tuple(components.to_vec())))
    }

    pub fn function_type(
        &mut self,
        domain: &[TypeHandle],
        range: TypeHandle,
    ) -> EngineResult<TypeHandle> {
        if domain.is_empty() {
            return Err(ErrorReport::new(ErrorCode::PosIntRequired).with_value(0));
        }
        self.check_types(domain)?;
        self.type_kind(range)?;
        Ok(self.intern_type(TypeKind::Function(domain.to_vec(), range)))
    }

    fn type_matches(&self, ty: TypeHandle, test: impl Fn(&TypeKind) -> bool) -> bool {
        self.types.get(ty).map_or(false, test)
    }

    pub fn type_is_bool(&self, ty: TypeHandle) -> bool {
        self.type_matches(ty, |k| *k == TypeKind::Bool)
    }

    pub fn type_is_int(&self, ty: TypeHandle) -> bool {
        self.type_matches(ty, |k| *k == TypeKind::Int)
    }

    pub fn type_is_real(&self, ty: TypeHandle) -> bool {
        self.type_matches(ty, |k| *k == TypeKind::Real)
    }

    pub fn type_is_arithmetic(&self, ty: TypeHandle) -> bool {
        self.type_matches(ty, |k| matches!(k, TypeKind::Int | TypeKind::Real))
    }

    pub fn type_is_scalar(&self, ty: TypeHandle) -> bool {
        self.type_matches(ty, |k| matches!(k, TypeKind::Scalar(_)))
    }

    pub fn type_is_function(&self, ty: TypeHandle) -> bool {
        self.type_matches(ty, |k| matches!(k, TypeKind::Function(..)))
    }

    /// `sub` is `sup` or an integer type used where a real is expected
    pub fn is_subtype(&self, sub: TypeHandle, sup: TypeHandle) -> bool {
        sub == sup || (self.type_is_int(sub) && self.type_is_real(sup))
    }

    /// Whether terms of the two types may be compared
    pub fn are_compatible(&self, a: TypeHandle, b: TypeHandle) -> bool {
        self.is_subtype(a, b) || self.is_subtype(b, a)
    }

    /// Smallest common supertype
    pub(crate) fn super_type(&self, a: TypeHandle, b: TypeHandle) -> Option<TypeHandle> {
        if self.is_subtype(a, b) {
            Some(b)
        } else if self.is_subtype(b, a) {
            Some(a)
        } else {
            None
        }
    }

    pub fn bv_type_size(&self, ty: TypeHandle) -> EngineResult<u32> {
        match self.type_kind(ty)? {
            TypeKind::BitVector(width) => Ok(*width),
            _ => Err(ErrorReport::new(ErrorCode::TypeMismatch).with_type(ty)),
        }
    }

    pub fn scalar_type_card(&self, ty: TypeHandle) -> EngineResult<u32> {
        match self.type_kind(ty)? {
            TypeKind::Scalar(card) => Ok(*card),
            _ => Err(ErrorReport::new(ErrorCode::TypeMismatch).with_type(ty)),
        }
    }

    pub fn type_num_children(&self, ty: TypeHandle) -> EngineResult<usize> {
        Ok(self.type_kind(ty)?.children().len())
    }

    pub fn type_children(&self, ty: TypeHandle) -> EngineResult<Vec<TypeHandle>> {
        Ok(self.type_kind(ty)?.children())
    }

    pub fn type_child(&self, ty: TypeHandle, index: i32) -> EngineResult<TypeHandle> {
        let children = self.type_kind(ty)?.children();
        usize::try_from(index)
            .ok()
            .and_then(|i| children.get(i).copied())
            .ok_or_else(|| invalid_type(ty).with_value(i64::from(index)))
    }
}
