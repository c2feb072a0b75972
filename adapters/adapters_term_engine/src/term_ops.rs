//! Term Constructors, Queries and Substitution
//!
//! Constructors type-check their arguments, apply a few local simplifications
//! and hash-cons the result.
//!
//! The n-ary Boolean operators, `distinct` and the quantifiers use their
//! argument slice as scratch space: on return it has been sorted, and for
//! `and`/`or` duplicates have been moved out of the leading prefix. Callers that
//! must preserve the caller's array pass a copy.

use crate::engine::{invalid_term, EngineResult, TermEngine};
use crate::terms::{TermKind, FALSE_TERM, TRUE_TERM};
use crate::types::{TypeKind, BOOL_TYPE, INT_TYPE, REAL_TYPE};
use entities_data_handling::{ErrorCode, ErrorReport, TermHandle, TypeHandle};
use entities_utilities::BigRational;
use std::collections::HashMap;
use usecases_memory_management::Allocator;

fn type_mismatch(t: TermHandle, expected: TypeHandle) -> ErrorReport {
    ErrorReport::new(ErrorCode::TypeMismatch)
        .with_term(t)
        .with_type(expected)
}

fn pos_int_required(value: i64) -> ErrorReport {
    ErrorReport::new(ErrorCode::PosIntRequired).with_value(value)
}

/// Sort in place and compact distinct values to the front; returns their count
fn sort_unique(args: &mut [TermHandle]) -> usize {
    args.sort_unstable();
    let mut unique = 0;
    for i in 0..args.len() {
        if unique == 0 || args[i] != args[unique - 1] {
            args[unique] = args[i];
            unique += 1;
        }
    }
    unique
}

type Substitution = HashMap<TermHandle, TermHandle>;

impl TermEngine {
    // ------------------------------------------------------------------
    // Checks
    // ------------------------------------------------------------------

    pub fn type_of_term(&self, t: TermHandle) -> EngineResult<TypeHandle> {
        Ok(self.term_entry(t)?.ty)
    }

    pub(crate) fn require_bool(&self, t: TermHandle) -> EngineResult<()> {
        if self.type_of_term(t)? == BOOL_TYPE {
            Ok(())
        } else {
            Err(type_mismatch(t, BOOL_TYPE))
        }
    }

    fn require_variable(&self, t: TermHandle) -> EngineResult<TypeHandle> {
        let entry = self.term_entry(t)?;
        if entry.kind == TermKind::Variable {
            Ok(entry.ty)
        } else {
            Err(ErrorReport::new(ErrorCode::VariableRequired).with_term(t))
        }
    }

    /// Variable types of a binder; rejects empty and repeated variable lists
    fn check_binder(&self, vars: &[TermHandle]) -> EngineResult<Vec<TypeHandle>> {
        if vars.is_empty() {
            return Err(pos_int_required(0));
        }
        let types = vars
            .iter()
            .map(|&v| self.require_variable(v))
            .collect::<EngineResult<Vec<_>>>()?;
        let mut sorted = vars.to_vec();
        sorted.sort_unstable();
        if let Some(pair) = sorted.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(ErrorReport::new(ErrorCode::DuplicateVariable).with_term(pair[0]));
        }
        Ok(types)
    }

    fn is_negation_of(&self, t: TermHandle, other: TermHandle) -> bool {
        matches!(self.terms.get(t), Some(entry) if entry.kind == TermKind::Not(other))
    }

    /// Whether a sorted list holds both some term and its negation
    fn has_complementary_pair(&self, sorted: &[TermHandle]) -> bool {
        sorted.iter().any(|&t| match self.terms.get(t).map(|e| &e.kind) {
            Some(TermKind::Not(inner)) => sorted.binary_search(inner).is_ok(),
            _ => false,
        })
    }

    // ------------------------------------------------------------------
    // Atoms
    // ------------------------------------------------------------------

    pub fn mk_true(&self) -> TermHandle {
        TRUE_TERM
    }

    pub fn mk_false(&self) -> TermHandle {
        FALSE_TERM
    }

    /// Constant of a scalar or uninterpreted type
    ///
    /// For a scalar type the index must be below the cardinality.
    pub fn constant(&mut self, ty: TypeHandle, index: i32) -> EngineResult<TermHandle> {
        let card = match self.type_kind(ty)? {
            TypeKind::Scalar(card) => Some(*card),
            TypeKind::Uninterpreted => None,
            _ => {
                return Err(
                    ErrorReport::new(ErrorCode::ScalarOrUninterpretedRequired).with_type(ty),
                )
            }
        };
        let index = u32::try_from(index)
            .ok()
            .filter(|&i| card.map_or(true, |card| i < card))
            .ok_or_else(|| {
                ErrorReport::new(ErrorCode::InvalidConstantIndex)
                    .with_type(ty)
                    .with_value(i64::from(index))
            })?;
        Ok(self.intern_term(TermKind::ScalarConst(index), ty))
    }

    pub fn new_uninterpreted_term(&mut self, ty: TypeHandle) -> EngineResult<TermHandle> {
        self.type_kind(ty)?;
        Ok(self.intern_term(TermKind::Uninterpreted, ty))
    }

    pub fn new_variable(&mut self, ty: TypeHandle) -> EngineResult<TermHandle> {
        self.type_kind(ty)?;
        Ok(self.intern_term(TermKind::Variable, ty))
    }

    // ------------------------------------------------------------------
    // Boolean structure
    // ------------------------------------------------------------------

    pub fn not(&mut self, t: TermHandle) -> EngineResult<TermHandle> {
        self.require_bool(t)?;
        let simplified = match self.term_kind(t)? {
            TermKind::BoolConst(value) => Some(if *value { FALSE_TERM } else { TRUE_TERM }),
            TermKind::Not(inner) => Some(*inner),
            _ => None,
        };
        Ok(match simplified {
            Some(result) => result,
            None => self.intern_term(TermKind::Not(t), BOOL_TYPE),
        })
    }

    /// Conjunction; `args` is sorted and deduplicated in place
    pub fn and(&mut self, args: &mut [TermHandle]) -> EngineResult<TermHandle> {
        self.junction(args, FALSE_TERM, TRUE_TERM, TermKind::And)
    }

    /// Disjunction; `args` is sorted and deduplicated in place
    pub fn or(&mut self, args: &mut [TermHandle]) -> EngineResult<TermHandle> {
        self.junction(args, TRUE_TERM, FALSE_TERM, TermKind::Or)
    }

    fn junction(
        &mut self,
        args: &mut [TermHandle],
        absorbing: TermHandle,
        neutral: TermHandle,
        build: fn(Vec<TermHandle>) -> TermKind,
    ) -> EngineResult<TermHandle> {
        for &t in args.iter() {
            self.require_bool(t)?;
        }
        let unique = sort_unique(args);
        let args = &args[..unique];
        if args.contains(&absorbing) {
            return Ok(absorbing);
        }
        let rest: Vec<TermHandle> = args.iter().copied().filter(|&t| t != neutral).collect();
        if self.has_complementary_pair(&rest) {
            return Ok(absorbing);
        }
        Ok(match rest.len() {
            0 => neutral,
            1 => rest[0],
            _ => self.intern_term(build(rest), BOOL_TYPE),
        })
    }

    /// Exclusive or; `args` is sorted in place
    pub fn xor(&mut self, args: &mut [TermHandle]) -> EngineResult<TermHandle> {
        for &t in args.iter() {
            self.require_bool(t)?;
        }
        args.sort_unstable();

        let mut negate = false;
        let mut rest = Vec::new();
        let mut i = 0;
        while i < args.len() {
            let t = args[i];
            let run = args[i..].iter().take_while(|&&x| x == t).count();
            if run % 2 == 1 {
                if t == TRUE_TERM {
                    negate = !negate;
                } else if t != FALSE_TERM {
                    rest.push(t);
                }
            }
            i += run;
        }

        let base = match rest.len() {
            0 => FALSE_TERM,
            1 => rest[0],
            _ => self.intern_term(TermKind::Xor(rest), BOOL_TYPE),
        };
        if negate {
            self.not(base)
        } else {
            Ok(base)
        }
    }

    pub fn eq(&mut self, a: TermHandle, b: TermHandle) -> EngineResult<TermHandle> {
        let ta = self.type_of_term(a)?;
        let tb = self.type_of_term(b)?;
        if !self.are_compatible(ta, tb) {
            return Err(ErrorReport::new(ErrorCode::IncompatibleTypes)
                .with_term(b)
                .with_type(ta));
        }
        if a == b {
            return Ok(TRUE_TERM);
        }
        let both_constant = self.term_kind(a)?.is_constant() && self.term_kind(b)?.is_constant();
        if both_constant {
            return Ok(FALSE_TERM);
        }
        if self.is_negation_of(a, b) || self.is_negation_of(b, a) {
            return Ok(FALSE_TERM);
        }
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        Ok(self.intern_term(TermKind::Eq(lo, hi), BOOL_TYPE))
    }

    pub fn ite(
        &mut self,
        cond: TermHandle,
        then_term: TermHandle,
        else_term: TermHandle,
    ) -> EngineResult<TermHandle> {
        self.require_bool(cond)?;
        let tt = self.type_of_term(then_term)?;
        let te = self.type_of_term(else_term)?;
        let ty = self.super_type(tt, te).ok_or_else(|| {
            ErrorReport::new(ErrorCode::IncompatibleTypes)
                .with_term(else_term)
                .with_type(tt)
        })?;
        if cond == TRUE_TERM || then_term == else_term {
            return Ok(then_term);
        }
        if cond == FALSE_TERM {
            return Ok(else_term);
        }
        Ok(self.intern_term(TermKind::Ite(cond, then_term, else_term), ty))
    }

    /// Pairwise distinctness; `args` is sorted in place
    pub fn distinct(&mut self, args: &mut [TermHandle]) -> EngineResult<TermHandle> {
        let first = *args.first().ok_or_else(|| pos_int_required(0))?;
        let mut common = self.type_of_term(first)?;
        for &t in args.iter() {
            let ty = self.type_of_term(t)?;
            common = self.super_type(common, ty).ok_or_else(|| {
                ErrorReport::new(ErrorCode::IncompatibleTypes)
                    .with_term(t)
                    .with_type(common)
            })?;
        }
        if args.len() == 1 {
            return Ok(TRUE_TERM);
        }
        args.sort_unstable();
        if args.windows(2).any(|pair| pair[0] == pair[1]) {
            return Ok(FALSE_TERM);
        }
        Ok(self.intern_term(TermKind::Distinct(args.to_vec()), BOOL_TYPE))
    }

    // ------------------------------------------------------------------
    // Binders
    // ------------------------------------------------------------------

    /// Universal quantification; `vars` is sorted in place
    pub fn forall(&mut self, vars: &mut [TermHandle], body: TermHandle) -> EngineResult<TermHandle> {
        self.quantifier(vars, body, TermKind::Forall)
    }

    /// Existential quantification; `vars` is sorted in place
    pub fn exists(&mut self, vars: &mut [TermHandle], body: TermHandle) -> EngineResult<TermHandle> {
        self.quantifier(vars, body, TermKind::Exists)
    }

    fn quantifier(
        &mut self,
        vars: &mut [TermHandle],
        body: TermHandle,
        build: fn(Vec<TermHandle>, TermHandle) -> TermKind,
    ) -> EngineResult<TermHandle> {
        self.check_binder(vars)?;
        self.require_bool(body)?;
        vars.sort_unstable();
        if matches!(self.term_kind(body)?, TermKind::BoolConst(_)) {
            return Ok(body);
        }
        Ok(self.intern_term(build(vars.to_vec(), body), BOOL_TYPE))
    }

    pub fn lambda(&mut self, vars: &[TermHandle], body: TermHandle) -> EngineResult<TermHandle> {
        let domain = self.check_binder(vars)?;
        let range = self.type_of_term(body)?;
        let ty = self.intern_type(TypeKind::Function(domain, range));
        Ok(self.intern_term(TermKind::Lambda(vars.to_vec(), body), ty))
    }

    // ------------------------------------------------------------------
    // Tuples and functions
    // ------------------------------------------------------------------

    pub fn tuple(&mut self, args: &[TermHandle]) -> EngineResult<TermHandle> {
        if args.is_empty() {
            return Err(pos_int_required(0));
        }
        let types = args
            .iter()
            .map(|&t| self.type_of_term(t))
            .collect::<EngineResult<Vec<_>>>()?;
        let ty = self.intern_type(TypeKind::Tuple(types));
        Ok(self.intern_term(TermKind::Tuple(args.to_vec()), ty))
    }

    /// Component `index` (one-based) of a tuple
    pub fn select(&mut self, index: i32, t: TermHandle) -> EngineResult<TermHandle> {
        let ty = self.type_of_term(t)?;
        let components = match self.type_kind(ty)? {
            TypeKind::Tuple(components) => components.clone(),
            _ => return Err(ErrorReport::new(ErrorCode::TupleRequired).with_term(t)),
        };
        let position = usize::try_from(index)
            .ok()
            .filter(|&i| i >= 1 && i <= components.len())
            .ok_or_else(|| {
                ErrorReport::new(ErrorCode::InvalidTupleIndex)
                    .with_term(t)
                    .with_value(i64::from(index))
            })?;
        if let TermKind::Tuple(args) = self.term_kind(t)? {
            return Ok(args[position - 1]);
        }
        Ok(self.intern_term(
            TermKind::Select(index.unsigned_abs(), t),
            components[position - 1],
        ))
    }

    /// Apply a function; applying a lambda substitutes its body
    pub fn application(&mut self, f: TermHandle, args: &[TermHandle]) -> EngineResult<TermHandle> {
        let fty = self.type_of_term(f)?;
        let (domain, range) = match self.type_kind(fty)? {
            TypeKind::Function(domain, range) => (domain.clone(), *range),
            _ => return Err(ErrorReport::new(ErrorCode::FunctionRequired).with_term(f)),
        };
        if args.len() != domain.len() {
            return Err(ErrorReport::new(ErrorCode::WrongNumberOfArguments)
                .with_term(f)
                .with_value(args.len() as i64));
        }
        for (&arg, &expected) in args.iter().zip(&domain) {
            let actual = self.type_of_term(arg)?;
            if !self.is_subtype(actual, expected) {
                return Err(type_mismatch(arg, expected));
            }
        }
        if let TermKind::Lambda(vars, body) = self.term_kind(f)?.clone() {
            return self.subst_term(&vars, args, body);
        }
        Ok(self.intern_term(TermKind::Application(f, args.to_vec()), range))
    }

    // ------------------------------------------------------------------
    // Arithmetic constants
    // ------------------------------------------------------------------

    /// Integer constants get the integer type, all others the real type
    pub fn arith_constant(&mut self, value: BigRational) -> TermHandle {
        let ty = if value.is_integer() { INT_TYPE } else { REAL_TYPE };
        self.intern_term(TermKind::ArithConst(value), ty)
    }

    pub fn int_constant(&mut self, value: i64) -> TermHandle {
        self.arith_constant(BigRational::from_i64(value))
    }

    pub fn rational_constant(&mut self, num: i64, den: i64) -> EngineResult<TermHandle> {
        let value = BigRational::from_fraction(num, den)
            .ok_or_else(|| ErrorReport::new(ErrorCode::DivisionByZero))?;
        Ok(self.arith_constant(value))
    }

    pub fn rational_const_value(&self, t: TermHandle) -> EngineResult<BigRational> {
        match self.term_kind(t)? {
            TermKind::ArithConst(value) => Ok(value.clone()),
            _ => Err(ErrorReport::new(ErrorCode::ArithConstantRequired).with_term(t)),
        }
    }

    // ------------------------------------------------------------------
    // Bit-vectors
    // ------------------------------------------------------------------

    /// Bit-vector constant of the given width from the low bits of `value`
    pub fn bv_constant_u64(&mut self, width: i32, value: u64) -> EngineResult<TermHandle> {
        let width = u32::try_from(width)
            .ok()
            .filter(|&w| w > 0)
            .ok_or_else(|| pos_int_required(i64::from(width)))?;
        let ty = self.intern_type(TypeKind::BitVector(width));
        let scratch = width as usize;
        self.allocator.charge(scratch);
        let bits: Vec<bool> = (0..width).map(|i| i < 64 && (value >> i) & 1 == 1).collect();
        self.allocator.credit(scratch);
        Ok(self.intern_term(TermKind::BvConst(bits), ty))
    }

    /// Bit-vector whose bit `i` is the Boolean term `args[i]`
    pub fn bv_from_bool_array(&mut self, args: &[TermHandle]) -> EngineResult<TermHandle> {
        if args.is_empty() {
            return Err(pos_int_required(0));
        }
        for &t in args {
            self.require_bool(t)?;
        }
        let width = u32::try_from(args.len()).map_err(|_| pos_int_required(-1))?;
        let ty = self.intern_type(TypeKind::BitVector(width));
        let constant = args.iter().all(|&t| t == TRUE_TERM || t == FALSE_TERM);
        let kind = if constant {
            TermKind::BvConst(args.iter().map(|&t| t == TRUE_TERM).collect())
        } else {
            TermKind::BvArray(args.to_vec())
        };
        Ok(self.intern_term(kind, ty))
    }

    /// Bits of a bit-vector constant, least significant first
    pub fn bv_const_value(&self, t: TermHandle) -> EngineResult<Vec<bool>> {
        self.bv_const_bits(t).map(<[bool]>::to_vec)
    }

    /// Borrowed bits of a bit-vector constant
    pub fn bv_const_bits(&self, t: TermHandle) -> EngineResult<&[bool]> {
        match self.term_kind(t)? {
            TermKind::BvConst(bits) => Ok(bits),
            _ => Err(ErrorReport::new(ErrorCode::BitvectorConstantRequired).with_term(t)),
        }
    }

    /// Width of a bit-vector term
    pub fn term_bitsize(&self, t: TermHandle) -> EngineResult<u32> {
        let ty = self.type_of_term(t)?;
        self.bv_type_size(ty).map_err(|_| type_mismatch(t, ty))
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn term_is_bool(&self, t: TermHandle) -> bool {
        self.type_of_term(t).map_or(false, |ty| self.type_is_bool(ty))
    }

    pub fn term_is_function(&self, t: TermHandle) -> bool {
        self.type_of_term(t).map_or(false, |ty| self.type_is_function(ty))
    }

    pub fn scalar_constant_index(&self, t: TermHandle) -> EngineResult<u32> {
        match self.term_kind(t)? {
            TermKind::ScalarConst(index) => Ok(*index),
            _ => Err(ErrorReport::new(ErrorCode::ConstantRequired).with_term(t)),
        }
    }

    pub fn term_num_children(&self, t: TermHandle) -> EngineResult<usize> {
        Ok(self.term_kind(t)?.children().len())
    }

    pub fn term_child(&self, t: TermHandle, index: i32) -> EngineResult<TermHandle> {
        let children = self.term_kind(t)?.children();
        usize::try_from(index)
            .ok()
            .and_then(|i| children.get(i).copied())
            .ok_or_else(|| invalid_term(t).with_value(i64::from(index)))
    }

    // ------------------------------------------------------------------
    // Substitution
    // ------------------------------------------------------------------

    fn check_substitution(
        &self,
        vars: &[TermHandle],
        vals: &[TermHandle],
    ) -> EngineResult<Substitution> {
        if vars.len() != vals.len() {
            return Err(ErrorReport::new(ErrorCode::WrongNumberOfArguments)
                .with_value(vals.len() as i64));
        }
        let mut map = Substitution::with_capacity(vars.len());
        for (&var, &val) in vars.iter().zip(vals) {
            let entry = self.term_entry(var)?;
            if !matches!(entry.kind, TermKind::Variable | TermKind::Uninterpreted) {
                return Err(ErrorReport::new(ErrorCode::VariableRequired).with_term(var));
            }
            let expected = entry.ty;
            if !self.is_subtype(self.type_of_term(val)?, expected) {
                return Err(type_mismatch(val, expected));
            }
            map.insert(var, val);
        }
        Ok(map)
    }

    /// Replace every free occurrence of `vars[i]` in `t` by `vals[i]`
    pub fn subst_term(
        &mut self,
        vars: &[TermHandle],
        vals: &[TermHandle],
        t: TermHandle,
    ) -> EngineResult<TermHandle> {
        let map = self.check_substitution(vars, vals)?;
        self.term_entry(t)?;
        self.substitute(t, &map, &mut HashMap::new())
    }

    /// Apply one substitution to every term of `terms`
    ///
    /// `terms` is overwritten only if every substitution succeeds.
    pub fn subst_term_array(
        &mut self,
        vars: &[TermHandle],
        vals: &[TermHandle],
        terms: &mut [TermHandle],
    ) -> EngineResult<()> {
        let map = self.check_substitution(vars, vals)?;
        for &t in terms.iter() {
            self.term_entry(t)?;
        }
        let mut cache = HashMap::new();
        let results = terms
            .iter()
            .map(|&t| self.substitute(t, &map, &mut cache))
            .collect::<EngineResult<Vec<_>>>()?;
        terms.copy_from_slice(&results);
        Ok(())
    }

    fn substitute_all(
        &mut self,
        terms: &[TermHandle],
        map: &Substitution,
        cache: &mut Substitution,
    ) -> EngineResult<Vec<TermHandle>> {
        terms
            .iter()
            .map(|&t| self.substitute(t, map, cache))
            .collect()
    }

    fn substitute_under_binder(
        &mut self,
        bound: &[TermHandle],
        body: TermHandle,
        map: &Substitution,
        cache: &mut Substitution,
    ) -> EngineResult<TermHandle> {
        if !bound.iter().any(|v| map.contains_key(v)) {
            return self.substitute(body, map, cache);
        }
        let inner: Substitution = map
            .iter()
            .filter(|(var, _)| !bound.contains(var))
            .map(|(&var, &val)| (var, val))
            .collect();
        self.substitute(body, &inner, &mut HashMap::new())
    }

    fn substitute(
        &mut self,
        t: TermHandle,
        map: &Substitution,
        cache: &mut Substitution,
    ) -> EngineResult<TermHandle> {
        if let Some(&val) = map.get(&t) {
            return Ok(val);
        }
        if let Some(&done) = cache.get(&t) {
            return Ok(done);
        }

        let result = match self.term_kind(t)?.clone() {
            TermKind::BoolConst(_)
            | TermKind::ArithConst(_)
            | TermKind::BvConst(_)
            | TermKind::ScalarConst(_)
            | TermKind::Uninterpreted
            | TermKind::Variable => t,
            TermKind::Not(a) => {
                let a = self.substitute(a, map, cache)?;
                self.not(a)?
            }
            TermKind::And(args) => {
                let mut args = self.substitute_all(&args, map, cache)?;
                self.and(&mut args)?
            }
            TermKind::Or(args) => {
                let mut args = self.substitute_all(&args, map, cache)?;
                self.or(&mut args)?
            }
            TermKind::Xor(args) => {
                let mut args = self.substitute_all(&args, map, cache)?;
                self.xor(&mut args)?
            }
            TermKind::Distinct(args) => {
                let mut args = self.substitute_all(&args, map, cache)?;
                self.distinct(&mut args)?
            }
            TermKind::Eq(a, b) => {
                let a = self.substitute(a, map, cache)?;
                let b = self.substitute(b, map, cache)?;
                self.eq(a, b)?
            }
            TermKind::Ite(c, a, b) => {
                let c = self.substitute(c, map, cache)?;
                let a = self.substitute(a, map, cache)?;
                let b = self.substitute(b, map, cache)?;
                self.ite(c, a, b)?
            }
            TermKind::Forall(mut vars, body) => {
                let body = self.substitute_under_binder(&vars, body, map, cache)?;
                self.forall(&mut vars, body)?
            }
            TermKind::Exists(mut vars, body) => {
                let body = self.substitute_under_binder(&vars, body, map, cache)?;
                self.exists(&mut vars, body)?
            }
            TermKind::Lambda(vars, body) => {
                let body = self.substitute_under_binder(&vars, body, map, cache)?;
                self.lambda(&vars, body)?
            }
            TermKind::Tuple(args) => {
                let args = self.substitute_all(&args, map, cache)?;
                self.tuple(&args)?
            }
            TermKind::Select(index, a) => {
                let a = self.substitute(a, map, cache)?;
                let index = i32::try_from(index).map_err(|_| invalid_term(t))?;
                self.select(index, a)?
            }
            TermKind::Application(f, args) => {
                let f = self.substitute(f, map, cache)?;
                let args = self.substitute_all(&args, map, cache)?;
                self.application(f, &args)?
            }
            TermKind::BvArray(args) => {
                let args = self.substitute_all(&args, map, cache)?;
                self.bv_from_bool_array(&args)?
            }
        };
        cache.insert(t, result);
        Ok(result)
    }
}
