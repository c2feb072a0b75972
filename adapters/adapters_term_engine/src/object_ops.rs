//! Native Object Operations
//!
//! Configurations, contexts, parameter records and models. Every object is
//! charged against the engine allocator when created or grown and credited
//! when it shrinks or is freed.

use crate::engine::{EngineResult, TermEngine};
use crate::objects::{
    Config, Context, ContextStatus, Model, NativeObject, ParamRecord, ASSERTION_BYTES,
    LEVEL_BYTES,
};
use crate::terms::{TermKind, FALSE_TERM};
use entities_data_handling::{ErrorCode, ErrorReport, NativeAddress, TermHandle};
use entities_utilities::{BigNumber, BigRational};
use std::collections::HashMap;
use usecases_memory_management::Allocator;

fn invalid_object(address: NativeAddress) -> ErrorReport {
    let raw = i64::try_from(address.raw()).unwrap_or(i64::MAX);
    ErrorReport::new(ErrorCode::InvalidNativeObject).with_value(raw)
}

macro_rules! object_accessor {
    ($name:ident, $variant:ident, $ty:ty) => {
        fn $name(&mut self, address: NativeAddress) -> EngineResult<&mut $ty> {
            match self.objects.get_mut(address) {
                Some(NativeObject::$variant(object)) => Ok(object),
                _ => Err(invalid_object(address)),
            }
        }
    };
}

impl TermEngine {
    fn store_object(&mut self, object: NativeObject) -> NativeAddress {
        self.allocator.charge(object.footprint());
        self.objects.insert(object)
    }

    /// Remove an object of the kind accepted by `is_kind`
    fn free_object(
        &mut self,
        address: NativeAddress,
        is_kind: fn(&NativeObject) -> bool,
    ) -> EngineResult<()> {
        match self.objects.get(address) {
            Some(object) if is_kind(object) => {}
            _ => return Err(invalid_object(address)),
        }
        if let Some(object) = self.objects.remove(address) {
            self.allocator.credit(object.footprint());
        }
        Ok(())
    }

    object_accessor!(config_mut, Config, Config);
    object_accessor!(context_mut, Context, Context);
    object_accessor!(params_mut, Params, ParamRecord);

    fn model(&self, address: NativeAddress) -> EngineResult<&Model> {
        match self.objects.get(address) {
            Some(NativeObject::Model(model)) => Ok(model),
            _ => Err(invalid_object(address)),
        }
    }

    /// Live native objects of every kind
    pub fn num_native_objects(&self) -> usize {
        self.objects.len()
    }

    // ------------------------------------------------------------------
    // Configurations
    // ------------------------------------------------------------------

    pub fn new_config(&mut self) -> NativeAddress {
        self.store_object(NativeObject::Config(Config::default()))
    }

    pub fn set_config(&mut self, address: NativeAddress, name: &str, value: &str) -> EngineResult<()> {
        let bytes = name.len() + value.len();
        let replaced = self.config_mut(address)?.settings.entry_bytes(name);
        self.allocator.charge(bytes);
        let result = self.config_mut(address)?.set(name, value);
        self.allocator.credit(if result.is_ok() { replaced } else { bytes });
        result
    }

    pub fn free_config(&mut self, address: NativeAddress) -> EngineResult<()> {
        self.free_object(address, |o| matches!(o, NativeObject::Config(_)))
    }

    // ------------------------------------------------------------------
    // Contexts
    // ------------------------------------------------------------------

    /// New context configured by `config`, or with defaults for a null address
    pub fn new_context(&mut self, config: NativeAddress) -> EngineResult<NativeAddress> {
        let context = if config.is_null() {
            Context::new(&Config::default())
        } else {
            Context::new(self.config_mut(config)?)
        };
        Ok(self.store_object(NativeObject::Context(context)))
    }

    pub fn free_context(&mut self, address: NativeAddress) -> EngineResult<()> {
        self.free_object(address, |o| matches!(o, NativeObject::Context(_)))
    }

    pub fn context_status(&mut self, address: NativeAddress) -> EngineResult<ContextStatus> {
        Ok(self.context_mut(address)?.status())
    }

    pub fn assert_formula(&mut self, address: NativeAddress, formula: TermHandle) -> EngineResult<()> {
        self.assert_formulas(address, &[formula])
    }

    /// Add Boolean formulas at the current level of the context
    pub fn assert_formulas(
        &mut self,
        address: NativeAddress,
        formulas: &[TermHandle],
    ) -> EngineResult<()> {
        self.context_mut(address)?;
        for &f in formulas {
            self.require_bool(f)?;
        }
        self.allocator.charge(formulas.len() * ASSERTION_BYTES);
        let trivially_false = formulas.contains(&FALSE_TERM);
        self.context_mut(address)?.assert_all(formulas, trivially_false);
        Ok(())
    }

    pub fn push(&mut self, address: NativeAddress) -> EngineResult<()> {
        if !self.context_mut(address)?.supports_push() {
            return Err(ErrorReport::new(ErrorCode::InvalidContextOperation));
        }
        self.allocator.charge(LEVEL_BYTES);
        self.context_mut(address)?.push();
        Ok(())
    }

    /// Drop the innermost level and the assertions made in it
    pub fn pop(&mut self, address: NativeAddress) -> EngineResult<()> {
        let context = self.context_mut(address)?;
        if !context.supports_push() {
            return Err(ErrorReport::new(ErrorCode::InvalidContextOperation));
        }
        let before = context.assertions().count();
        context.pop()?;
        let dropped = before - context.assertions().count();
        self.allocator
            .credit(LEVEL_BYTES + dropped * ASSERTION_BYTES);
        Ok(())
    }

    /// Interrupt a running search; a no-op for unknown addresses
    pub fn stop_search(&mut self, address: NativeAddress) {
        if let Ok(context) = self.context_mut(address) {
            context.stop_search();
        }
    }

    // ------------------------------------------------------------------
    // Parameter records
    // ------------------------------------------------------------------

    pub fn new_param_record(&mut self) -> NativeAddress {
        self.store_object(NativeObject::Params(ParamRecord::default()))
    }

    pub fn set_param(&mut self, address: NativeAddress, name: &str, value: &str) -> EngineResult<()> {
        let bytes = name.len() + value.len();
        let replaced = self.params_mut(address)?.settings.entry_bytes(name);
        self.allocator.charge(bytes);
        let result = self.params_mut(address)?.set(name, value);
        self.allocator.credit(if result.is_ok() { replaced } else { bytes });
        result
    }

    pub fn free_param_record(&mut self, address: NativeAddress) -> EngineResult<()> {
        self.free_object(address, |o| matches!(o, NativeObject::Params(_)))
    }

    // ------------------------------------------------------------------
    // Models
    // ------------------------------------------------------------------

    /// Model assigning `vals[i]` to the uninterpreted term `vars[i]`
    ///
    /// Values must be constants whose type is a subtype of the term's type.
    pub fn model_from_map(
        &mut self,
        vars: &[TermHandle],
        vals: &[TermHandle],
    ) -> EngineResult<NativeAddress> {
        if vars.len() != vals.len() {
            return Err(ErrorReport::new(ErrorCode::WrongNumberOfArguments)
                .with_value(vals.len() as i64));
        }
        let mut assignment = HashMap::with_capacity(vars.len());
        for (&var, &val) in vars.iter().zip(vals) {
            let entry = self.term_entry(var)?;
            if entry.kind != TermKind::Uninterpreted {
                return Err(ErrorReport::new(ErrorCode::VariableRequired).with_term(var));
            }
            let expected = entry.ty;
            let value = self.term_entry(val)?;
            if !value.kind.is_constant() {
                return Err(ErrorReport::new(ErrorCode::ConstantRequired).with_term(val));
            }
            if !self.is_subtype(value.ty, expected) {
                return Err(ErrorReport::new(ErrorCode::TypeMismatch)
                    .with_term(val)
                    .with_type(expected));
            }
            if assignment.insert(var, val).is_some() {
                return Err(ErrorReport::new(ErrorCode::DuplicateVariable).with_term(var));
            }
        }
        Ok(self.store_object(NativeObject::Model(Model { assignment })))
    }

    pub fn free_model(&mut self, address: NativeAddress) -> EngineResult<()> {
        self.free_object(address, |o| matches!(o, NativeObject::Model(_)))
    }

    pub fn get_bool_value(&self, model: NativeAddress, t: TermHandle) -> EngineResult<bool> {
        self.eval_bool(self.model(model)?, t)
    }

    /// Integer value of `t`; a non-integral value is a conversion failure
    pub fn get_integer_value(&self, model: NativeAddress, t: TermHandle) -> EngineResult<BigNumber> {
        let value = self.get_rational_value(model, t)?;
        if !value.is_integer() {
            return Err(ErrorReport::new(ErrorCode::EvalConversionFailed).with_term(t));
        }
        Ok(value.numerator())
    }

    pub fn get_rational_value(&self, model: NativeAddress, t: TermHandle) -> EngineResult<BigRational> {
        self.eval_rational(self.model(model)?, t)
    }

    /// Bits of a bit-vector value, least significant first
    pub fn get_bv_value(&self, model: NativeAddress, t: TermHandle) -> EngineResult<Vec<bool>> {
        self.eval_bv(self.model(model)?, t)
    }
}
