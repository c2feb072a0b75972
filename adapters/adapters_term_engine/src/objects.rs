//! Native Objects
//!
//! Configurations, contexts, parameter records and models are addressed by a
//! [`NativeAddress`] instead of a handle. The registry hands out non-zero
//! addresses that are never reused within one engine lifetime, so a stale
//! address is detected instead of silently naming a newer object.
//!
//! Contexts and models keep the terms they were given alive: they contribute
//! those terms as roots to every collection.

use entities_data_handling::{ErrorCode, ErrorReport, NativeAddress, TermHandle};
use std::collections::HashMap;

/// Status of a context, with the numeric codes reported to the managed side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextStatus {
    Idle,
    Searching,
    Unknown,
    Sat,
    Unsat,
    Interrupted,
    Error,
}

impl ContextStatus {
    pub fn code(self) -> i32 {
        match self {
            ContextStatus::Idle => 0,
            ContextStatus::Searching => 1,
            ContextStatus::Unknown => 2,
            ContextStatus::Sat => 3,
            ContextStatus::Unsat => 4,
            ContextStatus::Interrupted => 5,
            ContextStatus::Error => 6,
        }
    }
}

type Validator = fn(&str) -> bool;

fn one_of(allowed: &'static [&'static str]) -> impl Fn(&str) -> bool {
    move |value| allowed.contains(&value)
}

fn is_unit_interval(value: &str) -> bool {
    value.parse::<f64>().map_or(false, |x| (0.0..=1.0).contains(&x))
}

fn is_at_least_one(value: &str) -> bool {
    value.parse::<f64>().map_or(false, |x| x >= 1.0)
}

fn is_u32(value: &str) -> bool {
    value.parse::<u32>().is_ok()
}

/// Settings of a string-keyed record with per-key validation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    values: HashMap<String, String>,
}

impl Settings {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Bytes held by the setting `name`, 0 when unset
    pub(crate) fn entry_bytes(&self, name: &str) -> usize {
        self.values.get(name).map_or(0, |value| name.len() + value.len())
    }

    /// Bytes held by every setting
    pub(crate) fn footprint(&self) -> usize {
        self.values.iter().map(|(name, value)| name.len() + value.len()).sum()
    }

    fn set(
        &mut self,
        name: &str,
        value: &str,
        accepts: impl Fn(&str, &str) -> Option<bool>,
    ) -> Result<(), ErrorReport> {
        match accepts(name, value) {
            None => Err(ErrorReport::new(ErrorCode::UnknownParameter)),
            Some(false) => Err(ErrorReport::new(ErrorCode::InvalidParameterValue)),
            Some(true) => {
                self.values.insert(name.to_string(), value.to_string());
                Ok(())
            }
        }
    }
}

const MODES: &[&str] = &["one-shot", "multi-checks", "push-pop", "interactive"];

fn config_accepts(name: &str, value: &str) -> Option<bool> {
    match name {
        "mode" => Some(one_of(MODES)(value)),
        "solver-type" => Some(one_of(&["dpllt", "mcsat"])(value)),
        "arith-solver" => Some(one_of(&["simplex", "floyd-warshall", "auto"])(value)),
        "uf-solver" => Some(one_of(&["default", "none"])(value)),
        _ => None,
    }
}

fn param_accepts(name: &str, value: &str) -> Option<bool> {
    let validator: Validator = match name {
        "branching" => {
            return Some(one_of(&["default", "negative", "positive", "theory", "th-neg", "th-pos"])(value))
        }
        "randomness" | "var-decay" | "clause-decay" => is_unit_interval,
        "restart-factor" | "c-factor" | "d-factor" => is_at_least_one,
        "random-seed" | "c-threshold" | "d-threshold" => is_u32,
        _ => return None,
    };
    Some(validator(value))
}

/// Context configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub settings: Settings,
}

impl Config {
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), ErrorReport> {
        self.settings.set(name, value, config_accepts)
    }

    /// Configured mode; `push-pop` when unset
    pub fn mode(&self) -> &str {
        self.settings.get("mode").unwrap_or("push-pop")
    }
}

/// Search parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamRecord {
    pub settings: Settings,
}

impl ParamRecord {
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), ErrorReport> {
        self.settings.set(name, value, param_accepts)
    }
}

/// Assertion context
#[derive(Debug, Clone)]
pub struct Context {
    mode: String,
    /// Assertions per push level; level 0 is the base level
    levels: Vec<Vec<TermHandle>>,
    status: ContextStatus,
    inconsistent_levels: Vec<bool>,
}

impl Context {
    pub fn new(config: &Config) -> Self {
        Self {
            mode: config.mode().to_string(),
            levels: vec![Vec::new()],
            status: ContextStatus::Idle,
            inconsistent_levels: vec![false],
        }
    }

    pub fn status(&self) -> ContextStatus {
        self.status
    }

    pub fn supports_push(&self) -> bool {
        matches!(self.mode.as_str(), "push-pop" | "interactive")
    }

    pub fn level(&self) -> usize {
        self.levels.len() - 1
    }

    /// Record assertions; `trivially_false` marks a conflict at this level
    pub fn assert_all(&mut self, formulas: &[TermHandle], trivially_false: bool) {
        if let Some(level) = self.levels.last_mut() {
            level.extend_from_slice(formulas);
        }
        if trivially_false {
            if let Some(flag) = self.inconsistent_levels.last_mut() {
                *flag = true;
            }
        }
        self.refresh_status();
    }

    pub fn push(&mut self) {
        self.levels.push(Vec::new());
        self.inconsistent_levels.push(false);
    }

    pub fn pop(&mut self) -> Result<(), ErrorReport> {
        if self.levels.len() <= 1 {
            return Err(ErrorReport::new(ErrorCode::InvalidContextOperation));
        }
        self.levels.pop();
        self.inconsistent_levels.pop();
        self.refresh_status();
        Ok(())
    }

    /// No search ever runs in this engine, so stopping only matters while searching
    pub fn stop_search(&mut self) {
        if self.status == ContextStatus::Searching {
            self.status = ContextStatus::Interrupted;
        }
    }

    fn refresh_status(&mut self) {
        self.status = if self.inconsistent_levels.iter().any(|&flag| flag) {
            ContextStatus::Unsat
        } else {
            ContextStatus::Idle
        };
    }

    pub fn assertions(&self) -> impl Iterator<Item = TermHandle> + '_ {
        self.levels.iter().flatten().copied()
    }
}

/// Model built from an explicit assignment of constants to uninterpreted terms
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Model {
    pub(crate) assignment: HashMap<TermHandle, TermHandle>,
}

impl Model {
    pub fn value_of(&self, t: TermHandle) -> Option<TermHandle> {
        self.assignment.get(&t).copied()
    }

    pub fn terms(&self) -> impl Iterator<Item = TermHandle> + '_ {
        self.assignment.iter().flat_map(|(&k, &v)| [k, v])
    }
}

/// Any object addressed by a native address
#[derive(Debug, Clone)]
pub enum NativeObject {
    Config(Config),
    Context(Context),
    Params(ParamRecord),
    Model(Model),
}

pub(crate) const OBJECT_BYTES: usize = 128;
pub(crate) const LEVEL_BYTES: usize = 32;
pub(crate) const ASSERTION_BYTES: usize = std::mem::size_of::<TermHandle>();
const MODEL_ENTRY_BYTES: usize = 16;

impl NativeObject {
    /// Bytes charged for the object in its current state
    pub(crate) fn footprint(&self) -> usize {
        match self {
            NativeObject::Model(model) => OBJECT_BYTES + model.assignment.len() * MODEL_ENTRY_BYTES,
            NativeObject::Context(context) => {
                OBJECT_BYTES
                    + context.level() * LEVEL_BYTES
                    + context.assertions().count() * ASSERTION_BYTES
            }
            NativeObject::Config(config) => OBJECT_BYTES + config.settings.footprint(),
            NativeObject::Params(params) => OBJECT_BYTES + params.settings.footprint(),
        }
    }
}

const FIRST_ADDRESS: u64 = 0x1000;
const ADDRESS_STRIDE: u64 = 0x40;

#[derive(Debug)]
pub(crate) struct NativeObjects {
    next: u64,
    live: HashMap<NativeAddress, NativeObject>,
}

impl NativeObjects {
    pub(crate) fn new() -> Self {
        Self {
            next: FIRST_ADDRESS,
            live: HashMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, object: NativeObject) -> NativeAddress {
        let address = NativeAddress::from_raw(self.next);
        self.next = self.next.wrapping_add(ADDRESS_STRIDE).max(FIRST_ADDRESS);
        self.live.insert(address, object);
        address
    }

    pub(crate) fn get(&self, address: NativeAddress) -> Option<&NativeObject> {
        self.live.get(&address)
    }

    pub(crate) fn get_mut(&mut self, address: NativeAddress) -> Option<&mut NativeObject> {
        self.live.get_mut(&address)
    }

    pub(crate) fn remove(&mut self, address: NativeAddress) -> Option<NativeObject> {
        self.live.remove(&address)
    }

    pub(crate) fn len(&self) -> usize {
        self.live.len()
    }

    /// Terms held by live contexts and models
    pub(crate) fn held_terms(&self) -> Vec<TermHandle> {
        let mut held = Vec::new();
        for object in self.live.values() {
            match object {
                NativeObject::Context(context) => held.extend(context.assertions()),
                NativeObject::Model(model) => held.extend(model.terms()),
                NativeObject::Config(_) | NativeObject::Params(_) => {}
            }
        }
        held
    }
}
