//! Bridge Configuration
//!
//! Settings fixed when the engine is initialized. [`BridgeConfig::from_env`]
//! starts from the defaults and applies the environment overrides:
//!
//! | Variable | Meaning |
//! |----------|---------|
//! | `TERM_BRIDGE_MEMORY_LIMIT` | engine allocation budget in bytes |
//! | `TERM_BRIDGE_PIN_POLICY` | `borrow` or `copy` |
//!
//! Malformed values are ignored with a warning.

use infrastructure_bignum_encoding::{DEFAULT_STACK_SCRATCH_BYTES, MAX_STACK_SCRATCH_BYTES};
use infrastructure_managed_env::{PinPolicy, DEFAULT_SMALL_ARRAY_LIMIT};

pub const MEMORY_LIMIT_VAR: &str = "TERM_BRIDGE_MEMORY_LIMIT";
pub const PIN_POLICY_VAR: &str = "TERM_BRIDGE_PIN_POLICY";

/// Initialization configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Longest array copied to the stack without negotiating with the runtime
    pub small_array_limit: usize,
    /// Largest codec scratch buffer kept on the stack
    pub stack_scratch_bytes: usize,
    /// Engine allocation budget in bytes; `None` is unlimited
    pub engine_memory_limit: Option<usize>,
    /// Pinning policy of the environments the bridge creates
    pub pin_policy: PinPolicy,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            small_array_limit: DEFAULT_SMALL_ARRAY_LIMIT,
            stack_scratch_bytes: DEFAULT_STACK_SCRATCH_BYTES,
            engine_memory_limit: None,
            pin_policy: PinPolicy::Borrow,
        }
    }
}

impl BridgeConfig {
    /// Defaults with the process environment applied
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults with overrides read through `lookup`
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(raw) = lookup(MEMORY_LIMIT_VAR) {
            match raw.trim().parse::<usize>() {
                Ok(limit) => config.engine_memory_limit = Some(limit),
                Err(_) => tracing::warn!(variable = MEMORY_LIMIT_VAR, value = %raw, "ignoring malformed memory limit"),
            }
        }
        if let Some(raw) = lookup(PIN_POLICY_VAR) {
            match parse_pin_policy(&raw) {
                Some(policy) => config.pin_policy = policy,
                None => tracing::warn!(variable = PIN_POLICY_VAR, value = %raw, "ignoring unknown pin policy"),
            }
        }
        config
    }

    /// Scratch threshold actually used by the codec
    pub fn effective_stack_scratch_bytes(&self) -> usize {
        self.stack_scratch_bytes.min(MAX_STACK_SCRATCH_BYTES)
    }
}

fn parse_pin_policy(raw: &str) -> Option<PinPolicy> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "borrow" => Some(PinPolicy::Borrow),
        "copy" => Some(PinPolicy::Copy),
        _ => None,
    }
}
