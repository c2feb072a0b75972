//! Native Addresses
//!
//! Configurations, contexts, parameter records and models are heavier objects
//! than terms. The managed side holds them as a 64-bit value that the native
//! side reinterprets as an address; `0` means "no native resource" and is what
//! every constructor returns on failure.

use std::fmt;

/// 64-bit carrier for a native object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NativeAddress(u64);

impl NativeAddress {
    /// The "no native resource" value
    pub const NULL: NativeAddress = NativeAddress(0);

    /// Wrap a raw carrier value received from the managed side
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw carrier value handed to the managed side
    pub fn raw(self) -> u64 {
        self.0
    }

    /// Whether this address denotes no object
    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for NativeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_address() {
        assert!(NativeAddress::NULL.is_null());
        assert!(NativeAddress::default().is_null());
        assert!(!NativeAddress::from_raw(0x10).is_null());
    }

    #[test]
    fn test_raw_round_trip() {
        let addr = NativeAddress::from_raw(0xdead_beef);
        assert_eq!(addr.raw(), 0xdead_beef);
        assert_eq!(addr.to_string(), "0xdeadbeef");
    }
}
