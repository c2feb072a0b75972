//! Big Number Operations
//!
//! Provides the arbitrary precision signed integer used on both sides of the
//! boundary. Values are built from native constants or decoded from managed byte
//! arrays, live for one conversion call, and are then dropped.
//!
//! This module uses the `malachite` crate. Malachite stores integers as sign and
//! magnitude, which is the same split the byte codec works with: the magnitude is
//! exported first and the sign is applied afterwards with a two's complement pass.

/*
 * %CopyrightBegin%
 *
 * SPDX-License-Identifier: Apache-2.0
 *
 * Copyright Lee Barney 2025. All Rights Reserved.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 *
 * %CopyrightEnd%
 */

use malachite::base::num::basic::traits::Zero;
use malachite::base::num::conversion::traits::PowerOf2Digits;
use malachite::base::num::logic::traits::SignificantBits;
use malachite::{Integer, Natural};
use std::fmt;
use std::str::FromStr;

/// Big number representation using malachite's Integer
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BigNumber {
    value: Integer,
}

impl BigNumber {
    /// Create a new big number from i64
    pub fn from_i64(value: i64) -> Self {
        Self {
            value: Integer::from(value),
        }
    }

    /// Create a new big number from u64
    pub fn from_u64(value: u64) -> Self {
        Self {
            value: Integer::from(value),
        }
    }

    /// Zero
    pub fn zero() -> Self {
        Self::from_i64(0)
    }

    /// Parse a decimal string with an optional leading sign
    ///
    /// Returns None if the string is not a valid decimal integer.
    pub fn parse_decimal(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
        Integer::from_str(digits).ok().map(Self::from_integer)
    }

    /// Convert to i64
    ///
    /// Returns None if the value is out of range
    pub fn to_i64(&self) -> Option<i64> {
        i64::try_from(&self.value).ok()
    }

    /// Check if the number is zero
    pub fn is_zero(&self) -> bool {
        self.value == 0
    }

    /// Check if the number is strictly negative
    pub fn is_negative(&self) -> bool {
        self.value < 0
    }

    /// Sign of the number: -1, 0 or 1
    pub fn signum(&self) -> i32 {
        if self.value < 0 {
            -1
        } else if self.value == 0 {
            0
        } else {
            1
        }
    }

    /// Number of significant bits in the absolute value
    ///
    /// Zero has no significant bits.
    pub fn significant_bits(&self) -> u64 {
        self.value.significant_bits()
    }

    /// Write the magnitude big-endian into the tail of `out`
    ///
    /// Runs once over the limbs. Leading slots the magnitude does not reach are
    /// left untouched, and high bytes that do not fit are dropped.
    pub fn write_magnitude_be(&self, out: &mut [u8]) {
        let mut slots = out.iter_mut().rev();
        for limb in self.value.unsigned_abs_ref().limbs() {
            for byte in limb.to_le_bytes() {
                match slots.next() {
                    Some(slot) => *slot = byte,
                    None => return,
                }
            }
        }
    }

    /// Build a number from an unsigned big-endian magnitude and a sign
    pub fn from_magnitude_be(bytes: &[u8], negative: bool) -> Self {
        let magnitude = Natural::from_power_of_2_digits_desc(8, bytes.iter().copied())
            .unwrap_or(Natural::ZERO);
        let value = Integer::from(magnitude);
        Self {
            value: if negative { -value } else { value },
        }
    }

    /// Get the internal Integer value (for advanced use)
    pub fn as_integer(&self) -> &Integer {
        &self.value
    }

    /// Create from Integer (for advanced use)
    pub fn from_integer(value: Integer) -> Self {
        Self { value }
    }
}

impl fmt::Display for BigNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl From<i64> for BigNumber {
    fn from(value: i64) -> Self {
        Self::from_i64(value)
    }
}

impl From<u64> for BigNumber {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl From<i32> for BigNumber {
    fn from(value: i32) -> Self {
        Self::from_i64(value as i64)
    }
}

impl From<Integer> for BigNumber {
    fn from(value: Integer) -> Self {
        Self::from_integer(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_big_number_creation() {
        let big = BigNumber::from_i64(12345);
        assert!(!big.is_negative());
        assert!(!big.is_zero());
        assert_eq!(big.signum(), 1);

        let big_neg = BigNumber::from_i64(-12345);
        assert!(big_neg.is_negative());
        assert_eq!(big_neg.signum(), -1);
        assert_eq!(BigNumber::zero().signum(), 0);
    }

    #[test]
    fn test_significant_bits() {
        assert_eq!(BigNumber::zero().significant_bits(), 0);
        assert_eq!(BigNumber::from_i64(1).significant_bits(), 1);
        assert_eq!(BigNumber::from_i64(255).significant_bits(), 8);
        assert_eq!(BigNumber::from_i64(-256).significant_bits(), 9);
        assert_eq!(BigNumber::from_u64(u64::MAX).significant_bits(), 64);
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(BigNumber::parse_decimal("42"), Some(BigNumber::from_i64(42)));
        assert_eq!(BigNumber::parse_decimal("-42"), Some(BigNumber::from_i64(-42)));
        assert_eq!(BigNumber::parse_decimal("+7"), Some(BigNumber::from_i64(7)));
        assert_eq!(BigNumber::parse_decimal("12x"), None);

        let huge = BigNumber::parse_decimal("340282366920938463463374607431768211456").unwrap();
        assert!(huge.to_i64().is_none());
        assert_eq!(huge.significant_bits(), 129);
    }

    #[test]
    fn test_magnitude_bytes() {
        let mut out = [0u8; 3];
        BigNumber::from_i64(-0x1234).write_magnitude_be(&mut out);
        assert_eq!(out, [0, 0x12, 0x34]);

        let wide = BigNumber::from_magnitude_be(&[1, 0, 0, 0, 0, 0, 0, 0, 0, 2], false);
        assert_eq!(wide.significant_bits(), 73);
        let mut out = [0u8; 10];
        wide.write_magnitude_be(&mut out);
        assert_eq!(out, [1, 0, 0, 0, 0, 0, 0, 0, 0, 2]);

        let mut short = [0u8; 1];
        wide.write_magnitude_be(&mut short);
        assert_eq!(short, [2]);

        assert_eq!(
            BigNumber::from_magnitude_be(&[0x12, 0x34], true),
            BigNumber::from_i64(-0x1234)
        );
        assert_eq!(
            BigNumber::from_magnitude_be(&[0, 0, 0x7f], false),
            BigNumber::from_i64(0x7f)
        );
        assert!(BigNumber::from_magnitude_be(&[], false).is_zero());
        assert!(BigNumber::from_magnitude_be(&[0, 0], true).is_zero());
    }

    #[test]
    fn test_wide_magnitude_round_trip() {
        let bytes: Vec<u8> = (0..64_000u32).map(|i| (i % 251) as u8 + 1).collect();
        let value = BigNumber::from_magnitude_be(&bytes, true);
        assert!(value.is_negative());
        assert_eq!(value.significant_bits(), 63_999 * 8 + 1);
        let mut out = vec![0u8; bytes.len()];
        value.write_magnitude_be(&mut out);
        assert_eq!(out, bytes);
    }

    #[test]
    fn test_conversion() {
        assert_eq!(BigNumber::from_i64(i64::MIN).to_i64(), Some(i64::MIN));
        assert_eq!(BigNumber::from_u64(u64::MAX).to_i64(), None);
    }
}
