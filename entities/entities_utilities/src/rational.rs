//! Rational Number Operations Module
//!
//! Arbitrary precision rational numbers as they are exchanged with the native
//! engine: a numerator and a denominator, each carried across the boundary as its
//! own big integer.
//!
//! # Canonical Form
//!
//! Every `BigRational` is canonical by construction:
//!
//! - the denominator is strictly positive (the sign lives on the numerator);
//! - `gcd(|numerator|, denominator) == 1`;
//! - zero is `0/1`.
//!
//! A zero denominator can never be represented; the constructors return `None`
//! instead.
//!
//! # Examples
//!
//! ```rust
//! use entities_utilities::{BigNumber, BigRational};
//!
//! let q = BigRational::from_parts(&BigNumber::from_i64(-3), &BigNumber::from_i64(6)).unwrap();
//! assert_eq!(q.numerator(), BigNumber::from_i64(-1));
//! assert_eq!(q.denominator(), BigNumber::from_i64(2));
//! ```

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

use crate::big::BigNumber;
use malachite::base::num::basic::traits::Zero;
use malachite::base::num::conversion::traits::IsInteger;
use malachite::{Integer, Rational};

/// Big rational number representation using malachite's Rational.
///
/// Malachite keeps rationals reduced with a positive denominator, so wrapping
/// it gives the canonical form for free.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BigRational {
    value: Rational,
}

impl BigRational {
    /// Create a new rational number from a 64-bit signed integer.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use entities_utilities::BigRational;
    ///
    /// let r = BigRational::from_i64(42);
    /// assert_eq!(r.to_string(), "42");
    /// ```
    pub fn from_i64(value: i64) -> Self {
        Self {
            value: Rational::from(value),
        }
    }

    /// Create a rational number from a big integer.
    pub fn from_big(value: &BigNumber) -> Self {
        Self {
            value: Rational::from(value.as_integer().clone()),
        }
    }

    /// Create a rational number from a numerator and denominator.
    ///
    /// The result is reduced and its denominator made positive.
    ///
    /// # Returns
    ///
    /// * `Some(BigRational)` if denominator is not zero
    /// * `None` if denominator is zero
    pub fn from_parts(numerator: &BigNumber, denominator: &BigNumber) -> Option<Self> {
        if denominator.is_zero() {
            return None;
        }
        let num = Rational::from(numerator.as_integer().clone());
        let den = Rational::from(denominator.as_integer().clone());
        Some(Self { value: num / den })
    }

    /// Create a rational number from a 64-bit numerator and denominator.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use entities_utilities::BigRational;
    ///
    /// let r = BigRational::from_fraction(22, 7);
    /// assert!(r.is_some());
    /// assert_eq!(r.unwrap().to_string(), "22/7");
    /// assert!(BigRational::from_fraction(1, 0).is_none());
    /// ```
    pub fn from_fraction(numerator: i64, denominator: i64) -> Option<Self> {
        if denominator == 0 {
            return None;
        }
        Some(Self {
            value: Rational::from(numerator) / Rational::from(denominator),
        })
    }

    /// Signed numerator of the canonical form.
    pub fn numerator(&self) -> BigNumber {
        let magnitude = Integer::from(self.value.to_numerator());
        if self.is_negative() {
            BigNumber::from_integer(-magnitude)
        } else {
            BigNumber::from_integer(magnitude)
        }
    }

    /// Denominator of the canonical form; always strictly positive.
    pub fn denominator(&self) -> BigNumber {
        BigNumber::from_integer(Integer::from(self.value.to_denominator()))
    }

    /// Check if the rational number is zero.
    pub fn is_zero(&self) -> bool {
        self.value == Rational::ZERO
    }

    /// Check if the rational number is negative.
    pub fn is_negative(&self) -> bool {
        self.value < Rational::ZERO
    }

    /// Check if the rational number represents an integer.
    pub fn is_integer(&self) -> bool {
        (&self.value).is_integer()
    }
}

impl std::fmt::Display for BigRational {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_i64() {
        let r = BigRational::from_i64(42);
        assert_eq!(r.to_string(), "42");
        assert!(r.is_integer());
        assert_eq!(r.denominator(), BigNumber::from_i64(1));
    }

    #[test]
    fn test_from_parts_canonicalizes() {
        let r = BigRational::from_parts(&BigNumber::from_i64(-3), &BigNumber::from_i64(6)).unwrap();
        assert_eq!(r.numerator(), BigNumber::from_i64(-1));
        assert_eq!(r.denominator(), BigNumber::from_i64(2));

        let r = BigRational::from_parts(&BigNumber::from_i64(4), &BigNumber::from_i64(-8)).unwrap();
        assert_eq!(r.numerator(), BigNumber::from_i64(-1));
        assert_eq!(r.denominator(), BigNumber::from_i64(2));
        assert!(r.is_negative());

        let r = BigRational::from_parts(&BigNumber::from_i64(-9), &BigNumber::from_i64(-3)).unwrap();
        assert_eq!(r.to_string(), "3");
    }

    #[test]
    fn test_zero_denominator() {
        assert!(BigRational::from_parts(&BigNumber::from_i64(1), &BigNumber::zero()).is_none());
        assert!(BigRational::from_fraction(5, 0).is_none());
    }

    #[test]
    fn test_zero_is_zero_over_one() {
        let r = BigRational::from_parts(&BigNumber::zero(), &BigNumber::from_i64(-17)).unwrap();
        assert!(r.is_zero());
        assert!(!r.is_negative());
        assert_eq!(r.numerator(), BigNumber::zero());
        assert_eq!(r.denominator(), BigNumber::from_i64(1));
    }
}
