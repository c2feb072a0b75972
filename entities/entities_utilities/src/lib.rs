//! Entities Layer: Utilities
//!
//! Provides the arbitrary precision number types that cross the managed/native
//! boundary:
//! - [`BigNumber`]: signed arbitrary precision integers
//! - [`BigRational`]: canonical fractions built from two `BigNumber`s
//!
//! Both types wrap `malachite` values. They are transient: the bridge builds them
//! for the duration of one conversion call and drops them before returning.

pub mod big;
pub mod rational;

pub use big::BigNumber;
pub use rational::BigRational;
