//! Infrastructure Layer: Bignum Encoding
//!
//! Converts arbitrary precision integers and rationals to and from the byte
//! encoding understood by the managed side.
//!
//! ## Overview
//!
//! Integers travel as minimal big-endian two's complement byte sequences with
//! signed bytes. Rationals travel as an independently encoded numerator and
//! denominator of their canonical form.
//!
//! Each codec has a plain form and an `_in` form. The `_in` form takes the
//! engine [`Allocator`](usecases_memory_management::Allocator) that scratch
//! buffers above the stack threshold are charged to, so the caller decides how
//! an exhausted budget is reported.
//!
//! ## Codecs
//!
//! - **[`bignum_codec`]**: [`BigNumber`](entities_utilities::BigNumber) values
//! - **[`rational_codec`]**: [`BigRational`](entities_utilities::BigRational) values

mod common;

pub mod bignum_codec;
pub mod rational_codec;

pub use bignum_codec::BignumCodec;
pub use rational_codec::{EncodedRational, RationalCodec};

pub use common::{DecodeError, EncodeError};
pub use common::{DEFAULT_STACK_SCRATCH_BYTES, MAX_ENCODING_BYTES, MAX_STACK_SCRATCH_BYTES};
