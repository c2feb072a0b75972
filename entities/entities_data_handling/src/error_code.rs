//! Engine Error Codes
//!
//! The native engine reports its own validation errors through a side channel:
//! a failing call returns a sentinel and records an [`ErrorReport`] that the
//! managed side queries with the error-code/error-string pair. These errors are
//! distinct from out-of-memory, which the bridge converts into an exception.

use crate::handle::{Handle, TermHandle, TypeHandle};
use std::fmt;

/// Error codes recorded by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// No error since the last reset
    NoError,
    /// Handle is not a valid type
    InvalidType,
    /// Handle is not a valid term
    InvalidTerm,
    /// Scalar constant index out of range
    InvalidConstantIndex,
    /// Tuple component index out of range
    InvalidTupleIndex,
    /// Reference count of a term is already zero
    BadTermDecref,
    /// Reference count of a type is already zero
    BadTypeDecref,
    /// A strictly positive integer is required (widths, arities, cardinalities)
    PosIntRequired,
    /// Type must be a scalar or uninterpreted type
    ScalarOrUninterpretedRequired,
    /// Argument must be a function
    FunctionRequired,
    /// Argument must be a tuple
    TupleRequired,
    /// Argument must be a variable
    VariableRequired,
    /// Argument must be a rational constant
    ArithConstantRequired,
    /// Argument must be a bit-vector constant
    BitvectorConstantRequired,
    /// Argument must be a constant value
    ConstantRequired,
    /// Wrong number of arguments
    WrongNumberOfArguments,
    /// Term does not have the expected type
    TypeMismatch,
    /// Terms with incompatible types
    IncompatibleTypes,
    /// A variable occurs twice in a binder
    DuplicateVariable,
    /// Zero denominator in a rational constant
    DivisionByZero,
    /// Name is not bound
    UnknownName,
    /// Native address does not denote a live object of the expected kind
    InvalidNativeObject,
    /// Unknown configuration or parameter name
    UnknownParameter,
    /// Value not accepted for a configuration or parameter
    InvalidParameterValue,
    /// Operation not allowed in the context's current state
    InvalidContextOperation,
    /// Term has no value in the model
    EvalUnknownTerm,
    /// Model value cannot be converted to the requested form
    EvalConversionFailed,
}

impl ErrorCode {
    /// Numeric code reported to the managed side
    pub fn code(self) -> i32 {
        match self {
            ErrorCode::NoError => 0,
            ErrorCode::InvalidType => 1,
            ErrorCode::InvalidTerm => 2,
            ErrorCode::InvalidConstantIndex => 3,
            ErrorCode::InvalidTupleIndex => 5,
            ErrorCode::BadTermDecref => 6,
            ErrorCode::BadTypeDecref => 7,
            ErrorCode::PosIntRequired => 8,
            ErrorCode::ScalarOrUninterpretedRequired => 10,
            ErrorCode::FunctionRequired => 11,
            ErrorCode::TupleRequired => 12,
            ErrorCode::VariableRequired => 13,
            ErrorCode::ArithConstantRequired => 14,
            ErrorCode::BitvectorConstantRequired => 15,
            ErrorCode::ConstantRequired => 17,
            ErrorCode::WrongNumberOfArguments => 25,
            ErrorCode::TypeMismatch => 28,
            ErrorCode::IncompatibleTypes => 29,
            ErrorCode::DuplicateVariable => 30,
            ErrorCode::DivisionByZero => 40,
            ErrorCode::UnknownName => 60,
            ErrorCode::InvalidNativeObject => 300,
            ErrorCode::UnknownParameter => 500,
            ErrorCode::InvalidParameterValue => 501,
            ErrorCode::InvalidContextOperation => 400,
            ErrorCode::EvalUnknownTerm => 600,
            ErrorCode::EvalConversionFailed => 606,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            ErrorCode::NoError => "no error",
            ErrorCode::InvalidType => "invalid type",
            ErrorCode::InvalidTerm => "invalid term",
            ErrorCode::InvalidConstantIndex => "invalid constant index",
            ErrorCode::InvalidTupleIndex => "invalid tuple index",
            ErrorCode::BadTermDecref => "reference count of term is already zero",
            ErrorCode::BadTypeDecref => "reference count of type is already zero",
            ErrorCode::PosIntRequired => "integer argument must be positive",
            ErrorCode::ScalarOrUninterpretedRequired => "type is not scalar or uninterpreted",
            ErrorCode::FunctionRequired => "argument is not a function",
            ErrorCode::TupleRequired => "argument is not a tuple",
            ErrorCode::VariableRequired => "argument is not a variable",
            ErrorCode::ArithConstantRequired => "argument is not a rational constant",
            ErrorCode::BitvectorConstantRequired => "argument is not a bit-vector constant",
            ErrorCode::ConstantRequired => "argument is not a constant",
            ErrorCode::WrongNumberOfArguments => "wrong number of arguments",
            ErrorCode::TypeMismatch => "type mismatch",
            ErrorCode::IncompatibleTypes => "incompatible types",
            ErrorCode::DuplicateVariable => "duplicate variable in binder",
            ErrorCode::DivisionByZero => "division by zero",
            ErrorCode::UnknownName => "name is not bound",
            ErrorCode::InvalidNativeObject => "invalid native object",
            ErrorCode::UnknownParameter => "unknown parameter",
            ErrorCode::InvalidParameterValue => "invalid parameter value",
            ErrorCode::InvalidContextOperation => "operation not allowed in this context state",
            ErrorCode::EvalUnknownTerm => "term has no value in the model",
            ErrorCode::EvalConversionFailed => "model value cannot be converted",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Last error recorded by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    /// Error code
    pub code: ErrorCode,
    /// Offending term, if any
    pub term: Option<TermHandle>,
    /// Offending type, if any
    pub ty: Option<TypeHandle>,
    /// Offending integer argument, if any
    pub bad_value: Option<i64>,
}

impl ErrorReport {
    /// Empty report
    pub fn none() -> Self {
        Self::new(ErrorCode::NoError)
    }

    /// Report with a code only
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code,
            term: None,
            ty: None,
            bad_value: None,
        }
    }

    /// Attach the offending term
    pub fn with_term(mut self, term: Handle) -> Self {
        self.term = Some(term);
        self
    }

    /// Attach the offending type
    pub fn with_type(mut self, ty: Handle) -> Self {
        self.ty = Some(ty);
        self
    }

    /// Attach the offending integer argument
    pub fn with_value(mut self, value: i64) -> Self {
        self.bad_value = Some(value);
        self
    }
}

impl Default for ErrorReport {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)?;
        if let Some(term) = self.term {
            write!(f, " (term {})", term)?;
        }
        if let Some(ty) = self.ty {
            write!(f, " (type {})", ty)?;
        }
        if let Some(value) = self.bad_value {
            write!(f, " (value {})", value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_error_is_zero() {
        assert_eq!(ErrorCode::NoError.code(), 0);
        assert_eq!(ErrorReport::default().code, ErrorCode::NoError);
    }

    #[test]
    fn test_report_display() {
        let report = ErrorReport::new(ErrorCode::TypeMismatch).with_term(12).with_type(3);
        assert_eq!(report.to_string(), "type mismatch (term 12) (type 3)");

        let report = ErrorReport::new(ErrorCode::PosIntRequired).with_value(0);
        assert_eq!(report.to_string(), "integer argument must be positive (value 0)");
    }
}
