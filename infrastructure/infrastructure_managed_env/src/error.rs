//! Bridge Errors
//!
//! The single error type of the boundary. Facades turn it into a failure
//! sentinel and, for out-of-memory, a pending managed exception.

use entities_data_handling::{ErrorCode, ErrorReport};
use infrastructure_bignum_encoding::{DecodeError, EncodeError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// Native or managed allocation failed
    #[error("out of memory")]
    OutOfMemory,
    /// A conversion produced more bytes than a managed array can hold
    #[error("encoding needs {bytes} bytes, more than a managed array can hold")]
    EncodingTooLarge { bytes: u64 },
    /// A cheap local check failed before reaching the engine
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The engine rejected the call; details are in its error report
    #[error("engine error: {0}")]
    Engine(ErrorCode),
    /// The managed runtime has no exception class of that name
    #[error("managed exception class not found: {0}")]
    ClassNotFound(String),
    /// Called outside init/exit
    #[error("engine is not initialized")]
    NotInitialized,
}

impl From<EncodeError> for BridgeError {
    fn from(error: EncodeError) -> Self {
        match error {
            EncodeError::EncodingTooLarge { bytes } => BridgeError::EncodingTooLarge { bytes },
            EncodeError::OutOfMemory => BridgeError::OutOfMemory,
        }
    }
}

impl From<DecodeError> for BridgeError {
    fn from(error: DecodeError) -> Self {
        match error {
            DecodeError::ZeroDenominator => BridgeError::InvalidArgument(error.to_string()),
            DecodeError::OutOfMemory => BridgeError::OutOfMemory,
        }
    }
}

impl From<ErrorReport> for BridgeError {
    fn from(report: ErrorReport) -> Self {
        BridgeError::Engine(report.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        assert_eq!(BridgeError::from(EncodeError::OutOfMemory), BridgeError::OutOfMemory);
        assert_eq!(
            BridgeError::from(EncodeError::EncodingTooLarge { bytes: 9 }),
            BridgeError::EncodingTooLarge { bytes: 9 }
        );
        assert_eq!(
            BridgeError::from(DecodeError::ZeroDenominator),
            BridgeError::InvalidArgument("zero denominator".to_string())
        );
        assert_eq!(
            BridgeError::from(ErrorReport::new(ErrorCode::InvalidTerm)),
            BridgeError::Engine(ErrorCode::InvalidTerm)
        );
    }
}
