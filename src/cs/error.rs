//! Error type shared by every code in the crate.
//!
//! Only programming-contract violations end up here: bad code parameters and
//! vectors or matrices whose dimensions do not fit together. What the channel
//! did to a codeword is never an error; decoders report it through
//! [`DecodeOutcome`](crate::cs::ecc::DecodeOutcome).

use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Code parameters or inputs that can never be valid
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Two collaborating vectors or matrices disagree on a length
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

impl Error {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Error::InvalidInput(message.into())
    }

    /// Fails with [`Error::DimensionMismatch`] unless `actual == expected`
    pub fn check_len(expected: usize, actual: usize) -> Result<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(Error::DimensionMismatch { expected, actual })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_len() {
        assert!(Error::check_len(7, 7).is_ok());
        assert_eq!(
            Error::check_len(7, 6),
            Err(Error::DimensionMismatch {
                expected: 7,
                actual: 6
            })
        );
    }

    #[test]
    fn test_display() {
        let err = Error::invalid_input("Data bits must be positive");
        assert_eq!(err.to_string(), "invalid input: Data bits must be positive");

        let err = Error::DimensionMismatch {
            expected: 4,
            actual: 3,
        };
        assert_eq!(err.to_string(), "dimension mismatch: expected 4, got 3");
    }
}
