//! Error types shared by the extraction crates.

use thiserror::Error;

/// Result type alias using AdcircError.
pub type AdcircResult<T> = Result<T, AdcircError>;

/// Errors raised while interpreting dates, units and user parameters.
#[derive(Debug, Error)]
pub enum AdcircError {
    #[error("Invalid run date '{0}': expected YYYYMMDDHH")]
    InvalidRunDate(String),

    #[error("Invalid calendar date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid time units attribute: {0}")]
    InvalidTimeUnits(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Time offset out of range: {0} seconds")]
    TimeOutOfRange(f64),
}

impl AdcircError {
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        AdcircError::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }
}
