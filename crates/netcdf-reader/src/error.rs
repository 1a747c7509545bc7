//! Error types for netCDF reading operations.

use adcirc_common::AdcircError;
use thiserror::Error;

/// Result type for netCDF reader operations.
pub type NetCdfResult<T> = Result<T, NetCdfError>;

/// Error types for netCDF reading.
#[derive(Error, Debug)]
pub enum NetCdfError {
    /// The dataset could not be opened (missing file, unreachable server)
    #[error("Failed to open dataset {source_name}: {message}")]
    Open {
        source_name: String,
        message: String,
    },

    /// Missing required variable, dimension or attribute
    #[error("Missing required data: {0}")]
    MissingData(String),

    /// A variable did not have the expected shape or type
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// The netCDF library failed while reading values
    #[error("Failed to read {variable}: {message}")]
    Read { variable: String, message: String },

    /// A time step or node index beyond the variable's extent
    #[error("{what} {index} out of range (length {len})")]
    OutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    /// The time axis could not be interpreted
    #[error("Invalid time axis: {0}")]
    Time(#[from] AdcircError),
}

impl NetCdfError {
    pub(crate) fn read(variable: &str, err: impl std::fmt::Display) -> Self {
        NetCdfError::Read {
            variable: variable.to_string(),
            message: err.to_string(),
        }
    }
}
