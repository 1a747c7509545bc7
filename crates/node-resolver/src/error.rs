//! Error types for node resolution.

use thiserror::Error;

/// Result type for node resolution.
pub type ResolveResult<T> = Result<T, ResolveError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    /// The matcher was handed an empty candidate set
    #[error("No candidate nodes to match against")]
    NoCandidates,

    /// Parallel arrays disagree in length
    #[error("Length mismatch: {what} has {actual} entries, expected {expected}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Neither tolerance band around the contour contains a node
    #[error("No node found within {tolerance} m of the {target_depth} m contour")]
    NoNodeAtContour { target_depth: f64, tolerance: f64 },

    /// Every candidate distance to a target was NaN
    #[error("Target {target} could not be matched (no finite distance)")]
    UnmatchedTarget { target: usize },

    /// A cross-mesh match exceeded the configured distance limit
    #[error("Nearest node to point {point} is {distance_m:.1} m away (limit {limit_m:.1} m)")]
    MatchTooFar {
        point: usize,
        distance_m: f64,
        limit_m: f64,
    },

    /// Invalid band or option values
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}
