//! Depth-contour node filter.
//!
//! Restricts candidate nodes to those lying close to a target depth (the
//! "deep water" contour used for wave-transformation work). A narrow band is
//! tried first; when no node falls inside it, a wider band is scanned before
//! giving up.

use serde::{Deserialize, Serialize};

use crate::error::{ResolveError, ResolveResult};

/// Default half-width of the primary band, meters.
pub const DEFAULT_PRIMARY_TOLERANCE: f64 = 0.5;

/// Default half-width of the fallback band, meters.
pub const DEFAULT_FALLBACK_TOLERANCE: f64 = 3.0;

/// First node index examined by the scan. Node 0 is never a candidate.
pub const FIRST_SCANNED_NODE: usize = 1;

/// Which band produced a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandUsed {
    Primary,
    Fallback,
    None,
}

/// Nodes found near a contour, in ascending index order.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourSelection {
    pub depths: Vec<f64>,
    pub indices: Vec<usize>,
    pub band: BandUsed,
}

impl ContourSelection {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }
}

/// Select nodes whose depth lies strictly inside `target_depth ± primary_tolerance`,
/// falling back to `target_depth ± fallback_tolerance` when the first pass is empty.
///
/// An empty selection is a normal outcome; callers decide whether it is fatal.
pub fn select_near_contour(
    depths: &[f64],
    target_depth: f64,
    primary_tolerance: f64,
    fallback_tolerance: f64,
) -> ContourSelection {
    let (matched, indices) = scan(depths, target_depth, primary_tolerance);
    if !indices.is_empty() {
        return ContourSelection {
            depths: matched,
            indices,
            band: BandUsed::Primary,
        };
    }

    let (matched, indices) = scan(depths, target_depth, fallback_tolerance);
    let band = if indices.is_empty() {
        BandUsed::None
    } else {
        BandUsed::Fallback
    };

    ContourSelection {
        depths: matched,
        indices,
        band,
    }
}

fn scan(depths: &[f64], target: f64, tolerance: f64) -> (Vec<f64>, Vec<usize>) {
    let low = target - tolerance;
    let high = target + tolerance;

    depths
        .iter()
        .enumerate()
        .skip(FIRST_SCANNED_NODE)
        .filter(|&(_, &d)| d > low && d < high)
        .map(|(i, &d)| (d, i))
        .unzip()
}

/// A target depth with its primary and fallback tolerances.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContourBand {
    /// Positive-down depth of the contour, meters.
    pub target_depth: f64,
    #[serde(default = "default_primary")]
    pub primary_tolerance: f64,
    #[serde(default = "default_fallback")]
    pub fallback_tolerance: f64,
}

fn default_primary() -> f64 {
    DEFAULT_PRIMARY_TOLERANCE
}

fn default_fallback() -> f64 {
    DEFAULT_FALLBACK_TOLERANCE
}

impl ContourBand {
    /// Band around `target_depth` with the default tolerances.
    pub fn new(target_depth: f64) -> Self {
        Self {
            target_depth,
            primary_tolerance: DEFAULT_PRIMARY_TOLERANCE,
            fallback_tolerance: DEFAULT_FALLBACK_TOLERANCE,
        }
    }

    pub fn with_tolerances(
        target_depth: f64,
        primary_tolerance: f64,
        fallback_tolerance: f64,
    ) -> ResolveResult<Self> {
        let band = Self {
            target_depth,
            primary_tolerance,
            fallback_tolerance,
        };
        band.validate()?;
        Ok(band)
    }

    /// Tolerances must be positive and the fallback no narrower than the primary.
    pub fn validate(&self) -> ResolveResult<()> {
        if !self.target_depth.is_finite() {
            return Err(ResolveError::InvalidParameter(format!(
                "contour depth must be finite, got {}",
                self.target_depth
            )));
        }
        if self.primary_tolerance.is_nan() || self.primary_tolerance <= 0.0 {
            return Err(ResolveError::InvalidParameter(format!(
                "primary tolerance must be positive, got {}",
                self.primary_tolerance
            )));
        }
        if self.fallback_tolerance.is_nan() || self.fallback_tolerance < self.primary_tolerance {
            return Err(ResolveError::InvalidParameter(format!(
                "fallback tolerance {} is narrower than primary tolerance {}",
                self.fallback_tolerance, self.primary_tolerance
            )));
        }
        Ok(())
    }

    pub fn select(&self, depths: &[f64]) -> ContourSelection {
        select_near_contour(
            depths,
            self.target_depth,
            self.primary_tolerance,
            self.fallback_tolerance,
        )
    }
}

impl Default for ContourBand {
    fn default() -> Self {
        Self::new(20.0)
    }
}
