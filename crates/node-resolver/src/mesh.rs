//! Unstructured mesh node arrays.

use std::ops::Range;

use adcirc_common::GeoPoint;
use serde::{Deserialize, Serialize};

use crate::error::{ResolveError, ResolveResult};

/// Sign convention of a mesh's depth values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DepthConvention {
    /// Water depth is positive below the datum (ADCIRC default).
    #[default]
    PositiveDown,
    /// Bed elevation, negative below the datum.
    PositiveUp,
}

impl DepthConvention {
    /// Convert a raw value into a positive-down depth.
    pub fn to_positive_down(&self, value: f64) -> f64 {
        match self {
            DepthConvention::PositiveDown => value,
            DepthConvention::PositiveUp => -value,
        }
    }
}

/// A single mesh node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshNode {
    pub index: usize,
    pub lon: f64,
    pub lat: f64,
    /// Depth as stored, in the mesh's own convention.
    pub depth: f64,
}

impl MeshNode {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lon, self.lat)
    }
}

/// Node coordinates and depths of a model mesh, or of a contiguous part of one.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    lons: Vec<f64>,
    lats: Vec<f64>,
    depths: Vec<f64>,
    convention: DepthConvention,
}

impl Mesh {
    /// Build a mesh from parallel coordinate and depth arrays.
    pub fn new(
        lons: Vec<f64>,
        lats: Vec<f64>,
        depths: Vec<f64>,
        convention: DepthConvention,
    ) -> ResolveResult<Self> {
        check_len("lats", lons.len(), lats.len())?;
        check_len("depths", lons.len(), depths.len())?;
        Ok(Self {
            lons,
            lats,
            depths,
            convention,
        })
    }

    pub fn len(&self) -> usize {
        self.lons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lons.is_empty()
    }

    pub fn lons(&self) -> &[f64] {
        &self.lons
    }

    pub fn lats(&self) -> &[f64] {
        &self.lats
    }

    /// Depths as stored.
    pub fn depths(&self) -> &[f64] {
        &self.depths
    }

    pub fn convention(&self) -> DepthConvention {
        self.convention
    }

    pub fn node(&self, index: usize) -> Option<MeshNode> {
        Some(MeshNode {
            index,
            lon: *self.lons.get(index)?,
            lat: *self.lats.get(index)?,
            depth: *self.depths.get(index)?,
        })
    }

    pub fn point(&self, index: usize) -> Option<GeoPoint> {
        Some(GeoPoint::new(*self.lons.get(index)?, *self.lats.get(index)?))
    }

    /// Depths converted to positive-down, ready for contour search.
    pub fn normalized_depths(&self) -> Vec<f64> {
        self.depths
            .iter()
            .map(|&d| self.convention.to_positive_down(d))
            .collect()
    }

    /// Contiguous node range spanning two longitudes.
    ///
    /// Each bound is the last node whose longitude is nearest to the given
    /// value; the bounds are swapped when the mesh numbers nodes west-ward.
    /// The range is half-open, so the node nearest the larger bound is
    /// excluded. An empty or all-NaN mesh yields `0..0`.
    pub fn longitude_window(&self, left_lon: f64, right_lon: f64) -> Range<usize> {
        let (Some(start), Some(end)) = (
            last_nearest(&self.lons, left_lon),
            last_nearest(&self.lons, right_lon),
        ) else {
            return 0..0;
        };

        if start > end {
            end..start
        } else {
            start..end
        }
    }

    /// Copy of the nodes in `range` (clamped to the mesh length).
    pub fn slice(&self, range: Range<usize>) -> Mesh {
        let end = range.end.min(self.len());
        let start = range.start.min(end);
        Mesh {
            lons: self.lons[start..end].to_vec(),
            lats: self.lats[start..end].to_vec(),
            depths: self.depths[start..end].to_vec(),
            convention: self.convention,
        }
    }
}

pub(crate) fn check_len(what: &'static str, expected: usize, actual: usize) -> ResolveResult<()> {
    if expected != actual {
        return Err(ResolveError::LengthMismatch {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Index of the last value nearest to `target`, skipping NaN.
fn last_nearest(values: &[f64], target: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        let d = (v - target).abs();
        if d.is_nan() {
            continue;
        }
        match best {
            Some((_, best_d)) if d > best_d => {}
            _ => best = Some((i, d)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mesh(lons: &[f64]) -> Mesh {
        let n = lons.len();
        Mesh::new(lons.to_vec(), vec![34.5; n], vec![10.0; n], DepthConvention::PositiveDown)
            .unwrap()
    }

    #[test]
    fn test_length_mismatch() {
        let err = Mesh::new(vec![0.0, 1.0], vec![0.0], vec![1.0, 2.0], DepthConvention::PositiveDown)
            .unwrap_err();
        assert_eq!(
            err,
            ResolveError::LengthMismatch {
                what: "lats",
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_window_ascending() {
        let m = mesh(&[-79.0, -78.2, -77.0, -76.0, -75.3, -74.0]);
        assert_eq!(m.longitude_window(-78.148505, -75.245367), 1..4);
    }

    #[test]
    fn test_window_descending_is_swapped() {
        let m = mesh(&[-74.0, -75.3, -76.0, -77.0, -78.2, -79.0]);
        assert_eq!(m.longitude_window(-78.148505, -75.245367), 1..4);
    }

    #[test]
    fn test_window_prefers_last_tie() {
        let m = mesh(&[-78.0, -77.0, -78.0, -76.0, -75.0, -75.0]);
        assert_eq!(m.longitude_window(-78.0, -75.0), 2..5);
    }

    #[test]
    fn test_window_empty_mesh() {
        let m = mesh(&[]);
        assert_eq!(m.longitude_window(-78.0, -75.0), 0..0);
    }

    #[test]
    fn test_normalized_depths_positive_up() {
        let m = Mesh::new(vec![0.0, 1.0], vec![0.0, 0.0], vec![-20.0, 2.0], DepthConvention::PositiveUp)
            .unwrap();
        assert_eq!(m.normalized_depths(), vec![20.0, -2.0]);
    }

    #[test]
    fn test_slice_clamps() {
        let m = mesh(&[0.0, 1.0, 2.0]);
        assert_eq!(m.slice(1..10).lons(), &[1.0, 2.0]);
        assert!(m.slice(5..10).is_empty());
    }
}
