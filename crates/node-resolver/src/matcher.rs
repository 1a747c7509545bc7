//! Nearest-node matching of targets against a candidate subset.

use adcirc_common::GeoPoint;

use crate::error::{ResolveError, ResolveResult};
use crate::mesh::check_len;
use crate::target::{SearchStrategy, Target};

/// Distance rules used by the matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Great-circle distance for `nearest-geodesic`, scanning every candidate.
    #[default]
    Geodesic,
    /// Reproduce historical output: `nearest-geodesic` uses planar distance in
    /// degrees, starts at candidate 1, and reports the position within that
    /// shortened scan. Axis strategies are unaffected.
    Legacy,
}

/// The candidate chosen for one target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeMatch {
    /// Position within the candidate subset.
    pub position: usize,
    /// Strategy distance: degrees for axis strategies, meters for geodesic,
    /// planar degrees for legacy geodesic.
    pub distance: f64,
}

/// Match every target to its nearest candidate using great-circle distance.
///
/// Returns one position per target, in target order. Positions index into the
/// candidate subset, not the full mesh.
pub fn match_targets(
    candidate_indices: &[usize],
    candidate_lons: &[f64],
    candidate_lats: &[f64],
    targets: &[Target],
) -> ResolveResult<Vec<usize>> {
    Ok(match_targets_with(
        MatchMode::Geodesic,
        candidate_indices,
        candidate_lons,
        candidate_lats,
        targets,
    )?
    .into_iter()
    .map(|m| m.position)
    .collect())
}

/// Match every target under an explicit [`MatchMode`], keeping the distances.
pub fn match_targets_with(
    mode: MatchMode,
    candidate_indices: &[usize],
    candidate_lons: &[f64],
    candidate_lats: &[f64],
    targets: &[Target],
) -> ResolveResult<Vec<NodeMatch>> {
    if candidate_indices.is_empty() {
        return Err(ResolveError::NoCandidates);
    }
    check_len("candidate_lons", candidate_indices.len(), candidate_lons.len())?;
    check_len("candidate_lats", candidate_indices.len(), candidate_lats.len())?;

    let candidates: Vec<GeoPoint> = candidate_lons
        .iter()
        .zip(candidate_lats)
        .map(|(&lon, &lat)| GeoPoint::new(lon, lat))
        .collect();

    targets
        .iter()
        .enumerate()
        .map(|(i, target)| match_one(mode, &candidates, target, i))
        .collect()
}

fn match_one(
    mode: MatchMode,
    candidates: &[GeoPoint],
    target: &Target,
    target_index: usize,
) -> ResolveResult<NodeMatch> {
    let point = target.point();

    let best = match (mode, target.strategy) {
        (MatchMode::Legacy, SearchStrategy::NearestGeodesic) => {
            if candidates.len() < 2 {
                return Err(ResolveError::NoCandidates);
            }
            first_minimum(candidates[1..].iter().map(|c| planar_distance(&point, c)))
        }
        (_, strategy) => first_minimum(candidates.iter().map(|c| strategy.distance(&point, c))),
    };

    best.map(|(position, distance)| NodeMatch { position, distance })
        .ok_or(ResolveError::UnmatchedTarget {
            target: target_index,
        })
}

/// Euclidean distance in degree space.
fn planar_distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    ((a.lon - b.lon).powi(2) + (a.lat - b.lat).powi(2)).sqrt()
}

/// Position and value of the first minimum, ignoring NaN.
pub(crate) fn first_minimum(distances: impl Iterator<Item = f64>) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (i, d) in distances.enumerate() {
        if d.is_nan() {
            continue;
        }
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((i, d)),
        }
    }
    best
}
