//! End-to-end resolution: window, contour filter, nearest-node match.

use std::ops::Range;

use adcirc_common::GeoPoint;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::contour::{BandUsed, ContourBand};
use crate::error::{ResolveError, ResolveResult};
use crate::matcher::{match_targets_with, MatchMode};
use crate::mesh::Mesh;
use crate::target::Target;

/// Settings for [`NodeResolver`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ResolverOptions {
    #[serde(default)]
    pub band: ContourBand,
    #[serde(default)]
    pub mode: MatchMode,
    /// Restrict the search to the nodes between these two longitudes.
    #[serde(default)]
    pub window: Option<(f64, f64)>,
}

/// The node chosen for one target.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedNode {
    /// Position of the target in the input slice.
    pub target: usize,
    /// Position within the contour candidate subset.
    pub candidate_position: usize,
    /// Index into the full mesh.
    pub node_index: usize,
    pub point: GeoPoint,
    /// Positive-down depth of the node.
    pub depth: f64,
    pub distance: f64,
}

/// Resolves target locations to mesh nodes near a depth contour.
#[derive(Debug, Clone, Default)]
pub struct NodeResolver {
    options: ResolverOptions,
}

impl NodeResolver {
    pub fn new(options: ResolverOptions) -> ResolveResult<Self> {
        options.band.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Node range searched on `mesh`.
    pub fn search_range(&self, mesh: &Mesh) -> Range<usize> {
        match self.options.window {
            Some((left, right)) => mesh.longitude_window(left, right),
            None => 0..mesh.len(),
        }
    }

    /// Resolve every target, returning one node per target in input order.
    pub fn resolve(&self, mesh: &Mesh, targets: &[Target]) -> ResolveResult<Vec<ResolvedNode>> {
        let range = self.search_range(mesh);
        let offset = range.start;
        let area = mesh.slice(range);
        let depths = area.normalized_depths();

        let band = &self.options.band;
        let selection = band.select(&depths);
        match selection.band {
            BandUsed::Primary => {}
            BandUsed::Fallback => warn!(
                contour = band.target_depth,
                tolerance = band.fallback_tolerance,
                candidates = selection.len(),
                "No nodes in primary contour band, using fallback band"
            ),
            BandUsed::None => {
                return Err(ResolveError::NoNodeAtContour {
                    target_depth: band.target_depth,
                    tolerance: band.fallback_tolerance,
                })
            }
        }

        let lons: Vec<f64> = selection.indices.iter().map(|&i| area.lons()[i]).collect();
        let lats: Vec<f64> = selection.indices.iter().map(|&i| area.lats()[i]).collect();

        let matches = match_targets_with(self.options.mode, &selection.indices, &lons, &lats, targets)?;

        let resolved: Vec<ResolvedNode> = matches
            .into_iter()
            .enumerate()
            .map(|(t, m)| {
                let local = selection.indices[m.position];
                ResolvedNode {
                    target: t,
                    candidate_position: m.position,
                    node_index: offset + local,
                    point: GeoPoint::new(lons[m.position], lats[m.position]),
                    depth: selection.depths[m.position],
                    distance: m.distance,
                }
            })
            .collect();

        for (node, target) in resolved.iter().zip(targets) {
            debug!(
                target = %target.label(),
                strategy = %target.strategy,
                node = node.node_index,
                depth = node.depth,
                distance = node.distance,
                "Resolved target node"
            );
        }

        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::DepthConvention;
    use crate::target::SearchStrategy;

    fn mesh() -> Mesh {
        Mesh::new(
            vec![-79.0, -76.70, -76.60, -76.50, -76.40, -74.0],
            vec![34.0, 34.40, 34.48, 34.50, 34.52, 35.0],
            vec![-20.0, -20.1, -5.0, -19.9, -35.0, -20.0],
            DepthConvention::PositiveUp,
        )
        .unwrap()
    }

    #[test]
    fn test_resolve_maps_back_to_mesh_index() {
        let resolver = NodeResolver::new(ResolverOptions {
            window: Some((-76.72, -76.41)),
            ..Default::default()
        })
        .unwrap();

        // Window covers nodes 1..4; contour keeps local 2 (node 3) only,
        // local 0 (node 1) is skipped by the scan.
        assert_eq!(resolver.search_range(&mesh()), 1..4);

        let target = Target::new(-76.6, 34.5, SearchStrategy::NearestGeodesic);
        let resolved = resolver.resolve(&mesh(), &[target]).unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].node_index, 3);
        assert_eq!(resolved[0].candidate_position, 0);
        assert!((resolved[0].depth - 19.9).abs() < 1e-12);
    }

    #[test]
    fn test_resolve_without_contour_nodes() {
        let resolver = NodeResolver::new(ResolverOptions {
            band: ContourBand::new(100.0),
            ..Default::default()
        })
        .unwrap();
        let target = Target::new(-76.6, 34.5, SearchStrategy::NearestGeodesic);
        let err = resolver.resolve(&mesh(), &[target]).unwrap_err();
        assert!(matches!(err, ResolveError::NoNodeAtContour { .. }));
    }

    #[test]
    fn test_invalid_band_rejected() {
        let options = ResolverOptions {
            band: ContourBand {
                target_depth: 20.0,
                primary_tolerance: -1.0,
                fallback_tolerance: 3.0,
            },
            ..Default::default()
        };
        assert!(NodeResolver::new(options).is_err());
    }
}
