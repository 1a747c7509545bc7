//! Re-locating already-resolved nodes on a differently numbered mesh.
//!
//! When a run is published on another grid, node numbers from the first mesh
//! mean nothing on the second. The coordinates of the previously matched
//! nodes are carried over instead and snapped to the nearest node of the new
//! mesh by great-circle distance.

use adcirc_common::GeoPoint;

use crate::error::{ResolveError, ResolveResult};
use crate::matcher::first_minimum;
use crate::mesh::Mesh;

/// The node of the second mesh nearest to one input point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossMeshMatch {
    /// Index within the mesh that was searched.
    pub node_index: usize,
    pub distance_m: f64,
}

/// Find, for each point, the globally nearest node of `mesh`.
///
/// With `max_distance_m = None` every point is matched no matter how far the
/// nearest node is. With `Some(limit)`, a nearest node further than `limit`
/// meters is reported as [`ResolveError::MatchTooFar`].
pub fn match_across_meshes(
    points: &[GeoPoint],
    mesh: &Mesh,
    max_distance_m: Option<f64>,
) -> ResolveResult<Vec<CrossMeshMatch>> {
    if mesh.is_empty() {
        return Err(ResolveError::NoCandidates);
    }

    let nodes: Vec<GeoPoint> = mesh
        .lons()
        .iter()
        .zip(mesh.lats())
        .map(|(&lon, &lat)| GeoPoint::new(lon, lat))
        .collect();

    points
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let (node_index, distance_m) =
                first_minimum(nodes.iter().map(|node| point.distance_to(node)))
                    .ok_or(ResolveError::UnmatchedTarget { target: i })?;

            if let Some(limit_m) = max_distance_m {
                if distance_m > limit_m {
                    return Err(ResolveError::MatchTooFar {
                        point: i,
                        distance_m,
                        limit_m,
                    });
                }
            }

            Ok(CrossMeshMatch {
                node_index,
                distance_m,
            })
        })
        .collect()
}
