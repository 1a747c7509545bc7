//! Test data generators for synthetic mesh and model output.
//!
//! These generators create predictable, verifiable patterns so tests can
//! compute the expected node or value by hand.

/// Node arrays of a synthetic unstructured mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticMesh {
    pub lons: Vec<f64>,
    pub lats: Vec<f64>,
    /// Positive-down water depth in meters.
    pub depths: Vec<f64>,
}

impl SyntheticMesh {
    pub fn len(&self) -> usize {
        self.lons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lons.is_empty()
    }

    /// Depths flipped to bed elevation (negative below datum).
    pub fn elevations(&self) -> Vec<f64> {
        self.depths.iter().map(|d| -d).collect()
    }
}

/// Creates a sloping continental-shelf mesh over a bounding box.
///
/// Nodes are laid out on a regular `nx` x `ny` lattice and numbered column
/// by column from west to east, so any longitude range maps to a contiguous
/// node range. Depth is 0 m on the northern edge and grows linearly to
/// `max_depth` on the southern edge.
///
/// # Example
///
/// ```
/// use test_utils::shelf_mesh;
///
/// let mesh = shelf_mesh(3, 5, (-77.0, 34.0, -76.0, 35.0), 40.0);
/// assert_eq!(mesh.len(), 15);
/// assert_eq!(mesh.lons[0], -77.0);
/// assert_eq!(mesh.depths[0], 40.0); // south-west corner
/// assert_eq!(mesh.depths[4], 0.0);  // north-west corner
/// ```
pub fn shelf_mesh(
    nx: usize,
    ny: usize,
    bbox: (f64, f64, f64, f64),
    max_depth: f64,
) -> SyntheticMesh {
    let (min_lon, min_lat, max_lon, max_lat) = bbox;
    let dx = if nx > 1 { (max_lon - min_lon) / (nx - 1) as f64 } else { 0.0 };
    let dy = if ny > 1 { (max_lat - min_lat) / (ny - 1) as f64 } else { 0.0 };

    let mut mesh = SyntheticMesh {
        lons: Vec::with_capacity(nx * ny),
        lats: Vec::with_capacity(nx * ny),
        depths: Vec::with_capacity(nx * ny),
    };

    for col in 0..nx {
        for row in 0..ny {
            let lat = min_lat + row as f64 * dy;
            let fraction = if ny > 1 { row as f64 / (ny - 1) as f64 } else { 0.0 };
            mesh.lons.push(min_lon + col as f64 * dx);
            mesh.lats.push(lat);
            mesh.depths.push(max_depth * (1.0 - fraction));
        }
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shelf_mesh_layout() {
        let mesh = shelf_mesh(4, 3, (-78.0, 34.0, -75.0, 35.0), 30.0);
        assert_eq!(mesh.len(), 12);
        // Column-major: first three nodes share the western longitude.
        assert_eq!(&mesh.lons[0..3], &[-78.0, -78.0, -78.0]);
        assert_eq!(mesh.lons[3], -77.0);
        assert_eq!(&mesh.depths[0..3], &[30.0, 15.0, 0.0]);
    }

    #[test]
    fn test_shelf_mesh_elevations() {
        let mesh = shelf_mesh(1, 2, (-76.0, 34.0, -76.0, 35.0), 10.0);
        assert_eq!(mesh.elevations(), vec![-10.0, 0.0]);
    }
}
