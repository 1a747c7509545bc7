//! Mesh node resolution for fixed coastal monitoring locations
//!
//! Given the node arrays of an ADCIRC mesh and a set of target locations
//! (beach wells, gauges), this crate picks, for every target, the mesh node
//! that lies near a chosen depth contour and is closest to the target.
//!
//! # Pipeline
//!
//! 1. Optionally narrow the mesh to a contiguous longitude window
//!    ([`Mesh::longitude_window`]).
//! 2. Keep the nodes whose depth is near the contour ([`select_near_contour`]).
//! 3. Match each target against that subset with its own strategy
//!    ([`match_targets`]).
//!
//! [`NodeResolver`] runs all three steps and maps the result back to full-mesh
//! indices. [`match_across_meshes`] carries resolved coordinates over to a
//! second mesh with different node numbering.
//!
//! # Example
//!
//! ```rust
//! use node_resolver::{DepthConvention, Mesh, NodeResolver, SearchStrategy, Target};
//!
//! let mesh = Mesh::new(
//!     vec![-76.70, -76.60, -76.50],
//!     vec![34.40, 34.48, 34.50],
//!     vec![20.1, 19.8, 20.2],
//!     DepthConvention::PositiveDown,
//! )
//! .unwrap();
//!
//! let wells = [Target::new(-76.552499, 34.64928, SearchStrategy::NearestGeodesic).named("Shackleford Banks")];
//! let nodes = NodeResolver::default().resolve(&mesh, &wells).unwrap();
//! assert_eq!(nodes.len(), 1);
//! ```

pub mod contour;
pub mod cross_mesh;
pub mod error;
pub mod matcher;
pub mod mesh;
pub mod resolver;
pub mod target;

pub use contour::{select_near_contour, BandUsed, ContourBand, ContourSelection};
pub use cross_mesh::{match_across_meshes, CrossMeshMatch};
pub use error::{ResolveError, ResolveResult};
pub use matcher::{match_targets, match_targets_with, MatchMode, NodeMatch};
pub use mesh::{DepthConvention, Mesh, MeshNode};
pub use resolver::{NodeResolver, ResolvedNode, ResolverOptions};
pub use target::{SearchStrategy, Target};
