//! Behavioural tests for contour selection, target matching and cross-mesh
//! relocation.

use adcirc_common::GeoPoint;
use node_resolver::{
    match_across_meshes, match_targets, match_targets_with, select_near_contour, BandUsed,
    ContourBand, DepthConvention, MatchMode, Mesh, NodeResolver, ResolveError, ResolverOptions,
    SearchStrategy, Target,
};
use test_utils::{assert_approx_eq, assert_coords_approx_eq, fixtures, shelf_mesh};

fn geodesic(lon: f64, lat: f64) -> Target {
    Target::new(lon, lat, SearchStrategy::NearestGeodesic)
}

#[test]
fn test_narrow_band_hits_exclude_node_zero() {
    let depths = [20.2, 5.0, 19.6, 22.0, 20.49, 17.5];
    let sel = select_near_contour(&depths, 20.0, 0.5, 3.0);
    assert_eq!(sel.band, BandUsed::Primary);
    assert_eq!(sel.indices, vec![2, 4]);
    // 22.0 lies in the wide band but is ignored once the narrow band has hits.
    assert!(!sel.indices.contains(&3));
}

#[test]
fn test_wide_band_used_when_narrow_is_empty() {
    let depths = [20.0, 17.1, 40.0, 22.9, 21.0];
    let sel = select_near_contour(&depths, 20.0, 0.5, 3.0);
    assert_eq!(sel.band, BandUsed::Fallback);
    assert_eq!(sel.indices, vec![1, 3, 4]);
    assert_eq!(sel.depths, vec![17.1, 22.9, 21.0]);
}

#[test]
fn test_no_band_hits_gives_empty_selection() {
    let depths = [20.0, 1.0, 40.0, 17.0, 23.0];
    let sel = select_near_contour(&depths, 20.0, 0.5, 3.0);
    assert!(sel.indices.is_empty());
    assert!(sel.depths.is_empty());
    assert_eq!(sel.band, BandUsed::None);
}

#[test]
fn test_equidistant_target_picks_lower_position() {
    let idx = [7, 9];
    let lons = [-76.75, -76.25];
    let lats = [34.5, 34.5];
    let t = [geodesic(-76.5, 34.5)];
    assert_eq!(match_targets(&idx, &lons, &lats, &t).unwrap(), vec![0]);

    let lats = [34.25, 34.75];
    let t = [Target::new(-76.5, 34.5, SearchStrategy::NearestLatitude)];
    assert_eq!(match_targets(&idx, &[-76.5, -76.5], &lats, &t).unwrap(), vec![0]);
}

#[test]
fn test_coincident_target_has_zero_distance() {
    let idx = [0, 1, 2];
    let lons = [-76.70, -76.60, -76.50];
    let lats = [34.40, 34.48, 34.50];
    let matches =
        match_targets_with(MatchMode::Geodesic, &idx, &lons, &lats, &[geodesic(-76.60, 34.48)])
            .unwrap();
    assert_eq!(matches[0].position, 1);
    assert_eq!(matches[0].distance, 0.0);
}

#[test]
fn test_shackleford_example_by_mode() {
    let idx = [0, 1, 2];
    let lons = [-76.70, -76.60, -76.50];
    let lats = [34.40, 34.48, 34.50];
    let well = [geodesic(-76.552499, 34.64928)];

    // Historical scan skips candidate 0 and reports its own position.
    let legacy = match_targets_with(MatchMode::Legacy, &idx, &lons, &lats, &well).unwrap();
    assert_eq!(legacy[0].position, 1);

    // True nearest by great-circle distance.
    let modern = match_targets(&idx, &lons, &lats, &well).unwrap();
    assert_eq!(modern, vec![2]);
}

#[test]
fn test_cross_mesh_exact_duplicate() {
    let mesh = Mesh::new(
        vec![-76.70, -76.60, -76.6601, -76.50],
        vec![34.40, 34.48, 34.482, 34.50],
        vec![18.0, 19.0, 20.0, 21.0],
        DepthConvention::PositiveDown,
    )
    .unwrap();

    let point = GeoPoint::from_lat_lon(34.482, -76.6601);
    let matches = match_across_meshes(&[point], &mesh, None).unwrap();
    assert_eq!(matches[0].node_index, 2);
    assert_eq!(matches[0].distance_m, 0.0);
}

#[test]
fn test_resolver_on_shelf_mesh() {
    // 31 columns x 21 rows over Carteret, 0 m at the coast to 40 m offshore.
    let synthetic = shelf_mesh(31, 21, fixtures::bbox::CARTERET, 40.0);
    let mesh = Mesh::new(
        synthetic.lons.clone(),
        synthetic.lats.clone(),
        synthetic.elevations(),
        DepthConvention::PositiveUp,
    )
    .unwrap();

    let (_, lon, lat, tag) = fixtures::wells::SOUTH_CORE_BANKS;
    let strategy: SearchStrategy = tag.parse().unwrap();
    let target = Target::new(lon, lat, strategy);

    let (min_lon, _, max_lon, _) = fixtures::bbox::CARTERET;
    let resolver = NodeResolver::new(ResolverOptions {
        band: ContourBand::new(20.0),
        mode: MatchMode::Geodesic,
        window: Some((min_lon, max_lon)),
    })
    .unwrap();

    let nodes = resolver.resolve(&mesh, &[target]).unwrap();
    let node = &nodes[0];
    assert!((node.depth - 20.0).abs() < 0.5);
    assert_coords_approx_eq!(
        (node.point.lon, node.point.lat),
        (synthetic.lons[node.node_index], synthetic.lats[node.node_index]),
        1e-12
    );
    assert_approx_eq!(-mesh.depths()[node.node_index], node.depth, 1e-12);
}

#[test]
fn test_resolver_reports_missing_contour() {
    let synthetic = shelf_mesh(5, 5, fixtures::bbox::CARTERET, 10.0);
    let mesh = Mesh::new(
        synthetic.lons,
        synthetic.lats,
        synthetic.depths,
        DepthConvention::PositiveDown,
    )
    .unwrap();

    let err = NodeResolver::default()
        .resolve(&mesh, &[geodesic(-76.5, 34.6)])
        .unwrap_err();
    assert_eq!(
        err,
        ResolveError::NoNodeAtContour {
            target_depth: 20.0,
            tolerance: 3.0
        }
    );
}
