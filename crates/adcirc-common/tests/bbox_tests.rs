//! Tests for BoundingBox parsing and containment.

use adcirc_common::bbox::{BboxParseError, BoundingBox};

// ============================================================================
// Constructor tests
// ============================================================================

#[test]
fn test_bbox_new() {
    let bbox = BoundingBox::new(-78.0, 34.0, -75.0, 35.0);
    assert_eq!(bbox.min_lon, -78.0);
    assert_eq!(bbox.min_lat, 34.0);
    assert_eq!(bbox.max_lon, -75.0);
    assert_eq!(bbox.max_lat, 35.0);
}

#[test]
fn test_default_is_study_area() {
    let bbox = BoundingBox::default();
    assert_eq!(bbox, BoundingBox::carteret());
    assert!(bbox.is_valid());
}

// ============================================================================
// FromStr tests
// ============================================================================

#[test]
fn test_parse_with_whitespace() {
    let bbox: BoundingBox = " -78.148505, 34.206229 ,-75.245367,35.132368".parse().unwrap();
    assert_eq!(bbox, BoundingBox::carteret());
}

#[test]
fn test_parse_wrong_arity() {
    let result = "-78,34,-75".parse::<BoundingBox>();
    assert!(matches!(result, Err(BboxParseError::InvalidFormat(_))));
}

#[test]
fn test_parse_bad_number() {
    let result = "-78,34,east,35".parse::<BoundingBox>();
    match result {
        Err(BboxParseError::InvalidNumber(part)) => assert_eq!(part, "east"),
        other => panic!("Expected InvalidNumber, got {:?}", other),
    }
}

#[test]
fn test_parse_inverted() {
    let result = "-75,35,-78,34".parse::<BoundingBox>();
    assert!(matches!(result, Err(BboxParseError::Inverted(_))));
}

// ============================================================================
// Containment tests
// ============================================================================

#[test]
fn test_contains_edges_inclusive() {
    let bbox = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
    assert!(bbox.contains(0.0, 0.0));
    assert!(bbox.contains(1.0, 1.0));
    assert!(bbox.contains(0.5, 0.5));
    assert!(!bbox.contains(1.0001, 0.5));
    assert!(!bbox.contains(0.5, -0.0001));
}

#[test]
fn test_contains_nan_is_false() {
    let bbox = BoundingBox::default();
    assert!(!bbox.contains(f64::NAN, 34.5));
}
