//! Target locations and the distance strategy used to match each one.

use std::fmt;
use std::str::FromStr;

use adcirc_common::GeoPoint;
use serde::{Deserialize, Serialize};

use crate::error::ResolveError;

/// How "closest" is judged for a target.
///
/// The short aliases are the shoreline-orientation tags of the
/// well sheets: an east-west beach matches on longitude, a north-south
/// beach on latitude, and a diagonal beach on true distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchStrategy {
    #[serde(alias = "EW", alias = "ew")]
    NearestLongitude,
    #[serde(alias = "NS", alias = "ns")]
    NearestLatitude,
    #[serde(alias = "DIAG", alias = "diag")]
    NearestGeodesic,
}

impl SearchStrategy {
    /// Distance from `target` to `candidate` under this strategy.
    ///
    /// Longitude and latitude strategies return degrees; the geodesic
    /// strategy returns meters. Values are only compared within one target.
    pub fn distance(&self, target: &GeoPoint, candidate: &GeoPoint) -> f64 {
        match self {
            SearchStrategy::NearestLongitude => (candidate.lon - target.lon).abs(),
            SearchStrategy::NearestLatitude => (candidate.lat - target.lat).abs(),
            SearchStrategy::NearestGeodesic => target.distance_to(candidate),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchStrategy::NearestLongitude => "nearest-longitude",
            SearchStrategy::NearestLatitude => "nearest-latitude",
            SearchStrategy::NearestGeodesic => "nearest-geodesic",
        }
    }
}

impl fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchStrategy {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nearest-longitude" | "ew" => Ok(SearchStrategy::NearestLongitude),
            "nearest-latitude" | "ns" => Ok(SearchStrategy::NearestLatitude),
            "nearest-geodesic" | "diag" => Ok(SearchStrategy::NearestGeodesic),
            other => Err(ResolveError::InvalidParameter(format!(
                "unknown search strategy '{}'",
                other
            ))),
        }
    }
}

/// A fixed location whose nearest mesh node is wanted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    #[serde(default)]
    pub name: Option<String>,
    pub lon: f64,
    pub lat: f64,
    pub strategy: SearchStrategy,
}

impl Target {
    pub fn new(lon: f64, lat: f64, strategy: SearchStrategy) -> Self {
        Self {
            name: None,
            lon,
            lat,
            strategy,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lon, self.lat)
    }

    /// Name for log lines, falling back to the coordinates.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("({:.6}, {:.6})", self.lon, self.lat),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_aliases() {
        assert_eq!("DIAG".parse::<SearchStrategy>().unwrap(), SearchStrategy::NearestGeodesic);
        assert_eq!("ns".parse::<SearchStrategy>().unwrap(), SearchStrategy::NearestLatitude);
        assert_eq!(
            "nearest-longitude".parse::<SearchStrategy>().unwrap(),
            SearchStrategy::NearestLongitude
        );
        assert!("nearest-depth".parse::<SearchStrategy>().is_err());
    }

    #[test]
    fn test_axis_distances_ignore_other_axis() {
        let target = GeoPoint::new(-76.5, 34.6);
        let far_north = GeoPoint::new(-76.4, 40.0);
        assert!((SearchStrategy::NearestLongitude.distance(&target, &far_north) - 0.1).abs() < 1e-9);
        assert!((SearchStrategy::NearestLatitude.distance(&target, &far_north) - 5.4).abs() < 1e-9);
    }

    #[test]
    fn test_deserialize_target_with_alias() {
        let yaml = "name: South Core Banks\nlon: -76.496324\nlat: 34.661199\nstrategy: NS\n";
        let target: Target = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(target.strategy, SearchStrategy::NearestLatitude);
        assert_eq!(target.label(), "South Core Banks");
    }
}
