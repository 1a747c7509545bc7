//! Extractor configuration.
//!
//! Loaded from a YAML file; every field has a default, so an empty file (or
//! no file at all) gives the Carteret County setup with the two Core Banks
//! wells.

use std::path::Path;
use std::time::Duration;

use adcirc_common::{BoundingBox, GeoPoint, OutputZone, VerticalDatum};
use adcirc_common::datum::MSL_TO_NAVD88_M;
use anyhow::{bail, Context, Result};
use node_resolver::{ContourBand, MatchMode, ResolverOptions, SearchStrategy, Target};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{CutoffRule, GridRule, DEFAULT_BASE_URL};

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    #[serde(default)]
    pub source: SourceConfig,
    /// Study area; its longitude span bounds the node search.
    #[serde(default)]
    pub area: BoundingBox,
    #[serde(default = "default_wells")]
    pub wells: Vec<Target>,
    #[serde(default)]
    pub contour: ContourBand,
    #[serde(default)]
    pub match_mode: MatchMode,
    #[serde(default)]
    pub cycles: CycleConfig,
    #[serde(default)]
    pub hsofs: HsofsConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Where runs are read from and how their grid is decided.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// OPeNDAP base URL or local mirror directory.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub grid_rule: GridRule,
    #[serde(default)]
    pub cutoff: CutoffRule,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout() -> u64 {
    60
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            grid_rule: GridRule::default(),
            cutoff: CutoffRule::default(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl SourceConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Cycle hours tried for every day of a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleConfig {
    #[serde(default = "default_forecast_cycles")]
    pub forecast: Vec<u32>,
    #[serde(default = "default_maxima_cycles")]
    pub maxima: Vec<u32>,
}

fn default_forecast_cycles() -> Vec<u32> {
    vec![0, 6, 12, 18]
}

fn default_maxima_cycles() -> Vec<u32> {
    vec![0, 12]
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            forecast: default_forecast_cycles(),
            maxima: default_maxima_cycles(),
        }
    }
}

/// Node lookup on the hsofs mesh.
///
/// When `reference_points` is set, those coordinates (nodes previously
/// matched on nc6b) are snapped to the nearest hsofs nodes. Otherwise the
/// nodes resolved on the last nc6b run of the session are used, and failing
/// that the wells are resolved directly on hsofs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HsofsConfig {
    #[serde(default)]
    pub reference_points: Vec<GeoPoint>,
    /// Reject matches further than this many meters.
    #[serde(default)]
    pub max_distance_m: Option<f64>,
}

/// CSV presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub zone: OutputZone,
    #[serde(default)]
    pub datum: VerticalDatum,
    #[serde(default = "default_navd88_offset")]
    pub navd88_offset_m: f64,
    #[serde(default = "default_bad_dates_log")]
    pub bad_dates_log: String,
}

fn default_navd88_offset() -> f64 {
    MSL_TO_NAVD88_M
}

fn default_bad_dates_log() -> String {
    "bad_dates_log.txt".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            zone: OutputZone::default(),
            datum: VerticalDatum::default(),
            navd88_offset_m: default_navd88_offset(),
            bad_dates_log: default_bad_dates_log(),
        }
    }
}

/// Shackleford Banks and South Core Banks.
fn default_wells() -> Vec<Target> {
    vec![
        Target::new(-76.552499, 34.64928, SearchStrategy::NearestGeodesic)
            .named("Shackleford Banks"),
        Target::new(-76.496324, 34.661199, SearchStrategy::NearestLatitude)
            .named("South Core Banks"),
    ]
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            area: BoundingBox::default(),
            wells: default_wells(),
            contour: ContourBand::default(),
            match_mode: MatchMode::default(),
            cycles: CycleConfig::default(),
            hsofs: HsofsConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl ExtractorConfig {
    /// Load a configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        debug!(path = %path.display(), wells = config.wells.len(), "Loaded extractor config");
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty document deserializes to null rather than an empty map.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Reject settings that would make every run fail.
    pub fn validate(&self) -> Result<()> {
        if !self.area.is_valid() {
            bail!("area bounding box is inverted or empty: {:?}", self.area);
        }
        if self.wells.is_empty() {
            bail!("at least one well is required");
        }
        for well in &self.wells {
            let point = well.point();
            if !point.is_finite() {
                bail!("well {} has non-finite coordinates", well.label());
            }
            if !self.area.contains(point.lon, point.lat) {
                bail!("well {} lies outside the study area {:?}", well.label(), self.area);
            }
        }
        self.contour.validate()?;
        for &hour in self.cycles.forecast.iter().chain(&self.cycles.maxima) {
            if hour > 23 {
                bail!("cycle hour {} is not in 0..=23", hour);
            }
        }
        if !self.output.navd88_offset_m.is_finite() {
            bail!("navd88_offset_m must be finite");
        }
        if let Some(i) = self.hsofs.reference_points.iter().position(|p| !p.is_finite()) {
            bail!("hsofs.reference_points[{}] has non-finite coordinates", i);
        }
        let references = self.hsofs.reference_points.len();
        if references != 0 && references != self.wells.len() {
            bail!(
                "hsofs.reference_points has {} points but {} wells are configured",
                references,
                self.wells.len()
            );
        }
        if let Some(limit) = self.hsofs.max_distance_m {
            if limit.is_nan() || limit <= 0.0 {
                bail!("hsofs.max_distance_m must be positive, got {}", limit);
            }
        }
        Ok(())
    }

    /// Resolver settings: contour band, match mode and the area's longitude span.
    pub fn resolver_options(&self) -> ResolverOptions {
        ResolverOptions {
            band: self.contour,
            mode: self.match_mode,
            window: Some((self.area.min_lon, self.area.max_lon)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        let config = ExtractorConfig::from_yaml("").unwrap();
        assert_eq!(config, ExtractorConfig::default());
        assert_eq!(config.wells.len(), 2);
        assert_eq!(config.cycles.forecast, vec![0, 6, 12, 18]);
        assert_eq!(config.output.navd88_offset_m, 0.118);
        config.validate().unwrap();
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
source:
  base_url: /data/adcirc-mirror
  grid_rule: cutoff
  cutoff:
    nc6b_before: "2017080300"
    hsofs_exceptions: ["2017091500", "2017092000"]

area:
  min_lon: -77.5
  min_lat: 34.2
  max_lon: -76.0
  max_lat: 35.0

wells:
  - name: Shackleford Banks
    lon: -76.552499
    lat: 34.64928
    strategy: DIAG
  - lon: -76.496324
    lat: 34.661199
    strategy: nearest-latitude

contour:
  target_depth: 15.0

match_mode: legacy

cycles:
  maxima: [0]

hsofs:
  reference_points:
    - { lon: -76.55, lat: 34.60 }
    - { lon: -76.49, lat: 34.62 }
  max_distance_m: 2000.0

output:
  zone: est
  datum: navd88
"#;

        let config = ExtractorConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.source.grid_rule, GridRule::Cutoff);
        assert_eq!(config.source.cutoff.hsofs_exceptions.len(), 2);
        assert_eq!(config.wells[0].strategy, SearchStrategy::NearestGeodesic);
        assert_eq!(config.wells[1].name, None);
        assert_eq!(config.contour.target_depth, 15.0);
        assert_eq!(config.contour.primary_tolerance, 0.5);
        assert_eq!(config.match_mode, MatchMode::Legacy);
        assert_eq!(config.cycles.forecast, vec![0, 6, 12, 18]);
        assert_eq!(config.cycles.maxima, vec![0]);
        assert_eq!(config.hsofs.reference_points.len(), 2);
        assert_eq!(config.output.zone, OutputZone::Est);
        assert_eq!(config.output.bad_dates_log, "bad_dates_log.txt");
        config.validate().unwrap();

        let options = config.resolver_options();
        assert_eq!(options.window, Some((-77.5, -76.0)));
    }

    #[test]
    fn test_sample_config_matches_defaults() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/extractor.yaml");
        let config = ExtractorConfig::load(&path).unwrap();
        assert_eq!(config, ExtractorConfig::default());
    }

    #[test]
    fn test_missing_file() {
        let err = ExtractorConfig::load(Path::new("/nonexistent/extractor.yaml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_bad_run_date_in_cutoff() {
        let yaml = "source:\n  cutoff:\n    nc6b_before: \"2017-08-03\"\n";
        assert!(ExtractorConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_validate_rejects() {
        let mut config = ExtractorConfig::default();
        config.wells.clear();
        assert!(config.validate().is_err());

        let mut config = ExtractorConfig::default();
        config.cycles.forecast.push(24);
        assert!(config.validate().is_err());

        let mut config = ExtractorConfig::default();
        config.hsofs.max_distance_m = Some(0.0);
        assert!(config.validate().is_err());

        let mut config = ExtractorConfig::default();
        config.hsofs.max_distance_m = Some(f64::NAN);
        assert!(config.validate().is_err());

        let mut config = ExtractorConfig::default();
        config.hsofs.reference_points = vec![GeoPoint::new(-76.55, 34.6)];
        assert!(config.validate().is_err());

        let mut config = ExtractorConfig::default();
        config.wells[1] = Target::new(-80.0, 34.6, SearchStrategy::NearestLatitude);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("outside the study area"));
    }

    #[test]
    fn test_nan_reference_point_rejected_at_load() {
        let yaml = "hsofs:\n  reference_points:\n    - { lon: -76.55, lat: .nan }\n    - { lon: -76.49, lat: 34.62 }\n";
        let config = ExtractorConfig::from_yaml(yaml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("reference_points[0]"));
    }

    #[test]
    fn test_unquoted_cutoff_date() {
        let yaml = "source:\n  cutoff:\n    nc6b_before: 2017080300\n    hsofs_exceptions: [2017091500]\n";
        let config = ExtractorConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.source.cutoff, CutoffRule::default());
    }
}
