//! Vertical datum conversion for depth and water-surface elevation.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AdcircError;

/// MSL to NAVD88 offset for the Beaufort Inlet area, in meters.
pub const MSL_TO_NAVD88_M: f64 = 0.118;

/// Vertical reference used for the Depth and Elevation columns.
///
/// Model output is relative to mean sea level. Wave height and period are
/// not referenced to a datum and are never shifted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalDatum {
    #[default]
    Msl,
    Navd88,
}

impl VerticalDatum {
    pub fn label(&self) -> &'static str {
        match self {
            VerticalDatum::Msl => "MSL",
            VerticalDatum::Navd88 => "NAVD88",
        }
    }

    /// Shift an MSL-referenced value by `offset` when this datum is NAVD88.
    pub fn apply(&self, value: f64, offset: f64) -> f64 {
        match self {
            VerticalDatum::Msl => value,
            VerticalDatum::Navd88 => value + offset,
        }
    }
}

impl FromStr for VerticalDatum {
    type Err = AdcircError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "msl" => Ok(VerticalDatum::Msl),
            "navd88" | "navd" => Ok(VerticalDatum::Navd88),
            other => Err(AdcircError::invalid_parameter(
                "datum",
                format!("'{}' is not one of msl, navd88", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_offset() {
        assert_eq!(VerticalDatum::Msl.apply(1.5, MSL_TO_NAVD88_M), 1.5);
        assert!((VerticalDatum::Navd88.apply(1.5, MSL_TO_NAVD88_M) - 1.618).abs() < 1e-12);
    }

    #[test]
    fn test_parse_datum() {
        assert_eq!("NAVD88".parse::<VerticalDatum>().unwrap(), VerticalDatum::Navd88);
        assert_eq!("msl".parse::<VerticalDatum>().unwrap(), VerticalDatum::Msl);
        assert!("ngvd29".parse::<VerticalDatum>().is_err());
    }
}
