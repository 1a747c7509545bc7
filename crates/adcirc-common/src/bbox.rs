//! Geographic bounding box for the study area.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A geographic bounding box in degrees (EPSG:4326, longitude east-positive).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// The Carteret County study area (Bogue Banks to Cape Lookout).
    pub fn carteret() -> Self {
        Self::new(-78.148505, 34.206229, -75.245367, 35.132368)
    }

    /// Check if a point is contained within this bbox (edges inclusive).
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }

    /// Check that min corners are below max corners.
    pub fn is_valid(&self) -> bool {
        self.min_lon < self.max_lon && self.min_lat < self.max_lat
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::carteret()
    }
}

impl FromStr for BoundingBox {
    type Err = BboxParseError;

    /// Parse "min_lon,min_lat,max_lon,max_lat".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(BboxParseError::InvalidFormat(s.to_string()));
        }

        let mut values = [0.0f64; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| BboxParseError::InvalidNumber(part.to_string()))?;
        }

        let bbox = Self::new(values[0], values[1], values[2], values[3]);
        if !bbox.is_valid() {
            return Err(BboxParseError::Inverted(s.to_string()));
        }
        Ok(bbox)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BboxParseError {
    #[error("Invalid bounding box format: {0}. Expected 'min_lon,min_lat,max_lon,max_lat'")]
    InvalidFormat(String),

    #[error("Invalid number in bounding box: {0}")]
    InvalidNumber(String),

    #[error("Bounding box corners are inverted: {0}")]
    Inverted(String),
}
