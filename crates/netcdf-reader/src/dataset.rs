//! ADCIRC/SWAN dataset access.
//!
//! ADCIRC writes one netCDF file per product. All of them share the mesh
//! coordinates (`x`, `y`, `depth`, dimensioned by `node`) and a `time` axis;
//! the product variable is either `(time, node)` for time series or
//! `(node)` for maxima. Remote datasets are read through OPeNDAP by passing
//! the URL instead of a path.

use std::ops::Range;

use adcirc_common::TimeBase;
use chrono::{DateTime, Utc};
use netcdf::AttributeValue;
use tracing::debug;

use crate::error::{NetCdfError, NetCdfResult};
use crate::silence_hdf5_errors;

/// Node coordinate and depth arrays over a contiguous node range.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshArrays {
    pub lons: Vec<f64>,
    pub lats: Vec<f64>,
    /// Depth as stored in the file (positive-down for ADCIRC).
    pub depths: Vec<f64>,
}

impl MeshArrays {
    pub fn len(&self) -> usize {
        self.lons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lons.is_empty()
    }
}

/// An open ADCIRC product file or OPeNDAP endpoint.
pub struct AdcircDataset {
    file: netcdf::File,
    source: String,
}

impl std::fmt::Debug for AdcircDataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdcircDataset")
            .field("source", &self.source)
            .finish()
    }
}

impl AdcircDataset {
    /// Open a local path or an OPeNDAP URL.
    pub fn open(source: &str) -> NetCdfResult<Self> {
        silence_hdf5_errors();

        let file = netcdf::open(source).map_err(|e| NetCdfError::Open {
            source_name: source.to_string(),
            message: e.to_string(),
        })?;
        debug!(source = %source, "Opened dataset");

        Ok(Self {
            file,
            source: source.to_string(),
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.file.variable(name).is_some()
    }

    /// Number of mesh nodes.
    pub fn node_count(&self) -> NetCdfResult<usize> {
        if let Some(dim) = self.file.dimension("node") {
            return Ok(dim.len());
        }
        Ok(self.variable("x")?.len())
    }

    /// Number of entries on the time axis, 0 when the file has none.
    pub fn time_len(&self) -> usize {
        self.file.dimension("time").map(|d| d.len()).unwrap_or(0)
    }

    /// Read `x`, `y` and `depth` over `range` (clamped to the node count).
    pub fn read_mesh(&self, range: Range<usize>) -> NetCdfResult<MeshArrays> {
        let n = self.node_count()?;
        let end = range.end.min(n);
        let start = range.start.min(end);

        Ok(MeshArrays {
            lons: self.read_1d("x", start..end)?,
            lats: self.read_1d("y", start..end)?,
            depths: self.read_1d("depth", start..end)?,
        })
    }

    /// Parse the `units` attribute of the time variable.
    pub fn time_base(&self) -> NetCdfResult<TimeBase> {
        let var = self.variable("time")?;
        let units = match var.attribute_value("units") {
            Some(Ok(AttributeValue::Str(s))) => s,
            Some(Ok(other)) => {
                return Err(NetCdfError::InvalidFormat(format!(
                    "time:units is not a string: {:?}",
                    other
                )))
            }
            Some(Err(e)) => return Err(NetCdfError::read("time:units", e)),
            None => return Err(NetCdfError::MissingData("time:units attribute".to_string())),
        };
        Ok(TimeBase::from_units(&units)?)
    }

    /// Raw values of the time axis.
    pub fn time_values(&self) -> NetCdfResult<Vec<f64>> {
        let var = self.variable("time")?;
        var.get_values::<f64, _>(..)
            .map_err(|e| NetCdfError::read("time", e))
    }

    /// Absolute model times for every time step.
    pub fn model_times(&self) -> NetCdfResult<Vec<DateTime<Utc>>> {
        let base = self.time_base()?;
        self.time_values()?
            .into_iter()
            .map(|v| base.at(v).map_err(NetCdfError::from))
            .collect()
    }

    /// Values of `name` over a node range.
    ///
    /// `(time, node)` variables are read at `time_step` (step 0 when `None`);
    /// `(node)` variables ignore it. Fill values and NaN come back as `None`.
    pub fn read_nodes(
        &self,
        name: &str,
        time_step: Option<usize>,
        range: Range<usize>,
    ) -> NetCdfResult<Vec<Option<f64>>> {
        let var = self.variable(name)?;
        let dims = var.dimensions();
        let node_len = dims.last().map(|d| d.len()).unwrap_or(0);
        if range.end > node_len {
            return Err(NetCdfError::OutOfRange {
                what: "node",
                index: range.end.saturating_sub(1),
                len: node_len,
            });
        }
        if range.is_empty() {
            return Ok(Vec::new());
        }

        let raw = match dims.len() {
            1 => var.get_values::<f64, _>([range.clone()]),
            2 => {
                let t = time_step.unwrap_or(0);
                let steps = dims[0].len();
                if t >= steps {
                    return Err(NetCdfError::OutOfRange {
                        what: "time step",
                        index: t,
                        len: steps,
                    });
                }
                var.get_values::<f64, _>((t, range.clone()))
            }
            n => {
                return Err(NetCdfError::InvalidFormat(format!(
                    "{} has {} dimensions, expected (node) or (time, node)",
                    name, n
                )))
            }
        }
        .map_err(|e| NetCdfError::read(name, e))?;

        let fill = fill_value(&var);
        Ok(raw.into_iter().map(|v| mask(v, fill)).collect())
    }

    /// Values of `name` at arbitrary full-mesh node indices, in the order given.
    ///
    /// Reads the smallest contiguous span covering every index.
    pub fn read_at_nodes(
        &self,
        name: &str,
        time_step: Option<usize>,
        nodes: &[usize],
    ) -> NetCdfResult<Vec<Option<f64>>> {
        let (Some(&first), Some(&last)) = (nodes.iter().min(), nodes.iter().max()) else {
            return Ok(Vec::new());
        };
        let span = self.read_nodes(name, time_step, first..last + 1)?;
        Ok(nodes.iter().map(|&n| span[n - first]).collect())
    }

    fn variable(&self, name: &str) -> NetCdfResult<netcdf::Variable<'_>> {
        self.file
            .variable(name)
            .ok_or_else(|| NetCdfError::MissingData(format!("{} variable", name)))
    }

    fn read_1d(&self, name: &str, range: Range<usize>) -> NetCdfResult<Vec<f64>> {
        if range.is_empty() {
            return Ok(Vec::new());
        }
        self.variable(name)?
            .get_values::<f64, _>([range])
            .map_err(|e| NetCdfError::read(name, e))
    }
}

/// Check if a variable has an attribute with the given name.
/// This avoids HDF5 error spam when checking for optional attributes.
fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

fn get_f64_attr(var: &netcdf::Variable, name: &str) -> Option<f64> {
    if !has_attr(var, name) {
        return None;
    }
    let attr_value = var.attribute_value(name)?.ok()?;
    f64::try_from(attr_value).ok()
}

fn fill_value(var: &netcdf::Variable) -> Option<f64> {
    get_f64_attr(var, "_FillValue").or_else(|| get_f64_attr(var, "missing_value"))
}

fn mask(value: f64, fill: Option<f64>) -> Option<f64> {
    if value.is_nan() || fill == Some(value) {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask() {
        assert_eq!(mask(1.5, Some(-99999.0)), Some(1.5));
        assert_eq!(mask(-99999.0, Some(-99999.0)), None);
        assert_eq!(mask(f64::NAN, None), None);
        assert_eq!(mask(-99999.0, None), Some(-99999.0));
    }

    #[test]
    fn test_open_missing_file() {
        let err = AdcircDataset::open("/nonexistent/fort.63.nc").unwrap_err();
        assert!(matches!(err, NetCdfError::Open { .. }));
    }
}
