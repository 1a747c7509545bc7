//! Common types and utilities shared across the ADCIRC extraction workspace.

pub mod bbox;
pub mod datum;
pub mod error;
pub mod geo;
pub mod time;

pub use bbox::BoundingBox;
pub use datum::VerticalDatum;
pub use error::{AdcircError, AdcircResult};
pub use geo::GeoPoint;
pub use time::{date_range, parse_calendar_date, run_dates, OutputZone, RunDate, TimeBase};
