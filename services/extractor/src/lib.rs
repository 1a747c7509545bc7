//! ADCIRC+SWAN well extraction.
//!
//! Finds the daily NAM-forced runs on the RENCI THREDDS server (or a local
//! mirror of it), picks the mesh nodes offshore of each monitoring well and
//! writes their wave height, peak period and water level to CSV.

pub mod catalog;
pub mod config;
pub mod extract;
pub mod output;

pub use catalog::{Catalog, DataSource, GridRule, GridVariant, RunKind};
pub use config::ExtractorConfig;
pub use extract::{ExtractionSummary, Extractor, NodeSample, NodeSelection, Record, RunData};
pub use output::{BadDateLog, CsvOutput, ExtractionOutput, OutputSettings};
