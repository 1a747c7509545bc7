//! CSV output and the bad-date log.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use adcirc_common::{OutputZone, RunDate, VerticalDatum};
use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::extract::{Record, RunData};

/// Columns written for every node, in order.
const NODE_COLUMNS: [&str; 6] = ["Depth", "Elevation", "Max Hs", "Tp", "Node Lon", "Node Lat"];

/// Header row for `node_count` nodes.
///
/// The first node's columns carry the bare names; later nodes get the
/// 1-based node number appended (`Depth 2`, `Max Hs 2`, ...).
pub fn header(node_count: usize) -> Vec<String> {
    let mut columns = Vec::with_capacity(1 + node_count * NODE_COLUMNS.len());
    columns.push("Date".to_string());
    for node in 0..node_count {
        for name in NODE_COLUMNS {
            if node == 0 {
                columns.push(name.to_string());
            } else {
                columns.push(format!("{} {}", name, node + 1));
            }
        }
    }
    columns
}

/// `adcirc_{label}_{GMT|EST}_{MSL|NAVD88}.csv`
pub fn output_filename(label: &str, zone: OutputZone, datum: VerticalDatum) -> String {
    format!("adcirc_{}_{}_{}.csv", label, zone.label(), datum.label())
}

/// Time zone and vertical datum applied when rows are written.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputSettings {
    pub zone: OutputZone,
    pub datum: VerticalDatum,
    pub navd88_offset: f64,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            zone: OutputZone::Gmt,
            datum: VerticalDatum::Msl,
            navd88_offset: adcirc_common::datum::MSL_TO_NAVD88_M,
        }
    }
}

/// CSV writer for extraction records. The header is written on creation.
pub struct CsvOutput<W: Write> {
    writer: csv::Writer<W>,
    settings: OutputSettings,
    node_count: usize,
    rows: usize,
}

impl CsvOutput<File> {
    /// Create (truncating) `path`.
    pub fn create(path: &Path, node_count: usize, settings: OutputSettings) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Self::new(file, node_count, settings)
    }
}

impl<W: Write> CsvOutput<W> {
    pub fn new(inner: W, node_count: usize, settings: OutputSettings) -> Result<Self> {
        let mut writer = csv::Writer::from_writer(inner);
        writer.write_record(header(node_count))?;
        Ok(Self {
            writer,
            settings,
            node_count,
            rows: 0,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Write one row per record.
    pub fn write_run(&mut self, data: &RunData) -> Result<usize> {
        for record in &data.records {
            self.write_record(record)?;
        }
        Ok(data.records.len())
    }

    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        if record.samples.len() != self.node_count {
            anyhow::bail!(
                "record at {} has {} nodes, output was opened for {}",
                record.time,
                record.samples.len(),
                self.node_count
            );
        }

        let OutputSettings {
            zone,
            datum,
            navd88_offset,
        } = self.settings;

        let mut row = Vec::with_capacity(1 + self.node_count * NODE_COLUMNS.len());
        row.push(zone.format(record.time));
        for sample in &record.samples {
            // Wave height and period are not datum-referenced.
            row.push(datum.apply(sample.depth, navd88_offset).to_string());
            row.push(optional(sample.elevation.map(|z| datum.apply(z, navd88_offset))));
            row.push(optional(sample.wave_height));
            row.push(optional(sample.wave_period));
            row.push(sample.lon.to_string());
            row.push(sample.lat.to_string());
        }

        self.writer.write_record(&row)?;
        self.rows += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flush and hand back the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush CSV output: {}", e.error()))
    }
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Append-only log of runs that could not be extracted.
pub struct BadDateLog<W: Write> {
    writer: W,
    count: usize,
}

impl BadDateLog<File> {
    /// Open `path` for appending, creating it if needed.
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open bad date log: {}", path.display()))?;
        Ok(Self::new(file))
    }
}

impl<W: Write> BadDateLog<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, count: 0 }
    }

    pub fn record(&mut self, run: RunDate, reason: &str) -> Result<()> {
        // One line per failure; keep reasons on a single line.
        let reason = reason.replace(['\n', '\r'], " ");
        writeln!(self.writer, "{}\t{}", run, reason)?;
        self.writer.flush()?;
        self.count += 1;
        debug!(run = %run, reason = %reason, "Logged bad date");
        Ok(())
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// The CSV file and bad-date log of one invocation.
pub struct ExtractionOutput<W: Write, L: Write> {
    pub csv: CsvOutput<W>,
    pub bad_dates: BadDateLog<L>,
    csv_path: Option<PathBuf>,
}

impl ExtractionOutput<File, File> {
    /// Create `adcirc_{label}_....csv` in `dir` and open the bad-date log.
    pub fn create(
        dir: &Path,
        label: &str,
        node_count: usize,
        settings: OutputSettings,
        bad_dates_log: &Path,
    ) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

        let csv_path = dir.join(output_filename(label, settings.zone, settings.datum));
        let csv = CsvOutput::create(&csv_path, node_count, settings)?;
        let bad_dates = BadDateLog::open(bad_dates_log)?;
        info!(path = %csv_path.display(), nodes = node_count, "Writing CSV output");

        Ok(Self {
            csv,
            bad_dates,
            csv_path: Some(csv_path),
        })
    }
}

impl<W: Write, L: Write> ExtractionOutput<W, L> {
    pub fn new(csv: CsvOutput<W>, bad_dates: BadDateLog<L>) -> Self {
        Self {
            csv,
            bad_dates,
            csv_path: None,
        }
    }

    pub fn csv_path(&self) -> Option<&Path> {
        self.csv_path.as_deref()
    }

    pub fn into_parts(self) -> (CsvOutput<W>, BadDateLog<L>) {
        (self.csv, self.bad_dates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::NodeSample;
    use chrono::{TimeZone, Utc};

    fn sample(node_index: usize, elevation: Option<f64>) -> NodeSample {
        NodeSample {
            node_index,
            lon: -76.5,
            lat: 34.5,
            depth: 20.0,
            elevation,
            wave_height: Some(1.25),
            wave_period: None,
        }
    }

    fn record(samples: Vec<NodeSample>) -> Record {
        Record {
            time: Utc.with_ymd_and_hms(2017, 8, 2, 18, 0, 0).unwrap(),
            samples,
        }
    }

    fn written(out: CsvOutput<Vec<u8>>) -> String {
        String::from_utf8(out.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_header_groups() {
        let columns = header(2);
        assert_eq!(columns.len(), 13);
        assert_eq!(
            &columns[..7],
            &["Date", "Depth", "Elevation", "Max Hs", "Tp", "Node Lon", "Node Lat"]
        );
        assert_eq!(columns[7], "Depth 2");
        assert_eq!(columns[12], "Node Lat 2");
        assert_eq!(header(0), vec!["Date"]);
    }

    #[test]
    fn test_output_filename() {
        assert_eq!(
            output_filename("2017080218", OutputZone::Est, VerticalDatum::Navd88),
            "adcirc_2017080218_EST_NAVD88.csv"
        );
    }

    #[test]
    fn test_row_in_msl_gmt() {
        let mut out = CsvOutput::new(Vec::new(), 1, OutputSettings::default()).unwrap();
        out.write_record(&record(vec![sample(7, Some(0.5))])).unwrap();
        assert_eq!(out.rows(), 1);

        let text = written(out);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Date,Depth,Elevation,Max Hs,Tp,Node Lon,Node Lat");
        assert_eq!(lines[1], "2017-08-02 18:00,20,0.5,1.25,,-76.5,34.5");
    }

    #[test]
    fn test_navd88_shifts_depth_and_elevation_only() {
        let settings = OutputSettings {
            zone: OutputZone::Est,
            datum: VerticalDatum::Navd88,
            navd88_offset: 0.125,
        };
        let mut out = CsvOutput::new(Vec::new(), 1, settings).unwrap();
        out.write_record(&record(vec![sample(7, Some(0.5))])).unwrap();

        let text = written(out);
        let row = text.lines().nth(1).unwrap();
        assert_eq!(row, "2017-08-02 13:00,20.125,0.625,1.25,,-76.5,34.5");
    }

    #[test]
    fn test_missing_elevation_is_blank() {
        let mut out = CsvOutput::new(Vec::new(), 2, OutputSettings::default()).unwrap();
        out.write_record(&record(vec![sample(1, None), sample(2, Some(-0.25))]))
            .unwrap();

        let text = written(out);
        let fields: Vec<&str> = text.lines().nth(1).unwrap().split(',').collect();
        assert_eq!(fields.len(), 13);
        assert_eq!(fields[2], "");
        assert_eq!(fields[8], "-0.25");
    }

    #[test]
    fn test_node_count_mismatch_rejected() {
        let mut out = CsvOutput::new(Vec::new(), 2, OutputSettings::default()).unwrap();
        assert!(out.write_record(&record(vec![sample(1, None)])).is_err());
        assert_eq!(out.rows(), 0);
    }

    #[test]
    fn test_bad_date_lines() {
        let mut log = BadDateLog::new(Vec::new());
        let run = RunDate::parse("2017080218").unwrap();
        log.record(run, "Could not load forecast data").unwrap();
        log.record(run, "multi\nline").unwrap();
        assert_eq!(log.count(), 2);

        let text = String::from_utf8(log.into_inner()).unwrap();
        assert_eq!(
            text,
            "2017080218\tCould not load forecast data\n2017080218\tmulti line\n"
        );
    }

    #[test]
    fn test_bad_date_log_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad_dates_log.txt");
        let run = RunDate::parse("2017080300").unwrap();

        BadDateLog::open(&path).unwrap().record(run, "first").unwrap();
        BadDateLog::open(&path).unwrap().record(run, "second").unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.ends_with("2017080300\tsecond\n"));
    }

    #[test]
    fn test_create_in_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("out");
        let output = ExtractionOutput::create(
            &out_dir,
            "20170801_20170803",
            2,
            OutputSettings::default(),
            &dir.path().join("bad_dates_log.txt"),
        )
        .unwrap();

        let path = output.csv_path().unwrap().to_path_buf();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "adcirc_20170801_20170803_GMT_MSL.csv"
        );
        drop(output);
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.starts_with("Date,Depth,Elevation"));
    }
}
