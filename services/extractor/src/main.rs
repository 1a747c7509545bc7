//! ADCIRC+SWAN well extraction CLI.
//!
//! Pulls hourly significant wave height, peak wave period and water level
//! (or their run maxima) at the mesh nodes offshore of each configured well
//! and writes them to one CSV file per invocation. Runs that cannot be read
//! are appended to the bad-date log and skipped.

use std::path::{Path, PathBuf};

use adcirc_common::{
    parse_calendar_date, run_dates, BoundingBox, OutputZone, RunDate, VerticalDatum,
};
use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use extractor::{
    ExtractionOutput, Extractor, ExtractorConfig, GridRule, NodeSelection, OutputSettings,
};

#[derive(Parser, Debug)]
#[command(name = "adcirc-extract")]
#[command(about = "Extract ADCIRC+SWAN wave and water level data at coastal wells", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (YAML); built-in defaults when omitted
    #[arg(long, env = "ADCIRC_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Directory for the CSV file
    #[arg(long, env = "ADCIRC_OUTPUT_DIR", default_value = ".", global = true)]
    output_dir: PathBuf,

    /// Time zone of the Date column: gmt or est
    #[arg(long, global = true)]
    zone: Option<OutputZone>,

    /// Vertical datum of depth and elevation: msl or navd88
    #[arg(long, global = true)]
    datum: Option<VerticalDatum>,

    /// How each run's grid is decided: catalog or cutoff
    #[arg(long, global = true)]
    grid_rule: Option<GridRule>,

    /// OPeNDAP base URL or local mirror directory
    #[arg(long, env = "ADCIRC_BASE_URL", global = true)]
    base_url: Option<String>,

    /// Study area as min_lon,min_lat,max_lon,max_lat
    #[arg(long, global = true, allow_hyphen_values = true)]
    bbox: Option<BoundingBox>,

    /// Log level
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Emit JSON log lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Nowcast and forecast time series of one run
    Single {
        /// Run date, YYYYMMDDHH
        #[arg(short, long)]
        date: RunDate,
    },

    /// Time series of every forecast cycle in a date range
    Range {
        /// First day, YYYY-MM-DD
        #[arg(short, long, value_parser = parse_calendar_date)]
        start: NaiveDate,

        /// Day after the last one, YYYY-MM-DD
        #[arg(short, long, value_parser = parse_calendar_date)]
        end: NaiveDate,
    },

    /// Run maxima of every maxima cycle in a date range
    Maxima {
        /// First day, YYYY-MM-DD
        #[arg(short, long, value_parser = parse_calendar_date)]
        start: NaiveDate,

        /// Day after the last one, YYYY-MM-DD
        #[arg(short, long, value_parser = parse_calendar_date)]
        end: NaiveDate,
    },

    /// Time series at given mesh node indices, skipping node resolution
    KnownNodes {
        /// Single run date, YYYYMMDDHH
        #[arg(short, long, conflicts_with_all = ["start", "end"])]
        date: Option<RunDate>,

        /// First day, YYYY-MM-DD
        #[arg(short, long, value_parser = parse_calendar_date, requires = "end")]
        start: Option<NaiveDate>,

        /// Day after the last one, YYYY-MM-DD
        #[arg(short, long, value_parser = parse_calendar_date, requires = "start")]
        end: Option<NaiveDate>,

        /// Full-mesh node index (repeatable)
        #[arg(short, long = "node", required = true)]
        nodes: Vec<usize>,
    },
}

/// What one invocation extracts.
struct Job {
    label: String,
    runs: Vec<RunDate>,
    selection: NodeSelection,
    maxima: bool,
}

impl Job {
    fn from_command(command: Commands, config: &ExtractorConfig) -> Result<Self> {
        let job = match command {
            Commands::Single { date } => Job {
                label: date.to_string(),
                runs: vec![date],
                selection: NodeSelection::Resolve,
                maxima: false,
            },
            Commands::Range { start, end } => Job {
                label: range_label(start, end),
                runs: run_dates(start, end, &config.cycles.forecast)?,
                selection: NodeSelection::Resolve,
                maxima: false,
            },
            Commands::Maxima { start, end } => Job {
                label: format!("max_{}", range_label(start, end)),
                runs: run_dates(start, end, &config.cycles.maxima)?,
                selection: NodeSelection::Resolve,
                maxima: true,
            },
            Commands::KnownNodes {
                date,
                start,
                end,
                nodes,
            } => {
                let (label, runs) = match (date, start, end) {
                    (Some(date), _, _) => (date.to_string(), vec![date]),
                    (None, Some(start), Some(end)) => (
                        range_label(start, end),
                        run_dates(start, end, &config.cycles.forecast)?,
                    ),
                    _ => bail!("known-nodes needs --date or both --start and --end"),
                };
                Job {
                    label: format!("nodes_{}", label),
                    runs,
                    selection: NodeSelection::Known(nodes),
                    maxima: false,
                }
            }
        };
        Ok(job)
    }
}

fn range_label(start: NaiveDate, end: NaiveDate) -> String {
    format!("{}_{}", start.format("%Y%m%d"), end.format("%Y%m%d"))
}

/// Relative log paths are placed in the output directory.
fn bad_dates_path(output_dir: &Path, log: &str) -> PathBuf {
    let path = Path::new(log);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        output_dir.join(path)
    }
}

/// Command-line flags win over the configuration file.
fn apply_overrides(cli: &Cli, config: &mut ExtractorConfig) {
    if let Some(zone) = cli.zone {
        config.output.zone = zone;
    }
    if let Some(datum) = cli.datum {
        config.output.datum = datum;
    }
    if let Some(rule) = cli.grid_rule {
        config.source.grid_rule = rule;
    }
    if let Some(base_url) = &cli.base_url {
        config.source.base_url = base_url.clone();
    }
    if let Some(area) = cli.bbox {
        config.area = area;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);
    if cli.log_json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    let mut config = match &cli.config {
        Some(path) => ExtractorConfig::load(path)?,
        None => ExtractorConfig::default(),
    };

    apply_overrides(&cli, &mut config);

    let job = Job::from_command(cli.command, &config)?;
    if job.runs.is_empty() {
        warn!(label = %job.label, "Date range contains no runs");
    }

    let settings = OutputSettings {
        zone: config.output.zone,
        datum: config.output.datum,
        navd88_offset: config.output.navd88_offset_m,
    };
    let node_count = job.selection.node_count(config.wells.len());
    let log_path = bad_dates_path(&cli.output_dir, &config.output.bad_dates_log);

    info!(
        runs = job.runs.len(),
        source = %config.source.base_url,
        zone = settings.zone.label(),
        datum = settings.datum.label(),
        "Starting ADCIRC extraction"
    );

    let extractor = Extractor::new(config)?;
    let mut output = ExtractionOutput::create(
        &cli.output_dir,
        &job.label,
        node_count,
        settings,
        &log_path,
    )?;

    let summary = if job.maxima {
        extractor.maxima(&job.runs, &job.selection, &mut output).await?
    } else {
        extractor
            .time_series(&job.runs, &job.selection, &mut output)
            .await?
    };

    if summary.bad_dates > 0 {
        warn!(
            bad_dates = summary.bad_dates,
            log = %log_path.display(),
            "Some runs could not be extracted"
        );
    }
    if let Some(path) = output.csv_path() {
        info!(path = %path.display(), rows = summary.rows, "Data written");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_range_job() {
        let cli = Cli::try_parse_from([
            "adcirc-extract",
            "range",
            "--start",
            "2017-08-01",
            "--end",
            "2017-08-03",
            "--zone",
            "est",
        ])
        .unwrap();
        assert_eq!(cli.zone, Some(OutputZone::Est));

        let job = Job::from_command(cli.command, &ExtractorConfig::default()).unwrap();
        assert_eq!(job.label, "20170801_20170803");
        assert_eq!(job.runs.len(), 8);
        assert_eq!(job.runs[0].to_string(), "2017080100");
        assert!(!job.maxima);
    }

    #[test]
    fn test_maxima_job_uses_maxima_cycles() {
        let cli = Cli::try_parse_from([
            "adcirc-extract",
            "maxima",
            "--start",
            "2017-08-01",
            "--end",
            "2017-08-02",
        ])
        .unwrap();
        let job = Job::from_command(cli.command, &ExtractorConfig::default()).unwrap();
        assert_eq!(job.label, "max_20170801_20170802");
        let runs: Vec<String> = job.runs.iter().map(ToString::to_string).collect();
        assert_eq!(runs, vec!["2017080100", "2017080112"]);
        assert!(job.maxima);
    }

    #[test]
    fn test_known_nodes_job() {
        let cli = Cli::try_parse_from([
            "adcirc-extract",
            "known-nodes",
            "--date",
            "2017080218",
            "--node",
            "1520",
            "--node",
            "1604",
        ])
        .unwrap();
        let job = Job::from_command(cli.command, &ExtractorConfig::default()).unwrap();
        assert_eq!(job.label, "nodes_2017080218");
        assert_eq!(job.selection, NodeSelection::Known(vec![1520, 1604]));

        assert!(Cli::try_parse_from(["adcirc-extract", "known-nodes", "--node", "3"])
            .map_err(anyhow::Error::from)
            .and_then(|cli| Job::from_command(cli.command, &ExtractorConfig::default()))
            .is_err());
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::try_parse_from([
            "adcirc-extract",
            "single",
            "--date",
            "2017080212",
            "--bbox",
            "-77.0,34.5,-76.0,35.0",
            "--datum",
            "navd88",
            "--grid-rule",
            "cutoff",
        ])
        .unwrap();

        let mut config = ExtractorConfig::default();
        apply_overrides(&cli, &mut config);
        assert_eq!(config.area, BoundingBox::new(-77.0, 34.5, -76.0, 35.0));
        assert_eq!(config.resolver_options().window, Some((-77.0, -76.0)));
        assert_eq!(config.output.datum, VerticalDatum::Navd88);
        assert_eq!(config.source.grid_rule, GridRule::Cutoff);
        assert_eq!(config.output.zone, OutputZone::Gmt);
        config.validate().unwrap();

        let inverted = Cli::try_parse_from([
            "adcirc-extract",
            "single",
            "--date",
            "2017080212",
            "--bbox",
            "-76.0,35.0,-77.0,34.5",
        ]);
        assert!(inverted.is_err());
    }

    #[test]
    fn test_bad_dates_path() {
        let dir = Path::new("/tmp/out");
        assert_eq!(
            bad_dates_path(dir, "bad_dates_log.txt"),
            PathBuf::from("/tmp/out/bad_dates_log.txt")
        );
        assert_eq!(bad_dates_path(dir, "/var/log/bad.txt"), PathBuf::from("/var/log/bad.txt"));
    }
}
