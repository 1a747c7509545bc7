//! Dataset layout on the ADCIRC THREDDS server and run discovery.
//!
//! Runs are published under `{base}{YYYYMMDDHH}/{grid path}/{kind}/{file}`.
//! Which grid a run was published on changed over time, and not every run
//! has a nowcast, so both are discovered from the catalog pages (or from the
//! directory tree of a local mirror).

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use adcirc_common::RunDate;
use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Public RENCI OPeNDAP root for the daily NAM-forced runs.
pub const DEFAULT_BASE_URL: &str = "http://opendap.renci.org:1935/thredds/dodsC/daily/nam/";

static HREF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)href\s*=\s*["']([^"']+)["']"#).expect("valid href pattern"));

/// Model mesh a run was published on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridVariant {
    /// NC v6b mesh, used until August 2017.
    Nc6b,
    /// Hurricane Surge On-demand Forecast System mesh.
    Hsofs,
}

impl GridVariant {
    pub fn name(&self) -> &'static str {
        match self {
            GridVariant::Nc6b => "nc6b",
            GridVariant::Hsofs => "hsofs",
        }
    }

    /// Path of the grid's output below a run directory.
    pub fn path(&self) -> &'static str {
        match self {
            GridVariant::Nc6b => "nc6b/hatteras.renci.org/dailyv6c",
            GridVariant::Hsofs => "hsofs/hatteras.renci.org/namhsofs",
        }
    }
}

impl fmt::Display for GridVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Forecast or nowcast half of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    Nowcast,
    Forecast,
}

impl RunKind {
    pub fn dir(&self) -> &'static str {
        match self {
            RunKind::Nowcast => "nowcast",
            RunKind::Forecast => "namforecast",
        }
    }
}

impl fmt::Display for RunKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunKind::Nowcast => f.write_str("nowcast"),
            RunKind::Forecast => f.write_str("forecast"),
        }
    }
}

/// One output file and the variable read from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Product {
    pub file: &'static str,
    pub variable: &'static str,
}

/// The three products that make up a CSV row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductSet {
    pub wave_height: Product,
    pub wave_period: Product,
    pub elevation: Product,
    /// Values are read per time step (`false` for maxima files).
    pub per_time_step: bool,
}

impl ProductSet {
    pub fn products(&self) -> [Product; 3] {
        [self.wave_height, self.wave_period, self.elevation]
    }
}

/// Hourly significant wave height, peak period and water level.
pub const TIME_SERIES: ProductSet = ProductSet {
    wave_height: Product {
        file: "swan_HS.63.nc",
        variable: "swan_HS",
    },
    wave_period: Product {
        file: "swan_TPS.63.nc",
        variable: "swan_TPS",
    },
    elevation: Product {
        file: "fort.63.nc",
        variable: "zeta",
    },
    per_time_step: true,
};

/// Run maxima of the same quantities.
pub const MAXIMA: ProductSet = ProductSet {
    wave_height: Product {
        file: "swan_HS_max.63.nc",
        variable: "swan_HS_max",
    },
    wave_period: Product {
        file: "swan_TPS_max.63.nc",
        variable: "swan_TPS_max",
    },
    elevation: Product {
        file: "maxele.63.nc",
        variable: "zeta_max",
    },
    per_time_step: false,
};

/// How the grid of a run is decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridRule {
    /// Look for an `nc6b` entry in the run's catalog.
    #[default]
    Catalog,
    /// Decide from the run date alone.
    Cutoff,
}

impl FromStr for GridRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "catalog" => Ok(GridRule::Catalog),
            "cutoff" => Ok(GridRule::Cutoff),
            other => Err(format!("'{}' is not one of catalog, cutoff", other)),
        }
    }
}

/// Date-based grid selection: runs before `nc6b_before` used nc6b, except
/// the listed runs that were already published on hsofs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutoffRule {
    #[serde(default = "default_nc6b_before")]
    pub nc6b_before: RunDate,
    #[serde(default = "default_hsofs_exceptions")]
    pub hsofs_exceptions: Vec<RunDate>,
}

fn cycle(year: i32, month: u32, day: u32) -> RunDate {
    // Literal calendar dates.
    let date = NaiveDate::from_ymd_opt(year, month, day).expect("valid literal date");
    RunDate::new(date, 0).expect("hour 0 is valid")
}

fn default_nc6b_before() -> RunDate {
    cycle(2017, 8, 3)
}

fn default_hsofs_exceptions() -> Vec<RunDate> {
    vec![cycle(2017, 9, 15)]
}

impl Default for CutoffRule {
    fn default() -> Self {
        Self {
            nc6b_before: default_nc6b_before(),
            hsofs_exceptions: default_hsofs_exceptions(),
        }
    }
}

impl CutoffRule {
    pub fn grid_for(&self, run: RunDate) -> GridVariant {
        if run < self.nc6b_before && !self.hsofs_exceptions.contains(&run) {
            GridVariant::Nc6b
        } else {
            GridVariant::Hsofs
        }
    }
}

/// Where datasets are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// THREDDS server; datasets via OPeNDAP, listings via `catalog.html`.
    Remote { base_url: String },
    /// Directory tree with the same layout as the server.
    Local { root: PathBuf },
}

impl DataSource {
    /// `http(s)://` bases are remote, anything else is a local directory.
    pub fn from_base(base: &str) -> Self {
        let base = base.trim();
        if base.starts_with("http://") || base.starts_with("https://") {
            let base_url = if base.ends_with('/') {
                base.to_string()
            } else {
                format!("{}/", base)
            };
            DataSource::Remote { base_url }
        } else {
            let root = base.strip_prefix("file://").unwrap_or(base);
            DataSource::Local {
                root: PathBuf::from(root),
            }
        }
    }

    /// Path or URL of one product file.
    pub fn dataset_location(
        &self,
        run: RunDate,
        grid: GridVariant,
        kind: RunKind,
        product: &Product,
    ) -> String {
        match self {
            DataSource::Remote { base_url } => format!(
                "{}{}/{}/{}/{}",
                base_url,
                run,
                grid.path(),
                kind.dir(),
                product.file
            ),
            DataSource::Local { root } => root
                .join(run.to_string())
                .join(grid.path())
                .join(kind.dir())
                .join(product.file)
                .to_string_lossy()
                .into_owned(),
        }
    }
}

/// Extract every `href` target from an HTML page.
pub fn extract_links(html: &str) -> Vec<String> {
    HREF.captures_iter(html)
        .map(|cap| cap[1].to_string())
        .collect()
}

/// Grid implied by a run listing: nc6b if any entry mentions it, hsofs
/// otherwise. An empty listing decides nothing.
pub fn grid_from_entries(entries: &[String]) -> Option<GridVariant> {
    if entries.is_empty() {
        return None;
    }
    if entries.iter().any(|e| e.contains("nc6b")) {
        Some(GridVariant::Nc6b)
    } else {
        Some(GridVariant::Hsofs)
    }
}

/// Grid and nowcast discovery against a [`DataSource`].
pub struct Catalog {
    source: DataSource,
    client: Client,
    rule: GridRule,
    cutoff: CutoffRule,
}

impl Catalog {
    pub fn new(
        source: DataSource,
        rule: GridRule,
        cutoff: CutoffRule,
        request_timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            source,
            client,
            rule,
            cutoff,
        })
    }

    pub fn source(&self) -> &DataSource {
        &self.source
    }

    pub fn rule(&self) -> GridRule {
        self.rule
    }

    /// Grid the run was published on.
    #[instrument(skip_all, fields(run = %run))]
    pub async fn detect_grid(&self, run: RunDate) -> Result<GridVariant> {
        let grid = match self.rule {
            GridRule::Cutoff => self.cutoff.grid_for(run),
            GridRule::Catalog => {
                let entries = self.list_entries(&run.to_string()).await?;
                grid_from_entries(&entries)
                    .ok_or_else(|| anyhow!("Run listing for {} is empty", run))?
            }
        };
        debug!(grid = %grid, "Selected grid");
        Ok(grid)
    }

    /// Whether the run's grid directory lists a nowcast.
    ///
    /// A listing that cannot be fetched counts as "no nowcast".
    pub async fn has_nowcast(&self, run: RunDate, grid: GridVariant) -> bool {
        let dir = format!("{}/{}", run, grid.path());
        match self.list_entries(&dir).await {
            Ok(entries) => entries.iter().any(|e| e.contains("nowcast")),
            Err(e) => {
                debug!(run = %run, error = %e, "No nowcast listing");
                false
            }
        }
    }

    /// Entries of a directory below the base: links of its `catalog.html`
    /// for remote sources, file names for local ones.
    async fn list_entries(&self, dir: &str) -> Result<Vec<String>> {
        match &self.source {
            DataSource::Remote { base_url } => {
                let url = format!("{}{}/catalog.html", base_url, dir);
                let response = self
                    .client
                    .get(&url)
                    .send()
                    .await
                    .with_context(|| format!("Failed to fetch {}", url))?;
                if !response.status().is_success() {
                    bail!("{} returned HTTP {}", url, response.status().as_u16());
                }
                let html = response.text().await?;
                Ok(extract_links(&html))
            }
            DataSource::Local { root } => {
                let path = root.join(dir);
                let mut entries = Vec::new();
                let mut read_dir = tokio::fs::read_dir(&path)
                    .await
                    .with_context(|| format!("Failed to list {}", path.display()))?;
                while let Some(entry) = read_dir.next_entry().await? {
                    entries.push(entry.file_name().to_string_lossy().into_owned());
                }
                entries.sort();
                Ok(entries)
            }
        }
    }
}
