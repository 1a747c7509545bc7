//! Per-run extraction: grid discovery, node selection and product reads.
//!
//! netCDF access is synchronous, so each run kind is read on the blocking
//! pool. Runs are processed in order; nodes resolved on an nc6b run are
//! remembered and carried over to later hsofs runs.

use std::io::Write;
use std::sync::Mutex;

use adcirc_common::{GeoPoint, RunDate};
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use netcdf_reader::AdcircDataset;
use node_resolver::{match_across_meshes, DepthConvention, Mesh, NodeResolver, Target};
use tracing::{debug, info, instrument, warn};

use crate::catalog::{Catalog, DataSource, GridVariant, ProductSet, RunKind, MAXIMA, TIME_SERIES};
use crate::config::ExtractorConfig;
use crate::output::ExtractionOutput;

/// Values at one node for one row.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSample {
    /// Full-mesh node index.
    pub node_index: usize,
    pub lon: f64,
    pub lat: f64,
    /// Positive-down depth relative to MSL.
    pub depth: f64,
    pub elevation: Option<f64>,
    pub wave_height: Option<f64>,
    pub wave_period: Option<f64>,
}

/// One CSV row: a model time and a sample per node.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub time: DateTime<Utc>,
    pub samples: Vec<NodeSample>,
}

/// A node picked for a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectedNode {
    pub node_index: usize,
    pub point: GeoPoint,
    pub depth: f64,
}

/// How nodes are chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeSelection {
    /// Resolve the configured wells on each run's mesh.
    Resolve,
    /// Use these full-mesh node indices as given.
    Known(Vec<usize>),
}

impl NodeSelection {
    /// Nodes per row.
    pub fn node_count(&self, wells: usize) -> usize {
        match self {
            NodeSelection::Resolve => wells,
            NodeSelection::Known(nodes) => nodes.len(),
        }
    }
}

/// Everything read for one kind of one run.
#[derive(Debug, Clone)]
pub struct RunData {
    pub run: RunDate,
    pub grid: GridVariant,
    pub kind: RunKind,
    pub nodes: Vec<SelectedNode>,
    pub records: Vec<Record>,
}

/// Totals of one invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionSummary {
    pub runs: usize,
    pub rows: usize,
    pub bad_dates: usize,
}

/// Node lookup decided before the blocking read.
#[derive(Debug, Clone)]
enum NodePlan {
    /// Contour filter and per-well match.
    Contour {
        resolver: NodeResolver,
        wells: Vec<Target>,
    },
    /// Snap known coordinates to the nearest node inside the search window.
    Snap {
        resolver: NodeResolver,
        points: Vec<GeoPoint>,
        max_distance_m: Option<f64>,
    },
    Known(Vec<usize>),
}

struct ReadJob {
    run: RunDate,
    grid: GridVariant,
    kind: RunKind,
    products: ProductSet,
    /// Wave height, wave period and elevation locations.
    locations: [String; 3],
    plan: NodePlan,
}

/// Drives extraction for a configuration.
pub struct Extractor {
    catalog: Catalog,
    config: ExtractorConfig,
    resolver: NodeResolver,
    nc6b_points: Mutex<Option<Vec<GeoPoint>>>,
}

impl Extractor {
    pub fn new(config: ExtractorConfig) -> Result<Self> {
        config.validate()?;

        let source = DataSource::from_base(&config.source.base_url);
        let catalog = Catalog::new(
            source,
            config.source.grid_rule,
            config.source.cutoff.clone(),
            config.source.request_timeout(),
        )?;
        let resolver = NodeResolver::new(config.resolver_options())?;

        Ok(Self {
            catalog,
            config,
            resolver,
            nc6b_points: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Hourly time series (nowcast first when published, then forecast).
    pub async fn time_series<W: Write, L: Write>(
        &self,
        runs: &[RunDate],
        selection: &NodeSelection,
        output: &mut ExtractionOutput<W, L>,
    ) -> Result<ExtractionSummary> {
        self.drive(runs, TIME_SERIES, selection, output).await
    }

    /// One row of forecast maxima per run.
    pub async fn maxima<W: Write, L: Write>(
        &self,
        runs: &[RunDate],
        selection: &NodeSelection,
        output: &mut ExtractionOutput<W, L>,
    ) -> Result<ExtractionSummary> {
        self.drive(runs, MAXIMA, selection, output).await
    }

    async fn drive<W: Write, L: Write>(
        &self,
        runs: &[RunDate],
        products: ProductSet,
        selection: &NodeSelection,
        output: &mut ExtractionOutput<W, L>,
    ) -> Result<ExtractionSummary> {
        let mut summary = ExtractionSummary::default();

        for &run in runs {
            summary.runs += 1;

            let grid = match self.catalog.detect_grid(run).await {
                Ok(grid) => grid,
                Err(e) => {
                    warn!(run = %run, error = %format!("{:#}", e), "Could not find run");
                    output
                        .bad_dates
                        .record(run, &format!("Could not find run: {:#}", e))?;
                    continue;
                }
            };

            for kind in self.kinds(run, grid, &products).await {
                match self.read(run, grid, kind, products, selection).await {
                    Ok(data) => {
                        let rows = output.csv.write_run(&data)?;
                        summary.rows += rows;
                        info!(run = %run, grid = %grid, kind = %kind, rows, "Extracted run");
                    }
                    Err(e) => {
                        warn!(run = %run, kind = %kind, error = %format!("{:#}", e), "Could not load data");
                        output
                            .bad_dates
                            .record(run, &format!("Could not load {} data: {:#}", kind, e))?;
                    }
                }
            }
        }

        output.csv.flush()?;
        summary.bad_dates = output.bad_dates.count();
        info!(
            runs = summary.runs,
            rows = summary.rows,
            bad_dates = summary.bad_dates,
            "Extraction finished"
        );
        Ok(summary)
    }

    async fn kinds(&self, run: RunDate, grid: GridVariant, products: &ProductSet) -> Vec<RunKind> {
        if products.per_time_step && self.catalog.has_nowcast(run, grid).await {
            vec![RunKind::Nowcast, RunKind::Forecast]
        } else {
            vec![RunKind::Forecast]
        }
    }

    /// Read one kind of one run.
    #[instrument(skip_all, fields(run = %run, grid = %grid, kind = %kind))]
    pub async fn read(
        &self,
        run: RunDate,
        grid: GridVariant,
        kind: RunKind,
        products: ProductSet,
        selection: &NodeSelection,
    ) -> Result<RunData> {
        let source = self.catalog.source();
        let locations = products
            .products()
            .map(|product| source.dataset_location(run, grid, kind, &product));

        let job = ReadJob {
            run,
            grid,
            kind,
            products,
            locations,
            plan: self.plan(grid, selection),
        };

        let data = tokio::task::spawn_blocking(move || read_run(job))
            .await
            .context("Read task failed")??;

        if grid == GridVariant::Nc6b && *selection == NodeSelection::Resolve {
            let points = data.nodes.iter().map(|n| n.point).collect();
            *self.nc6b_points.lock().unwrap_or_else(|e| e.into_inner()) = Some(points);
        }

        Ok(data)
    }

    fn plan(&self, grid: GridVariant, selection: &NodeSelection) -> NodePlan {
        if let NodeSelection::Known(nodes) = selection {
            return NodePlan::Known(nodes.clone());
        }

        let contour = || NodePlan::Contour {
            resolver: self.resolver.clone(),
            wells: self.config.wells.clone(),
        };
        if grid == GridVariant::Nc6b {
            return contour();
        }

        let hsofs = &self.config.hsofs;
        let points = if hsofs.reference_points.is_empty() {
            self.nc6b_points
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clone()
        } else {
            Some(hsofs.reference_points.clone())
        };

        match points {
            Some(points) => NodePlan::Snap {
                resolver: self.resolver.clone(),
                points,
                max_distance_m: hsofs.max_distance_m,
            },
            None => {
                debug!("No reference points for hsofs, resolving wells directly");
                contour()
            }
        }
    }
}

fn read_run(job: ReadJob) -> Result<RunData> {
    let [hs_location, tp_location, zeta_location] = &job.locations;
    let hs = open(hs_location)?;
    let tp = open(tp_location)?;
    let zeta = open(zeta_location)?;
    require_variable(&hs, job.products.wave_height.variable)?;
    require_variable(&tp, job.products.wave_period.variable)?;
    require_variable(&zeta, job.products.elevation.variable)?;

    let nodes = select_nodes(&zeta, &job.plan)?;
    let indices: Vec<usize> = nodes.iter().map(|n| n.node_index).collect();

    let records = if job.products.per_time_step {
        let times = zeta.model_times()?;
        let steps = times.len().min(hs.time_len()).min(tp.time_len());
        if steps < times.len() {
            warn!(
                elevation_steps = times.len(),
                steps, "Wave products have fewer time steps than elevation"
            );
        }
        times
            .into_iter()
            .take(steps)
            .enumerate()
            .map(|(step, time)| {
                read_record(&[&hs, &tp, &zeta], &job.products, &nodes, &indices, Some(step), time)
            })
            .collect::<Result<Vec<_>>>()?
    } else {
        vec![read_record(
            &[&hs, &tp, &zeta],
            &job.products,
            &nodes,
            &indices,
            None,
            job.run.datetime(),
        )?]
    };

    debug!(nodes = nodes.len(), records = records.len(), "Read run");
    Ok(RunData {
        run: job.run,
        grid: job.grid,
        kind: job.kind,
        nodes,
        records,
    })
}

fn open(location: &str) -> Result<AdcircDataset> {
    AdcircDataset::open(location).with_context(|| format!("Failed to open {}", location))
}

fn require_variable(dataset: &AdcircDataset, variable: &str) -> Result<()> {
    if !dataset.has_variable(variable) {
        bail!("{} has no {} variable", dataset.source(), variable);
    }
    Ok(())
}

fn read_record(
    datasets: &[&AdcircDataset; 3],
    products: &ProductSet,
    nodes: &[SelectedNode],
    indices: &[usize],
    step: Option<usize>,
    time: DateTime<Utc>,
) -> Result<Record> {
    let [hs, tp, zeta] = datasets;
    let wave_height = hs.read_at_nodes(products.wave_height.variable, step, indices)?;
    let wave_period = tp.read_at_nodes(products.wave_period.variable, step, indices)?;
    let elevation = zeta.read_at_nodes(products.elevation.variable, step, indices)?;

    let samples = nodes
        .iter()
        .enumerate()
        .map(|(i, node)| NodeSample {
            node_index: node.node_index,
            lon: node.point.lon,
            lat: node.point.lat,
            depth: node.depth,
            elevation: elevation[i],
            wave_height: wave_height[i],
            wave_period: wave_period[i],
        })
        .collect();

    Ok(Record { time, samples })
}

/// Pick the run's nodes from the mesh stored in `dataset`.
fn select_nodes(dataset: &AdcircDataset, plan: &NodePlan) -> Result<Vec<SelectedNode>> {
    match plan {
        NodePlan::Known(nodes) => {
            let count = dataset.node_count()?;
            if let Some(&bad) = nodes.iter().find(|&&n| n >= count) {
                bail!("Node {} is outside the mesh ({} nodes)", bad, count);
            }
            let lons = dataset.read_at_nodes("x", None, nodes)?;
            let lats = dataset.read_at_nodes("y", None, nodes)?;
            let depths = dataset.read_at_nodes("depth", None, nodes)?;

            Ok(nodes
                .iter()
                .enumerate()
                .map(|(i, &node_index)| SelectedNode {
                    node_index,
                    point: GeoPoint::new(
                        lons[i].unwrap_or(f64::NAN),
                        lats[i].unwrap_or(f64::NAN),
                    ),
                    depth: depths[i].unwrap_or(f64::NAN),
                })
                .collect())
        }
        NodePlan::Contour { resolver, wells } => {
            let mesh = read_mesh(dataset)?;
            let resolved = resolver.resolve(&mesh, wells)?;
            Ok(resolved
                .into_iter()
                .map(|node| SelectedNode {
                    node_index: node.node_index,
                    point: node.point,
                    depth: node.depth,
                })
                .collect())
        }
        NodePlan::Snap {
            resolver,
            points,
            max_distance_m,
        } => {
            let mesh = read_mesh(dataset)?;
            let range = resolver.search_range(&mesh);
            let offset = range.start;
            let area = mesh.slice(range);
            let matches = match_across_meshes(points, &area, *max_distance_m)?;

            matches
                .into_iter()
                .map(|m| {
                    let node_index = offset + m.node_index;
                    let node = mesh
                        .node(node_index)
                        .with_context(|| format!("Matched node {} is outside the mesh", node_index))?;
                    debug!(node = node_index, distance_m = m.distance_m, "Snapped reference point");
                    Ok(SelectedNode {
                        node_index,
                        point: node.point(),
                        depth: node.depth,
                    })
                })
                .collect()
        }
    }
}

fn read_mesh(dataset: &AdcircDataset) -> Result<Mesh> {
    let count = dataset.node_count()?;
    let arrays = dataset.read_mesh(0..count)?;
    Ok(Mesh::new(
        arrays.lons,
        arrays.lats,
        arrays.depths,
        DepthConvention::PositiveDown,
    )?)
}
