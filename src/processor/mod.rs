//! Processing engine.
//!
//! Runs the per-file pipeline (read, grid-map, extract, QC, combine) and
//! orchestrates batches of files using specialized modules for input
//! discovery and report writing.

pub mod batch;
pub mod discovery;
pub mod writer;

#[cfg(test)]
pub mod tests;

pub use self::batch::BatchProcessor;
pub use self::writer::ReportWriter;

use crate::config::HfrConfig;
use crate::constants::columns;
use crate::error::{HfrError, Result};
use crate::extract::{extract_column, extract_optional_column};
use crate::grid::{IndexMap, RadialGrid, RadialGridSpec, TotalGridSpec};
use crate::header::FileHeader;
use crate::models::{ProductType, RadialMetadata, TotalMetadata};
use crate::qc::temporal::{load_sibling, locate_siblings};
use crate::qc::{
    combine, names, run_radial_battery, run_total_battery, FlagSequence, QcFlag, RadialQcInput,
    TestResult, TotalQcInput,
};
use crate::table::{read_measurement_file, MeasurementTable};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Station and network metadata used to build grids.
///
/// The primary records win over the file header, which wins over the
/// fallback profiles.
#[derive(Debug, Clone, Default)]
pub struct MetadataSources {
    pub radial_station: RadialMetadata,
    pub radial_profile: Option<RadialMetadata>,
    pub total_network: TotalMetadata,
    pub total_profile: Option<TotalMetadata>,
}

/// On-disk layout of a station/network metadata or profile file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataFile {
    pub radial: Option<RadialMetadata>,
    pub total: Option<TotalMetadata>,
}

impl MetadataFile {
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(HfrError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let file: MetadataFile = serde_json::from_str(&content)?;
        debug!("Loaded metadata from {}", path.display());
        Ok(file)
    }
}

impl MetadataSources {
    /// Combine an optional primary metadata file with an optional profile
    pub fn from_files(metadata: Option<&Path>, profile: Option<&Path>) -> Result<Self> {
        let primary = metadata
            .map(MetadataFile::from_file)
            .transpose()?
            .unwrap_or_default();
        let profile = profile
            .map(MetadataFile::from_file)
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            radial_station: primary.radial.unwrap_or_default(),
            radial_profile: profile.radial,
            total_network: primary.total.unwrap_or_default(),
            total_profile: profile.total,
        })
    }

    fn radial_primary(&self, header: &FileHeader) -> RadialMetadata {
        self.radial_station
            .merged_with(Some(&header.radial_metadata()))
    }

    fn total_primary(&self, header: &FileHeader) -> TotalMetadata {
        self.total_network.merged_with(Some(&header.total_metadata()))
    }
}

/// QC outcome of one file, ready for the writer
#[derive(Debug, Clone)]
pub struct QcReport {
    pub source: PathBuf,
    pub product: ProductType,
    pub timestamp: Option<NaiveDateTime>,
    /// Column names of the two grid axes
    pub axis_names: [&'static str; 2],
    /// Grid-ordered axis values of every cell
    pub axis_values: [Vec<f64>; 2],
    /// Grid-ordered (lat, lon) of every cell
    pub coordinates: [Vec<f64>; 2],
    pub index_map: IndexMap,
    pub results: Vec<TestResult>,
    pub overall: FlagSequence,
}

impl QcReport {
    pub fn cell_count(&self) -> usize {
        self.overall.len()
    }

    pub fn populated_count(&self) -> usize {
        self.index_map.mapped_count()
    }

    pub fn good_count(&self) -> usize {
        self.overall.count(QcFlag::Good)
    }

    /// Flags of a named test, broadcast to the grid
    pub fn flags(&self, name: &str) -> Option<FlagSequence> {
        if name == names::OVERALL {
            return Some(self.overall.clone());
        }
        self.results
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.broadcast(self.cell_count()))
    }
}

/// Inputs of one file-processing invocation
struct FileContext<'a> {
    path: &'a Path,
    header: FileHeader,
    table: MeasurementTable,
}

/// Per-file QC pipeline
#[derive(Debug, Clone)]
pub struct FileProcessor {
    config: HfrConfig,
    metadata: MetadataSources,
}

impl FileProcessor {
    pub fn new(config: HfrConfig, metadata: MetadataSources) -> Self {
        Self { config, metadata }
    }

    pub fn config(&self) -> &HfrConfig {
        &self.config
    }

    /// Run the full pipeline on one radial or total file
    pub fn process_file(&self, path: &Path) -> Result<QcReport> {
        let (header, table) = read_measurement_file(path)?;

        let product = header
            .product_type()
            .or_else(|| ProductType::from_path(path))
            .ok_or_else(|| HfrError::invalid_format(path, "Unknown product type"))?;

        debug!(
            "Processing {} file {} ({} rows)",
            product,
            path.display(),
            table.height()
        );

        let context = FileContext {
            path,
            header,
            table,
        };

        let report = match product {
            ProductType::Radial => self.process_radial(context)?,
            ProductType::Total => self.process_total(context)?,
        };

        info!(
            "{}: {} cells, {} populated, {} good",
            path.display(),
            report.cell_count(),
            report.populated_count(),
            report.good_count()
        );

        Ok(report)
    }

    fn process_radial(&self, ctx: FileContext<'_>) -> Result<QcReport> {
        let product = ProductType::Radial;
        let primary = self.metadata.radial_primary(&ctx.header);
        let spec = RadialGridSpec::resolve(&primary, self.metadata.radial_profile.as_ref())?;
        let grid = spec.build_grid();
        let index_map = grid.index_map(&ctx.table)?;

        let velocity = extract_column(&ctx.table, &index_map, columns::RADIAL_VELOCITY, product)?;
        let vector_flag =
            extract_optional_column(&ctx.table, &index_map, columns::VECTOR_FLAG, product)?;
        let temporal_quality =
            extract_optional_column(&ctx.table, &index_map, columns::TEMPORAL_QUALITY, product)?;

        let (bearings, ranges) = grid.cell_values();
        let (lat, lon) = grid.cell_coordinates();

        let (previous, next) = if self.config.skip_temporal_derivative {
            (None, None)
        } else {
            let siblings =
                locate_siblings(ctx.path, self.config.qc.radial.temporal_resolution_minutes);
            (
                load_sibling(siblings.previous.as_deref(), |p| self.sibling_velocity(p)),
                load_sibling(siblings.next.as_deref(), |p| self.sibling_velocity(p)),
            )
        };

        let input = RadialQcInput {
            velocity: &velocity,
            vector_flag: vector_flag.as_deref(),
            temporal_quality: temporal_quality.as_deref(),
            bearing: &bearings,
            lat: &lat,
            lon: &lon,
            previous_velocity: previous.as_deref(),
            next_velocity: next.as_deref(),
        };
        let results = run_radial_battery(
            &input,
            &self.config.qc.radial,
            self.config.bucket_index_min_cells,
        );
        let overall = combine(&results)?;

        Ok(QcReport {
            source: ctx.path.to_path_buf(),
            product,
            timestamp: ctx.header.timestamp,
            axis_names: [columns::BEARING, columns::RANGE],
            axis_values: [bearings, ranges],
            coordinates: [lat, lon],
            index_map,
            results,
            overall,
        })
    }

    /// Grid-ordered radial velocity of a sibling file, mapped on its own metadata
    fn sibling_velocity(&self, path: &Path) -> Result<Vec<f64>> {
        let (header, table) = read_measurement_file(path)?;
        let primary = self.metadata.radial_primary(&header);
        let spec = RadialGridSpec::resolve(&primary, self.metadata.radial_profile.as_ref())?;
        let grid: RadialGrid = spec.build_grid();
        let index_map = grid.index_map(&table)?;
        extract_column(
            &table,
            &index_map,
            columns::RADIAL_VELOCITY,
            ProductType::Radial,
        )
    }

    fn process_total(&self, ctx: FileContext<'_>) -> Result<QcReport> {
        let product = ProductType::Total;
        let primary = self.metadata.total_primary(&ctx.header);
        let spec = TotalGridSpec::resolve(&primary, self.metadata.total_profile.as_ref())?;
        let grid = spec.build_grid();
        let index_map = grid.index_map(&ctx.table)?;

        let extract = |column: &str| extract_column(&ctx.table, &index_map, column, product);
        let extract_optional =
            |column: &str| extract_optional_column(&ctx.table, &index_map, column, product);

        let u = extract(columns::VELOCITY_U)?;
        let v = extract(columns::VELOCITY_V)?;
        let vector_flag = extract_optional(columns::VECTOR_FLAG)?;
        let u_std = extract_optional(columns::U_QUALITY)?;
        let v_std = extract_optional(columns::V_QUALITY)?;
        let gdop = extract_optional(columns::GDOP)?;
        let site_counts = columns::SITE_COUNTS
            .iter()
            .map(|column| extract_optional(*column))
            .collect::<Result<Vec<_>>>()?;

        let mut counts: [Option<&[f64]>; 6] = [None; 6];
        for (slot, column) in counts.iter_mut().zip(&site_counts) {
            *slot = column.as_deref();
        }

        let input = TotalQcInput {
            u: &u,
            v: &v,
            vector_flag: vector_flag.as_deref(),
            u_std: u_std.as_deref(),
            v_std: v_std.as_deref(),
            gdop: gdop.as_deref(),
            site_counts: counts,
        };
        let results = run_total_battery(&input, &self.config.qc.total);
        let overall = combine(&results)?;

        let (xs, ys) = grid.cell_values();
        let (lat, lon) = grid.cell_coordinates();

        Ok(QcReport {
            source: ctx.path.to_path_buf(),
            product,
            timestamp: ctx.header.timestamp,
            axis_names: [columns::X_DISTANCE, columns::Y_DISTANCE],
            axis_values: [xs, ys],
            coordinates: [lat, lon],
            index_map,
            results,
            overall,
        })
    }
}
