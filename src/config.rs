//! Configuration management and validation.
//!
//! Provides the QC thresholds for radial and total products and the
//! processing settings for batch runs. Thresholds are optional: a missing
//! threshold leaves its test not evaluated.

use crate::constants::defaults;
use crate::error::{HfrError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Threshold value or NaN when not configured
pub fn limit(value: Option<f64>) -> f64 {
    value.unwrap_or(f64::NAN)
}

/// QC thresholds for radial files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadialQcConfig {
    /// Maximum radial speed (m/s)
    pub velocity_threshold: Option<f64>,

    /// Maximum temporal standard deviation (m/s)
    pub variance_threshold: Option<f64>,

    /// Maximum velocity change against neighbouring files (m/s)
    pub temporal_derivative_threshold: Option<f64>,

    /// Time step between consecutive files (minutes)
    pub temporal_resolution_minutes: i64,

    pub median_radius_km: Option<f64>,
    pub median_angle_deg: Option<f64>,
    pub median_current_limit: Option<f64>,

    pub avg_bearing_min: Option<f64>,
    pub avg_bearing_max: Option<f64>,

    /// Populated cells required for a usable file
    pub radial_count_threshold: Option<f64>,
}

impl Default for RadialQcConfig {
    fn default() -> Self {
        Self {
            velocity_threshold: Some(defaults::VELOCITY_THRESHOLD),
            variance_threshold: Some(defaults::VARIANCE_THRESHOLD),
            temporal_derivative_threshold: Some(defaults::TEMPORAL_DERIVATIVE_THRESHOLD),
            temporal_resolution_minutes: defaults::TEMPORAL_RESOLUTION_MINUTES,
            median_radius_km: Some(defaults::MEDIAN_RADIUS_KM),
            median_angle_deg: Some(defaults::MEDIAN_ANGLE_DEG),
            median_current_limit: Some(defaults::MEDIAN_CURRENT_LIMIT),
            avg_bearing_min: Some(defaults::AVG_BEARING_MIN),
            avg_bearing_max: Some(defaults::AVG_BEARING_MAX),
            radial_count_threshold: Some(defaults::RADIAL_COUNT_THRESHOLD),
        }
    }
}

/// QC thresholds for total files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TotalQcConfig {
    /// Maximum current speed (m/s)
    pub velocity_threshold: Option<f64>,

    /// Maximum u/v standard deviation (m/s)
    pub variance_threshold: Option<f64>,

    /// Minimum contributing radials per cell
    pub data_density_threshold: Option<f64>,

    pub gdop_threshold: Option<f64>,
}

impl Default for TotalQcConfig {
    fn default() -> Self {
        Self {
            velocity_threshold: Some(defaults::VELOCITY_THRESHOLD),
            variance_threshold: Some(defaults::VARIANCE_THRESHOLD),
            data_density_threshold: Some(defaults::DATA_DENSITY_THRESHOLD),
            gdop_threshold: Some(defaults::GDOP_THRESHOLD),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QcConfig {
    pub radial: RadialQcConfig,
    pub total: TotalQcConfig,
}

/// Output format of the per-file QC report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Parquet,
    Csv,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Parquet => "parquet",
            ReportFormat::Csv => "csv",
        }
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = HfrError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "parquet" => Ok(ReportFormat::Parquet),
            "csv" => Ok(ReportFormat::Csv),
            other => Err(HfrError::configuration(format!(
                "Unknown report format '{}' (expected parquet or csv)",
                other
            ))),
        }
    }
}

/// Global configuration for HFR processing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HfrConfig {
    /// Maximum files processed concurrently
    pub workers: usize,

    pub report_format: ReportFormat,

    /// Populated cells above which the median filter uses a bearing index
    pub bucket_index_min_cells: usize,

    /// Skip the temporal derivative sibling lookup
    pub skip_temporal_derivative: bool,

    pub qc: QcConfig,
}

impl Default for HfrConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get().max(1),
            report_format: ReportFormat::Parquet,
            bucket_index_min_cells: defaults::BUCKET_INDEX_MIN_CELLS,
            skip_temporal_derivative: false,
            qc: QcConfig::default(),
        }
    }
}

impl HfrConfig {
    /// Load a JSON configuration; absent keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: HfrConfig = serde_json::from_str(&content)?;
        config.validate()?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(HfrError::configuration("workers must be at least 1"));
        }
        if self.qc.radial.temporal_resolution_minutes <= 0 {
            return Err(HfrError::configuration(
                "temporal_resolution_minutes must be strictly positive",
            ));
        }
        Ok(())
    }

    /// Create configuration with custom worker count
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_report_format(mut self, format: ReportFormat) -> Self {
        self.report_format = format;
        self
    }

    /// Disable the temporal derivative sibling lookup
    pub fn without_temporal_derivative(mut self) -> Self {
        self.skip_temporal_derivative = true;
        self
    }
}
