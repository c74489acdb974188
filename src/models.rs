//! Core data structures and types for HF radar processing.
//!
//! Defines product types, station/network metadata records, the explicit
//! header-key to field mapping used to populate them, and processing
//! statistics.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{RADIAL_EXTENSION, TOTAL_EXTENSION};

/// Product types produced by HF radar networks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    /// Single-site beam-relative measurement
    Radial,
    /// Multi-site combined vector estimate
    Total,
}

impl ProductType {
    /// Detect product type from the file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_string_lossy().to_lowercase();

        if extension == RADIAL_EXTENSION {
            Some(ProductType::Radial)
        } else if extension == TOTAL_EXTENSION {
            Some(ProductType::Total)
        } else {
            None
        }
    }

    /// Detect product type from the `%TableType` header value (`LLUV ...` / `TOT4 ...`)
    pub fn from_table_type(table_type: &str) -> Option<Self> {
        let kind = table_type.split_whitespace().next()?.to_uppercase();
        match kind.as_str() {
            "LLUV" => Some(ProductType::Radial),
            k if k.starts_with("TOT") => Some(ProductType::Total),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ProductType::Radial => RADIAL_EXTENSION,
            ProductType::Total => TOTAL_EXTENSION,
        }
    }
}

impl std::fmt::Display for ProductType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductType::Radial => write!(f, "radial"),
            ProductType::Total => write!(f, "total"),
        }
    }
}

/// Keep the first present, non-NaN value
fn pick(primary: Option<f64>, fallback: Option<f64>) -> Option<f64> {
    primary
        .filter(|v| !v.is_nan())
        .or_else(|| fallback.filter(|v| !v.is_nan()))
}

/// Station metadata for radial grid construction
///
/// Used both for the primary station record and for the fallback profile;
/// every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadialMetadata {
    pub origin_lat: Option<f64>,
    pub origin_lon: Option<f64>,
    pub min_bearing: Option<f64>,
    pub max_bearing: Option<f64>,
    pub angular_resolution: Option<f64>,
    pub antenna_bearing: Option<f64>,
    pub min_range: Option<f64>,
    pub max_range: Option<f64>,
    pub range_resolution: Option<f64>,
}

impl RadialMetadata {
    /// Fill every missing or NaN field from `fallback`
    pub fn merged_with(&self, fallback: Option<&RadialMetadata>) -> RadialMetadata {
        let Some(fb) = fallback else {
            return self.clone();
        };
        RadialMetadata {
            origin_lat: pick(self.origin_lat, fb.origin_lat),
            origin_lon: pick(self.origin_lon, fb.origin_lon),
            min_bearing: pick(self.min_bearing, fb.min_bearing),
            max_bearing: pick(self.max_bearing, fb.max_bearing),
            angular_resolution: pick(self.angular_resolution, fb.angular_resolution),
            antenna_bearing: pick(self.antenna_bearing, fb.antenna_bearing),
            min_range: pick(self.min_range, fb.min_range),
            max_range: pick(self.max_range, fb.max_range),
            range_resolution: pick(self.range_resolution, fb.range_resolution),
        }
    }
}

/// Network metadata for total grid construction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TotalMetadata {
    pub origin_lat: Option<f64>,
    pub origin_lon: Option<f64>,
    pub lon_min: Option<f64>,
    pub lon_max: Option<f64>,
    pub lat_min: Option<f64>,
    pub lat_max: Option<f64>,
    pub grid_spacing: Option<f64>,
}

impl TotalMetadata {
    /// Fill every missing or NaN field from `fallback`
    pub fn merged_with(&self, fallback: Option<&TotalMetadata>) -> TotalMetadata {
        let Some(fb) = fallback else {
            return self.clone();
        };
        TotalMetadata {
            origin_lat: pick(self.origin_lat, fb.origin_lat),
            origin_lon: pick(self.origin_lon, fb.origin_lon),
            lon_min: pick(self.lon_min, fb.lon_min),
            lon_max: pick(self.lon_max, fb.lon_max),
            lat_min: pick(self.lat_min, fb.lat_min),
            lat_max: pick(self.lat_max, fb.lat_max),
            grid_spacing: pick(self.grid_spacing, fb.grid_spacing),
        }
    }
}

type RadialSetter = fn(&mut RadialMetadata, &[f64]);
type TotalSetter = fn(&mut TotalMetadata, &[f64]);

fn set_radial_origin(m: &mut RadialMetadata, v: &[f64]) {
    m.origin_lat = v.first().copied();
    m.origin_lon = v.get(1).copied();
}

fn set_angular_resolution(m: &mut RadialMetadata, v: &[f64]) {
    m.angular_resolution = v.first().copied();
}

fn set_antenna_bearing(m: &mut RadialMetadata, v: &[f64]) {
    m.antenna_bearing = v.first().copied();
}

fn set_range_resolution(m: &mut RadialMetadata, v: &[f64]) {
    m.range_resolution = v.first().copied();
}

fn set_min_bearing(m: &mut RadialMetadata, v: &[f64]) {
    m.min_bearing = v.first().copied();
}

fn set_max_bearing(m: &mut RadialMetadata, v: &[f64]) {
    m.max_bearing = v.first().copied();
}

fn set_min_range(m: &mut RadialMetadata, v: &[f64]) {
    m.min_range = v.first().copied();
}

fn set_max_range(m: &mut RadialMetadata, v: &[f64]) {
    m.max_range = v.first().copied();
}

fn set_total_origin(m: &mut TotalMetadata, v: &[f64]) {
    m.origin_lat = v.first().copied();
    m.origin_lon = v.get(1).copied();
}

fn set_grid_spacing(m: &mut TotalMetadata, v: &[f64]) {
    m.grid_spacing = v.first().copied();
}

/// Expects `lon_min lon_max lat_min lat_max`
fn set_bounding_box(m: &mut TotalMetadata, v: &[f64]) {
    if let [lon_min, lon_max, lat_min, lat_max] = v {
        m.lon_min = Some(*lon_min);
        m.lon_max = Some(*lon_max);
        m.lat_min = Some(*lat_min);
        m.lat_max = Some(*lat_max);
    }
}

/// Header keys of radial files mapped onto metadata fields
pub const RADIAL_HEADER_FIELDS: &[(&str, RadialSetter)] = &[
    ("Origin", set_radial_origin),
    ("AngularResolution", set_angular_resolution),
    ("AntennaBearing", set_antenna_bearing),
    ("RangeResolutionKMeters", set_range_resolution),
    ("MinimumBearing", set_min_bearing),
    ("MaximumBearing", set_max_bearing),
    ("MinimumRangeKMeters", set_min_range),
    ("MaximumRangeKMeters", set_max_range),
];

/// Header keys of total files mapped onto metadata fields
pub const TOTAL_HEADER_FIELDS: &[(&str, TotalSetter)] = &[
    ("Origin", set_total_origin),
    ("GridSpacing", set_grid_spacing),
    ("BoundingBox", set_bounding_box),
];

/// Apply every known header entry through its setter
pub fn apply_header_fields<M>(
    metadata: &mut M,
    table: &[(&str, fn(&mut M, &[f64]))],
    key: &str,
    values: &[f64],
) -> bool {
    match table.iter().find(|(name, _)| *name == key) {
        Some((_, setter)) => {
            setter(metadata, values);
            true
        }
        None => false,
    }
}

/// Processing statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub files_processed: usize,
    pub files_failed: usize,
    pub total_cells: usize,
    pub flagged_good: usize,
    pub output_path: PathBuf,
    pub processing_time_ms: u128,
}
