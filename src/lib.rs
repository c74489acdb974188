//! HF radar grid mapping and quality control.
//!
//! Reads CODAR-style radial (`.ruv`) and total (`.tuv`) files, maps their
//! sparse measurement tables onto dense bearing x range or x x y grids and
//! runs the SeaDataNet QC test battery, producing per-test and overall
//! flags for every grid cell.
//!
//! This library provides tools for:
//! - Parsing instrument file headers and measurement tables
//! - Building radial and total grids from station metadata
//! - Extracting grid-ordered columns with unit and sentinel normalization
//! - Running the QC tests and combining their flags
//! - Writing per-file QC reports to Parquet or CSV

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod extract;
pub mod geodesy;
pub mod grid;
pub mod header;
pub mod models;
pub mod processor;
pub mod qc;
pub mod table;

// Re-export commonly used types
pub use config::{HfrConfig, QcConfig, ReportFormat};
pub use error::{HfrError, Result};
pub use grid::{IndexMap, RadialGrid, RadialGridSpec, TotalGrid, TotalGridSpec};
pub use models::{ProcessingStats, ProductType, RadialMetadata, TotalMetadata};
pub use processor::{BatchProcessor, FileProcessor, MetadataSources, QcReport, ReportWriter};
pub use qc::{FlagSequence, QcFlag, TestResult};
pub use table::MeasurementTable;
