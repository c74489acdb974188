//! QC report writing
//!
//! Each processed file yields one table with a row per grid cell: the file
//! timestamp when known, the two axis values, the cell latitude and
//! longitude, the row index into the source table (-1 for empty cells), one
//! column per test and the overall `QCflag`. Flags are nullable integers so
//! absent cells stay null.

use super::QcReport;
use crate::config::ReportFormat;
use crate::constants::columns;
use crate::error::{HfrError, Result};
use crate::qc::names;

use polars::prelude::{
    Column, CsvWriter, DataFrame, ParquetCompression, ParquetWriter as PolarsParquetWriter,
    SerWriter,
};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Column holding the source row of each cell
pub const ROW_INDEX_COLUMN: &str = "ROW_INDEX";

/// Column holding the file timestamp
pub const TIME_COLUMN: &str = "TIME";

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Build the per-cell report table
pub fn report_frame(report: &QcReport) -> Result<DataFrame> {
    let cells = report.cell_count();
    let [axis1_name, axis2_name] = report.axis_names;
    let [axis1, axis2] = &report.axis_values;
    let [lat, lon] = &report.coordinates;

    let mut frame_columns = Vec::new();
    if let Some(timestamp) = report.timestamp {
        let time = timestamp.format(TIME_FORMAT).to_string();
        frame_columns.push(Column::new(TIME_COLUMN.into(), vec![time; cells]));
    }
    frame_columns.extend([
        Column::new(axis1_name.into(), axis1.clone()),
        Column::new(axis2_name.into(), axis2.clone()),
        Column::new(columns::LATITUDE.into(), lat.clone()),
        Column::new(columns::LONGITUDE.into(), lon.clone()),
        Column::new(ROW_INDEX_COLUMN.into(), report.index_map.to_sentinel_vec()),
    ]);

    for result in &report.results {
        let flags = result.broadcast(cells);
        frame_columns.push(Column::new(result.name.as_str().into(), flags.to_codes()));
    }
    frame_columns.push(Column::new(names::OVERALL.into(), report.overall.to_codes()));

    Ok(DataFrame::new(frame_columns)?)
}

/// Writes QC reports into an output directory
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
    format: ReportFormat,
}

impl ReportWriter {
    pub fn new(output_dir: PathBuf, format: ReportFormat) -> Self {
        Self { output_dir, format }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Output path of the report for a source file
    pub fn output_path(&self, source: &Path) -> PathBuf {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "report".to_string());
        self.output_dir
            .join(format!("{}_qc.{}", stem, self.format.extension()))
    }

    pub fn write(&self, report: &QcReport) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let output_path = self.output_path(&report.source);
        let mut df = report_frame(report)?;
        let file = File::create(&output_path)?;

        match self.format {
            ReportFormat::Parquet => {
                PolarsParquetWriter::new(file)
                    .with_compression(ParquetCompression::Snappy)
                    .finish(&mut df)
                    .map_err(|e| HfrError::ProcessingFailed {
                        path: output_path.clone(),
                        reason: format!("Failed to write parquet report: {}", e),
                    })?;
            }
            ReportFormat::Csv => {
                let mut file = file;
                CsvWriter::new(&mut file)
                    .include_header(true)
                    .finish(&mut df)
                    .map_err(|e| HfrError::ProcessingFailed {
                        path: output_path.clone(),
                        reason: format!("Failed to write CSV report: {}", e),
                    })?;
            }
        }

        debug!(
            "Wrote {} rows to {}",
            df.height(),
            output_path.display()
        );

        Ok(output_path)
    }
}
