//! In-memory measurement table.
//!
//! Rows of named `f64` columns in file order, backed by a polars
//! `DataFrame`. The table is read-only once built.

use crate::constants::HEADER_PREFIX;
use crate::error::{HfrError, Result};
use crate::header::{parse_header, FileHeader};
use polars::prelude::{Column, DataFrame, DataType};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct MeasurementTable {
    frame: DataFrame,
}

impl MeasurementTable {
    /// Build a table from named columns of equal length
    pub fn from_columns<S: AsRef<str>>(columns: Vec<(S, Vec<f64>)>) -> Result<Self> {
        let columns: Vec<Column> = columns
            .into_iter()
            .map(|(name, values)| Column::new(name.as_ref().into(), values))
            .collect();
        Ok(Self {
            frame: DataFrame::new(columns)?,
        })
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame.column(name).is_ok()
    }

    /// Column values in row order; nulls read as NaN
    pub fn column_values(&self, name: &str) -> Result<Vec<f64>> {
        let column = self
            .frame
            .column(name)
            .map_err(|_| HfrError::ColumnNotFound {
                column: name.to_string(),
            })?;
        let column = column.cast(&DataType::Float64)?;
        let values = column.f64()?;
        Ok(values
            .into_iter()
            .map(|value| value.unwrap_or(f64::NAN))
            .collect())
    }
}

/// Read the header and the first data table of a CODAR tabular file
pub fn read_measurement_file(file_path: &Path) -> Result<(FileHeader, MeasurementTable)> {
    let header = parse_header(file_path)?;
    let table = read_table(file_path, &header)?;
    Ok((header, table))
}

/// Read the data rows delimited by the header boundaries
pub fn read_table(file_path: &Path, header: &FileHeader) -> Result<MeasurementTable> {
    let file = File::open(file_path)?;
    let reader = BufReader::new(file);

    let width = header.column_names.len();
    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); width];

    let span = header.boundaries;
    for (line_num, line) in reader
        .lines()
        .enumerate()
        .skip(span.start_line)
        .take(span.line_count())
    {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with(HEADER_PREFIX) {
            continue;
        }

        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        if tokens.len() != width {
            return Err(HfrError::invalid_format(
                file_path,
                format!(
                    "Line {} has {} values, expected {}",
                    line_num + 1,
                    tokens.len(),
                    width
                ),
            ));
        }

        for (column, token) in columns.iter_mut().zip(tokens) {
            let value = token.parse::<f64>().unwrap_or_else(|_| {
                warn!("Unparseable value '{}' on line {}", token, line_num + 1);
                f64::NAN
            });
            column.push(value);
        }
    }

    let table = MeasurementTable::from_columns(
        header
            .column_names
            .iter()
            .zip(columns)
            .map(|(name, values)| (name.as_str(), values))
            .collect(),
    )?;

    debug!(
        "Read {} rows x {} columns from {}",
        table.height(),
        width,
        file_path.display()
    );

    Ok(table)
}
