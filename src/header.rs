//! CODAR tabular header parsing and metadata extraction.
//!
//! Parses the `%Key: value` header of radial (LLUV) and total (TUV) files to
//! extract the table layout, the file timestamp and the grid metadata, and
//! calculates the data boundaries of the first table for row reading.

use crate::constants::HEADER_PREFIX;
use crate::error::{HfrError, Result};
use crate::models::{
    apply_header_fields, ProductType, RadialMetadata, TotalMetadata, RADIAL_HEADER_FIELDS,
    TOTAL_HEADER_FIELDS,
};
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, warn};

/// Line span of the first data table (0-based, end exclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataBoundaries {
    pub start_line: usize,
    pub end_line: usize,
}

impl DataBoundaries {
    pub fn line_count(&self) -> usize {
        self.end_line.saturating_sub(self.start_line)
    }
}

/// Header of a CODAR tabular file
#[derive(Debug, Clone)]
pub struct FileHeader {
    pub table_type: Option<String>,
    pub column_names: Vec<String>,
    pub timestamp: Option<NaiveDateTime>,
    /// First occurrence of every header key
    pub entries: BTreeMap<String, String>,
    pub boundaries: DataBoundaries,
}

impl FileHeader {
    /// Product type declared by `%TableType`
    pub fn product_type(&self) -> Option<ProductType> {
        self.table_type
            .as_deref()
            .and_then(ProductType::from_table_type)
    }

    /// Radial grid metadata declared in the header
    pub fn radial_metadata(&self) -> RadialMetadata {
        let mut metadata = RadialMetadata::default();
        for (key, value) in &self.entries {
            apply_header_fields(
                &mut metadata,
                RADIAL_HEADER_FIELDS,
                key,
                &leading_numbers(value),
            );
        }
        metadata
    }

    /// Total grid metadata declared in the header
    pub fn total_metadata(&self) -> TotalMetadata {
        let mut metadata = TotalMetadata::default();
        for (key, value) in &self.entries {
            apply_header_fields(
                &mut metadata,
                TOTAL_HEADER_FIELDS,
                key,
                &leading_numbers(value),
            );
        }
        metadata
    }
}

/// Extract header metadata and data boundaries of the first table
pub fn parse_header(file_path: &Path) -> Result<FileHeader> {
    if !file_path.exists() {
        return Err(HfrError::FileNotFound {
            path: file_path.to_path_buf(),
        });
    }
    let file = File::open(file_path)?;
    let reader = BufReader::new(file);

    let mut builder = HeaderBuilder::default();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        if builder.parse_line(line_num, &line) {
            break;
        }
    }

    let header = builder.build(file_path)?;

    debug!(
        "Parsed header for {}: {} columns, data lines {}..{}",
        file_path.display(),
        header.column_names.len(),
        header.boundaries.start_line,
        header.boundaries.end_line
    );

    Ok(header)
}

#[derive(Default)]
struct HeaderBuilder {
    table_type: Option<String>,
    column_names: Option<Vec<String>>,
    timestamp: Option<NaiveDateTime>,
    entries: BTreeMap<String, String>,
    data_start: Option<usize>,
    data_end: Option<usize>,
}

impl HeaderBuilder {
    /// Consume one line; returns true once the first table has ended
    fn parse_line(&mut self, line_num: usize, line: &str) -> bool {
        let trimmed = line.trim();

        let Some(rest) = trimmed.strip_prefix(HEADER_PREFIX) else {
            return false; // data row or blank
        };

        // `%%` lines are comments
        if rest.starts_with(HEADER_PREFIX) {
            return false;
        }

        let Some((key, value)) = rest.split_once(':') else {
            return false;
        };
        let key = key.trim();
        let value = value.trim();

        match key {
            "TableStart" if self.data_start.is_none() => {
                self.data_start = Some(line_num + 1);
            }
            "TableEnd" if self.data_start.is_some() => {
                self.data_end = Some(line_num);
                return true;
            }
            "TableType" if self.table_type.is_none() => {
                self.table_type = Some(value.to_string());
            }
            "TableColumnTypes" if self.column_names.is_none() => {
                self.column_names = Some(value.split_whitespace().map(str::to_string).collect());
            }
            "TimeStamp" if self.timestamp.is_none() => {
                self.timestamp = parse_timestamp(value);
            }
            _ => {}
        }

        self.entries
            .entry(key.to_string())
            .or_insert_with(|| value.to_string());

        false
    }

    fn build(self, file_path: &Path) -> Result<FileHeader> {
        let column_names = self
            .column_names
            .ok_or_else(|| HfrError::invalid_format(file_path, "Missing %TableColumnTypes"))?;

        let start_line = self
            .data_start
            .ok_or_else(|| HfrError::invalid_format(file_path, "Missing %TableStart"))?;

        let end_line = self
            .data_end
            .ok_or_else(|| HfrError::invalid_format(file_path, "Missing %TableEnd"))?;

        Ok(FileHeader {
            table_type: self.table_type,
            column_names,
            timestamp: self.timestamp,
            entries: self.entries,
            boundaries: DataBoundaries {
                start_line,
                end_line,
            },
        })
    }
}

/// Parse `YYYY MM DD hh mm ss`
fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let parsed = NaiveDateTime::parse_from_str(value, "%Y %m %d %H %M %S");
    if parsed.is_err() {
        warn!("Could not parse timestamp: {}", value);
    }
    parsed.ok()
}

/// Numeric tokens up to the first non-numeric one
fn leading_numbers(value: &str) -> Vec<f64> {
    value
        .split_whitespace()
        .map_while(|token| token.parse::<f64>().ok())
        .collect()
}
