//! Column extraction into grid order.
//!
//! Projects a named measurement-table column onto the grid through an
//! `IndexMap`, applying the unit conversion, sign convention and native
//! sentinel normalization of that column.

use crate::constants::{columns, COUNT_BAD_VALUE, COUNT_CLAMP, QUALITY_BAD_VALUE};
use crate::error::Result;
use crate::grid::IndexMap;
use crate::models::ProductType;
use crate::table::MeasurementTable;

/// Normalization family of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Radial speed: cm/s to m/s, sign inverted so positive is away from the site
    RadialSpeed,
    /// cm/s to m/s
    Velocity,
    /// cm/s to m/s, native `9.99` becomes NaN
    QualityStd,
    /// Native `999` becomes NaN, clamped to 127
    Count,
    /// Passed through unchanged
    Raw,
}

impl ColumnKind {
    /// Normalization family of `column` in a product of type `product`
    pub fn of(column: &str, product: ProductType) -> Self {
        match column {
            columns::RADIAL_VELOCITY | columns::MAX_VELOCITY | columns::MIN_VELOCITY
                if product == ProductType::Radial =>
            {
                ColumnKind::RadialSpeed
            }
            columns::VELOCITY_U | columns::VELOCITY_V | columns::U_QUALITY | columns::V_QUALITY => {
                ColumnKind::Velocity
            }
            columns::SPATIAL_QUALITY | columns::TEMPORAL_QUALITY => ColumnKind::QualityStd,
            columns::SPATIAL_COUNT | columns::TEMPORAL_COUNT => ColumnKind::Count,
            _ => ColumnKind::Raw,
        }
    }

    /// Normalize one raw table value
    pub fn normalize(&self, raw: f64) -> f64 {
        match self {
            ColumnKind::RadialSpeed => -raw / 100.0,
            ColumnKind::Velocity => raw / 100.0,
            ColumnKind::QualityStd => {
                let value = raw / 100.0;
                if value == QUALITY_BAD_VALUE {
                    f64::NAN
                } else {
                    value
                }
            }
            ColumnKind::Count => {
                if raw == COUNT_BAD_VALUE {
                    f64::NAN
                } else if raw > COUNT_CLAMP {
                    COUNT_CLAMP
                } else {
                    raw
                }
            }
            ColumnKind::Raw => raw,
        }
    }
}

/// Grid-ordered, normalized values of `column`; NaN for unmapped cells
pub fn extract_column(
    table: &MeasurementTable,
    index_map: &IndexMap,
    column: &str,
    product: ProductType,
) -> Result<Vec<f64>> {
    let kind = ColumnKind::of(column, product);
    let values = table.column_values(column)?;
    Ok(project(&values, index_map, kind))
}

/// Like [`extract_column`], `None` when the table lacks the column
pub fn extract_optional_column(
    table: &MeasurementTable,
    index_map: &IndexMap,
    column: &str,
    product: ProductType,
) -> Result<Option<Vec<f64>>> {
    if !table.has_column(column) {
        return Ok(None);
    }
    extract_column(table, index_map, column, product).map(Some)
}

fn project(values: &[f64], index_map: &IndexMap, kind: ColumnKind) -> Vec<f64> {
    index_map
        .iter()
        .map(|row| match row.and_then(|r| values.get(r)) {
            Some(&raw) => kind.normalize(raw),
            None => f64::NAN,
        })
        .collect()
}
