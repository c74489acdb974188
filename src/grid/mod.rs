//! Grid index mapping.
//!
//! Enumerates the dense output grid of a product (bearing x range for radials,
//! x x y for totals) and resolves, per grid cell, the measurement-table row
//! that belongs there.

pub mod radial;
pub mod total;

pub use self::radial::{RadialGrid, RadialGridSpec};
pub use self::total::{TotalGrid, TotalGridSpec};

use crate::constants::{AXIS_DECIMALS, UNMAPPED_INDEX};
use crate::error::{HfrError, Result};
use std::collections::HashMap;
use tracing::debug;

/// Per-cell row index into the measurement table; `None` is unmapped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexMap {
    indices: Vec<Option<usize>>,
}

impl IndexMap {
    /// A map of `len` unmapped cells
    pub fn unmapped(len: usize) -> Self {
        Self {
            indices: vec![None; len],
        }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn get(&self, cell: usize) -> Option<usize> {
        self.indices.get(cell).copied().flatten()
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<usize>> + '_ {
        self.indices.iter().copied()
    }

    /// Number of cells holding a row
    pub fn mapped_count(&self) -> usize {
        self.indices.iter().filter(|i| i.is_some()).count()
    }

    /// Export with `-1` for unmapped cells
    pub fn to_sentinel_vec(&self) -> Vec<i64> {
        self.indices
            .iter()
            .map(|i| i.map_or(UNMAPPED_INDEX, |row| row as i64))
            .collect()
    }
}

impl From<Vec<Option<usize>>> for IndexMap {
    fn from(indices: Vec<Option<usize>>) -> Self {
        Self { indices }
    }
}

/// Two enumerated axes flattened row-major (axis 1 outer, axis 2 inner)
#[derive(Debug, Clone, PartialEq)]
pub struct AxisGrid {
    pub axis1: Vec<f64>,
    pub axis2: Vec<f64>,
}

impl AxisGrid {
    pub fn len(&self) -> usize {
        self.axis1.len() * self.axis2.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Axis values of a flattened cell
    pub fn cell(&self, cell: usize) -> (f64, f64) {
        let inner = self.axis2.len();
        (self.axis1[cell / inner], self.axis2[cell % inner])
    }

    /// Grid-ordered values of each axis
    pub fn cell_values(&self) -> (Vec<f64>, Vec<f64>) {
        (0..self.len()).map(|cell| self.cell(cell)).unzip()
    }

    /// Locate each row's (key1, key2) on the grid; first row wins a cell
    pub fn resolve(&self, keys1: &[f64], keys2: &[f64]) -> Result<IndexMap> {
        if keys1.len() != keys2.len() {
            return Err(HfrError::configuration(format!(
                "Key columns differ in length: {} vs {}",
                keys1.len(),
                keys2.len()
            )));
        }

        let inner = self.axis2.len();
        let positions: HashMap<(i64, i64), usize> = self
            .axis1
            .iter()
            .enumerate()
            .flat_map(|(i, &a)| {
                self.axis2
                    .iter()
                    .enumerate()
                    .map(move |(j, &b)| ((axis_key(a), axis_key(b)), i * inner + j))
            })
            .collect();

        let mut map = IndexMap::unmapped(self.len());
        let mut unmatched = 0usize;

        for (row, (&k1, &k2)) in keys1.iter().zip(keys2).enumerate() {
            if k1.is_nan() || k2.is_nan() {
                unmatched += 1;
                continue;
            }
            match positions.get(&(axis_key(k1), axis_key(k2))) {
                Some(&cell) => {
                    let slot = &mut map.indices[cell];
                    if slot.is_none() {
                        *slot = Some(row);
                    }
                }
                None => unmatched += 1,
            }
        }

        debug!(
            "Resolved {} of {} rows onto {} grid cells ({} off-grid)",
            map.mapped_count(),
            keys1.len(),
            map.len(),
            unmatched
        );

        Ok(map)
    }
}

/// Round to the axis precision
pub fn round_axis(value: f64) -> f64 {
    let scale = 10f64.powi(AXIS_DECIMALS);
    (value * scale).round() / scale
}

/// Exact-match key of an axis value
fn axis_key(value: f64) -> i64 {
    (value * 10f64.powi(AXIS_DECIMALS)).round() as i64
}

/// Snap down to a multiple of `step`
pub fn snap_down(value: f64, step: f64) -> f64 {
    (value / step).floor() * step
}

/// Enumerate `min, min+step, ... <= max` inclusive
pub fn enumerate_axis(min: f64, max: f64, step: f64) -> Vec<f64> {
    if max < min {
        return Vec::new();
    }
    // quotients within drift of a whole number count as exact multiples
    let quotient = (max - min) / step;
    let steps = if (quotient - quotient.round()).abs() < 1e-9 {
        quotient.round()
    } else {
        quotient.floor()
    } as usize;
    (0..=steps)
        .map(|k| (min + k as f64 * step).min(max))
        .collect()
}

/// Strictly positive step or a configuration error
pub(crate) fn require_positive_step(name: &str, step: f64) -> Result<f64> {
    if step > 0.0 && step.is_finite() {
        Ok(step)
    } else {
        Err(HfrError::configuration(format!(
            "{} must be strictly positive, got {}",
            name, step
        )))
    }
}

/// Present and non-NaN value or an insufficient metadata error
pub(crate) fn require_field(field: &'static str, value: Option<f64>) -> Result<f64> {
    value
        .filter(|v| !v.is_nan())
        .ok_or(HfrError::InsufficientMetadata { field })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enumerate_axis_inclusive() {
        assert_eq!(enumerate_axis(0.0, 10.0, 2.5), vec![0.0, 2.5, 5.0, 7.5, 10.0]);
        assert_eq!(enumerate_axis(0.0, 9.0, 2.5), vec![0.0, 2.5, 5.0, 7.5]);
        assert_eq!(enumerate_axis(3.0, 3.0, 1.0), vec![3.0]);
        assert!(enumerate_axis(5.0, 3.0, 1.0).is_empty());
    }

    #[test]
    fn test_enumerate_axis_survives_float_drift() {
        // 0.1 steps accumulate error; the last value must not be lost
        let axis = enumerate_axis(0.0, 0.3, 0.1);
        assert_eq!(axis.len(), 4);
    }

    #[test]
    fn test_enumerate_axis_never_passes_max() {
        // 0.6 / 0.2 lands just below 3 and 0.1 + 3 * 0.2 just above 0.7
        let axis = enumerate_axis(0.1, 0.7, 0.2);
        assert_eq!(axis.len(), 4);
        assert_eq!(axis.last(), Some(&0.7));

        let axis = enumerate_axis(1.5044, 45.132, 1.5044);
        assert_eq!(axis.len(), 30);
        assert!(axis.iter().all(|&v| v <= 45.132));
    }

    #[test]
    fn test_snap_down() {
        assert_eq!(snap_down(7.3, 2.0), 6.0);
        assert_eq!(snap_down(-7.3, 2.0), -8.0);
        assert_eq!(snap_down(6.0, 2.0), 6.0);
    }

    #[test]
    fn test_resolve_row_major() {
        let grid = AxisGrid {
            axis1: vec![0.0, 5.0, 10.0],
            axis2: vec![1.5, 3.0],
        };
        assert_eq!(grid.len(), 6);
        assert_eq!(grid.cell(3), (5.0, 3.0));

        // rows out of grid order, one off-grid and one NaN key
        let keys1 = vec![10.0, 0.0, 7.0, f64::NAN, 5.0];
        let keys2 = vec![3.0, 1.5, 3.0, 1.5, 3.0];
        let map = grid.resolve(&keys1, &keys2).unwrap();

        assert_eq!(map.len(), 6);
        assert_eq!(map.to_sentinel_vec(), vec![1, -1, -1, 4, -1, 0]);
        assert_eq!(map.mapped_count(), 3);
    }

    #[test]
    fn test_resolve_first_row_wins() {
        let grid = AxisGrid {
            axis1: vec![0.0],
            axis2: vec![1.0],
        };
        let map = grid.resolve(&[0.0, 0.0], &[1.0, 1.0]).unwrap();
        assert_eq!(map.get(0), Some(0));
    }

    #[test]
    fn test_resolve_key_length_mismatch() {
        let grid = AxisGrid {
            axis1: vec![0.0],
            axis2: vec![1.0],
        };
        assert!(grid.resolve(&[0.0], &[]).is_err());
    }

    #[test]
    fn test_require_positive_step() {
        assert!(require_positive_step("step", 1.0).is_ok());
        assert!(matches!(
            require_positive_step("step", 0.0),
            Err(HfrError::Configuration { .. })
        ));
        assert!(require_positive_step("step", -2.0).is_err());
        assert!(require_positive_step("step", f64::NAN).is_err());
    }
}
