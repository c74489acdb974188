//! Radial (bearing x range) grid construction.

use super::{
    enumerate_axis, require_field, require_positive_step, round_axis, snap_down, AxisGrid,
    IndexMap,
};
use crate::constants::columns;
use crate::error::Result;
use crate::geodesy;
use crate::models::RadialMetadata;
use crate::table::MeasurementTable;
use tracing::debug;

/// Validated radial grid parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialGridSpec {
    pub origin_lat: f64,
    pub origin_lon: f64,
    pub min_bearing: f64,
    pub max_bearing: f64,
    pub angular_resolution: f64,
    pub antenna_bearing: f64,
    pub min_range: f64,
    pub max_range: f64,
    pub range_resolution: f64,
}

impl RadialGridSpec {
    /// Merge station metadata with an optional fallback profile and validate
    pub fn resolve(primary: &RadialMetadata, fallback: Option<&RadialMetadata>) -> Result<Self> {
        let m = primary.merged_with(fallback);

        let spec = Self {
            origin_lat: require_field("origin_lat", m.origin_lat)?,
            origin_lon: require_field("origin_lon", m.origin_lon)?,
            min_bearing: require_field("min_bearing", m.min_bearing)?,
            max_bearing: require_field("max_bearing", m.max_bearing)?,
            angular_resolution: require_field("angular_resolution", m.angular_resolution)?,
            antenna_bearing: require_field("antenna_bearing", m.antenna_bearing)?,
            min_range: require_field("min_range", m.min_range)?,
            max_range: require_field("max_range", m.max_range)?,
            range_resolution: require_field("range_resolution", m.range_resolution)?,
        };

        require_positive_step("angular_resolution", spec.angular_resolution)?;
        require_positive_step("range_resolution", spec.range_resolution)?;

        Ok(spec)
    }

    /// Bearing axis aligned on the antenna bearing
    pub fn bearing_axis(&self) -> Vec<f64> {
        let res = self.angular_resolution;
        let min = snap_down(self.min_bearing, res) + self.antenna_bearing.rem_euclid(res);
        let max = snap_down(self.max_bearing, res);
        enumerate_axis(min, max, res)
    }

    /// Range axis in kilometres, rounded to suppress drift
    pub fn range_axis(&self) -> Vec<f64> {
        let res = self.range_resolution;
        let min = snap_down(self.min_range, res);
        let max = snap_down(self.max_range, res);
        enumerate_axis(min, max, res)
            .into_iter()
            .map(round_axis)
            .collect()
    }

    pub fn build_grid(&self) -> RadialGrid {
        let grid = RadialGrid {
            spec: *self,
            axes: AxisGrid {
                axis1: self.bearing_axis(),
                axis2: self.range_axis(),
            },
        };
        debug!(
            "Radial grid: {} bearings x {} ranges",
            grid.bearings().len(),
            grid.ranges().len()
        );
        grid
    }
}

/// Enumerated radial grid; bearing is the outer axis
#[derive(Debug, Clone)]
pub struct RadialGrid {
    spec: RadialGridSpec,
    axes: AxisGrid,
}

impl RadialGrid {
    pub fn spec(&self) -> &RadialGridSpec {
        &self.spec
    }

    pub fn bearings(&self) -> &[f64] {
        &self.axes.axis1
    }

    pub fn ranges(&self) -> &[f64] {
        &self.axes.axis2
    }

    /// Number of grid cells
    pub fn len(&self) -> usize {
        self.axes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    /// Grid-ordered (bearing, range) of every cell
    pub fn cell_values(&self) -> (Vec<f64>, Vec<f64>) {
        self.axes.cell_values()
    }

    /// Resolve table rows onto the grid by their `BEAR`/`RNGE` keys
    pub fn index_map(&self, table: &MeasurementTable) -> Result<IndexMap> {
        let bearings = table.column_values(columns::BEARING)?;
        let ranges = table.column_values(columns::RANGE)?;
        self.axes.resolve(&bearings, &ranges)
    }

    /// Grid-ordered (lat, lon) of every cell, projected from the site origin
    pub fn cell_coordinates(&self) -> (Vec<f64>, Vec<f64>) {
        (0..self.len())
            .map(|cell| {
                let (bearing, range_km) = self.axes.cell(cell);
                geodesy::project(
                    self.spec.origin_lat,
                    self.spec.origin_lon,
                    bearing,
                    range_km * 1000.0,
                )
            })
            .unzip()
    }
}
