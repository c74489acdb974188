//! Total (x x y) grid construction.
//!
//! The bounding box is expressed as signed kilometre offsets from the
//! network origin: negative west of / south of the origin.

use super::{
    enumerate_axis, require_field, require_positive_step, round_axis, snap_down, AxisGrid,
    IndexMap,
};
use crate::constants::columns;
use crate::error::Result;
use crate::geodesy::{self, haversine_km};
use crate::models::TotalMetadata;
use crate::table::MeasurementTable;
use tracing::debug;

/// Validated total grid parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TotalGridSpec {
    pub origin_lat: f64,
    pub origin_lon: f64,
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
    pub grid_spacing: f64,
}

impl TotalGridSpec {
    /// Merge network metadata with an optional fallback profile and validate
    pub fn resolve(primary: &TotalMetadata, fallback: Option<&TotalMetadata>) -> Result<Self> {
        let m = primary.merged_with(fallback);

        let spec = Self {
            origin_lat: require_field("origin_lat", m.origin_lat)?,
            origin_lon: require_field("origin_lon", m.origin_lon)?,
            lon_min: require_field("lon_min", m.lon_min)?,
            lon_max: require_field("lon_max", m.lon_max)?,
            lat_min: require_field("lat_min", m.lat_min)?,
            lat_max: require_field("lat_max", m.lat_max)?,
            grid_spacing: require_field("grid_spacing", m.grid_spacing)?,
        };

        require_positive_step("grid_spacing", spec.grid_spacing)?;

        Ok(spec)
    }

    /// Signed east-west offset (km) of a longitude along the origin parallel
    fn x_offset(&self, lon: f64) -> f64 {
        let d = haversine_km(self.origin_lat, self.origin_lon, self.origin_lat, lon);
        if lon < self.origin_lon { -d } else { d }
    }

    /// Signed north-south offset (km) of a latitude along the origin meridian
    fn y_offset(&self, lat: f64) -> f64 {
        let d = haversine_km(self.origin_lat, self.origin_lon, lat, self.origin_lon);
        if lat < self.origin_lat { -d } else { d }
    }

    pub fn x_axis(&self) -> Vec<f64> {
        let step = self.grid_spacing;
        let min = snap_down(self.x_offset(self.lon_min), step);
        let max = snap_down(self.x_offset(self.lon_max), step);
        enumerate_axis(min, max, step)
            .into_iter()
            .map(round_axis)
            .collect()
    }

    pub fn y_axis(&self) -> Vec<f64> {
        let step = self.grid_spacing;
        let min = snap_down(self.y_offset(self.lat_min), step);
        let max = snap_down(self.y_offset(self.lat_max), step);
        enumerate_axis(min, max, step)
            .into_iter()
            .map(round_axis)
            .collect()
    }

    pub fn build_grid(&self) -> TotalGrid {
        let grid = TotalGrid {
            spec: *self,
            axes: AxisGrid {
                axis1: self.x_axis(),
                axis2: self.y_axis(),
            },
        };
        debug!("Total grid: {} x {} cells", grid.xs().len(), grid.ys().len());
        grid
    }
}

/// Enumerated total grid; x is the outer axis
#[derive(Debug, Clone)]
pub struct TotalGrid {
    spec: TotalGridSpec,
    axes: AxisGrid,
}

impl TotalGrid {
    pub fn spec(&self) -> &TotalGridSpec {
        &self.spec
    }

    pub fn xs(&self) -> &[f64] {
        &self.axes.axis1
    }

    pub fn ys(&self) -> &[f64] {
        &self.axes.axis2
    }

    pub fn len(&self) -> usize {
        self.axes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    /// Grid-ordered (x, y) of every cell
    pub fn cell_values(&self) -> (Vec<f64>, Vec<f64>) {
        self.axes.cell_values()
    }

    /// Resolve table rows onto the grid by their `XDST`/`YDST` keys
    pub fn index_map(&self, table: &MeasurementTable) -> Result<IndexMap> {
        let xs = table.column_values(columns::X_DISTANCE)?;
        let ys = table.column_values(columns::Y_DISTANCE)?;
        self.axes.resolve(&xs, &ys)
    }

    /// Grid-ordered (lat, lon) of every cell, projected from the origin
    pub fn cell_coordinates(&self) -> (Vec<f64>, Vec<f64>) {
        (0..self.len())
            .map(|cell| {
                let (x, y) = self.axes.cell(cell);
                let bearing = x.atan2(y).to_degrees();
                geodesy::project(
                    self.spec.origin_lat,
                    self.spec.origin_lon,
                    bearing,
                    x.hypot(y) * 1000.0,
                )
            })
            .unzip()
    }
}
