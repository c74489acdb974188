//! Spatial median filter test for radial velocities.
//!
//! Each populated cell is compared with the mean velocity of its
//! neighbourhood: itself plus every populated cell within `angle_deg` of
//! bearing and `radius_km` of planar distance. The deviation is then
//! thresholded against `current_limit`.

use super::checks::threshold;
use super::flags::{FlagSequence, QcFlag};
use crate::geodesy::planar_km;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MedianFilterParams {
    pub radius_km: f64,
    pub angle_deg: f64,
    pub current_limit: f64,
}

/// Grid-ordered inputs of the filter
#[derive(Debug, Clone, Copy)]
pub struct MedianFilterInput<'a> {
    pub velocity: &'a [f64],
    pub bearing: &'a [f64],
    pub lat: &'a [f64],
    pub lon: &'a [f64],
}

impl MedianFilterInput<'_> {
    fn consistent(&self) -> bool {
        let n = self.velocity.len();
        self.bearing.len() == n && self.lat.len() == n && self.lon.len() == n
    }

    fn populated(&self) -> Vec<usize> {
        (0..self.velocity.len())
            .filter(|&i| !self.velocity[i].is_nan())
            .collect()
    }

    fn is_neighbour(&self, i: usize, j: usize, params: &MedianFilterParams) -> bool {
        i == j
            || ((self.bearing[j] - self.bearing[i]).abs() <= params.angle_deg
                && planar_km(self.lat[i], self.lon[i], self.lat[j], self.lon[j])
                    <= params.radius_km)
    }

    /// |mean(neighbourhood) - v_i|, neighbours summed in grid order
    fn deviation(&self, i: usize, neighbours: impl Iterator<Item = usize>) -> f64 {
        let (sum, count) = neighbours.fold((0.0, 0usize), |(sum, count), j| {
            (sum + self.velocity[j], count + 1)
        });
        (sum / count as f64 - self.velocity[i]).abs()
    }
}

/// All-pairs median filter, O(n²) over populated cells
pub fn median_filter(input: &MedianFilterInput<'_>, params: &MedianFilterParams) -> FlagSequence {
    if !input.consistent() {
        return FlagSequence::filled(Some(QcFlag::Unknown), input.velocity.len());
    }

    let populated = input.populated();
    let mut deviations = vec![f64::NAN; input.velocity.len()];

    for &i in &populated {
        let neighbours = populated
            .iter()
            .copied()
            .filter(|&j| input.is_neighbour(i, j, params));
        deviations[i] = input.deviation(i, neighbours);
    }

    threshold(&deviations, params.current_limit)
}

/// Median filter accelerated by a bearing-bucket index.
///
/// Buckets are `angle_deg` wide, so every candidate neighbour lies in the
/// cell's own bucket or the two adjacent ones; the neighbour predicate and
/// summation order are the same as [`median_filter`].
pub fn median_filter_indexed(
    input: &MedianFilterInput<'_>,
    params: &MedianFilterParams,
) -> FlagSequence {
    if !(params.angle_deg > 0.0 && params.angle_deg.is_finite()) {
        return median_filter(input, params);
    }
    if !input.consistent() {
        return FlagSequence::filled(Some(QcFlag::Unknown), input.velocity.len());
    }

    let populated = input.populated();
    let bucket_of = |i: usize| (input.bearing[i] / params.angle_deg).floor() as i64;

    let mut buckets: HashMap<i64, Vec<usize>> = HashMap::new();
    for &i in &populated {
        if !input.bearing[i].is_nan() {
            buckets.entry(bucket_of(i)).or_default().push(i);
        }
    }
    debug!(
        "Median filter index: {} populated cells in {} bearing buckets",
        populated.len(),
        buckets.len()
    );

    let mut deviations = vec![f64::NAN; input.velocity.len()];
    let mut candidates = Vec::new();

    for &i in &populated {
        candidates.clear();
        candidates.push(i);
        if !input.bearing[i].is_nan() {
            let key = bucket_of(i);
            for k in key - 1..=key + 1 {
                if let Some(bucket) = buckets.get(&k) {
                    candidates.extend(bucket.iter().copied().filter(|&j| j != i));
                }
            }
        }
        candidates.sort_unstable();

        let neighbours = candidates
            .iter()
            .copied()
            .filter(|&j| input.is_neighbour(i, j, params));
        deviations[i] = input.deviation(i, neighbours);
    }

    threshold(&deviations, params.current_limit)
}
