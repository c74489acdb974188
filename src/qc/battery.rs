//! The QC test batteries run on radial and total grids.

use super::checks::{
    average_radial_bearing, data_density, double_threshold, gdop, over_water, radial_count,
    threshold,
};
use super::flags::{FlagSequence, QcFlag, TestResult};
use super::median::{median_filter, median_filter_indexed, MedianFilterInput, MedianFilterParams};
use super::temporal::temporal_derivative;
use crate::config::{limit, RadialQcConfig, TotalQcConfig};
use tracing::debug;

/// Variable names of the individual tests
pub mod names {
    pub const OVER_WATER: &str = "OWTR_QC";
    pub const VELOCITY_THRESHOLD: &str = "CSPD_QC";
    pub const VARIANCE_THRESHOLD: &str = "VART_QC";
    pub const MEDIAN_FILTER: &str = "MDFL_QC";
    pub const TEMPORAL_DERIVATIVE: &str = "TDER_QC";
    pub const AVERAGE_RADIAL_BEARING: &str = "AVRB_QC";
    pub const RADIAL_COUNT: &str = "RDCT_QC";
    pub const DATA_DENSITY: &str = "DDNS_QC";
    pub const GDOP: &str = "GDOP_QC";
    pub const OVERALL: &str = "QCflag";
}

/// Flags for a test whose input column is absent: unknown wherever data exists
fn not_evaluated(reference: &[f64]) -> FlagSequence {
    threshold(reference, f64::NAN)
}

/// Grid-ordered inputs of the radial battery
#[derive(Debug, Clone, Copy)]
pub struct RadialQcInput<'a> {
    /// Radial speed, positive away from the site (m/s)
    pub velocity: &'a [f64],
    pub vector_flag: Option<&'a [f64]>,
    pub temporal_quality: Option<&'a [f64]>,
    /// Axis bearing of every cell
    pub bearing: &'a [f64],
    pub lat: &'a [f64],
    pub lon: &'a [f64],
    pub previous_velocity: Option<&'a [f64]>,
    pub next_velocity: Option<&'a [f64]>,
}

pub fn run_radial_battery(
    input: &RadialQcInput<'_>,
    config: &RadialQcConfig,
    bucket_index_min_cells: usize,
) -> Vec<TestResult> {
    let velocity = input.velocity;

    let over_water_flags = match input.vector_flag {
        Some(mask) => over_water(mask),
        None => not_evaluated(velocity),
    };

    let variance_flags = match input.temporal_quality {
        Some(std) => threshold(std, limit(config.variance_threshold)),
        None => not_evaluated(velocity),
    };

    let params = MedianFilterParams {
        radius_km: limit(config.median_radius_km),
        angle_deg: limit(config.median_angle_deg),
        current_limit: limit(config.median_current_limit),
    };
    let median_input = MedianFilterInput {
        velocity,
        bearing: input.bearing,
        lat: input.lat,
        lon: input.lon,
    };
    let populated = velocity.iter().filter(|v| !v.is_nan()).count();
    let median_flags = if populated > bucket_index_min_cells {
        median_filter_indexed(&median_input, &params)
    } else {
        median_filter(&median_input, &params)
    };

    // average bearing over populated cells only
    let populated_bearings: Vec<f64> = velocity
        .iter()
        .zip(input.bearing)
        .map(|(v, &b)| if v.is_nan() { f64::NAN } else { b })
        .collect();

    let results = vec![
        TestResult::grid(names::OVER_WATER, over_water_flags),
        TestResult::grid(
            names::VELOCITY_THRESHOLD,
            threshold(velocity, limit(config.velocity_threshold)),
        ),
        TestResult::grid(names::VARIANCE_THRESHOLD, variance_flags),
        TestResult::grid(names::MEDIAN_FILTER, median_flags),
        TestResult::grid(
            names::TEMPORAL_DERIVATIVE,
            temporal_derivative(
                velocity,
                input.previous_velocity,
                input.next_velocity,
                limit(config.temporal_derivative_threshold),
            ),
        ),
        TestResult::scalar(
            names::AVERAGE_RADIAL_BEARING,
            average_radial_bearing(
                &populated_bearings,
                limit(config.avg_bearing_min),
                limit(config.avg_bearing_max),
            ),
        ),
        TestResult::scalar(
            names::RADIAL_COUNT,
            radial_count(velocity, limit(config.radial_count_threshold)),
        ),
    ];

    debug!(
        "Radial battery: {} tests over {} cells ({} populated)",
        results.len(),
        velocity.len(),
        populated
    );

    results
}

/// Grid-ordered inputs of the total battery
#[derive(Debug, Clone, Copy)]
pub struct TotalQcInput<'a> {
    /// Eastward velocity (m/s)
    pub u: &'a [f64],
    /// Northward velocity (m/s)
    pub v: &'a [f64],
    pub vector_flag: Option<&'a [f64]>,
    pub u_std: Option<&'a [f64]>,
    pub v_std: Option<&'a [f64]>,
    pub gdop: Option<&'a [f64]>,
    /// `S1CN..S6CN`, absent columns as `None`
    pub site_counts: [Option<&'a [f64]>; 6],
}

pub fn run_total_battery(input: &TotalQcInput<'_>, config: &TotalQcConfig) -> Vec<TestResult> {
    let components_match = input.u.len() == input.v.len();
    let speed: Vec<f64> = if components_match {
        input.u.iter().zip(input.v).map(|(u, v)| u.hypot(*v)).collect()
    } else {
        vec![f64::NAN; input.u.len()]
    };
    let cells = speed.len();

    // mismatched components cannot be evaluated anywhere
    let speed_flags = if components_match {
        threshold(&speed, limit(config.velocity_threshold))
    } else {
        FlagSequence::filled(Some(QcFlag::Unknown), cells)
    };

    let over_water_flags = match input.vector_flag {
        Some(mask) => over_water(mask),
        None => not_evaluated(&speed),
    };

    let variance_flags = match (input.u_std, input.v_std) {
        (Some(u_std), Some(v_std)) => {
            double_threshold(u_std, v_std, limit(config.variance_threshold))
        }
        _ => not_evaluated(&speed),
    };

    let gdop_flags = match input.gdop {
        Some(values) => gdop(values, limit(config.gdop_threshold)),
        None => not_evaluated(&speed),
    };

    let results = vec![
        TestResult::grid(names::OVER_WATER, over_water_flags),
        TestResult::grid(names::VELOCITY_THRESHOLD, speed_flags),
        TestResult::grid(names::VARIANCE_THRESHOLD, variance_flags),
        TestResult::grid(
            names::DATA_DENSITY,
            data_density(
                &input.site_counts,
                cells,
                limit(config.data_density_threshold),
            ),
        ),
        TestResult::grid(names::GDOP, gdop_flags),
    ];

    debug!(
        "Total battery: {} tests over {} cells",
        results.len(),
        cells
    );

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qc::combine::combine;
    use crate::qc::flags::QcFlag::{Bad, Good, Unknown};
    use crate::qc::flags::TestScope;

    const NAN: f64 = f64::NAN;

    #[test]
    fn test_radial_battery_names_and_scopes() {
        let velocity = [0.1, NAN, 2.0];
        let bearing = [10.0, 10.0, 15.0];
        let lat = [43.0, 43.01, 43.02];
        let lon = [10.0, 10.0, 10.0];
        let mask = [0.0, NAN, 0.0];
        let input = RadialQcInput {
            velocity: &velocity,
            vector_flag: Some(&mask[..]),
            temporal_quality: None,
            bearing: &bearing,
            lat: &lat,
            lon: &lon,
            previous_velocity: None,
            next_velocity: None,
        };
        let config = RadialQcConfig {
            radial_count_threshold: Some(1.0),
            ..Default::default()
        };

        let results = run_radial_battery(&input, &config, usize::MAX);
        let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["OWTR_QC", "CSPD_QC", "VART_QC", "MDFL_QC", "TDER_QC", "AVRB_QC", "RDCT_QC"]
        );

        let by_name = |name: &str| results.iter().find(|r| r.name == name).unwrap();
        assert_eq!(by_name("AVRB_QC").scope, TestScope::Scalar);
        assert_eq!(by_name("RDCT_QC").flags.get(0), Some(Good));
        assert_eq!(by_name("CSPD_QC").flags.get(2), Some(Bad));
        // no temporal quality column and no siblings: unknown where data exists
        assert_eq!(by_name("VART_QC").flags.get(0), Some(Unknown));
        assert_eq!(by_name("TDER_QC").flags.as_slice()[1], None);

        let overall = combine(&results).unwrap();
        assert_eq!(overall.len(), 3);
        assert_eq!(overall.get(0), Some(Bad));
        // scalar results reach every cell, empty ones included
        assert_eq!(overall.get(1), Some(Bad));
    }

    #[test]
    fn test_total_battery() {
        let u = [0.3, 1.0, NAN];
        let v = [0.4, 1.0, NAN];
        let s1 = [2.0, 1.0, NAN];
        let s2 = [2.0, 1.0, NAN];
        let gdop_values = [1.0, 3.0, NAN];
        let u_std = [0.1, 0.1, NAN];
        let v_std = [0.1, 2.0, NAN];
        let input = TotalQcInput {
            u: &u,
            v: &v,
            vector_flag: None,
            u_std: Some(&u_std[..]),
            v_std: Some(&v_std[..]),
            gdop: Some(&gdop_values[..]),
            site_counts: [Some(&s1[..]), Some(&s2[..]), None, None, None, None],
        };

        let results = run_total_battery(&input, &TotalQcConfig::default());
        let by_name = |name: &str| results.iter().find(|r| r.name == name).unwrap();

        // speed 0.5 and ~1.41
        assert_eq!(by_name("CSPD_QC").flags.get(0), Some(Good));
        assert_eq!(by_name("CSPD_QC").flags.get(1), Some(Bad));
        assert_eq!(by_name("VART_QC").flags.get(1), Some(Bad));
        assert_eq!(by_name("DDNS_QC").flags.get(0), Some(Good));
        assert_eq!(by_name("DDNS_QC").flags.get(1), Some(Bad));
        assert_eq!(by_name("GDOP_QC").flags.get(1), Some(Bad));
        assert_eq!(by_name("OWTR_QC").flags.get(0), Some(Unknown));

        let overall = combine(&results).unwrap();
        // over-water is not evaluated, so a clean cell is still not all good
        assert_eq!(overall.get(0), Some(Bad));
        assert_eq!(overall.as_slice()[2], None);
    }

    #[test]
    fn test_total_speed_unknown_on_component_mismatch() {
        let u = [0.3, 0.1, NAN];
        let v = [0.4, 0.1];
        let input = TotalQcInput {
            u: &u,
            v: &v,
            vector_flag: None,
            u_std: None,
            v_std: None,
            gdop: None,
            site_counts: [None; 6],
        };

        let results = run_total_battery(&input, &TotalQcConfig::default());
        let speed = results
            .iter()
            .find(|r| r.name == names::VELOCITY_THRESHOLD)
            .unwrap();

        assert_eq!(speed.flags.len(), 3);
        assert_eq!(speed.flags.count(Unknown), 3);
    }
}
