//! Cell-wise and scalar QC tests.
//!
//! Every test is a pure function over grid-ordered columns. NaN data yields
//! an absent flag (`None`), a NaN limit yields `Unknown` (not evaluated) and
//! inputs of unequal length make the whole test `Unknown`.

use super::flags::{FlagSequence, QcFlag};

/// Land/water bitmask: zero is water, any set bit fails
pub fn over_water(mask: &[f64]) -> FlagSequence {
    mask.iter()
        .map(|&bits| {
            if bits.is_nan() {
                None
            } else {
                Some(QcFlag::pass(bits == 0.0))
            }
        })
        .collect()
}

/// `|data| <= limit` passes
pub fn threshold(data: &[f64], limit: f64) -> FlagSequence {
    compare(data, limit, |value, limit| value.abs() <= limit)
}

/// `|data| >= limit` passes
pub fn inverse_threshold(data: &[f64], limit: f64) -> FlagSequence {
    compare(data, limit, |value, limit| value.abs() >= limit)
}

fn compare(data: &[f64], limit: f64, passes: impl Fn(f64, f64) -> bool) -> FlagSequence {
    data.iter()
        .map(|&value| {
            if value.is_nan() {
                None
            } else if limit.is_nan() {
                Some(QcFlag::Unknown)
            } else {
                Some(QcFlag::pass(passes(value, limit)))
            }
        })
        .collect()
}

/// Both values must be within `limit`.
///
/// A negative value marks a missing sibling cell and makes the cell
/// `Unknown`.
pub fn double_threshold(data_a: &[f64], data_b: &[f64], limit: f64) -> FlagSequence {
    if data_a.len() != data_b.len() {
        return FlagSequence::filled(Some(QcFlag::Unknown), data_a.len().max(data_b.len()));
    }

    data_a
        .iter()
        .zip(data_b)
        .map(|(&a, &b)| {
            if a.is_nan() || b.is_nan() {
                None
            } else if a < 0.0 || b < 0.0 || limit.is_nan() {
                Some(QcFlag::Unknown)
            } else {
                Some(QcFlag::pass(a <= limit && b <= limit))
            }
        })
        .collect()
}

/// Mean of the populated bearings must lie in `[min, max]`
pub fn average_radial_bearing(bearings: &[f64], min: f64, max: f64) -> Option<QcFlag> {
    if min.is_nan() || max.is_nan() {
        return Some(QcFlag::Unknown);
    }
    let mean = nan_mean(bearings);
    Some(QcFlag::pass(mean >= min && mean <= max))
}

/// More than `threshold` populated cells must be present
pub fn radial_count(velocity: &[f64], threshold: f64) -> Option<QcFlag> {
    if threshold.is_nan() {
        return Some(QcFlag::Unknown);
    }
    let count = velocity.iter().filter(|v| !v.is_nan()).count();
    Some(QcFlag::pass(count as f64 > threshold))
}

/// Sum of the site contribution counts must reach `floor`.
///
/// Absent columns contribute zero.
pub fn data_density(site_counts: &[Option<&[f64]>], cells: usize, floor: f64) -> FlagSequence {
    let present: Vec<&[f64]> = site_counts.iter().flatten().copied().collect();
    if present.iter().any(|column| column.len() != cells) {
        return FlagSequence::filled(Some(QcFlag::Unknown), cells);
    }

    let sums: Vec<f64> = (0..cells)
        .map(|cell| present.iter().map(|column| column[cell]).sum())
        .collect();

    inverse_threshold(&sums, floor)
}

/// Geometric dilution of precision must stay under `ceiling`
pub fn gdop(values: &[f64], ceiling: f64) -> FlagSequence {
    threshold(values, ceiling)
}

/// Mean of the non-NaN values; NaN when there are none
pub fn nan_mean(values: &[f64]) -> f64 {
    let (sum, count) = values
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use QcFlag::{Bad, Good, Unknown};

    const NAN: f64 = f64::NAN;

    fn flags(values: Vec<Option<QcFlag>>) -> FlagSequence {
        FlagSequence::new(values)
    }

    #[test]
    fn test_over_water() {
        assert_eq!(
            over_water(&[0.0, 128.0, NAN, 3.0]),
            flags(vec![Some(Good), Some(Bad), None, Some(Bad)])
        );
    }

    #[test]
    fn test_threshold() {
        assert_eq!(
            threshold(&[0.5, -2.0, NAN, 1.3], 1.2),
            flags(vec![Some(Good), Some(Bad), None, Some(Bad)])
        );
        assert_eq!(
            threshold(&[0.5, -1.2, 1.2], 1.2),
            flags(vec![Some(Good), Some(Good), Some(Good)])
        );
    }

    #[test]
    fn test_threshold_with_nan_limit() {
        assert_eq!(threshold(&[1.0], NAN), flags(vec![Some(Unknown)]));
        assert_eq!(threshold(&[NAN, 1.0], NAN), flags(vec![None, Some(Unknown)]));
    }

    #[test]
    fn test_inverse_threshold() {
        assert_eq!(
            inverse_threshold(&[3.0, 2.0, -4.0, NAN], 3.0),
            flags(vec![Some(Good), Some(Bad), Some(Good), None])
        );
        assert_eq!(inverse_threshold(&[5.0], NAN), flags(vec![Some(Unknown)]));
    }

    #[test]
    fn test_double_threshold() {
        assert_eq!(
            double_threshold(&[0.1, -1.0, NAN], &[0.2, 0.3, 0.1], 1.0),
            flags(vec![Some(Good), Some(Unknown), None])
        );
        assert_eq!(
            double_threshold(&[0.1, 2.0], &[1.5, 0.1], 1.0),
            flags(vec![Some(Bad), Some(Bad)])
        );
        assert_eq!(
            double_threshold(&[0.1], &[0.2], NAN),
            flags(vec![Some(Unknown)])
        );
    }

    #[test]
    fn test_double_threshold_length_mismatch() {
        assert_eq!(
            double_threshold(&[0.1, 0.2, 0.3], &[0.1], 1.0),
            FlagSequence::filled(Some(Unknown), 3)
        );
    }

    #[test]
    fn test_average_radial_bearing() {
        assert_eq!(
            average_radial_bearing(&[100.0, NAN, 120.0], 90.0, 130.0),
            Some(Good)
        );
        assert_eq!(average_radial_bearing(&[10.0, 20.0], 90.0, 130.0), Some(Bad));
        assert_eq!(average_radial_bearing(&[NAN, NAN], 0.0, 360.0), Some(Bad));
        assert_eq!(average_radial_bearing(&[100.0], NAN, 130.0), Some(Unknown));
    }

    #[test]
    fn test_radial_count() {
        assert_eq!(radial_count(&[0.1, NAN, 0.2, 0.3], 2.0), Some(Good));
        assert_eq!(radial_count(&[0.1, NAN, 0.2], 2.0), Some(Bad));
        assert_eq!(radial_count(&[0.1], NAN), Some(Unknown));
    }

    #[test]
    fn test_data_density_absent_columns_contribute_zero() {
        let s1 = [1.0, 2.0, NAN];
        let s2 = [1.0, 0.0, 1.0];
        let counts = [Some(&s1[..]), Some(&s2[..]), None, None, None, None];

        assert_eq!(
            data_density(&counts, 3, 2.0),
            flags(vec![Some(Good), Some(Good), None])
        );
        assert_eq!(
            data_density(&counts, 3, 3.0),
            flags(vec![Some(Bad), Some(Bad), None])
        );
    }

    #[test]
    fn test_data_density_length_mismatch() {
        let s1 = [1.0, 2.0];
        let s2 = [1.0];
        assert_eq!(
            data_density(&[Some(&s1[..]), Some(&s2[..])], 2, 1.0),
            FlagSequence::filled(Some(Unknown), 2)
        );
    }

    #[test]
    fn test_gdop() {
        assert_eq!(
            gdop(&[1.5, 2.5, NAN], 2.0),
            flags(vec![Some(Good), Some(Bad), None])
        );
    }

    #[test]
    fn test_tests_are_pure() {
        let data = [0.5, -2.0, NAN, 1.3];
        assert_eq!(threshold(&data, 1.2), threshold(&data, 1.2));
    }
}
