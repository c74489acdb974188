//! Overall flag from the individual test results.

use super::flags::{FlagSequence, QcFlag, TestResult, TestScope};
use crate::error::{HfrError, Result};

/// Combine named results into one flag per cell.
///
/// Scalar results are broadcast first. Per cell, in order: all good gives
/// good, all missing gives missing, all unknown gives unknown, all absent
/// stays absent, anything else is bad.
pub fn combine(results: &[TestResult]) -> Result<FlagSequence> {
    let len = grid_length(results)?;
    let expanded: Vec<FlagSequence> = results.iter().map(|r| r.broadcast(len)).collect();

    Ok((0..len)
        .map(|cell| {
            let all = |expected: Option<QcFlag>| {
                expanded.iter().all(|flags| flags.as_slice()[cell] == expected)
            };
            if all(Some(QcFlag::Good)) {
                Some(QcFlag::Good)
            } else if all(Some(QcFlag::Missing)) {
                Some(QcFlag::Missing)
            } else if all(Some(QcFlag::Unknown)) {
                Some(QcFlag::Unknown)
            } else if all(None) {
                None
            } else {
                Some(QcFlag::Bad)
            }
        })
        .collect())
}

/// Common length of the grid-scoped results
fn grid_length(results: &[TestResult]) -> Result<usize> {
    if results.is_empty() {
        return Err(HfrError::quality_control("No test results to combine"));
    }

    let mut grid_len: Option<usize> = None;
    for result in results.iter().filter(|r| r.scope == TestScope::Grid) {
        match grid_len {
            None => grid_len = Some(result.flags.len()),
            Some(len) if len != result.flags.len() => {
                return Err(HfrError::quality_control(format!(
                    "Test '{}' has {} cells, expected {}",
                    result.name,
                    result.flags.len(),
                    len
                )));
            }
            Some(_) => {}
        }
    }

    Ok(grid_len.unwrap_or(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use QcFlag::{Bad, Good, Missing, Unknown};

    fn grid(name: &str, flags: Vec<Option<QcFlag>>) -> TestResult {
        TestResult::grid(name, FlagSequence::new(flags))
    }

    #[test]
    fn test_all_good() {
        let combined = combine(&[
            grid("A", vec![Some(Good), Some(Good)]),
            grid("B", vec![Some(Good), Some(Good)]),
        ])
        .unwrap();
        assert_eq!(combined, FlagSequence::new(vec![Some(Good), Some(Good)]));
    }

    #[test]
    fn test_any_failure_is_bad() {
        let combined = combine(&[
            grid("A", vec![Some(Good), Some(Good)]),
            grid("B", vec![Some(Bad), Some(Good)]),
        ])
        .unwrap();
        assert_eq!(combined, FlagSequence::new(vec![Some(Bad), Some(Good)]));
    }

    #[test]
    fn test_all_missing_and_all_absent() {
        let combined = combine(&[grid("A", vec![Some(Missing), None])]).unwrap();
        assert_eq!(combined, FlagSequence::new(vec![Some(Missing), None]));

        let combined = combine(&[grid("A", vec![None, None]), grid("B", vec![None, None])]).unwrap();
        assert_eq!(combined, FlagSequence::new(vec![None, None]));
    }

    #[test]
    fn test_all_unknown_and_mixed() {
        let combined = combine(&[
            grid("A", vec![Some(Unknown), Some(Unknown), None]),
            grid("B", vec![Some(Unknown), Some(Good), Some(Good)]),
        ])
        .unwrap();
        // mixed unknown/good and absent/good are both bad
        assert_eq!(
            combined,
            FlagSequence::new(vec![Some(Unknown), Some(Bad), Some(Bad)])
        );
    }

    #[test]
    fn test_scalar_results_are_broadcast() {
        let combined = combine(&[
            grid("OWTR", vec![Some(Good), Some(Good), Some(Bad)]),
            TestResult::scalar("RDCT", Some(Good)),
        ])
        .unwrap();
        assert_eq!(
            combined,
            FlagSequence::new(vec![Some(Good), Some(Good), Some(Bad)])
        );

        let combined = combine(&[
            grid("OWTR", vec![Some(Good), Some(Good)]),
            TestResult::scalar("AVRB", Some(Bad)),
        ])
        .unwrap();
        assert_eq!(combined, FlagSequence::filled(Some(Bad), 2));
    }

    #[test]
    fn test_never_produces_other_flags() {
        let combined = combine(&[
            grid("A", vec![Some(QcFlag::ProbablyGood), Some(QcFlag::Interpolated)]),
            grid("B", vec![Some(QcFlag::ProbablyGood), Some(QcFlag::Nominal)]),
        ])
        .unwrap();
        assert_eq!(combined, FlagSequence::filled(Some(Bad), 2));
    }

    #[test]
    fn test_mismatched_lengths_and_empty_input() {
        assert!(combine(&[grid("A", vec![Some(Good)]), grid("B", vec![])]).is_err());
        assert!(combine(&[]).is_err());
    }
}
