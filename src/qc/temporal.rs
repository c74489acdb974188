//! Temporal derivative test.
//!
//! Compares every cell with the same cell of the files one time step
//! before and after. Sibling files are found by rewriting the timestamp
//! token embedded in the path; a missing or unreadable sibling leaves the
//! test not evaluated.

use super::checks::{double_threshold, threshold};
use super::flags::FlagSequence;
use crate::constants::{SIBLING_GAP, TIMESTAMP_TOKEN_FORMAT, TIMESTAMP_TOKEN_PATTERN};
use crate::error::Result;
use chrono::{Duration, NaiveDateTime};
use regex::Regex;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, warn};

fn token_regex() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| Regex::new(TIMESTAMP_TOKEN_PATTERN).expect("valid timestamp pattern"))
}

/// Byte span and value of the last timestamp token in a file name
fn timestamp_token(name: &str) -> Option<(Range<usize>, NaiveDateTime)> {
    let token = token_regex().find_iter(name).last()?;
    let timestamp = NaiveDateTime::parse_from_str(token.as_str(), TIMESTAMP_TOKEN_FORMAT).ok()?;
    Some((token.range(), timestamp))
}

/// Path of the file `offset_minutes` away from `path`.
///
/// The file-name token (`..._YYYY_MM_DD_HHMM.ext`) is rewritten, and so are
/// date directories (`YYYY`, `YYYY_MM`, `YYYY_MM_DD`) matching the original
/// timestamp.
pub fn sibling_path(path: &Path, offset_minutes: i64) -> Option<PathBuf> {
    let name = path.file_name()?.to_str()?;
    let (span, timestamp) = timestamp_token(name)?;
    let shifted = timestamp + Duration::minutes(offset_minutes);

    let new_name = format!(
        "{}{}{}",
        &name[..span.start],
        shifted.format(TIMESTAMP_TOKEN_FORMAT),
        &name[span.end..]
    );

    let date_dirs = [
        (timestamp.format("%Y_%m_%d").to_string(), shifted.format("%Y_%m_%d").to_string()),
        (timestamp.format("%Y_%m").to_string(), shifted.format("%Y_%m").to_string()),
        (timestamp.format("%Y").to_string(), shifted.format("%Y").to_string()),
    ];

    let mut sibling = PathBuf::new();
    if let Some(parent) = path.parent() {
        for component in parent.components() {
            let part = component.as_os_str();
            let replacement = part
                .to_str()
                .and_then(|s| date_dirs.iter().find(|(old, _)| old == s))
                .map(|(_, new)| new.as_str());
            match replacement {
                Some(new) => sibling.push(new),
                None => sibling.push(part),
            }
        }
    }
    sibling.push(new_name);
    Some(sibling)
}

/// Existing sibling files one time step before and after
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Siblings {
    pub previous: Option<PathBuf>,
    pub next: Option<PathBuf>,
}

pub fn locate_siblings(path: &Path, resolution_minutes: i64) -> Siblings {
    let existing = |offset: i64| sibling_path(path, offset).filter(|p| p.is_file());
    let siblings = Siblings {
        previous: existing(-resolution_minutes),
        next: existing(resolution_minutes),
    };
    debug!(
        "Siblings of {}: previous={:?} next={:?}",
        path.display(),
        siblings.previous,
        siblings.next
    );
    siblings
}

/// Load and grid-map a sibling; failures degrade to `None`
pub fn load_sibling<F>(path: Option<&Path>, load: F) -> Option<Vec<f64>>
where
    F: FnOnce(&Path) -> Result<Vec<f64>>,
{
    let path = path?;
    match load(path) {
        Ok(values) => Some(values),
        Err(e) => {
            warn!("Ignoring sibling {}: {}", path.display(), e);
            None
        }
    }
}

/// Velocity change against the previous and next file must stay within `limit`
pub fn temporal_derivative(
    current: &[f64],
    previous: Option<&[f64]>,
    next: Option<&[f64]>,
    limit: f64,
) -> FlagSequence {
    let (Some(previous), Some(next)) = (previous, next) else {
        return threshold(current, f64::NAN);
    };
    if previous.len() != current.len() || next.len() != current.len() {
        debug!(
            "Sibling grids differ in size ({} / {} vs {}), test not evaluated",
            previous.len(),
            next.len(),
            current.len()
        );
        return threshold(current, f64::NAN);
    }

    let backward = differences(current, previous);
    let forward = differences(current, next);
    double_threshold(&backward, &forward, limit)
}

/// |v - sibling| per cell; NaN where v is absent, a gap sentinel where the sibling is
fn differences(current: &[f64], sibling: &[f64]) -> Vec<f64> {
    current
        .iter()
        .zip(sibling)
        .map(|(&v, &s)| {
            if v.is_nan() {
                f64::NAN
            } else if s.is_nan() {
                SIBLING_GAP
            } else {
                (v - s).abs()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qc::flags::QcFlag::{Bad, Good, Unknown};
    use std::fs;
    use tempfile::TempDir;

    const NAN: f64 = f64::NAN;

    #[test]
    fn test_timestamp_token() {
        let (span, ts) = timestamp_token("RDLm_TINO_2024_01_15_1200.ruv").unwrap();
        assert_eq!(span, 10..25);
        assert_eq!(ts.format("%Y-%m-%d %H:%M").to_string(), "2024-01-15 12:00");
        assert!(timestamp_token("no_token.ruv").is_none());
        assert!(sibling_path(Path::new("/data/no_token.ruv"), 60).is_none());
    }

    #[test]
    fn test_sibling_path_rewrites_token() {
        let path = Path::new("/data/TINO/RDLm_TINO_2024_01_15_1200.ruv");
        assert_eq!(
            sibling_path(path, -60).unwrap(),
            PathBuf::from("/data/TINO/RDLm_TINO_2024_01_15_1100.ruv")
        );
        assert_eq!(
            sibling_path(path, 30).unwrap(),
            PathBuf::from("/data/TINO/RDLm_TINO_2024_01_15_1230.ruv")
        );
    }

    #[test]
    fn test_sibling_path_crosses_date_directories() {
        let path = Path::new("/data/TINO/2024/2024_01/2024_01_01/RDLm_TINO_2024_01_01_0000.ruv");
        assert_eq!(
            sibling_path(path, -60).unwrap(),
            PathBuf::from("/data/TINO/2023/2023_12/2023_12_31/RDLm_TINO_2023_12_31_2300.ruv")
        );
    }

    #[test]
    fn test_locate_siblings_only_existing() {
        let dir = TempDir::new().unwrap();
        let current = dir.path().join("RDLm_TINO_2024_01_15_1200.ruv");
        let previous = dir.path().join("RDLm_TINO_2024_01_15_1100.ruv");
        fs::write(&current, "").unwrap();
        fs::write(&previous, "").unwrap();

        let siblings = locate_siblings(&current, 60);
        assert_eq!(siblings.previous, Some(previous));
        assert_eq!(siblings.next, None);
    }

    #[test]
    fn test_missing_sibling_is_not_evaluated() {
        let current = [0.1, NAN, 0.3];
        let flags = temporal_derivative(&current, Some(&[0.1, 0.1, 0.1]), None, 1.0);
        assert_eq!(
            flags,
            FlagSequence::new(vec![Some(Unknown), None, Some(Unknown)])
        );
    }

    #[test]
    fn test_size_mismatch_is_not_evaluated() {
        let current = [0.1, 0.2];
        let flags = temporal_derivative(&current, Some(&[0.1]), Some(&[0.1, 0.2]), 1.0);
        assert_eq!(flags, FlagSequence::filled(Some(Unknown), 2));
    }

    #[test]
    fn test_temporal_derivative() {
        let current = [0.1, 0.5, NAN, 0.2];
        let previous = [0.2, -1.0, 0.1, NAN];
        let next = [0.0, 0.4, 0.1, 0.2];

        let flags = temporal_derivative(&current, Some(&previous), Some(&next), 1.0);
        assert_eq!(
            flags,
            FlagSequence::new(vec![Some(Good), Some(Bad), None, Some(Unknown)])
        );
    }

    #[test]
    fn test_load_sibling_degrades_on_error() {
        let loaded = load_sibling(Some(Path::new("x.ruv")), |p| {
            Err(crate::error::HfrError::FileNotFound {
                path: p.to_path_buf(),
            })
        });
        assert!(loaded.is_none());
        assert!(load_sibling(None, |_| Ok(vec![1.0])).is_none());
        assert_eq!(
            load_sibling(Some(Path::new("x.ruv")), |_| Ok(vec![1.0])),
            Some(vec![1.0])
        );
    }
}
