//! SeaDataNet quality flags and test results.

use serde::{Deserialize, Serialize};
use std::fmt;

/// SeaDataNet / OceanSITES quality flag scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum QcFlag {
    Unknown = 0,
    Good = 1,
    ProbablyGood = 2,
    PotentiallyCorrectable = 3,
    Bad = 4,
    Nominal = 7,
    Interpolated = 8,
    Missing = 9,
}

impl QcFlag {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(QcFlag::Unknown),
            1 => Some(QcFlag::Good),
            2 => Some(QcFlag::ProbablyGood),
            3 => Some(QcFlag::PotentiallyCorrectable),
            4 => Some(QcFlag::Bad),
            7 => Some(QcFlag::Nominal),
            8 => Some(QcFlag::Interpolated),
            9 => Some(QcFlag::Missing),
            _ => None,
        }
    }

    /// Pass/fail verdict
    pub(crate) fn pass(passed: bool) -> Self {
        if passed { QcFlag::Good } else { QcFlag::Bad }
    }
}

impl fmt::Display for QcFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Per-cell flags; `None` means the value was absent from the input (NaN)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FlagSequence(Vec<Option<QcFlag>>);

impl FlagSequence {
    pub fn new(flags: Vec<Option<QcFlag>>) -> Self {
        Self(flags)
    }

    /// `len` copies of `flag`
    pub fn filled(flag: Option<QcFlag>, len: usize) -> Self {
        Self(vec![flag; len])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, cell: usize) -> Option<QcFlag> {
        self.0.get(cell).copied().flatten()
    }

    pub fn as_slice(&self) -> &[Option<QcFlag>] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<QcFlag>> + '_ {
        self.0.iter().copied()
    }

    /// Flag codes with NaN for absent values
    pub fn to_f64(&self) -> Vec<f64> {
        self.0
            .iter()
            .map(|f| f.map_or(f64::NAN, |flag| flag.code() as f64))
            .collect()
    }

    /// Nullable flag codes
    pub fn to_codes(&self) -> Vec<Option<i32>> {
        self.0.iter().map(|f| f.map(|flag| flag.code() as i32)).collect()
    }

    /// Repeat a length-1 sequence to `len` cells
    pub fn broadcast(&self, len: usize) -> Self {
        match self.0.as_slice() {
            [single] => Self::filled(*single, len),
            _ => self.clone(),
        }
    }

    pub fn count(&self, flag: QcFlag) -> usize {
        self.0.iter().filter(|f| **f == Some(flag)).count()
    }
}

impl From<Vec<Option<QcFlag>>> for FlagSequence {
    fn from(flags: Vec<Option<QcFlag>>) -> Self {
        Self(flags)
    }
}

impl FromIterator<Option<QcFlag>> for FlagSequence {
    fn from_iter<I: IntoIterator<Item = Option<QcFlag>>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Cells a test result applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestScope {
    /// One flag per grid cell
    Grid,
    /// A single flag broadcast to every cell
    Scalar,
}

/// Named flags of one QC test
#[derive(Debug, Clone, PartialEq)]
pub struct TestResult {
    pub name: String,
    pub flags: FlagSequence,
    pub scope: TestScope,
}

impl TestResult {
    pub fn grid(name: impl Into<String>, flags: FlagSequence) -> Self {
        Self {
            name: name.into(),
            flags,
            scope: TestScope::Grid,
        }
    }

    pub fn scalar(name: impl Into<String>, flag: Option<QcFlag>) -> Self {
        Self {
            name: name.into(),
            flags: FlagSequence::filled(flag, 1),
            scope: TestScope::Scalar,
        }
    }

    /// Flags expanded to `len` cells
    pub fn broadcast(&self, len: usize) -> FlagSequence {
        match self.scope {
            TestScope::Scalar => self.flags.broadcast(len),
            TestScope::Grid => self.flags.clone(),
        }
    }
}
