//! Tests for the processor module
//!
//! Exercise the per-file pipeline and the batch runner on small radial and
//! total files written to temporary directories.

pub mod error_handling;

use std::fs;
use std::path::{Path, PathBuf};

/// Radial rows: `VELO BEAR RNGE VFLG ETMP` (cm/s, deg, km, bits, cm/s)
pub const RADIAL_ROWS: &[[f64; 5]] = &[
    [-10.0, 0.0, 1.5, 0.0, 5.0],
    [-12.0, 0.0, 3.0, 0.0, 5.0],
    [-11.0, 5.0, 1.5, 0.0, 5.0],
    [-150.0, 5.0, 3.0, 0.0, 5.0],
    [-10.0, 10.0, 1.5, 0.0, 999.0],
    [-9.0, 10.0, 4.5, 128.0, 5.0],
];

/// Radial file on a 3 x 3 grid: bearings 0/5/10, ranges 1.5/3.0/4.5 km
pub fn radial_content(rows: &[[f64; 5]]) -> String {
    let mut content = String::from(
        "%CTF: 1.00\n\
         %FileType: LLUV rdls \"RadialMap\"\n\
         %TimeStamp: 2024 01 15 12 00 00\n\
         %Origin:  43.0000000   10.0000000\n\
         %AntennaBearing: 0.0 deg\n\
         %AngularResolution: 5 Deg\n\
         %RangeResolutionKMeters: 1.500000\n\
         %MinimumBearing: 0 deg\n\
         %MaximumBearing: 10 deg\n\
         %MinimumRangeKMeters: 1.5\n\
         %MaximumRangeKMeters: 4.5\n\
         %TableType: LLUV RDL9\n\
         %TableColumns: 5\n\
         %TableColumnTypes: VELO BEAR RNGE VFLG ETMP\n\
         %TableRows: 6\n\
         %TableStart:\n\
         %%   VELO    BEAR    RNGE  VFLG    ETMP\n",
    );
    for row in rows {
        content.push_str(&format!(
            "  {:8.3} {:7.1} {:7.3} {:5} {:8.3}\n",
            row[0], row[1], row[2], row[3], row[4]
        ));
    }
    content.push_str("%TableEnd:\n%End:\n");
    content
}

/// Total file with three vectors on the 43N 10E network grid
pub fn total_content() -> String {
    "%CTF: 1.00\n\
     %FileType: TOT tuv \"TotalMap\"\n\
     %TimeStamp: 2024 01 15 12 00 00\n\
     %Origin:  43.0000000   10.0000000\n\
     %GridSpacing: 2.000 km\n\
     %BoundingBox: 9.8 10.2 42.9 43.1\n\
     %TableType: TOT4\n\
     %TableColumnTypes: LOND LATD VELU VELV VFLG UQAL VQAL GDOP XDST YDST S1CN S2CN S3CN\n\
     %TableStart:\n\
     10.0000 43.0000  30.0  40.0 0 10.0 10.0 1.0  0.0 0.0 2 2 0\n\
     10.0245 43.0000 100.0 100.0 0 10.0 10.0 1.0  2.0 0.0 2 2 0\n\
      9.9755 43.0180  10.0  10.0 0 10.0 10.0 3.0 -2.0 2.0 1 1 1\n\
     %TableEnd:\n"
        .to_string()
}

/// Write `content` under `dir`, creating parent directories
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}
