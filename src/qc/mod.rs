//! Quality control test battery and flag combination.
//!
//! All tests are pure functions over grid-ordered columns producing
//! SeaDataNet flags; the combiner merges them into the overall flag.

pub mod battery;
pub mod checks;
pub mod combine;
pub mod flags;
pub mod median;
pub mod temporal;

pub use self::battery::{names, run_radial_battery, run_total_battery, RadialQcInput, TotalQcInput};
pub use self::combine::combine;
pub use self::flags::{FlagSequence, QcFlag, TestResult, TestScope};
