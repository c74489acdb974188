//! Application constants for HFR processor
//!
//! Column names, native sentinels, physical constants and default QC
//! thresholds used throughout the processor.

// =============================================================================
// Physical Constants
// =============================================================================

/// Mean Earth radius in kilometres (haversine and planar distances)
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// WGS84 semi-major axis in metres
pub const WGS84_A: f64 = 6_378_137.0;

/// WGS84 flattening
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;

/// Decimal places kept on axis values and row keys to suppress float drift
pub const AXIS_DECIMALS: i32 = 4;

// =============================================================================
// File Types
// =============================================================================

/// Extension of radial (LLUV) files
pub const RADIAL_EXTENSION: &str = "ruv";

/// Extension of total (TUV) files
pub const TOTAL_EXTENSION: &str = "tuv";

/// Prefix of header lines in CODAR tabular files
pub const HEADER_PREFIX: char = '%';

/// Pattern of the timestamp token embedded in file names (YYYY_MM_DD_HHMM)
pub const TIMESTAMP_TOKEN_PATTERN: &str = r"(\d{4})_(\d{2})_(\d{2})_(\d{2})(\d{2})";

/// chrono format used to render the timestamp token
pub const TIMESTAMP_TOKEN_FORMAT: &str = "%Y_%m_%d_%H%M";

// =============================================================================
// Measurement Table Columns
// =============================================================================

/// Column names of the measurement table as declared in `%TableColumnTypes`
pub mod columns {
    pub const LONGITUDE: &str = "LOND";
    pub const LATITUDE: &str = "LATD";
    pub const VELOCITY_U: &str = "VELU";
    pub const VELOCITY_V: &str = "VELV";
    pub const VECTOR_FLAG: &str = "VFLG";

    // Radial columns
    pub const SPATIAL_QUALITY: &str = "ESPC";
    pub const TEMPORAL_QUALITY: &str = "ETMP";
    pub const MAX_VELOCITY: &str = "MAXV";
    pub const MIN_VELOCITY: &str = "MINV";
    pub const SPATIAL_COUNT: &str = "ERSC";
    pub const TEMPORAL_COUNT: &str = "ERTC";
    pub const X_DISTANCE: &str = "XDST";
    pub const Y_DISTANCE: &str = "YDST";
    pub const RANGE: &str = "RNGE";
    pub const BEARING: &str = "BEAR";
    pub const RADIAL_VELOCITY: &str = "VELO";

    // Total columns
    pub const U_QUALITY: &str = "UQAL";
    pub const V_QUALITY: &str = "VQAL";
    pub const GDOP: &str = "GDOP";

    /// Site contribution count columns of total files
    pub const SITE_COUNTS: &[&str] = &["S1CN", "S2CN", "S3CN", "S4CN", "S5CN", "S6CN"];
}

// =============================================================================
// Native Sentinels
// =============================================================================

/// Native bad value of spatial/temporal quality columns after cm/s to m/s
pub const QUALITY_BAD_VALUE: f64 = 9.99;

/// Native bad value of quality count columns
pub const COUNT_BAD_VALUE: f64 = 999.0;

/// Count columns are stored as signed bytes downstream
pub const COUNT_CLAMP: f64 = 127.0;

/// Sentinel exported for unmapped grid cells
pub const UNMAPPED_INDEX: i64 = -1;

/// Sentinel fed to the double threshold when a sibling cell is a gap
pub const SIBLING_GAP: f64 = -1.0;

// =============================================================================
// Default QC Thresholds
// =============================================================================

pub mod defaults {
    /// Maximum current speed (m/s)
    pub const VELOCITY_THRESHOLD: f64 = 1.2;

    /// Maximum temporal/total variance (m/s)
    pub const VARIANCE_THRESHOLD: f64 = 1.0;

    /// Maximum velocity change between consecutive files (m/s)
    pub const TEMPORAL_DERIVATIVE_THRESHOLD: f64 = 1.0;

    /// Time step between consecutive files (minutes)
    pub const TEMPORAL_RESOLUTION_MINUTES: i64 = 60;

    /// Median filter search radius (km)
    pub const MEDIAN_RADIUS_KM: f64 = 10.0;

    /// Median filter bearing window (degrees)
    pub const MEDIAN_ANGLE_DEG: f64 = 10.0;

    /// Median filter deviation limit (m/s)
    pub const MEDIAN_CURRENT_LIMIT: f64 = 0.3;

    pub const AVG_BEARING_MIN: f64 = 0.0;
    pub const AVG_BEARING_MAX: f64 = 360.0;

    /// Minimum populated cells of a radial file
    pub const RADIAL_COUNT_THRESHOLD: f64 = 150.0;

    /// Minimum number of contributing radials per total cell
    pub const DATA_DENSITY_THRESHOLD: f64 = 3.0;

    /// Maximum GDOP of a total cell
    pub const GDOP_THRESHOLD: f64 = 2.0;

    /// Populated cell count above which the median filter uses a bearing index
    pub const BUCKET_INDEX_MIN_CELLS: usize = 2000;
}
