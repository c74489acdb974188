//! Error handling tests

use super::{radial_content, write_file, RADIAL_ROWS};
use crate::config::HfrConfig;
use crate::error::HfrError;
use crate::processor::{FileProcessor, MetadataFile, MetadataSources};
use tempfile::TempDir;

fn processor() -> FileProcessor {
    FileProcessor::new(HfrConfig::default(), MetadataSources::default())
}

#[test]
fn test_nonexistent_file() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("RDLm_TINO_2024_01_15_1200.ruv");

    match processor().process_file(&missing).unwrap_err() {
        HfrError::FileNotFound { path } => assert_eq!(path, missing),
        other => panic!("Expected FileNotFound error, got {:?}", other),
    }
}

#[test]
fn test_file_without_table() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_file(
        temp_dir.path(),
        "RDLm_TINO_2024_01_15_1200.ruv",
        "%TableType: LLUV RDL9\n%TableColumnTypes: VELO BEAR RNGE\n",
    );

    assert!(matches!(
        processor().process_file(&path),
        Err(HfrError::InvalidFormat { .. })
    ));
}

#[test]
fn test_unknown_product_type() {
    let temp_dir = TempDir::new().unwrap();
    let content = radial_content(RADIAL_ROWS).replace("%TableType: LLUV RDL9\n", "");
    let path = write_file(temp_dir.path(), "measurements.dat", &content);

    match processor().process_file(&path).unwrap_err() {
        HfrError::InvalidFormat { reason, .. } => assert!(reason.contains("product type")),
        other => panic!("Expected InvalidFormat error, got {:?}", other),
    }
}

#[test]
fn test_product_type_from_extension() {
    let temp_dir = TempDir::new().unwrap();
    let content = radial_content(RADIAL_ROWS).replace("%TableType: LLUV RDL9\n", "");
    let path = write_file(temp_dir.path(), "RDLm_TINO_2024_01_15_1200.ruv", &content);

    let report = processor().process_file(&path).unwrap();
    assert_eq!(report.cell_count(), 9);
}

#[test]
fn test_missing_velocity_column() {
    let temp_dir = TempDir::new().unwrap();
    let content = "%TableType: LLUV RDL9\n\
                   %Origin: 43.0 10.0\n\
                   %AntennaBearing: 0\n\
                   %AngularResolution: 5\n\
                   %RangeResolutionKMeters: 1.5\n\
                   %MinimumBearing: 0\n\
                   %MaximumBearing: 10\n\
                   %MinimumRangeKMeters: 1.5\n\
                   %MaximumRangeKMeters: 4.5\n\
                   %TableColumnTypes: BEAR RNGE\n\
                   %TableStart:\n\
                   0.0 1.5\n\
                   %TableEnd:\n";
    let path = write_file(temp_dir.path(), "RDLm_TINO_2024_01_15_1200.ruv", content);

    match processor().process_file(&path).unwrap_err() {
        HfrError::ColumnNotFound { column } => assert_eq!(column, "VELO"),
        other => panic!("Expected ColumnNotFound error, got {:?}", other),
    }
}

#[test]
fn test_zero_grid_spacing() {
    let temp_dir = TempDir::new().unwrap();
    let content = radial_content(RADIAL_ROWS).replace(
        "%RangeResolutionKMeters: 1.500000",
        "%RangeResolutionKMeters: 0.0",
    );
    let path = write_file(temp_dir.path(), "RDLm_TINO_2024_01_15_1200.ruv", &content);

    assert!(matches!(
        processor().process_file(&path),
        Err(HfrError::Configuration { .. })
    ));
}

#[test]
fn test_malformed_metadata_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_file(temp_dir.path(), "station.json", "{ radial: ");

    assert!(matches!(
        MetadataFile::from_file(&path),
        Err(HfrError::Json(_))
    ));
    assert!(matches!(
        MetadataSources::from_files(Some(&temp_dir.path().join("absent.json")), None),
        Err(HfrError::FileNotFound { .. })
    ));
}
