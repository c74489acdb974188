//! Input discovery for HFR processing
//!
//! Resolves the command-line input into the list of radial (`.ruv`) and
//! total (`.tuv`) files to process. The input may be a single file, a
//! directory tree of dated sub-directories, or a glob pattern.

use crate::error::{HfrError, Result};
use crate::models::ProductType;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// File discovery component for HFR datasets
#[derive(Debug)]
pub struct FileDiscovery {
    input: PathBuf,
    product: Option<ProductType>,
}

impl FileDiscovery {
    pub fn new(input: PathBuf) -> Self {
        Self {
            input,
            product: None,
        }
    }

    /// Restrict discovery to one product type
    pub fn with_product(mut self, product: Option<ProductType>) -> Self {
        self.product = product;
        self
    }

    /// Discover input files, sorted by path
    ///
    /// Typical network layout:
    /// ```text
    /// radials/
    ///   TINO/
    ///     2024/
    ///       2024_01/
    ///         2024_01_15/
    ///           RDLm_TINO_2024_01_15_1200.ruv
    /// ```
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        let mut files = if self.input.is_file() {
            vec![self.input.clone()]
        } else if self.input.is_dir() {
            self.walk_directory()?
        } else {
            self.expand_pattern()?
        };

        files.retain(|path| self.accepts(path));
        files.sort();
        files.dedup();

        debug!(
            "Discovered {} input files under {}",
            files.len(),
            self.input.display()
        );

        Ok(files)
    }

    fn accepts(&self, path: &Path) -> bool {
        match (ProductType::from_path(path), self.product) {
            (Some(found), Some(wanted)) => found == wanted,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    fn walk_directory(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(&self.input).follow_links(true) {
            let entry = entry.map_err(|e| HfrError::Io(e.into()))?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }

    fn expand_pattern(&self) -> Result<Vec<PathBuf>> {
        let pattern = self.input.to_string_lossy();
        let paths = glob::glob(&pattern).map_err(|e| {
            HfrError::configuration(format!("Invalid input pattern '{}': {}", pattern, e))
        })?;

        let files = paths
            .map(|entry| entry.map_err(|e| HfrError::Io(e.into_error())))
            .collect::<Result<Vec<_>>>()?;

        if files.is_empty() {
            return Err(HfrError::FileNotFound {
                path: self.input.clone(),
            });
        }

        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_walks_dated_directories() {
        let dir = TempDir::new().unwrap();
        let day = dir.path().join("TINO/2024/2024_01/2024_01_15");
        touch(&day.join("RDLm_TINO_2024_01_15_1300.ruv"));
        touch(&day.join("RDLm_TINO_2024_01_15_1200.ruv"));
        touch(&day.join("notes.txt"));
        touch(&dir.path().join("TOTL_NAPL_2024_01_15_1200.tuv"));

        let files = FileDiscovery::new(dir.path().to_path_buf())
            .discover()
            .unwrap();
        assert_eq!(files.len(), 3);

        let radials = FileDiscovery::new(dir.path().to_path_buf())
            .with_product(Some(ProductType::Radial))
            .discover()
            .unwrap();
        assert_eq!(radials.len(), 2);
        assert!(radials[0].ends_with("RDLm_TINO_2024_01_15_1200.ruv"));
    }

    #[test]
    fn test_single_file_and_pattern() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("RDLm_TINO_2024_01_15_1200.ruv");
        touch(&file);

        let files = FileDiscovery::new(file.clone()).discover().unwrap();
        assert_eq!(files, vec![file.clone()]);

        let pattern = dir.path().join("*.ruv");
        let files = FileDiscovery::new(pattern).discover().unwrap();
        assert_eq!(files, vec![file]);
    }

    #[test]
    fn test_missing_input() {
        let dir = TempDir::new().unwrap();
        let result = FileDiscovery::new(dir.path().join("absent_*.ruv")).discover();
        assert!(matches!(result, Err(HfrError::FileNotFound { .. })));
    }
}
