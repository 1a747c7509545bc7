//! Path utilities for locating test data files.
//!
//! This module provides functions to find test data files across multiple
//! potential locations, supporting both local development and CI environments.

use std::path::PathBuf;

/// Returns the workspace root directory.
///
/// This is determined by walking up from the test-utils manifest directory.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent()) // workspace root
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// Returns `crates/{crate_name}/testdata/`.
pub fn crate_testdata_dir(crate_name: &str) -> PathBuf {
    workspace_root()
        .join("crates")
        .join(crate_name)
        .join("testdata")
}

/// Returns `services/{service_name}/testdata/`.
pub fn service_testdata_dir(service_name: &str) -> PathBuf {
    workspace_root()
        .join("services")
        .join(service_name)
        .join("testdata")
}

/// Searches for a test file in multiple locations.
///
/// This function checks the following locations in order:
/// 1. Environment variable `TEST_DATA_DIR` (if set)
/// 2. `crates/netcdf-reader/testdata/`
/// 3. `services/extractor/testdata/`
/// 4. workspace-level `testdata/`
///
/// # Returns
///
/// `Some(PathBuf)` if the file is found, `None` otherwise.
pub fn find_test_file(name: &str) -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(test_data_dir) = std::env::var("TEST_DATA_DIR") {
        candidates.push(PathBuf::from(test_data_dir).join(name));
    }

    candidates.extend([
        crate_testdata_dir("netcdf-reader").join(name),
        service_testdata_dir("extractor").join(name),
        workspace_root().join("testdata").join(name),
    ]);

    candidates.into_iter().find(|path| path.exists())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_root_is_valid() {
        let root = workspace_root();
        assert!(
            root.join("Cargo.toml").exists(),
            "Workspace root should contain Cargo.toml: {:?}",
            root
        );
    }

    #[test]
    fn test_crate_testdata_dir() {
        let dir = crate_testdata_dir("netcdf-reader");
        assert!(dir.to_string_lossy().contains("netcdf-reader"));
        assert!(dir.to_string_lossy().ends_with("testdata"));
    }

    #[test]
    fn test_missing_file_not_found() {
        assert!(find_test_file("definitely-not-here.nc").is_none());
    }
}
