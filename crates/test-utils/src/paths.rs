//! Path utilities for test output and cache directories.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Returns the workspace root directory.
pub fn workspace_root() -> PathBuf {
    // Start from the test-utils crate manifest dir
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent()) // workspace root
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// Returns the path to the service testdata directory.
///
/// # Arguments
///
/// * `service_name` - The name of the service (e.g., "oven-render")
pub fn service_testdata_dir(service_name: &str) -> PathBuf {
    workspace_root()
        .join("services")
        .join(service_name)
        .join("testdata")
}

/// Creates a temporary directory for test output.
///
/// The directory is automatically cleaned up when the returned `TempDir` is dropped.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary test directory")
}

/// Writes a small file and backdates its modification time by `age`.
pub fn write_aged_file(path: &Path, age: Duration) -> PathBuf {
    std::fs::write(path, b"stale").expect("Failed to write aged file");
    let file = File::options()
        .write(true)
        .open(path)
        .expect("Failed to reopen aged file");
    file.set_modified(SystemTime::now() - age)
        .expect("Failed to set modification time");
    path.to_path_buf()
}
