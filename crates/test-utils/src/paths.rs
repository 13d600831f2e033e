//! Path utilities for locating sample configuration.

use std::path::PathBuf;

/// Returns the workspace root directory.
///
/// This is determined by walking up from the current crate's manifest directory
/// until we find the workspace Cargo.toml.
pub fn workspace_root() -> PathBuf {
    // Start from the test-utils crate manifest dir
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent()) // workspace root
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// Path of a file in the workspace `config/` directory.
pub fn config_file(name: &str) -> PathBuf {
    workspace_root().join("config").join(name)
}

/// Creates a temporary directory for test output.
///
/// The directory is automatically cleaned up when the returned `TempDir` is dropped.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary test directory")
}
