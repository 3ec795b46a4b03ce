//! Shared helpers for protoguard-sast integration tests

#![allow(dead_code)]

pub mod builders;

use std::path::PathBuf;
use tempfile::TempDir;

/// Create a temporary source file, creating parent directories as needed
pub async fn create_source_file(dir: &TempDir, filename: &str, content: &str) -> PathBuf {
    let path = dir.path().join(filename);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .expect("Failed to create source directory");
    }
    tokio::fs::write(&path, content)
        .await
        .expect("Failed to write source file");
    path
}
