//! Saving split output: single CSV files or one ZIP bundle.
//!
//! Every save goes through a temporary file in the destination directory
//! that is persisted over the final name, so a failed save never leaves a
//! truncated file behind.

pub mod archive;

pub use archive::{archive_name_for, build_archive, normalize_archive_name};

use crate::csv_processor::Chunk;
use crate::utils::{CsvSplitterError, Result};
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

pub const CSV_CONTENT_TYPE: &str = "text/csv;charset=utf-8";
pub const ZIP_CONTENT_TYPE: &str = "application/zip";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedFile {
    pub path: PathBuf,
    pub content_type: String,
    pub size_bytes: u64,
}

/// Saves one chunk as `{dir}/{chunk.name}`.
pub fn export_one(chunk: &Chunk, dir: impl AsRef<Path>) -> Result<ExportedFile> {
    let path = save_atomically(dir.as_ref(), &chunk.name, chunk.content.as_bytes())?;

    info!(file = %path.display(), rows = chunk.row_count, "Exported chunk");

    Ok(ExportedFile {
        path,
        content_type: CSV_CONTENT_TYPE.to_string(),
        size_bytes: chunk.size_bytes as u64,
    })
}

/// Bundles all chunks into `{dir}/{archive_name}` (`.zip` appended if missing).
pub fn export_all(
    chunks: &[Chunk],
    archive_name: &str,
    dir: impl AsRef<Path>,
) -> Result<ExportedFile> {
    let file_name = normalize_archive_name(archive_name);
    let bytes = build_archive(chunks)?;
    let path = save_atomically(dir.as_ref(), &file_name, &bytes)?;

    info!(
        file = %path.display(),
        entries = chunks.len(),
        size_bytes = bytes.len(),
        "Exported archive"
    );

    Ok(ExportedFile {
        path,
        content_type: ZIP_CONTENT_TYPE.to_string(),
        size_bytes: bytes.len() as u64,
    })
}

fn save_atomically(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    if file_name.is_empty() || Path::new(file_name).file_name() != Some(OsStr::new(file_name)) {
        return Err(CsvSplitterError::Export(format!(
            "invalid file name: {:?}",
            file_name
        )));
    }

    std::fs::create_dir_all(dir).map_err(|e| {
        CsvSplitterError::Export(format!("Failed to create {}: {}", dir.display(), e))
    })?;

    let final_path = dir.join(file_name);

    let mut temp_file = NamedTempFile::new_in(dir).map_err(|e| {
        CsvSplitterError::Export(format!("Failed to create temporary file: {}", e))
    })?;
    temp_file
        .write_all(bytes)
        .and_then(|_| temp_file.flush())
        .map_err(|e| CsvSplitterError::Export(format!("Failed to write {}: {}", file_name, e)))?;

    temp_file.persist(&final_path).map_err(|e| {
        CsvSplitterError::Export(format!(
            "Failed to persist file to {}: {}",
            final_path.display(),
            e.error
        ))
    })?;

    Ok(final_path)
}
