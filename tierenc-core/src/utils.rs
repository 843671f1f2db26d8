//! Utility functions for formatting and file operations.
//!
//! General-purpose helpers used across tierenc-core and the CLI: input
//! validation, output directory creation, duration and byte formatting.

use crate::error::{CoreError, CoreResult};
use crate::config::MUX_EXTENSIONS;
use std::path::Path;

/// Checks that `path` names an existing regular file.
///
/// Called before any output directory is created so a bad input leaves no
/// trace on disk.
pub fn validate_input_file(path: &Path) -> CoreResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(CoreError::InvalidInput(path.display().to_string()))
    }
}

/// Creates `dir` and its parents. An existing directory is not an error.
pub fn ensure_dir(dir: &Path) -> CoreResult<()> {
    std::fs::create_dir_all(dir).map_err(|e| {
        CoreError::PathError(format!("Failed to create directory {}: {e}", dir.display()))
    })
}

/// Whether `path` has one of the extensions a directory mux picks up.
#[must_use]
pub fn is_muxable_artifact(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| MUX_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

/// Formats seconds as HH:MM:SS (e.g., 3725.0 -> "01:02:05"). Returns "??:??:??" for invalid inputs.
#[must_use] pub fn format_duration(seconds: f64) -> String {
    if seconds < 0.0 || !seconds.is_finite() {
        return "??:??:??".to_string();
    }

    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Formats bytes with binary units (B, KiB, MiB, GiB).
#[must_use] pub fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;
    const GIB: f64 = MIB * 1024.0;

    let bytes_f64 = bytes as f64;
    if bytes_f64 >= GIB {
        format!("{:.2} GiB", bytes_f64 / GIB)
    } else if bytes_f64 >= MIB {
        format!("{:.2} MiB", bytes_f64 / MIB)
    } else if bytes_f64 >= KIB {
        format!("{:.2} KiB", bytes_f64 / KIB)
    } else {
        format!("{bytes} B")
    }
}

/// Extracts the file name of `path`, failing if it has none.
pub fn get_filename_safe(path: &Path) -> CoreResult<String> {
    Ok(path
        .file_name()
        .ok_or_else(|| {
            CoreError::PathError(format!("Failed to get filename for {}", path.display()))
        })?
        .to_string_lossy()
        .to_string())
}
