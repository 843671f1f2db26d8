//! Temporary file management utilities.
//!
//! Two-pass statistics live in a scratch directory that exists for the span
//! of one video encode. The tempfile crate removes it when the returned
//! handle drops, on success and on error alike.

use crate::error::CoreResult;
use std::path::{Path, PathBuf};
use tempfile::{Builder as TempFileBuilder, TempDir};

/// File name prefix ffmpeg derives its pass log names from.
pub const PASSLOG_PREFIX: &str = "ffmpeg2pass";

/// Creates a temporary directory with prefix inside `base_dir`. Auto-cleaned when dropped.
pub fn create_temp_dir(base_dir: &Path, prefix: &str) -> CoreResult<TempDir> {
    std::fs::create_dir_all(base_dir)?;

    Ok(TempFileBuilder::new()
        .prefix(prefix)
        .tempdir_in(base_dir)?)
}

/// `-passlogfile` value for statistics kept in `dir`.
pub fn passlog_path(dir: &Path) -> PathBuf {
    dir.join(PASSLOG_PREFIX)
}
