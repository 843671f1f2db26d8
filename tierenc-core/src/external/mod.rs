// ============================================================================
// tierenc-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with ffmpeg and ffprobe
//
// This module encapsulates every interaction with the external media engine.
// Spawning and probing sit behind traits so the pipeline can be driven by the
// scripted mocks in tests and by ffmpeg-sidecar / the ffprobe crate in
// production.
//
// KEY COMPONENTS:
// - Traits for external tool interactions (FfmpegSpawner, FfprobeExecutor)
// - FfmpegArgs: argument vector builder
// - Scripted mocks for both seams (test builds and the `test-mocks` feature)
// - Dependency checking

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult};

// ---- Standard library imports ----
use std::io;
use std::process::{Command, Stdio};

// ============================================================================
// SUBMODULES
// ============================================================================

/// Argument vector construction
pub mod ffmpeg_builder;

/// Contains traits and implementations for executing ffmpeg commands
pub mod ffmpeg_executor;

/// Contains traits and implementations for executing ffprobe commands
pub mod ffprobe_executor;

/// Scripted implementations of the ffmpeg/ffprobe traits
#[cfg(any(test, feature = "test-mocks"))]
pub mod mocks;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use ffmpeg_builder::{FfmpegArgs, NULL_SINK};
pub use ffmpeg_executor::{
    EngineOutput, EngineRun, FfmpegProcess, FfmpegSpawner, SidecarProcess, SidecarSpawner,
    run_ffmpeg,
};
pub use ffprobe_executor::{CrateFfprobeExecutor, FfprobeExecutor, StreamKind, StreamMetadata};

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks if a required external command is available and executable.
///
/// Runs `<cmd_name> -version` with output discarded. Only a failure to
/// launch counts; the exit status is not inspected.
///
/// # Returns
///
/// * `Ok(())` - If the command could be started
/// * `Err(CoreError::DependencyNotFound)` - If the command is not found
/// * `Err(CoreError::CommandStart)` - If the command exists but fails to start
pub fn check_dependency(cmd_name: &str) -> CoreResult<()> {
    let result = Command::new(cmd_name)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {}", cmd_name);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{}' not found.", cmd_name);
            Err(CoreError::DependencyNotFound(cmd_name.to_string()))
        }
        Err(e) => {
            log::error!("Failed to start dependency check command '{}': {}", cmd_name, e);
            Err(CoreError::CommandStart(cmd_name.to_string(), e))
        }
    }
}
