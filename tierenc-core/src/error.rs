// ============================================================================
// tierenc-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Custom Error Types for tierenc-core
//
// This module defines the error types used throughout the tierenc-core
// library. A single enum covers probing, loudness measurement, encoding,
// input validation and the process plumbing underneath them.
//
// KEY COMPONENTS:
// - CoreError: Main error enum with variants for different error categories
// - CoreResult: Type alias for Result<T, CoreError>
// - Helper functions for creating common command error types

// ---- External crate imports ----
use thiserror::Error;

// ---- Standard library imports ----
use std::io;
use std::process::ExitStatus;

/// Errors produced by tierenc-core operations.
#[derive(Error, Debug)]
pub enum CoreError {
    // ---- I/O and Command Execution Errors ----
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to start command '{0}': {1}")]
    CommandStart(String, #[source] io::Error),

    #[error("Failed waiting for command '{0}': {1}")]
    CommandWait(String, #[source] io::Error),

    #[error("Command '{cmd}' failed with status {status}: {stderr}")]
    CommandFailed {
        cmd: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("Required external command '{0}' not found")]
    DependencyNotFound(String),

    // ---- Media Pipeline Errors ----
    /// Stream metadata is missing or invalid.
    #[error("Probe error: {0}")]
    Probe(String),

    /// Loudness levels could not be located in the engine's diagnostic output.
    #[error("Loudness measurement error: {0}")]
    Measurement(String),

    /// The engine reported failure for an encode or mux stage.
    #[error("Encode error: {0}")]
    Encode(String),

    /// The source file does not exist or is not a regular file.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("ffprobe output parsing error: {0}")]
    FfprobeParse(String),

    // ---- Configuration and Path Errors ----
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Path error: {0}")]
    PathError(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

/// Result type for tierenc-core operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Creates a `CommandStart` error for a command that could not be spawned.
pub fn command_start_error(cmd: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandStart(cmd.into(), err)
}

/// Creates a `CommandWait` error for a command whose exit could not be collected.
pub fn command_wait_error(cmd: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandWait(cmd.into(), err)
}

/// Creates a `CommandFailed` error from a non-zero exit.
pub fn command_failed_error(
    cmd: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed {
        cmd: cmd.into(),
        status,
        stderr: stderr.into(),
    }
}

/// Creates an `Encode` error for a stage that exited unsuccessfully.
///
/// Only the tail of the diagnostic output is kept; ffmpeg prints the cause
/// of a failure last.
pub fn encode_failed_error(stage: &str, status: ExitStatus, log_lines: &[String]) -> CoreError {
    const TAIL_LINES: usize = 5;
    let start = log_lines.len().saturating_sub(TAIL_LINES);
    let tail = log_lines[start..].join("\n");
    let code = status
        .code()
        .map_or_else(|| "signal".to_string(), |c| c.to_string());

    if tail.is_empty() {
        CoreError::Encode(format!("{stage} exited with status {code}"))
    } else {
        CoreError::Encode(format!("{stage} exited with status {code}:\n{tail}"))
    }
}
