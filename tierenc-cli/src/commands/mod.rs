//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command.

/// Module containing the implementation of the `encode` command.
/// This command produces the audio-only tier and the VP9 ladder of a source.
pub mod encode;

/// Module containing the implementation of the `mux` command.
pub mod mux;

use crate::cli::Commands;
use tierenc_core::{CoreError, CoreResult, validate_input_file};

/// Checks every input path the command reads before anything is created.
///
/// Fails with `InvalidInput` naming the first unusable path.
pub fn validate_inputs(command: &Commands) -> CoreResult<()> {
    match command {
        Commands::Encode(args) => validate_input_file(&args.input),
        Commands::Mux(args) => {
            validate_input_file(&args.audio)?;
            if let Some(artifact) = &args.artifact {
                validate_input_file(artifact)?;
            }
            match &args.input_dir {
                Some(dir) if !dir.is_dir() => {
                    Err(CoreError::InvalidInput(dir.display().to_string()))
                }
                _ => Ok(()),
            }
        }
    }
}
