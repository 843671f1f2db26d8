//! Implementation of the 'mux' subcommand.

use crate::cli::MuxArgs;
use crate::commands::encode::exit_policy;
use crate::error::CliResult;

use tierenc_core::config::MuxConfig;
use tierenc_core::encoding::MuxOutcome;
use tierenc_core::external::{FfmpegSpawner, FfprobeExecutor};
use tierenc_core::utils::get_filename_safe;
use tierenc_core::{MuxReport, mux_clean, mux_directory};

use log::error;

pub fn build_mux_config(args: &MuxArgs) -> MuxConfig {
    let mut config = MuxConfig::new(args.audio.clone(), args.output_dir.clone());
    config.normalize = args.norm;
    config.exit_policy = exit_policy(args.best_effort);
    config
}

/// Muxes the replacement audio onto the directory or single artifact named
/// by `args`. A single artifact is written under its own file name.
pub fn run_mux<S: FfmpegSpawner, P: FfprobeExecutor>(
    spawner: &S,
    probe: &P,
    args: &MuxArgs,
) -> CliResult<MuxReport> {
    let config = build_mux_config(args);

    if let Some(input_dir) = &args.input_dir {
        return mux_directory(spawner, probe, &config, input_dir);
    }

    let mut report = MuxReport::default();
    if let Some(artifact) = &args.artifact {
        let output = config.output_dir.join(get_filename_safe(artifact)?);
        let outcome = match mux_clean(spawner, probe, &config, Some(artifact), &output) {
            Ok(branch) => MuxOutcome {
                artifact: artifact.clone(),
                output,
                branch: Some(branch),
                error: None,
            },
            Err(err) => {
                error!("Muxing {} failed: {err}", artifact.display());
                MuxOutcome {
                    artifact: artifact.clone(),
                    output,
                    branch: None,
                    error: Some(err.to_string()),
                }
            }
        };
        report.outcomes.push(outcome);
    }
    Ok(report)
}
