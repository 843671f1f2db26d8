//! Implementation of the 'encode' subcommand.
//!
//! Maps the parsed arguments onto a LadderConfig and hands it to the core
//! ladder orchestration.

use crate::cli::EncodeArgs;
use crate::error::CliResult;

use tierenc_core::config::{ExitPolicy, LadderConfig, LadderConfigBuilder};
use tierenc_core::external::{FfmpegSpawner, FfprobeExecutor};
use tierenc_core::processing::{DimensionOverrides, SeekRange};
use tierenc_core::{LadderReport, Settings, plan_ladder, run_ladder};

use log::{debug, info};

/// Parses repeated `-x KEY[=VALUE]` options; a bare `KEY` is a flag.
///
/// A leading `-` on the key is accepted and dropped.
pub fn parse_extra_settings(options: &[String]) -> Settings {
    let mut settings = Settings::new();
    for option in options {
        let option = option.trim_start_matches('-');
        match option.split_once('=') {
            Some((key, value)) if !key.is_empty() => settings.insert(key, value),
            Some(_) => {}
            None if !option.is_empty() => settings.insert_flag(option),
            None => {}
        }
    }
    settings
}

pub fn exit_policy(best_effort: bool) -> ExitPolicy {
    if best_effort {
        ExitPolicy::BestEffort
    } else {
        ExitPolicy::FailFast
    }
}

/// Builds the ladder configuration described by `args`.
pub fn build_ladder_config(args: &EncodeArgs) -> LadderConfig {
    let mut builder = LadderConfigBuilder::new(args.input.clone())
        .output_dir(args.output_dir.clone())
        .skip(args.skip.clone())
        .seek(SeekRange::new(
            args.ss.clone(),
            args.to.clone(),
            args.duration.clone(),
        ))
        .normalize(args.norm)
        .extra_settings(parse_extra_settings(&args.extra))
        .dimension_overrides(DimensionOverrides {
            width: args.force_width,
            height: args.force_height,
            sar: args.force_sar,
            dar: args.force_dar,
        })
        .exit_policy(exit_policy(args.best_effort));

    if let Some(resolutions) = &args.resolutions {
        builder = builder.resolutions(resolutions.clone());
    }
    if let Some(vf) = args.vf.as_deref() {
        builder = builder.video_filters(vf);
    }
    if let Some(af) = args.af.as_deref() {
        builder = builder.audio_filters(af);
    }
    if let Some(crf) = args.crf {
        builder = builder.vp9_override("crf", crf);
    }
    if let Some(gop) = args.gop {
        builder = builder.vp9_override("g", gop);
    }

    builder.build()
}

/// Runs the encode ladder for `args`.
///
/// `on_planned` runs after the source has been probed and before anything
/// is written, so a probe failure leaves no output behind.
pub fn run_encode<S, P, F>(
    spawner: &S,
    probe: &P,
    args: &EncodeArgs,
    on_planned: F,
) -> CliResult<LadderReport>
where
    S: FfmpegSpawner,
    P: FfprobeExecutor,
    F: FnOnce() -> CliResult<()>,
{
    let config = build_ladder_config(args);
    debug!("Ladder configuration: {config:?}");

    let planned = plan_ladder(probe, &config)?;
    on_planned()?;

    info!("Input: {}", config.input.display());
    info!("Output directory: {}", config.output_dir.display());

    run_ladder(spawner, &config, planned)
}
