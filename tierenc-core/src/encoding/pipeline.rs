// ============================================================================
// tierenc-core/src/encoding/pipeline.rs
// ============================================================================
//
// LADDER ORCHESTRATION: Probe, Plan, Measure, Encode
//
// Sequences one run of the encode ladder:
//   1. validate the input and probe its dimensions (failure aborts the run)
//   2. plan the tiers
//   3. optionally measure loudness once over the trim range
//   4. encode each tier in order; a failed tier is recorded and the ladder
//      continues
//
// KEY COMPONENTS:
// - encode_ladder: the orchestration entry point
// - plan_ladder / run_ladder: its two halves, split where output starts
// - LadderReport / TierOutcome / EncodeResult: what happened to each tier

// ---- Internal crate imports ----
use crate::config::{LadderConfig, initial_video_filters};
use crate::encoding::audio::{AudioEncode, encode_audio_only};
use crate::encoding::video::{VideoEncode, encode_video, video_settings};
use crate::error::CoreResult;
use crate::external::{FfmpegSpawner, FfprobeExecutor};
use crate::processing::dimensions::{ProbedDimensions, probe_dimensions};
use crate::processing::filters::FilterChain;
use crate::processing::loudness::{GainAdjustment, LoudnessMeasurement, normalization_filter};
use crate::processing::planner::{ScaleTarget, Tier, TierPlan, plan_tiers, scale_target};
use crate::settings::Settings;
use crate::utils::{ensure_dir, validate_input_file};

// ---- External crate imports ----
use log::{error, info};
use serde::Serialize;

// ---- Standard library imports ----
use std::path::{Path, PathBuf};
use std::time::Instant;

/// A tier that was encoded.
#[derive(Debug, Clone, Serialize)]
pub struct EncodeResult {
    pub tier: Tier,
    pub output: PathBuf,
    /// `None` for audio-only tiers
    pub scale: Option<ScaleTarget>,
    pub elapsed_secs: f64,
    /// Size of the artifact, when it could be read
    pub size_bytes: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TierOutcome {
    Encoded(EncodeResult),
    Failed {
        tier: Tier,
        output: PathBuf,
        error: String,
    },
}

impl TierOutcome {
    pub fn tier(&self) -> Tier {
        match self {
            TierOutcome::Encoded(result) => result.tier,
            TierOutcome::Failed { tier, .. } => *tier,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, TierOutcome::Failed { .. })
    }
}

/// Everything a ladder run decided and produced.
#[derive(Debug, Clone, Serialize)]
pub struct LadderReport {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    /// Probed values with any forced overrides applied
    pub dimensions: ProbedDimensions,
    pub plan: TierPlan,
    pub loudness: Option<LoudnessMeasurement>,
    pub gain: Option<GainAdjustment>,
    /// One per planned tier, in plan order
    pub outcomes: Vec<TierOutcome>,
}

impl LadderReport {
    pub fn all_succeeded(&self) -> bool {
        !self.outcomes.iter().any(TierOutcome::is_failure)
    }

    pub fn failures(&self) -> impl Iterator<Item = &TierOutcome> {
        self.outcomes.iter().filter(|o| o.is_failure())
    }
}

/// Video filter chain for one tier: initial chain, then the caller's filters,
/// then the computed scale in the position `scale` already holds.
pub fn tier_video_filters(user: &FilterChain, scale: &ScaleTarget) -> FilterChain {
    let mut chain = initial_video_filters();
    chain.extend(user);
    chain.set("scale", scale.filter_value());
    chain
}

/// Probed geometry and tier plan of a ladder run, decided before anything
/// is written.
#[derive(Debug, Clone)]
pub struct PlannedLadder {
    pub dimensions: ProbedDimensions,
    pub plan: TierPlan,
}

/// Validates the input, probes it and plans its tiers.
///
/// Touches nothing on disk, so a caller can defer creating its own output
/// (run logs included) until this has succeeded.
pub fn plan_ladder<P: FfprobeExecutor>(probe: &P, config: &LadderConfig) -> CoreResult<PlannedLadder> {
    validate_input_file(&config.input)?;

    let probed = probe_dimensions(probe, &config.input)?;
    let dimensions = probed.with_overrides(&config.dimension_overrides);
    if !config.dimension_overrides.is_empty() {
        info!(
            "Using forced dimensions {}x{} sar={} dar={}",
            dimensions.width, dimensions.height, dimensions.sar, dimensions.dar
        );
    }

    let plan = plan_tiers(&config.resolutions, &config.skip, dimensions.height);
    info!(
        "Planned tiers for {}: {}",
        config.input.display(),
        plan.tiers
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(PlannedLadder { dimensions, plan })
}

/// Runs the encode ladder described by `config`.
///
/// Returns `Err` only when nothing can be attempted: the input is invalid,
/// its dimensions cannot be probed, or the output directory cannot be
/// created. Per-tier failures are reported in the returned [`LadderReport`].
pub fn encode_ladder<S: FfmpegSpawner, P: FfprobeExecutor>(
    spawner: &S,
    probe: &P,
    config: &LadderConfig,
) -> CoreResult<LadderReport> {
    let planned = plan_ladder(probe, config)?;
    run_ladder(spawner, config, planned)
}

/// Measures loudness if asked and encodes every tier of `planned`.
pub fn run_ladder<S: FfmpegSpawner>(
    spawner: &S,
    config: &LadderConfig,
    planned: PlannedLadder,
) -> CoreResult<LadderReport> {
    ensure_dir(&config.output_dir)?;

    let mut report = LadderReport {
        input: config.input.clone(),
        output_dir: config.output_dir.clone(),
        dimensions: planned.dimensions,
        plan: planned.plan,
        loudness: None,
        gain: None,
        outcomes: Vec::new(),
    };

    let mut audio_filters = config.audio_filters.clone();
    if config.normalize {
        match normalization_filter(spawner, &config.input, &config.seek, &config.loudness_targets) {
            Ok((measurement, gain)) => {
                audio_filters.extend(&gain.filter());
                report.loudness = Some(measurement);
                report.gain = Some(gain);
            }
            Err(err) => {
                error!("Loudness measurement failed, no tier can be normalized: {err}");
                let cause = err.to_string();
                report.outcomes = report
                    .plan
                    .tiers
                    .iter()
                    .map(|tier| TierOutcome::Failed {
                        tier: *tier,
                        output: config.output_dir.join(tier.file_name()),
                        error: cause.clone(),
                    })
                    .collect();
                return Ok(report);
            }
        }
    }

    let settings = video_settings(&config.vp9_overrides, &config.extra_settings);
    let tiers = report.plan.tiers.clone();
    for tier in tiers {
        let output = config.output_dir.join(tier.file_name());
        let scale = (!tier.is_audio_only()).then(|| scale_target(report.dimensions.dar, tier));
        info!("Encoding {tier} -> {}", output.display());

        let started = Instant::now();
        let result = encode_tier(spawner, config, &settings, &audio_filters, tier, scale.as_ref(), &output);
        let outcome = match result {
            Ok(()) => {
                let elapsed = started.elapsed().as_secs_f64();
                info!("Finished {tier} in {elapsed:.2}s");
                TierOutcome::Encoded(EncodeResult {
                    tier,
                    size_bytes: std::fs::metadata(&output).map(|m| m.len()).ok(),
                    output,
                    scale,
                    elapsed_secs: elapsed,
                })
            }
            Err(err) => {
                error!("Tier {tier} failed: {err}");
                TierOutcome::Failed {
                    tier,
                    output,
                    error: err.to_string(),
                }
            }
        };
        report.outcomes.push(outcome);
    }

    Ok(report)
}

fn encode_tier<S: FfmpegSpawner>(
    spawner: &S,
    config: &LadderConfig,
    video_settings: &Settings,
    audio_filters: &FilterChain,
    tier: Tier,
    scale: Option<&ScaleTarget>,
    output: &Path,
) -> CoreResult<()> {
    match scale {
        None => encode_audio_only(
            spawner,
            &AudioEncode {
                source: &config.input,
                output,
                audio_filters,
                settings: &config.extra_settings,
                seek: &config.seek,
            },
            config.exit_policy,
        ),
        Some(scale) => {
            log::debug!("Scaling {tier} to {}", scale.filter_value());
            let video_filters = tier_video_filters(&config.video_filters, scale);
            encode_video(
                spawner,
                &VideoEncode {
                    source: &config.input,
                    output,
                    video_filters: &video_filters,
                    audio_filters,
                    settings: video_settings,
                    seek: &config.seek,
                },
                config.exit_policy,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::dimensions::Rational;

    #[test]
    fn computed_scale_replaces_user_scale_in_place() {
        let user = FilterChain::parse("hqdn3d=4,scale=1920x1080");
        let scale = scale_target(Rational::new(16, 9).unwrap(), Tier(480));
        let chain = tier_video_filters(&user, &scale);
        assert_eq!(chain.to_string(), "scale=853x480,setsar=1,hqdn3d=4");
    }

    #[test]
    fn user_filters_follow_initial_chain() {
        let user = FilterChain::parse("crop=1920:800:0:140");
        let scale = scale_target(Rational::new(12, 5).unwrap(), Tier(360));
        assert_eq!(
            tier_video_filters(&user, &scale).to_string(),
            "scale=864x360,setsar=1,crop=1920:800:0:140"
        );
    }
}
