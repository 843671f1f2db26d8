// ============================================================================
// tierenc-core/src/encoding/muxer.rs
// ============================================================================
//
// CLEAN-AUDIO MUXING: Replacing the Audio of Existing Artifacts
//
// Combines a previously encoded artifact with a replacement audio track.
// Video artifacts keep their video stream untouched (stream copy) and stop
// at the shorter input. Audio-only artifacts are re-encoded from the
// replacement track and trimmed to the original artifact's probed duration.
//
// KEY COMPONENTS:
// - MuxBranch: which of the two recipes applies to an artifact
// - mux_clean: one artifact (or none) + replacement audio
// - mux_directory: every recognized artifact in a directory
// - MuxReport: per-file outcomes

// ---- Internal crate imports ----
use crate::config::{
    AUDIO_EXTENSION, MuxConfig, VIDEO_EXTENSION, audio_settings, mp3_settings, opus_settings,
};
use crate::error::CoreResult;
use crate::external::{EngineRun, FfmpegArgs, FfmpegSpawner, FfprobeExecutor, StreamKind};
use crate::processing::dimensions::probe_audio_duration;
use crate::processing::filters::FilterChain;
use crate::processing::loudness::normalization_filter;
use crate::processing::seek::SeekRange;
use crate::settings::{Settings, merge};
use crate::utils::{ensure_dir, get_filename_safe, is_muxable_artifact};

// ---- External crate imports ----
use serde::Serialize;

// ---- Standard library imports ----
use std::path::{Path, PathBuf};

/// Recipe used for one mux.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum MuxBranch {
    /// Replacement audio re-encoded, optionally cut to `trim_secs`. The codec
    /// follows the output container: opus for `.webm`, mp3 otherwise.
    AudioOnly { trim_secs: Option<f64> },
    /// Video stream-copied, replacement audio encoded to opus, shortest wins.
    Video,
}

/// Picks the recipe for `artifact`.
///
/// No artifact means a plain audio-only encode. An `.mp3` artifact, or one
/// without a video stream, is audio-only and trimmed to its own audio
/// duration.
pub fn choose_branch<P: FfprobeExecutor>(probe: &P, artifact: Option<&Path>) -> CoreResult<MuxBranch> {
    let Some(artifact) = artifact else {
        return Ok(MuxBranch::AudioOnly { trim_secs: None });
    };

    if !has_extension(artifact, AUDIO_EXTENSION) && probe.probe_stream(artifact, StreamKind::Video)?.is_some() {
        return Ok(MuxBranch::Video);
    }

    let duration = probe_audio_duration(probe, artifact)?;
    log::debug!("{} lasts {duration:.3}s", artifact.display());
    Ok(MuxBranch::AudioOnly {
        trim_secs: Some(duration),
    })
}

/// Argument vector for a mux. A `Video` branch without an artifact falls
/// back to a plain audio-only encode.
pub fn mux_args(
    branch: MuxBranch,
    artifact: Option<&Path>,
    audio: &Path,
    audio_filters: &FilterChain,
    output: &Path,
) -> Vec<String> {
    match (branch, artifact) {
        (MuxBranch::Video, Some(artifact)) => {
            let mut copy = Settings::new();
            copy.insert("c:v", "copy");
            copy.insert_flag("shortest");
            FfmpegArgs::new()
                .input(artifact)
                .input(audio)
                .audio_filters(audio_filters)
                .map("0:v:0")
                .map("1:a:0")
                .settings(&merge(&[&copy, &audio_settings(), &opus_settings()]))
                .output(output)
                .build()
        }
        (MuxBranch::AudioOnly { trim_secs }, _) => {
            audio_only_mux_args(trim_secs, audio, audio_filters, output)
        }
        (MuxBranch::Video, None) => audio_only_mux_args(None, audio, audio_filters, output),
    }
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

/// Codec layer the output container accepts: webm only carries opus.
fn audio_codec_settings(output: &Path) -> Settings {
    if has_extension(output, VIDEO_EXTENSION) {
        opus_settings()
    } else {
        mp3_settings()
    }
}

fn audio_only_mux_args(
    trim_secs: Option<f64>,
    audio: &Path,
    audio_filters: &FilterChain,
    output: &Path,
) -> Vec<String> {
    let mut trim = Settings::flags(["vn"]);
    if let Some(secs) = trim_secs {
        trim.insert("t", format!("{secs:.3}"));
    }
    let codec = audio_codec_settings(output);
    FfmpegArgs::new()
        .input(audio)
        .audio_filters(audio_filters)
        .map("0:a:0")
        .settings(&merge(&[&trim, &audio_settings(), &codec]))
        .output(output)
        .build()
}

fn replacement_filters<S: FfmpegSpawner>(spawner: &S, config: &MuxConfig) -> CoreResult<FilterChain> {
    if !config.normalize {
        return Ok(FilterChain::new());
    }
    let (_, gain) = normalization_filter(
        spawner,
        &config.audio,
        &SeekRange::default(),
        &config.loudness_targets,
    )?;
    Ok(gain.filter())
}

fn mux_with_filters<S: FfmpegSpawner, P: FfprobeExecutor>(
    spawner: &S,
    probe: &P,
    config: &MuxConfig,
    audio_filters: &FilterChain,
    artifact: Option<&Path>,
    output: &Path,
) -> CoreResult<MuxBranch> {
    let branch = choose_branch(probe, artifact)?;
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent)?;
    }

    log::info!(
        "Muxing {} with {} -> {} ({:?})",
        artifact.map_or_else(|| "<none>".to_string(), |p| p.display().to_string()),
        config.audio.display(),
        output.display(),
        branch
    );

    let args = mux_args(branch, artifact, &config.audio, audio_filters, output);
    let mut run = EngineRun::new(spawner, config.exit_policy);
    run.run("clean audio mux", &args)?;
    run.finish()?;
    Ok(branch)
}

/// Muxes `config.audio` onto `artifact`, writing `output`.
///
/// With `config.normalize` the replacement track is measured first and a
/// gain filter applied to it.
pub fn mux_clean<S: FfmpegSpawner, P: FfprobeExecutor>(
    spawner: &S,
    probe: &P,
    config: &MuxConfig,
    artifact: Option<&Path>,
    output: &Path,
) -> CoreResult<MuxBranch> {
    let filters = replacement_filters(spawner, config)?;
    mux_with_filters(spawner, probe, config, &filters, artifact, output)
}

/// Outcome of muxing one artifact of a directory.
#[derive(Debug, Clone, Serialize)]
pub struct MuxOutcome {
    pub artifact: PathBuf,
    pub output: PathBuf,
    pub branch: Option<MuxBranch>,
    pub error: Option<String>,
}

impl MuxOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MuxReport {
    pub outcomes: Vec<MuxOutcome>,
}

impl MuxReport {
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(MuxOutcome::succeeded)
    }

    pub fn failed(&self) -> impl Iterator<Item = &MuxOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded())
    }
}

/// Muxes every `.webm`/`.mp3` in `input_dir` with `config.audio`.
///
/// Entries are processed in name order and each lands in
/// `config.output_dir` under its own file name. A failed file is recorded
/// and the remaining files are still processed. The replacement track is
/// measured once for all files.
pub fn mux_directory<S: FfmpegSpawner, P: FfprobeExecutor>(
    spawner: &S,
    probe: &P,
    config: &MuxConfig,
    input_dir: &Path,
) -> CoreResult<MuxReport> {
    let mut artifacts: Vec<PathBuf> = std::fs::read_dir(input_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_muxable_artifact(path))
        .collect();
    artifacts.sort();

    if artifacts.is_empty() {
        log::warn!("No .webm or .mp3 files found in {}", input_dir.display());
        return Ok(MuxReport::default());
    }

    ensure_dir(&config.output_dir)?;
    let filters = replacement_filters(spawner, config)?;

    let mut report = MuxReport::default();
    for artifact in artifacts {
        let output = config.output_dir.join(get_filename_safe(&artifact)?);
        let result = mux_with_filters(spawner, probe, config, &filters, Some(&artifact), &output);
        let outcome = match result {
            Ok(branch) => MuxOutcome {
                artifact,
                output,
                branch: Some(branch),
                error: None,
            },
            Err(err) => {
                log::error!("Muxing {} failed: {err}", artifact.display());
                MuxOutcome {
                    artifact,
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
