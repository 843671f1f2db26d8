// ============================================================================
// tierenc-core/src/encoding/video.rs
// ============================================================================
//
// VIDEO ENCODING: Two-Pass Constrained-Quality VP9
//
// Each video tier is encoded in two sequential ffmpeg invocations. Pass 1
// analyses the video stream only, writing statistics and discarding its
// output. Pass 2 reads those statistics and writes the final webm with audio.
// Both passes receive the same filter chain and the same input seeking, so
// they see identical frames.
//
// KEY COMPONENTS:
// - VideoEncode: what to encode and where
// - video_settings: settings layering for a webm tier
// - two_pass_args / encode_video

// ---- Internal crate imports ----
use crate::config::{
    ExitPolicy, VIDEO_EXTENSION, audio_settings, map_settings, opus_settings, vp9_settings,
};
use crate::error::CoreResult;
use crate::external::{EngineRun, FfmpegArgs, FfmpegSpawner};
use crate::processing::filters::FilterChain;
use crate::processing::seek::SeekRange;
use crate::settings::{Settings, SettingsLayer, merge, merge_layers};
use crate::temp_files;

// ---- Standard library imports ----
use std::path::Path;

/// Prefix of the per-encode directory holding pass statistics.
const PASSLOG_DIR_PREFIX: &str = ".tierenc-passlog-";

/// One two-pass video encode.
#[derive(Debug, Clone, Copy)]
pub struct VideoEncode<'a> {
    pub source: &'a Path,
    pub output: &'a Path,
    /// Complete chain, scale included
    pub video_filters: &'a FilterChain,
    pub audio_filters: &'a FilterChain,
    /// Merged encoder settings, see [`video_settings`]
    pub settings: &'a Settings,
    pub seek: &'a SeekRange,
}

/// VP9 defaults < opus codec < audio < stream deselection < VP9 overrides <
/// caller options.
pub fn video_settings(vp9_overrides: &Settings, user: &Settings) -> Settings {
    merge(&[
        &vp9_settings(),
        &opus_settings(),
        &audio_settings(),
        &map_settings(),
        vp9_overrides,
        user,
    ])
}

fn with_pass(settings: &Settings, pass: u32, passlog: &Path) -> Settings {
    let mut pass_settings = Settings::new();
    pass_settings.insert("pass", pass);
    pass_settings.insert("passlogfile", passlog.to_string_lossy().into_owned());
    merge(&[settings, &pass_settings])
}

/// Argument vectors for pass 1 and pass 2, sharing `passlog` as the
/// statistics file prefix.
pub fn two_pass_args(job: &VideoEncode<'_>, passlog: &Path) -> (Vec<String>, Vec<String>) {
    let audio_keys: Vec<String> = merge(&[&opus_settings(), &audio_settings()])
        .keys()
        .map(str::to_string)
        .collect();
    let mut no_audio = Settings::new();
    no_audio.insert_flag("an");
    let analysis_settings = merge_layers(&[
        job.settings.into(),
        SettingsLayer::new(no_audio).without(audio_keys),
    ]);

    let pass_1 = FfmpegArgs::new()
        .input_seek(job.seek)
        .input(job.source)
        .video_filters(job.video_filters)
        .map("0:v:0")
        .settings(&with_pass(&analysis_settings, 1, passlog))
        .null_output()
        .build();

    let pass_2 = FfmpegArgs::new()
        .input_seek(job.seek)
        .input(job.source)
        .video_filters(job.video_filters)
        .audio_filters(job.audio_filters)
        .map("0:v:0")
        .map("0:a:0?")
        .settings(&with_pass(job.settings, 2, passlog))
        .format(VIDEO_EXTENSION)
        .output(job.output)
        .build();

    (pass_1, pass_2)
}

/// Runs both passes, blocking until each has exited.
///
/// The statistics directory is created next to the output and removed once
/// pass 2 has finished, whatever its outcome.
pub fn encode_video<S: FfmpegSpawner>(
    spawner: &S,
    job: &VideoEncode<'_>,
    policy: ExitPolicy,
) -> CoreResult<()> {
    let output_dir = job
        .output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let passlog_dir = temp_files::create_temp_dir(output_dir, PASSLOG_DIR_PREFIX)?;
    let passlog = temp_files::passlog_path(passlog_dir.path());
    let (pass_1, pass_2) = two_pass_args(job, &passlog);

    let mut run = EngineRun::new(spawner, policy);

    log::info!("Pass 1/2 for {}", job.output.display());
    run.run("VP9 pass 1", &pass_1)?;

    log::info!("Pass 2/2 for {}", job.output.display());
    run.run("VP9 pass 2", &pass_2)?;

    drop(passlog_dir);
    run.finish()
}
