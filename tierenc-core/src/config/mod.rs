//! Configuration structures and constants for the tierenc-core library.
//!
//! Every default lives here as a constant or as a function returning a fresh
//! [`Settings`] value. Nothing is shared or mutated between runs: a
//! [`LadderConfig`] or [`MuxConfig`] is built per call and owned by it.

mod builder;

use crate::processing::dimensions::DimensionOverrides;
use crate::processing::filters::FilterChain;
use crate::processing::seek::SeekRange;
use crate::settings::Settings;

use serde::Serialize;

use std::path::PathBuf;

pub use builder::LadderConfigBuilder;

// Default constants

/// Tier heights encoded when the caller does not choose any. `0` is the
/// audio-only tier.
pub const DEFAULT_RESOLUTIONS: [u32; 4] = [0, 360, 480, 720];

/// Sentinel tier for the audio-only artifact.
pub const AUDIO_ONLY_TIER: u32 = 0;

/// A tier may exceed the source height by this many pixels before it counts
/// as an upscale.
pub const HEIGHT_TOLERANCE: u32 = 16;

/// Loudness ceiling for the loudest sample, in dB.
pub const DEFAULT_PEAK_DB: f64 = -0.5;

/// Loudness ceiling for the mean level, in dB.
pub const DEFAULT_MEAN_DB: f64 = -18.5;

/// Default output directory for the encode ladder.
pub const DEFAULT_SOURCE_DIR: &str = "./source/";

/// Default output directory for clean-audio muxes.
pub const DEFAULT_CLEAN_DIR: &str = "./clean/";

/// Artifact extensions picked up by a directory mux.
pub const MUX_EXTENSIONS: [&str; 2] = ["webm", "mp3"];

/// Extension of the audio-only artifact.
pub const AUDIO_EXTENSION: &str = "mp3";

/// Extension of a video tier artifact.
pub const VIDEO_EXTENSION: &str = "webm";

/// Two-pass constrained-quality VP9 defaults. `b:v 0` lets `crf` govern size.
pub fn vp9_settings() -> Settings {
    Settings::from_pairs([
        ("c:v", "libvpx-vp9"),
        ("b:v", "0"),
        ("g", "119"),
        ("crf", "20"),
        ("pix_fmt", "yuv420p"),
        ("deadline", "good"),
        ("cpu-used", "1"),
        ("row-mt", "1"),
        ("frame-parallel", "0"),
        ("tile-columns", "2"),
        ("tile-rows", "0"),
        ("threads", "4"),
    ])
}

/// Stereo fixed-bitrate audio shared by both codecs.
pub fn audio_settings() -> Settings {
    Settings::from_pairs([("b:a", "320k"), ("ac", "2")])
}

pub fn mp3_settings() -> Settings {
    Settings::from_pairs([("c:a", "libmp3lame")])
}

pub fn opus_settings() -> Settings {
    Settings::from_pairs([("c:a", "libopus")])
}

/// Deselects data and subtitle streams and drops chapters from the output.
pub fn map_settings() -> Settings {
    let mut settings = Settings::flags(["dn", "sn"]);
    settings.insert("map_chapters", "-1");
    settings
}

/// Streams the audio-only encode and the loudness pass must not carry.
pub fn ignore_streams() -> Settings {
    Settings::flags(["vn", "sn", "dn"])
}

/// Filter chain every video tier starts from: reset scale and square pixels.
pub fn initial_video_filters() -> FilterChain {
    FilterChain::parse("scale=1,setsar=1")
}

/// Peak and mean ceilings used when computing a gain adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LoudnessTargets {
    pub peak_db: f64,
    pub mean_db: f64,
}

impl Default for LoudnessTargets {
    fn default() -> Self {
        Self {
            peak_db: DEFAULT_PEAK_DB,
            mean_db: DEFAULT_MEAN_DB,
        }
    }
}

/// How a non-zero engine exit is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitPolicy {
    /// A failed invocation fails its artifact; pass 2 is not attempted after
    /// a failed pass 1.
    #[default]
    FailFast,
    /// Failures are logged and every invocation is still attempted.
    BestEffort,
}

/// Parameters for one run of the encode ladder.
///
/// Build with [`LadderConfigBuilder`].
#[derive(Debug, Clone)]
pub struct LadderConfig {
    /// Source file to encode from
    pub input: PathBuf,

    /// Directory receiving `<tier>.mp3` / `<tier>.webm`
    pub output_dir: PathBuf,

    /// Requested tier heights, `0` for audio-only
    pub resolutions: Vec<u32>,

    /// Tiers removed from `resolutions` before planning
    pub skip: Vec<u32>,

    /// User video filters, applied after the initial scale/setsar chain
    pub video_filters: FilterChain,

    /// User audio filters; the normalization gain is appended after them
    pub audio_filters: FilterChain,

    pub seek: SeekRange,

    /// Measure the source once and apply a gain filter to every tier
    pub normalize: bool,

    pub loudness_targets: LoudnessTargets,

    /// Overrides layered over [`vp9_settings`] (`crf`, `g`, ...)
    pub vp9_overrides: Settings,

    /// Free-form engine options layered over everything else
    pub extra_settings: Settings,

    /// Values forced over the probed source geometry
    pub dimension_overrides: DimensionOverrides,

    pub exit_policy: ExitPolicy,
}

/// Parameters for muxing a replacement audio track onto existing artifacts.
#[derive(Debug, Clone)]
pub struct MuxConfig {
    /// Replacement ("clean") audio track
    pub audio: PathBuf,

    /// Directory receiving the muxed artifacts
    pub output_dir: PathBuf,

    /// Measure the replacement track and apply a gain filter before muxing
    pub normalize: bool,

    pub loudness_targets: LoudnessTargets,

    pub exit_policy: ExitPolicy,
}

impl MuxConfig {
    pub fn new(audio: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            audio,
            output_dir,
            normalize: false,
            loudness_targets: LoudnessTargets::default(),
            exit_policy: ExitPolicy::default(),
        }
    }
}
