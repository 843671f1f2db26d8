// ============================================================================
// tierenc-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for LadderConfig
//
// Provides a fluent API for assembling a LadderConfig. Only the input path is
// required; every other field starts from the defaults in `config`.
//
// KEY COMPONENTS:
// - LadderConfigBuilder: Builder struct for creating LadderConfig instances

// ---- Standard library imports ----
use std::path::PathBuf;

// ---- Internal crate imports ----
use super::{DEFAULT_RESOLUTIONS, DEFAULT_SOURCE_DIR, ExitPolicy, LadderConfig, LoudnessTargets};
use crate::processing::dimensions::DimensionOverrides;
use crate::processing::filters::FilterSpec;
use crate::processing::seek::SeekRange;
use crate::settings::{SettingValue, Settings};

/// Builder for creating LadderConfig instances.
///
/// # Examples
///
/// ```rust
/// use tierenc_core::config::LadderConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = LadderConfigBuilder::new(PathBuf::from("/media/source.mkv"))
///     .output_dir(PathBuf::from("/media/out"))
///     .skip(vec![360])
///     .video_filters("crop=1920:800:0:140")
///     .normalize(true)
///     .vp9_override("crf", "24")
///     .build();
///
/// assert_eq!(config.skip, vec![360]);
/// assert_eq!(config.vp9_overrides.get("crf").and_then(|v| v.as_str()), Some("24"));
/// ```
#[derive(Debug, Clone)]
pub struct LadderConfigBuilder {
    config: LadderConfig,
}

impl LadderConfigBuilder {
    /// Creates a builder for encoding `input` with default settings.
    pub fn new(input: PathBuf) -> Self {
        Self {
            config: LadderConfig {
                input,
                output_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
                resolutions: DEFAULT_RESOLUTIONS.to_vec(),
                skip: Vec::new(),
                video_filters: Default::default(),
                audio_filters: Default::default(),
                seek: SeekRange::default(),
                normalize: false,
                loudness_targets: LoudnessTargets::default(),
                vp9_overrides: Settings::new(),
                extra_settings: Settings::new(),
                dimension_overrides: DimensionOverrides::default(),
                exit_policy: ExitPolicy::default(),
            },
        }
    }

    pub fn output_dir(mut self, output_dir: PathBuf) -> Self {
        self.config.output_dir = output_dir;
        self
    }

    pub fn resolutions(mut self, resolutions: Vec<u32>) -> Self {
        self.config.resolutions = resolutions;
        self
    }

    pub fn skip(mut self, skip: Vec<u32>) -> Self {
        self.config.skip = skip;
        self
    }

    pub fn video_filters(mut self, filters: impl Into<FilterSpec>) -> Self {
        self.config.video_filters = filters.into().into_chain();
        self
    }

    pub fn audio_filters(mut self, filters: impl Into<FilterSpec>) -> Self {
        self.config.audio_filters = filters.into().into_chain();
        self
    }

    pub fn seek(mut self, seek: SeekRange) -> Self {
        self.config.seek = seek;
        self
    }

    pub fn normalize(mut self, normalize: bool) -> Self {
        self.config.normalize = normalize;
        self
    }

    pub fn loudness_targets(mut self, targets: LoudnessTargets) -> Self {
        self.config.loudness_targets = targets;
        self
    }

    /// Overrides one VP9 default, e.g. `crf` or `g`.
    pub fn vp9_override(mut self, key: &str, value: impl Into<SettingValue>) -> Self {
        self.config.vp9_overrides.insert(key, value);
        self
    }

    pub fn extra_settings(mut self, settings: Settings) -> Self {
        self.config.extra_settings = settings;
        self
    }

    pub fn dimension_overrides(mut self, overrides: DimensionOverrides) -> Self {
        self.config.dimension_overrides = overrides;
        self
    }

    pub fn exit_policy(mut self, policy: ExitPolicy) -> Self {
        self.config.exit_policy = policy;
        self
    }

    pub fn build(self) -> LadderConfig {
        self.config
    }
}
