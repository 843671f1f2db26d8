//! FFmpeg argument builder
//!
//! Assembles ffmpeg argument vectors in the order ffmpeg interprets them:
//! global options, per-input options (seeking) followed by their `-i`, then
//! output options and finally the output target. The result is a plain
//! `Vec<String>` so a command can be inspected without spawning anything.

use crate::processing::filters::FilterChain;
use crate::processing::seek::SeekRange;
use crate::settings::Settings;
use std::path::Path;

/// Output target ffmpeg discards everything written to.
pub const NULL_SINK: &str = "-";

/// Builder for ffmpeg argument vectors.
#[derive(Debug, Clone)]
pub struct FfmpegArgs {
    args: Vec<String>,
}

impl Default for FfmpegArgs {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegArgs {
    /// Starts a command with the banner hidden and overwriting enabled; the
    /// engine never runs interactively.
    #[must_use]
    pub fn new() -> Self {
        Self {
            args: vec!["-hide_banner".to_string(), "-y".to_string()],
        }
    }

    /// Adds seeking options for the next input. Must precede [`FfmpegArgs::input`]
    /// so ffmpeg applies them before decoding.
    #[must_use]
    pub fn input_seek(mut self, seek: &SeekRange) -> Self {
        self.args.extend(seek.to_input_args());
        self
    }

    #[must_use]
    pub fn input(mut self, path: &Path) -> Self {
        self.args.push("-i".to_string());
        self.args.push(path.to_string_lossy().into_owned());
        self
    }

    /// Adds `-vf`, unless the chain is empty.
    #[must_use]
    pub fn video_filters(mut self, chain: &FilterChain) -> Self {
        if let Some(rendered) = chain.render() {
            self.args.extend(["-vf".to_string(), rendered]);
        }
        self
    }

    /// Adds `-af`, unless the chain is empty.
    #[must_use]
    pub fn audio_filters(mut self, chain: &FilterChain) -> Self {
        if let Some(rendered) = chain.render() {
            self.args.extend(["-af".to_string(), rendered]);
        }
        self
    }

    #[must_use]
    pub fn map(mut self, spec: &str) -> Self {
        self.args.extend(["-map".to_string(), spec.to_string()]);
        self
    }

    /// Renders settings as `-key value` / `-key`.
    #[must_use]
    pub fn settings(mut self, settings: &Settings) -> Self {
        self.args.extend(settings.to_args());
        self
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn format(mut self, format: &str) -> Self {
        self.args.extend(["-f".to_string(), format.to_string()]);
        self
    }

    /// Terminates the command with the null muxer.
    #[must_use]
    pub fn null_output(self) -> Self {
        self.format("null").arg(NULL_SINK)
    }

    #[must_use]
    pub fn output(mut self, path: &Path) -> Self {
        self.args.push(path.to_string_lossy().into_owned());
        self
    }

    #[must_use]
    pub fn build(self) -> Vec<String> {
        self.args
    }
}
