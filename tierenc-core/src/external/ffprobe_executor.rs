//! FFprobe integration for stream metadata.
//!
//! Only the fields the pipeline consumes are surfaced: geometry and aspect
//! ratios of a video stream, and the duration of a stream.
use crate::error::{CoreError, CoreResult, command_failed_error, command_start_error};
use ffprobe::{FfProbeError, ffprobe};
use std::path::Path;

/// Stream type to select when probing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Video,
    Audio,
}

impl StreamKind {
    /// ffprobe's `codec_type` for this kind.
    pub fn codec_type(&self) -> &'static str {
        match self {
            StreamKind::Video => "video",
            StreamKind::Audio => "audio",
        }
    }
}

/// Metadata of the first stream of a given kind.
///
/// Aspect ratios stay as ffprobe reports them (`16:9`, `0:1`, `N/A`);
/// interpretation is left to the caller.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StreamMetadata {
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub sample_aspect_ratio: Option<String>,
    pub display_aspect_ratio: Option<String>,
    /// Stream duration in seconds, or the container's when the stream has none
    pub duration: Option<f64>,
}

/// Trait for probing stream metadata.
pub trait FfprobeExecutor {
    /// Returns the first stream of `kind`, or `None` if the file has none.
    fn probe_stream(&self, input_path: &Path, kind: StreamKind) -> CoreResult<Option<StreamMetadata>>;
}

/// Production executor backed by the `ffprobe` crate.
#[derive(Debug, Clone, Default)]
pub struct CrateFfprobeExecutor;

impl CrateFfprobeExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl FfprobeExecutor for CrateFfprobeExecutor {
    fn probe_stream(&self, input_path: &Path, kind: StreamKind) -> CoreResult<Option<StreamMetadata>> {
        log::debug!(
            "Running ffprobe (via crate) for {} stream on: {}",
            kind.codec_type(),
            input_path.display()
        );
        let metadata = ffprobe(input_path).map_err(|err| {
            log::error!("ffprobe failed on {}: {:?}", input_path.display(), err);
            map_ffprobe_error(err, kind.codec_type())
        })?;

        let format_duration = metadata
            .format
            .duration
            .as_deref()
            .and_then(|d| d.parse::<f64>().ok());

        let stream = metadata
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some(kind.codec_type()));

        Ok(stream.map(|s| StreamMetadata {
            width: s.width,
            height: s.height,
            sample_aspect_ratio: s.sample_aspect_ratio.clone(),
            display_aspect_ratio: s.display_aspect_ratio.clone(),
            duration: s
                .duration
                .as_deref()
                .and_then(|d| d.parse::<f64>().ok())
                .or(format_duration),
        }))
    }
}

fn map_ffprobe_error(err: FfProbeError, context: &str) -> CoreError {
    match err {
        FfProbeError::Io(io_err) => command_start_error(format!("ffprobe ({context})"), io_err),
        FfProbeError::Status(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            command_failed_error(format!("ffprobe ({context})"), output.status, stderr)
        }
        FfProbeError::Deserialize(err) => {
            CoreError::FfprobeParse(format!("ffprobe {context} output deserialization: {err}"))
        }
        _ => CoreError::FfprobeParse(format!("Unknown ffprobe error during {context}: {err:?}")),
    }
}
