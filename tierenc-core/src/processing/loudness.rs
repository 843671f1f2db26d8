// ============================================================================
// tierenc-core/src/processing/loudness.rs
// ============================================================================
//
// LOUDNESS ANALYSIS: Peak/Mean Measurement and Gain Computation
//
// Runs a full decode of the audio through ffmpeg's `volumedetect` filter with
// every output stream discarded, then reads the mean and peak levels from the
// diagnostic output. The gain applied afterwards is the largest one that keeps
// both levels under their ceilings.
//
// KEY COMPONENTS:
// - LoudnessMeasurement / GainAdjustment
// - measure_loudness: engine-backed measurement pass
// - parse_volume_levels / compute_gain: pure helpers

// ---- Internal crate imports ----
use crate::config::{LoudnessTargets, ignore_streams};
use crate::error::{CoreError, CoreResult};
use crate::external::{FfmpegArgs, FfmpegSpawner, run_ffmpeg};
use crate::processing::filters::FilterChain;
use crate::processing::seek::SeekRange;

// ---- External crate imports ----
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

// ---- Standard library imports ----
use std::path::Path;

static MEAN_VOLUME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r" mean_volume: (?P<mean>-?[0-9]+\.?[0-9]*)").expect("mean_volume pattern is valid")
});

static MAX_VOLUME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r" max_volume: (?P<peak>-?[0-9]+\.?[0-9]*)").expect("max_volume pattern is valid")
});

/// Mean and peak level of a decoded audio range, in dB.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LoudnessMeasurement {
    pub mean_db: f64,
    pub peak_db: f64,
}

/// Uniform gain to apply, in dB.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GainAdjustment {
    pub db: f64,
}

impl GainAdjustment {
    /// The `volume` filter applying this gain, rounded to 0.1 dB.
    pub fn filter(&self) -> FilterChain {
        let mut chain = FilterChain::new();
        chain.set("volume", format!("{:.1}dB", self.db));
        chain
    }
}

/// Extracts mean and peak levels from ffmpeg's diagnostic lines.
///
/// When a level is reported more than once the last report wins.
pub fn parse_volume_levels<S: AsRef<str>>(lines: &[S]) -> CoreResult<LoudnessMeasurement> {
    let mut mean_db = None;
    let mut peak_db = None;

    for line in lines {
        let line = line.as_ref();
        if let Some(value) = MEAN_VOLUME_RE
            .captures(line)
            .and_then(|caps| caps.name("mean"))
            .and_then(|m| m.as_str().parse::<f64>().ok())
        {
            mean_db = Some(value);
        }
        if let Some(value) = MAX_VOLUME_RE
            .captures(line)
            .and_then(|caps| caps.name("peak"))
            .and_then(|m| m.as_str().parse::<f64>().ok())
        {
            peak_db = Some(value);
        }
    }

    match (mean_db, peak_db) {
        (Some(mean_db), Some(peak_db)) => Ok(LoudnessMeasurement { mean_db, peak_db }),
        (None, None) => Err(CoreError::Measurement(
            "neither mean_volume nor max_volume found in ffmpeg output".to_string(),
        )),
        (None, _) => Err(CoreError::Measurement(
            "mean_volume not found in ffmpeg output".to_string(),
        )),
        (_, None) => Err(CoreError::Measurement(
            "max_volume not found in ffmpeg output".to_string(),
        )),
    }
}

/// `min(target_peak - peak, target_mean - mean)`: never pushes either level
/// above its ceiling.
pub fn compute_gain(measurement: &LoudnessMeasurement, targets: &LoudnessTargets) -> GainAdjustment {
    let peak_headroom = targets.peak_db - measurement.peak_db;
    let mean_headroom = targets.mean_db - measurement.mean_db;
    GainAdjustment {
        db: peak_headroom.min(mean_headroom),
    }
}

/// Measures the loudness of `source` over `seek`.
///
/// The seek range is applied as input seeking so exactly the range that will
/// be encoded is measured.
pub fn measure_loudness<S: FfmpegSpawner>(
    spawner: &S,
    source: &Path,
    seek: &SeekRange,
) -> CoreResult<LoudnessMeasurement> {
    log::info!("Measuring loudness of {}", source.display());

    let args = FfmpegArgs::new()
        .input_seek(seek)
        .input(source)
        .audio_filters(&FilterChain::parse("volumedetect"))
        .settings(&ignore_streams())
        .null_output()
        .build();

    let output = run_ffmpeg(spawner, "loudness measurement", &args)?;
    if !output.status.success() {
        log::warn!(
            "Loudness measurement of {} exited with {}",
            source.display(),
            output.status
        );
    }

    let measurement = parse_volume_levels(&output.log_lines).map_err(|err| match err {
        CoreError::Measurement(msg) => {
            CoreError::Measurement(format!("{msg} for {}", source.display()))
        }
        other => other,
    })?;

    log::debug!(
        "Loudness of {}: mean {:.1} dB, peak {:.1} dB",
        source.display(),
        measurement.mean_db,
        measurement.peak_db
    );
    Ok(measurement)
}

/// Measures `source` and returns the gain filter that normalizes it.
pub fn normalization_filter<S: FfmpegSpawner>(
    spawner: &S,
    source: &Path,
    seek: &SeekRange,
    targets: &LoudnessTargets,
) -> CoreResult<(LoudnessMeasurement, GainAdjustment)> {
    let measurement = measure_loudness(spawner, source, seek)?;
    let gain = compute_gain(&measurement, targets);
    log::info!("Applying {:.1} dB gain to {}", gain.db, source.display());
    Ok((measurement, gain))
}

#[cfg(test)]
mod tests {
    use super::*;

    const VOLUMEDETECT_OUTPUT: &[&str] = &[
        "[Parsed_volumedetect_0 @ 0x7f8b1c] n_samples: 2646000",
        "[Parsed_volumedetect_0 @ 0x7f8b1c] mean_volume: -25.0 dB",
        "[Parsed_volumedetect_0 @ 0x7f8b1c] max_volume: -3.0 dB",
        "[Parsed_volumedetect_0 @ 0x7f8b1c] histogram_3db: 12",
    ];

    #[test]
    fn parses_both_levels() {
        let m = parse_volume_levels(VOLUMEDETECT_OUTPUT).unwrap();
        assert_eq!(m, LoudnessMeasurement { mean_db: -25.0, peak_db: -3.0 });
    }

    #[test]
    fn integer_and_positive_levels() {
        let m = parse_volume_levels(&[" mean_volume: -20 dB", " max_volume: 0 dB"]).unwrap();
        assert_eq!(m.mean_db, -20.0);
        assert_eq!(m.peak_db, 0.0);
    }

    #[test]
    fn missing_peak_is_a_measurement_error() {
        let err = parse_volume_levels(&[" mean_volume: -20.1 dB"]).unwrap_err();
        assert!(matches!(err, CoreError::Measurement(msg) if msg.contains("max_volume")));
    }

    #[test]
    fn level_without_leading_space_is_not_matched() {
        assert!(parse_volume_levels(&["mean_volume: -1 dB", "max_volume: -1 dB"]).is_err());
    }

    #[test]
    fn gain_respects_both_ceilings() {
        let m = LoudnessMeasurement { mean_db: -25.0, peak_db: -3.0 };
        let gain = compute_gain(&m, &LoudnessTargets::default());
        assert!((gain.db - 2.5).abs() < 1e-9);
        assert_eq!(gain.filter().to_string(), "volume=2.5dB");
    }

    #[test]
    fn gain_can_be_negative() {
        let m = LoudnessMeasurement { mean_db: -10.0, peak_db: 0.0 };
        let gain = compute_gain(&m, &LoudnessTargets::default());
        assert!((gain.db - -8.5).abs() < 1e-9);
        assert_eq!(gain.filter().to_string(), "volume=-8.5dB");
    }
}
