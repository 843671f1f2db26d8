// ============================================================================
// tierenc-core/src/processing/dimensions.rs
// ============================================================================
//
// DIMENSION PROBE: Source Geometry and Aspect Ratios
//
// Reads width, height, sample aspect ratio and display aspect ratio of the
// first video stream of a source, substituting defaults for the aspect ratios
// when the container metadata omits them.
//
// KEY COMPONENTS:
// - Rational: reduced aspect ratio parsed from `N:D` / `N/D`
// - ProbedDimensions: immutable probe result
// - DimensionOverrides: caller-supplied values merged over a probe
// - probe_dimensions / probe_audio_duration: FfprobeExecutor-backed queries

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult};
use crate::external::{FfprobeExecutor, StreamKind, StreamMetadata};

// ---- External crate imports ----
use serde::Serialize;

// ---- Standard library imports ----
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// A positive rational number in lowest terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rational {
    num: u64,
    den: u64,
}

impl Rational {
    pub const ONE: Rational = Rational { num: 1, den: 1 };

    /// Returns `None` when either part is zero.
    pub fn new(num: u64, den: u64) -> Option<Self> {
        if num == 0 || den == 0 {
            return None;
        }
        let divisor = gcd(num, den);
        Some(Self {
            num: num / divisor,
            den: den / divisor,
        })
    }

    /// Parses ffprobe's `N:D` notation (`N/D` is accepted too).
    ///
    /// `0:1`, `N/A` and anything unparseable yield `None`; ffprobe reports
    /// those when the stream does not declare a ratio.
    pub fn parse(text: &str) -> Option<Self> {
        let (num, den) = text.trim().split_once([':', '/'])?;
        let num = num.trim().parse::<u64>().ok()?;
        let den = den.trim().parse::<u64>().ok()?;
        Self::new(num, den)
    }

    pub fn numer(&self) -> u64 {
        self.num
    }

    pub fn denom(&self) -> u64 {
        self.den
    }

    /// `self × value`, rounded half-up to the nearest integer.
    pub fn scale_round(&self, value: u32) -> u64 {
        let scaled = u128::from(self.num) * u128::from(value);
        let den = u128::from(self.den);
        let rounded = (2 * scaled + den) / (2 * den);
        u64::try_from(rounded).unwrap_or(u64::MAX)
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.num, self.den)
    }
}

impl FromStr for Rational {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| CoreError::Config(format!("invalid aspect ratio '{s}'")))
    }
}

impl Serialize for Rational {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Geometry of a source's first video stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProbedDimensions {
    pub width: u32,
    pub height: u32,
    pub sar: Rational,
    pub dar: Rational,
}

impl ProbedDimensions {
    /// Builds dimensions, defaulting `sar` to 1:1 and `dar` to `width:height`.
    pub fn new(width: u32, height: u32, sar: Option<Rational>, dar: Option<Rational>) -> CoreResult<Self> {
        let frame = Rational::new(u64::from(width), u64::from(height)).ok_or_else(|| {
            CoreError::Probe(format!("invalid dimensions {width}x{height}"))
        })?;
        Ok(Self {
            width,
            height,
            sar: sar.unwrap_or(Rational::ONE),
            dar: dar.unwrap_or(frame),
        })
    }

    /// Returns a copy with `overrides` applied on top.
    pub fn with_overrides(&self, overrides: &DimensionOverrides) -> Self {
        Self {
            width: overrides.width.unwrap_or(self.width),
            height: overrides.height.unwrap_or(self.height),
            sar: overrides.sar.unwrap_or(self.sar),
            dar: overrides.dar.unwrap_or(self.dar),
        }
    }
}

/// Caller-forced geometry values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DimensionOverrides {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub sar: Option<Rational>,
    pub dar: Option<Rational>,
}

impl DimensionOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn positive_dimension(value: Option<i64>, name: &str, source: &Path) -> CoreResult<u32> {
    match value {
        Some(v) if v > 0 => u32::try_from(v).map_err(|_| {
            CoreError::Probe(format!("{name} {v} out of range in {}", source.display()))
        }),
        Some(v) => Err(CoreError::Probe(format!(
            "video stream has non-positive {name} ({v}) in {}",
            source.display()
        ))),
        None => Err(CoreError::Probe(format!(
            "video stream missing {name} in {}",
            source.display()
        ))),
    }
}

/// Queries `kind` in `path`, reporting any ffprobe failure as a probe error.
fn probe_first<P: FfprobeExecutor>(
    probe: &P,
    path: &Path,
    kind: StreamKind,
) -> CoreResult<Option<StreamMetadata>> {
    probe.probe_stream(path, kind).map_err(|err| match err {
        CoreError::Probe(_) => err,
        other => CoreError::Probe(format!(
            "could not read {} stream of {}: {other}",
            kind.codec_type(),
            path.display()
        )),
    })
}

/// Probes the first video stream of `source`.
pub fn probe_dimensions<P: FfprobeExecutor>(probe: &P, source: &Path) -> CoreResult<ProbedDimensions> {
    let stream = probe_first(probe, source, StreamKind::Video)?
        .ok_or_else(|| CoreError::Probe(format!("no video stream found in {}", source.display())))?;

    let width = positive_dimension(stream.width, "width", source)?;
    let height = positive_dimension(stream.height, "height", source)?;
    let sar = stream.sample_aspect_ratio.as_deref().and_then(Rational::parse);
    let dar = stream.display_aspect_ratio.as_deref().and_then(Rational::parse);

    if sar.is_none() {
        log::debug!("No sample aspect ratio for {}, assuming 1:1", source.display());
    }
    if dar.is_none() {
        log::debug!("No display aspect ratio for {}, using {width}:{height}", source.display());
    }

    let dimensions = ProbedDimensions::new(width, height, sar, dar)?;
    log::debug!(
        "Probed {}: {}x{} sar={} dar={}",
        source.display(),
        dimensions.width,
        dimensions.height,
        dimensions.sar,
        dimensions.dar
    );
    Ok(dimensions)
}

/// Probes the duration in seconds of the first audio stream of `path`.
pub fn probe_audio_duration<P: FfprobeExecutor>(probe: &P, path: &Path) -> CoreResult<f64> {
    let stream = probe_first(probe, path, StreamKind::Audio)?
        .ok_or_else(|| CoreError::Probe(format!("no audio stream found in {}", path.display())))?;

    match stream.duration {
        Some(duration) if duration.is_finite() && duration > 0.0 => Ok(duration),
        _ => Err(CoreError::Probe(format!(
            "audio stream has no usable duration in {}",
            path.display()
        ))),
    }
}
