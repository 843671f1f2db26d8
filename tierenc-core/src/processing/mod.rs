//! Decision logic of the pipeline.
//!
//! Everything here either is a pure function over probed values or drives a
//! single measurement through the engine seams. Encoding itself lives in
//! [`crate::encoding`].

/// Source geometry and aspect ratios
pub mod dimensions;

/// Filter chain parsing and rendering
pub mod filters;

/// Loudness measurement and gain computation
pub mod loudness;

/// Tier selection and scale targets
pub mod planner;

/// Trim ranges applied as input seeking
pub mod seek;

pub use dimensions::{DimensionOverrides, ProbedDimensions, Rational, probe_audio_duration, probe_dimensions};
pub use filters::{FilterChain, FilterSpec};
pub use loudness::{GainAdjustment, LoudnessMeasurement, compute_gain, measure_loudness};
pub use planner::{ScaleTarget, SkipReason, Tier, TierPlan, plan_tiers, scale_target};
pub use seek::SeekRange;
