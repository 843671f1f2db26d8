//! Resolution ladder planning.
//!
//! Decides which requested tiers are encoded and at what scale. The smallest
//! requested video tier is always kept so that a run produces at least one
//! video, even from a source shorter than that tier; larger tiers are dropped
//! once they would clearly upscale.

use crate::config::{AUDIO_ONLY_TIER, HEIGHT_TOLERANCE};
use crate::processing::dimensions::Rational;

use serde::Serialize;

use std::collections::BTreeSet;
use std::fmt;

/// One rung of the ladder: `0` is audio-only, anything else a video height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Tier(pub u32);

impl Tier {
    pub const AUDIO_ONLY: Tier = Tier(AUDIO_ONLY_TIER);

    pub fn is_audio_only(&self) -> bool {
        *self == Self::AUDIO_ONLY
    }

    pub fn height(&self) -> u32 {
        self.0
    }

    /// Output file name: `0.mp3` or `<height>.webm`.
    pub fn file_name(&self) -> String {
        if self.is_audio_only() {
            format!("{}.{}", self.0, crate::config::AUDIO_EXTENSION)
        } else {
            format!("{}.{}", self.0, crate::config::VIDEO_EXTENSION)
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_audio_only() {
            f.write_str("audio-only")
        } else {
            write!(f, "{}p", self.0)
        }
    }
}

/// Why a requested tier is not encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The caller asked for the tier to be skipped.
    Requested,
    /// The tier exceeds the source height by more than the tolerance.
    InsufficientHeight { source_height: u32 },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Requested => f.write_str("skipped on request"),
            SkipReason::InsufficientHeight { source_height } => {
                write!(f, "insufficient video height ({source_height}p source)")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedTier {
    pub tier: Tier,
    pub reason: SkipReason,
}

/// Ordered tiers to encode plus the ones left out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TierPlan {
    /// Ascending, audio-only first when present
    pub tiers: Vec<Tier>,
    /// In ascending tier order
    pub skipped: Vec<SkippedTier>,
}

/// Plans the ladder for a source of `source_height` pixels.
pub fn plan_tiers(requested: &[u32], skip: &[u32], source_height: u32) -> TierPlan {
    let requested: BTreeSet<u32> = requested.iter().copied().collect();
    let skip: BTreeSet<u32> = skip.iter().copied().collect();

    let first_video = requested
        .iter()
        .copied()
        .find(|r| *r != AUDIO_ONLY_TIER && !skip.contains(r));

    // BTreeSet iterates ascending, which already puts the audio-only tier first.
    let mut plan = TierPlan::default();
    for tier in requested.into_iter().map(Tier) {
        let reason = if skip.contains(&tier.0) {
            Some(SkipReason::Requested)
        } else if !tier.is_audio_only()
            && tier.0 > source_height.saturating_add(HEIGHT_TOLERANCE)
            && first_video.is_some_and(|first| tier.0 > first)
        {
            Some(SkipReason::InsufficientHeight { source_height })
        } else {
            None
        };

        match reason {
            Some(reason) => {
                log::warn!("Skipping {tier}: {reason}");
                plan.skipped.push(SkippedTier { tier, reason });
            }
            None => plan.tiers.push(tier),
        }
    }
    plan
}

/// Width and height handed to the scale filter as one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScaleTarget {
    pub width: u64,
    pub height: u32,
}

impl ScaleTarget {
    /// `scale` filter argument, `<W>x<H>`.
    pub fn filter_value(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

/// Scale for a video tier: `round(dar × height)` by `height`, half-up.
pub fn scale_target(dar: Rational, tier: Tier) -> ScaleTarget {
    ScaleTarget {
        width: dar.scale_round(tier.0),
        height: tier.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heights(plan: &TierPlan) -> Vec<u32> {
        plan.tiers.iter().map(Tier::height).collect()
    }

    #[test]
    fn keeps_everything_for_tall_source() {
        let plan = plan_tiers(&[0, 360, 480, 720], &[], 1080);
        assert_eq!(heights(&plan), vec![0, 360, 480, 720]);
        assert!(plan.skipped.is_empty());
    }

    #[test]
    fn smallest_video_tier_survives_short_source() {
        let plan = plan_tiers(&[0, 360, 480, 720], &[], 200);
        assert_eq!(heights(&plan), vec![0, 360]);
        let skipped: Vec<u32> = plan.skipped.iter().map(|s| s.tier.0).collect();
        assert_eq!(skipped, vec![480, 720]);
        assert!(plan
            .skipped
            .iter()
            .all(|s| s.reason == SkipReason::InsufficientHeight { source_height: 200 }));
    }

    #[test]
    fn tolerance_is_inclusive() {
        // 496 = 480 + 16 is not an upscale
        let plan = plan_tiers(&[360, 496, 497], &[], 480);
        assert_eq!(heights(&plan), vec![360, 496]);
    }

    #[test]
    fn skip_set_and_duplicates_removed() {
        let plan = plan_tiers(&[720, 0, 360, 720, 480], &[360], 1080);
        assert_eq!(heights(&plan), vec![0, 480, 720]);
        assert_eq!(
            plan.skipped,
            vec![SkippedTier {
                tier: Tier(360),
                reason: SkipReason::Requested
            }]
        );
    }

    #[test]
    fn first_video_is_computed_after_skips() {
        // With 360 skipped, 480 becomes the guaranteed tier.
        let plan = plan_tiers(&[0, 360, 480, 720], &[360], 200);
        assert_eq!(heights(&plan), vec![0, 480]);
    }

    #[test]
    fn audio_only_plan() {
        let plan = plan_tiers(&[0], &[], 100);
        assert_eq!(heights(&plan), vec![0]);
    }

    #[test]
    fn plan_never_contains_skipped_and_is_ascending() {
        let requested = [0, 1080, 240, 720, 360, 480, 240];
        let skip = [720, 5];
        for height in [100, 360, 500, 2160] {
            let plan = plan_tiers(&requested, &skip, height);
            let h = heights(&plan);
            assert!(h.iter().all(|t| !skip.contains(t)));
            assert!(h.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn scale_targets_for_16_9() {
        let dar = Rational::new(16, 9).unwrap();
        assert_eq!(scale_target(dar, Tier(360)).filter_value(), "640x360");
        assert_eq!(scale_target(dar, Tier(480)).filter_value(), "853x480");
        assert_eq!(scale_target(dar, Tier(720)).filter_value(), "1280x720");
    }
}
