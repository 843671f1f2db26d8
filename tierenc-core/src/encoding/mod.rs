//! Encoding and muxing through ffmpeg.
//!
//! `audio` and `video` each produce one artifact, `pipeline` sequences a full
//! ladder run and `muxer` replaces the audio of existing artifacts.

pub mod audio;
pub mod muxer;
pub mod pipeline;
pub mod video;

pub use audio::encode_audio_only;
pub use muxer::{MuxBranch, MuxOutcome, MuxReport, mux_clean, mux_directory};
pub use pipeline::{
    EncodeResult, LadderReport, PlannedLadder, TierOutcome, encode_ladder, plan_ladder, run_ladder,
};
pub use video::encode_video;
