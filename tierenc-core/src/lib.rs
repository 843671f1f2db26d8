//! Core library for resolution-ladder transcoding using ffmpeg and ffprobe.
//!
//! This crate probes a source, plans which resolution tiers to produce,
//! measures and corrects loudness, merges layered encoder settings and drives
//! ffmpeg through an audio-only encode and two-pass VP9 encodes. It can also
//! mux a replacement audio track onto previously produced artifacts.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use tierenc_core::config::LadderConfigBuilder;
//! use tierenc_core::external::{CrateFfprobeExecutor, SidecarSpawner};
//! use tierenc_core::encode_ladder;
//! use std::path::PathBuf;
//!
//! let config = LadderConfigBuilder::new(PathBuf::from("/path/to/source.mkv"))
//!     .output_dir(PathBuf::from("/path/to/source"))
//!     .normalize(true)
//!     .build();
//!
//! let report = encode_ladder(&SidecarSpawner, &CrateFfprobeExecutor::new(), &config).unwrap();
//! for outcome in &report.outcomes {
//!     println!("{:?}", outcome);
//! }
//! ```

pub mod config;
pub mod encoding;
pub mod error;
pub mod external;
pub mod file_logging;
pub mod processing;
pub mod settings;
pub mod temp_files;
pub mod utils;

// Re-exports for public API
pub use config::{ExitPolicy, LadderConfig, LadderConfigBuilder, LoudnessTargets, MuxConfig};
pub use encoding::{
    LadderReport, MuxReport, PlannedLadder, encode_ladder, mux_clean, mux_directory, plan_ladder,
    run_ladder,
};
pub use error::{CoreError, CoreResult};
pub use settings::{SettingValue, Settings, SettingsLayer, merge, merge_layers};
pub use utils::{format_bytes, format_duration, validate_input_file};
