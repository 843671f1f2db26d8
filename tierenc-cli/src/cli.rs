// tierenc-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{ArgGroup, Args, Parser, Subcommand};
use std::path::PathBuf;
use tierenc_core::config::{DEFAULT_CLEAN_DIR, DEFAULT_SOURCE_DIR};
use tierenc_core::processing::Rational;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Tierenc: resolution ladder encoder",
    long_about = "Encodes a source video into an audio-only mp3 and a ladder of two-pass VP9 \
                  webm tiers, and muxes clean audio onto previously encoded artifacts."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory for run logs (defaults to OUTPUT_DIR/logs)
    #[arg(long, global = true, value_name = "LOG_DIR", env = "TIERENC_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Do not write a run log file
    #[arg(long, global = true)]
    pub no_log: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Encodes the audio-only tier and every planned VP9 tier of a source
    Encode(EncodeArgs),
    /// Replaces the audio of encoded artifacts with a clean track
    Mux(MuxArgs),
}

impl Commands {
    /// Name used in run log file names.
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Encode(_) => "encode",
            Commands::Mux(_) => "mux",
        }
    }

    pub fn output_dir(&self) -> &PathBuf {
        match self {
            Commands::Encode(args) => &args.output_dir,
            Commands::Mux(args) => &args.output_dir,
        }
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Source video file
    #[arg(short = 'i', long = "input", value_name = "INPUT")]
    pub input: PathBuf,

    /// Directory the tier artifacts are written to
    #[arg(
        short = 'o',
        long = "output-dir",
        value_name = "OUTPUT_DIR",
        default_value = DEFAULT_SOURCE_DIR,
        env = "TIERENC_OUTPUT_DIR"
    )]
    pub output_dir: PathBuf,

    // --- Filters ---
    /// Video filters applied before scaling, e.g. "crop=1920:800:0:140,hqdn3d=4"
    #[arg(long, value_name = "FILTERS")]
    pub vf: Option<String>,

    /// Audio filters applied before any loudness gain
    #[arg(long, value_name = "FILTERS")]
    pub af: Option<String>,

    // --- Trimming ---
    /// Start position in the source
    #[arg(long, value_name = "TIME")]
    pub ss: Option<String>,

    /// End position in the source (ignored when a duration is given)
    #[arg(long, value_name = "TIME")]
    pub to: Option<String>,

    /// Duration to encode from the start position
    #[arg(short = 't', long = "duration", value_name = "TIME")]
    pub duration: Option<String>,

    /// Measure loudness and apply a gain to every tier
    #[arg(long)]
    pub norm: bool,

    // --- Tier selection ---
    /// Tiers to leave out (0 is the audio-only tier)
    #[arg(long, value_name = "TIER", num_args = 1.., value_delimiter = ',')]
    pub skip: Vec<u32>,

    /// Tiers to encode instead of the default 0,360,480,720
    #[arg(long, value_name = "TIERS", value_delimiter = ',')]
    pub resolutions: Option<Vec<u32>>,

    // --- Encoder overrides ---
    /// VP9 constant rate factor
    #[arg(long, value_name = "CRF", value_parser = clap::value_parser!(u32).range(0..=63))]
    pub crf: Option<u32>,

    /// VP9 keyframe interval
    #[arg(short = 'g', value_name = "FRAMES")]
    pub gop: Option<u32>,

    /// Extra ffmpeg output option, repeatable; KEY alone is a flag
    #[arg(short = 'x', long = "extra", value_name = "KEY[=VALUE]")]
    pub extra: Vec<String>,

    // --- Forced geometry ---
    #[arg(long, value_name = "PIXELS")]
    pub force_width: Option<u32>,

    #[arg(long, value_name = "PIXELS")]
    pub force_height: Option<u32>,

    /// Sample aspect ratio, e.g. 1:1
    #[arg(long, value_name = "RATIO", value_parser = parse_ratio)]
    pub force_sar: Option<Rational>,

    /// Display aspect ratio, e.g. 16:9
    #[arg(long, value_name = "RATIO", value_parser = parse_ratio)]
    pub force_dar: Option<Rational>,

    // --- Run behavior ---
    /// Keep going after a failed ffmpeg invocation and attempt every pass
    #[arg(long)]
    pub best_effort: bool,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("target").required(true).args(["input_dir", "artifact"])))]
pub struct MuxArgs {
    /// Replacement audio track
    #[arg(short = 'a', long, value_name = "FILE")]
    pub audio: PathBuf,

    /// Mux every .webm and .mp3 in this directory
    #[arg(long, value_name = "DIR")]
    pub input_dir: Option<PathBuf>,

    /// Mux a single artifact
    #[arg(long, value_name = "FILE")]
    pub artifact: Option<PathBuf>,

    /// Directory the muxed files are written to
    #[arg(
        short = 'o',
        long = "output-dir",
        value_name = "OUTPUT_DIR",
        default_value = DEFAULT_CLEAN_DIR
    )]
    pub output_dir: PathBuf,

    /// Measure the replacement track and apply a gain to it
    #[arg(long)]
    pub norm: bool,

    /// Keep going after a failed ffmpeg invocation
    #[arg(long)]
    pub best_effort: bool,

    /// Print the mux report as JSON
    #[arg(long)]
    pub json: bool,
}

fn parse_ratio(value: &str) -> Result<Rational, String> {
    Rational::parse(value).ok_or_else(|| format!("'{value}' is not a ratio like 16:9"))
}
