use assert_cmd::Command;
use clap::Parser;
use predicates::str::contains;
use std::error::Error;
use std::path::PathBuf;
use tempfile::tempdir;
use tierenc::{Cli, Commands};

// Helper function to get the path to the compiled binary
fn tierenc_cmd() -> Command {
    let mut cmd = Command::cargo_bin("tierenc").expect("Failed to find tierenc binary");
    cmd.env_remove("TIERENC_OUTPUT_DIR").env_remove("TIERENC_LOG_DIR");
    cmd
}

#[test]
fn test_encode_non_existent_input_creates_nothing() -> Result<(), Box<dyn Error>> {
    let work = tempdir()?;
    let output_dir = work.path().join("source");
    let missing = work.path().join("missing.mkv");

    tierenc_cmd()
        .arg("encode")
        .arg("-i")
        .arg(&missing)
        .arg("-o")
        .arg(&output_dir)
        .assert()
        .failure()
        .code(1)
        .stderr(contains(format!(
            "invalid input file provided: {}",
            missing.display()
        )));

    assert!(!output_dir.exists());
    Ok(())
}

#[test]
fn test_encode_directory_input_is_invalid() -> Result<(), Box<dyn Error>> {
    let work = tempdir()?;

    tierenc_cmd()
        .arg("encode")
        .arg("-i")
        .arg(work.path())
        .arg("-o")
        .arg(work.path().join("out"))
        .assert()
        .failure()
        .stderr(contains("invalid input file provided"));

    assert!(!work.path().join("out").exists());
    Ok(())
}

#[test]
fn test_unprobeable_source_leaves_no_run_log() -> Result<(), Box<dyn Error>> {
    let work = tempdir()?;
    let input = work.path().join("broken.mkv");
    std::fs::write(&input, "not a video")?;
    let output_dir = work.path().join("source");

    // Fails at the probe, or earlier when ffmpeg/ffprobe are not installed.
    tierenc_cmd()
        .arg("encode")
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(&output_dir)
        .assert()
        .failure()
        .code(1);

    assert!(!output_dir.join("logs").exists());
    assert!(!output_dir.exists());
    Ok(())
}

#[test]
fn test_mux_missing_audio_is_invalid() -> Result<(), Box<dyn Error>> {
    let work = tempdir()?;
    let artifact = work.path().join("480.webm");
    std::fs::write(&artifact, "dummy content")?;

    tierenc_cmd()
        .arg("mux")
        .arg("--audio")
        .arg(work.path().join("clean.wav"))
        .arg("--artifact")
        .arg(&artifact)
        .arg("-o")
        .arg(work.path().join("clean"))
        .assert()
        .failure()
        .stderr(contains("invalid input file provided"));

    assert!(!work.path().join("clean").exists());
    Ok(())
}

#[test]
fn test_encode_requires_input() {
    tierenc_cmd()
        .arg("encode")
        .assert()
        .failure()
        .stderr(contains("--input"));
}

#[test]
fn test_encode_rejects_out_of_range_crf() -> Result<(), Box<dyn Error>> {
    tierenc_cmd()
        .args(["encode", "-i", "in.mkv", "--crf", "99"])
        .assert()
        .failure()
        .stderr(contains("invalid value '99'"));
    Ok(())
}

#[test]
fn test_mux_needs_exactly_one_target() {
    tierenc_cmd()
        .args(["mux", "--audio", "clean.wav"])
        .assert()
        .failure();

    tierenc_cmd()
        .args(["mux", "--audio", "clean.wav", "--input-dir", "a", "--artifact", "b.webm"])
        .assert()
        .failure()
        .stderr(contains("cannot be used with"));
}

#[test]
fn test_parse_encode_defaults() {
    let cli = Cli::try_parse_from(["tierenc", "encode", "-i", "talk.mkv"]).unwrap();
    assert!(!cli.verbose);
    assert!(!cli.no_log);

    match cli.command {
        Commands::Encode(args) => {
            assert_eq!(args.input, PathBuf::from("talk.mkv"));
            assert!(!args.norm);
            assert!(args.skip.is_empty());
            assert!(args.resolutions.is_none());
            assert!(args.extra.is_empty());
            assert!(!args.best_effort);
            assert!(!args.json);
        }
        other => panic!("expected encode, got {other:?}"),
    }
}

#[test]
fn test_parse_encode_full_flag_set() {
    let cli = Cli::try_parse_from([
        "tierenc", "--verbose", "encode", "-i", "talk.mkv", "-o", "ladder", "--vf", "hqdn3d=4",
        "--af", "aresample=48000", "--ss", "1:00", "-t", "30", "--norm", "--skip", "360", "480",
        "--resolutions", "0,360,480,720,1080", "--crf", "28", "-g", "240", "-x", "threads=8",
        "-x", "an", "--force-dar", "16:9", "--force-height", "1080", "--json", "--no-log",
    ])
    .unwrap();
    assert!(cli.verbose);
    assert!(cli.no_log);

    let Commands::Encode(args) = cli.command else {
        panic!("expected encode");
    };
    assert_eq!(args.output_dir, PathBuf::from("ladder"));
    assert_eq!(args.vf.as_deref(), Some("hqdn3d=4"));
    assert_eq!(args.duration.as_deref(), Some("30"));
    assert_eq!(args.skip, vec![360, 480]);
    assert_eq!(args.resolutions, Some(vec![0, 360, 480, 720, 1080]));
    assert_eq!(args.crf, Some(28));
    assert_eq!(args.gop, Some(240));
    assert_eq!(args.extra, vec!["threads=8".to_string(), "an".to_string()]);
    assert_eq!(args.force_dar.map(|r| r.to_string()), Some("16:9".to_string()));
    assert_eq!(args.force_height, Some(1080));
    assert!(args.json);
}

#[test]
fn test_parse_rejects_bad_ratio() {
    let err = Cli::try_parse_from(["tierenc", "encode", "-i", "a.mkv", "--force-sar", "wide"])
        .unwrap_err();
    assert!(err.to_string().contains("not a ratio"));
}

#[test]
fn test_parse_mux_artifact() {
    let cli = Cli::try_parse_from([
        "tierenc", "mux", "--audio", "clean.wav", "--artifact", "0.mp3", "--norm", "--best-effort",
    ])
    .unwrap();
    let Commands::Mux(args) = cli.command else {
        panic!("expected mux");
    };
    assert_eq!(args.artifact, Some(PathBuf::from("0.mp3")));
    assert!(args.input_dir.is_none());
    assert_eq!(args.output_dir, PathBuf::from("./clean/"));
    assert!(args.norm);
    assert!(args.best_effort);
}
