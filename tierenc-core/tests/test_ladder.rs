// tierenc-core/tests/test_ladder.rs
//
// Drives encode_ladder end to end through the mock ffmpeg/ffprobe seams.

use tierenc_core::config::{ExitPolicy, LadderConfigBuilder};
use tierenc_core::encoding::{TierOutcome, encode_ladder};
use tierenc_core::error::CoreError;
use tierenc_core::external::StreamKind;
use tierenc_core::external::mocks::{MockFfmpegSpawner, MockFfprobeExecutor, log_events};
use tierenc_core::processing::planner::{SkipReason, Tier};
use tierenc_core::processing::seek::SeekRange;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

const VOLUMEDETECT: &[&str] = &[
    "[Parsed_volumedetect_0 @ 0x600002d3c000] n_samples: 2646000",
    "[Parsed_volumedetect_0 @ 0x600002d3c000] mean_volume: -25.0 dB",
    "[Parsed_volumedetect_0 @ 0x600002d3c000] max_volume: -3.0 dB",
];

// Helper to create a dummy source file
fn create_source(dir: &Path) -> PathBuf {
    let path = dir.join("source.mkv");
    fs::write(&path, b"dummy content").expect("Failed to create dummy source");
    path
}

fn value_after<'a>(args: &'a [String], key: &str) -> Option<&'a str> {
    let i = args.iter().position(|a| a == key)?;
    args.get(i + 1).map(String::as_str)
}

fn position(args: &[String], key: &str) -> usize {
    args.iter()
        .position(|a| a == key)
        .unwrap_or_else(|| panic!("{key} missing from {args:?}"))
}

fn expect_full_ladder(spawner: &MockFfmpegSpawner) {
    spawner.add_success_expectation("libmp3lame", vec![], true);
    for _ in 0..6 {
        spawner.add_success_expectation("libvpx-vp9", vec![], true);
    }
}

#[test]
fn test_full_ladder_for_1080p_source() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input = create_source(dir.path());
    let output_dir = dir.path().join("source");

    let probe = MockFfprobeExecutor::new();
    probe.expect_video(&input, 1920, 1080, Some("16:9"));
    let spawner = MockFfmpegSpawner::new();
    expect_full_ladder(&spawner);

    let config = LadderConfigBuilder::new(input.clone())
        .output_dir(output_dir.clone())
        .build();
    let report = encode_ladder(&spawner, &probe, &config)?;

    assert!(report.all_succeeded());
    assert_eq!(
        report.plan.tiers,
        vec![Tier(0), Tier(360), Tier(480), Tier(720)]
    );
    assert_eq!(spawner.pending_expectations(), 0);

    let calls = spawner.get_received_calls();
    assert_eq!(calls.len(), 7);

    // Audio-only first, then two passes per video tier in ascending order.
    assert!(calls[0].iter().any(|a| a == "libmp3lame"));
    assert!(calls[0].iter().all(|a| a != "-vf"));
    assert_eq!(calls[0].last().map(String::as_str), output_dir.join("0.mp3").to_str());

    let expected_scales = ["640x360", "853x480", "1280x720"];
    for (i, scale) in expected_scales.iter().enumerate() {
        let pass_1 = &calls[1 + i * 2];
        let pass_2 = &calls[2 + i * 2];
        let vf = format!("scale={scale},setsar=1");
        assert_eq!(value_after(pass_1, "-vf"), Some(vf.as_str()));
        assert_eq!(value_after(pass_2, "-vf"), Some(vf.as_str()));
        assert_eq!(value_after(pass_1, "-pass"), Some("1"));
        assert_eq!(value_after(pass_2, "-pass"), Some("2"));
        assert_eq!(
            value_after(pass_1, "-passlogfile"),
            value_after(pass_2, "-passlogfile")
        );
        assert_eq!(value_after(pass_2, "-crf"), Some("20"));
        assert_eq!(value_after(pass_2, "-b:v"), Some("0"));
        assert_eq!(value_after(pass_2, "-c:a"), Some("libopus"));
    }

    let outputs: Vec<PathBuf> = report
        .outcomes
        .iter()
        .map(|o| match o {
            TierOutcome::Encoded(result) => result.output.clone(),
            TierOutcome::Failed { error, .. } => panic!("unexpected failure: {error}"),
        })
        .collect();
    assert_eq!(
        outputs,
        ["0.mp3", "360.webm", "480.webm", "720.webm"]
            .iter()
            .map(|name| output_dir.join(name))
            .collect::<Vec<_>>()
    );

    // Pass statistics directories are gone once the ladder finishes.
    let left: BTreeSet<String> = fs::read_dir(&output_dir)?
        .map(|e| e.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<Result<_, _>>()?;
    let expected: BTreeSet<String> = ["0.mp3", "360.webm", "480.webm", "720.webm"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(left, expected);

    Ok(())
}

#[test]
fn test_short_source_keeps_smallest_video_tier() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input = create_source(dir.path());

    let probe = MockFfprobeExecutor::new();
    probe.expect_video(&input, 356, 200, None);
    let spawner = MockFfmpegSpawner::new();
    spawner.add_success_expectation("libmp3lame", vec![], true);
    spawner.add_success_expectation("libvpx-vp9", vec![], true);
    spawner.add_success_expectation("libvpx-vp9", vec![], true);

    let config = LadderConfigBuilder::new(input)
        .output_dir(dir.path().join("out"))
        .build();
    let report = encode_ladder(&spawner, &probe, &config)?;

    assert_eq!(report.plan.tiers, vec![Tier(0), Tier(360)]);
    let skipped: Vec<(u32, SkipReason)> = report
        .plan
        .skipped
        .iter()
        .map(|s| (s.tier.0, s.reason))
        .collect();
    assert_eq!(
        skipped,
        vec![
            (480, SkipReason::InsufficientHeight { source_height: 200 }),
            (720, SkipReason::InsufficientHeight { source_height: 200 }),
        ]
    );
    assert_eq!(spawner.get_received_calls().len(), 3);

    // No DAR declared: 356:200 reduces to 89:50, 89/50 x 360 = 640.8 -> 641
    let calls = spawner.get_received_calls();
    assert_eq!(value_after(&calls[1], "-vf"), Some("scale=641x360,setsar=1"));
    Ok(())
}

#[test]
fn test_requested_skips_and_custom_resolutions() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input = create_source(dir.path());

    let probe = MockFfprobeExecutor::new();
    probe.expect_video(&input, 1920, 1080, Some("16:9"));
    let spawner = MockFfmpegSpawner::new();
    spawner.add_success_expectation("libvpx-vp9", vec![], true);
    spawner.add_success_expectation("libvpx-vp9", vec![], true);

    let config = LadderConfigBuilder::new(input)
        .output_dir(dir.path().join("out"))
        .resolutions(vec![720, 0, 1080])
        .skip(vec![0, 720])
        .build();
    let report = encode_ladder(&spawner, &probe, &config)?;

    assert_eq!(report.plan.tiers, vec![Tier(1080)]);
    assert!(report
        .plan
        .skipped
        .iter()
        .all(|s| s.reason == SkipReason::Requested));
    let calls = spawner.get_received_calls();
    assert_eq!(value_after(&calls[0], "-vf"), Some("scale=1920x1080,setsar=1"));
    Ok(())
}

#[test]
fn test_normalization_measures_once_with_input_seek() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input = create_source(dir.path());

    let probe = MockFfprobeExecutor::new();
    probe.expect_video(&input, 1920, 1080, Some("16:9"));
    let spawner = MockFfmpegSpawner::new();
    spawner.add_success_expectation("volumedetect", log_events(VOLUMEDETECT), false);
    spawner.add_success_expectation("libmp3lame", vec![], true);
    spawner.add_success_expectation("libvpx-vp9", vec![], true);
    spawner.add_success_expectation("libvpx-vp9", vec![], true);

    let config = LadderConfigBuilder::new(input)
        .output_dir(dir.path().join("out"))
        .resolutions(vec![0, 480])
        .audio_filters("aresample=48000")
        .seek(SeekRange::new(Some("1:39".into()), Some("9:00".into()), Some("30".into())))
        .normalize(true)
        .build();
    let report = encode_ladder(&spawner, &probe, &config)?;

    assert!(report.all_succeeded());
    assert_eq!(report.gain.map(|g| g.db), Some(2.5));

    let calls = spawner.get_received_calls();
    assert_eq!(calls.len(), 4);
    assert!(calls[0].iter().any(|a| a == "volumedetect"));
    assert!(calls[0].iter().any(|a| a == "-vn"));
    assert!(calls[0].ends_with(&["-f".to_string(), "null".to_string(), "-".to_string()]));

    // Every invocation seeks identically, before its input.
    for call in &calls {
        let i = position(call, "-i");
        assert!(position(call, "-ss") < i);
        assert!(position(call, "-t") < i);
        assert_eq!(value_after(call, "-ss"), Some("1:39"));
        assert_eq!(value_after(call, "-t"), Some("30"));
        assert!(call.iter().all(|a| a != "-to"));
    }

    assert_eq!(value_after(&calls[1], "-af"), Some("aresample=48000,volume=2.5dB"));
    assert!(value_after(&calls[2], "-af").is_none());
    assert_eq!(value_after(&calls[3], "-af"), Some("aresample=48000,volume=2.5dB"));
    Ok(())
}

#[test]
fn test_measurement_failure_fails_every_tier() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input = create_source(dir.path());

    let probe = MockFfprobeExecutor::new();
    probe.expect_video(&input, 1280, 720, None);
    let spawner = MockFfmpegSpawner::new();
    spawner.add_success_expectation(
        "volumedetect",
        log_events(&["[Parsed_volumedetect_0 @ 0x1] mean_volume: -20.0 dB"]),
        false,
    );

    let config = LadderConfigBuilder::new(input)
        .output_dir(dir.path().join("out"))
        .resolutions(vec![0, 360])
        .normalize(true)
        .build();
    let report = encode_ladder(&spawner, &probe, &config)?;

    assert!(!report.all_succeeded());
    assert_eq!(report.failures().count(), 2);
    for outcome in &report.outcomes {
        match outcome {
            TierOutcome::Failed { error, .. } => assert!(error.contains("max_volume")),
            TierOutcome::Encoded(_) => panic!("tier should have failed"),
        }
    }
    assert_eq!(spawner.get_received_calls().len(), 1);
    Ok(())
}

#[test]
fn test_fail_fast_skips_pass_two_and_continues_ladder() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input = create_source(dir.path());

    let probe = MockFfprobeExecutor::new();
    probe.expect_video(&input, 1920, 1080, Some("16:9"));
    let spawner = MockFfmpegSpawner::new();
    spawner.add_success_expectation("libmp3lame", vec![], true);
    spawner.add_success_expectation("libvpx-vp9", vec![], true);
    spawner.add_success_expectation("libvpx-vp9", vec![], true);
    spawner.add_exit_error_expectation(
        "libvpx-vp9",
        log_events(&["Error while opening encoder for output stream #0:0"]),
        1,
    );
    spawner.add_success_expectation("libvpx-vp9", vec![], true);
    spawner.add_success_expectation("libvpx-vp9", vec![], true);

    let config = LadderConfigBuilder::new(input)
        .output_dir(dir.path().join("out"))
        .build();
    let report = encode_ladder(&spawner, &probe, &config)?;

    // 480 stops after its failed first pass; 720 still runs.
    assert_eq!(spawner.get_received_calls().len(), 6);
    let failed: Vec<Tier> = report.failures().map(TierOutcome::tier).collect();
    assert_eq!(failed, vec![Tier(480)]);
    match &report.outcomes[2] {
        TierOutcome::Failed { error, .. } => {
            assert!(error.contains("VP9 pass 1"));
            assert!(error.contains("Error while opening encoder"));
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert!(matches!(report.outcomes[3], TierOutcome::Encoded(_)));
    Ok(())
}

#[test]
fn test_best_effort_attempts_both_passes() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input = create_source(dir.path());

    let probe = MockFfprobeExecutor::new();
    probe.expect_video(&input, 1920, 1080, Some("16:9"));
    let spawner = MockFfmpegSpawner::new();
    spawner.add_exit_error_expectation("libvpx-vp9", vec![], 1);
    spawner.add_success_expectation("libvpx-vp9", vec![], true);

    let config = LadderConfigBuilder::new(input)
        .output_dir(dir.path().join("out"))
        .resolutions(vec![360])
        .exit_policy(ExitPolicy::BestEffort)
        .build();
    let report = encode_ladder(&spawner, &probe, &config)?;

    assert_eq!(spawner.get_received_calls().len(), 2);
    assert!(!report.all_succeeded());
    Ok(())
}

#[test]
fn test_probe_failure_aborts_before_any_encode() {
    let dir = tempdir().unwrap();
    let input = create_source(dir.path());
    let output_dir = dir.path().join("out");

    let probe = MockFfprobeExecutor::new();
    probe.expect_stream(&input, StreamKind::Video, None);
    let spawner = MockFfmpegSpawner::new();

    let config = LadderConfigBuilder::new(input)
        .output_dir(output_dir.clone())
        .build();
    let err = encode_ladder(&spawner, &probe, &config).unwrap_err();

    assert!(matches!(err, CoreError::Probe(_)));
    assert!(spawner.get_received_calls().is_empty());
    assert!(!output_dir.exists());
}

#[test]
fn test_invalid_input_creates_nothing() {
    let dir = tempdir().unwrap();
    let output_dir = dir.path().join("out");

    let config = LadderConfigBuilder::new(dir.path().join("missing.mkv"))
        .output_dir(output_dir.clone())
        .build();
    let err = encode_ladder(&MockFfmpegSpawner::new(), &MockFfprobeExecutor::new(), &config)
        .unwrap_err();

    assert!(matches!(err, CoreError::InvalidInput(_)));
    assert!(!output_dir.exists());
}

#[test]
fn test_user_options_layer_over_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input = create_source(dir.path());

    let probe = MockFfprobeExecutor::new();
    probe.expect_video(&input, 1920, 1080, Some("16:9"));
    let spawner = MockFfmpegSpawner::new();
    spawner.add_success_expectation("libmp3lame", vec![], true);
    spawner.add_success_expectation("libvpx-vp9", vec![], true);
    spawner.add_success_expectation("libvpx-vp9", vec![], true);

    let mut extra = tierenc_core::Settings::new();
    extra.insert("threads", "8");
    extra.insert("ar", "44100");
    let config = LadderConfigBuilder::new(input)
        .output_dir(dir.path().join("out"))
        .resolutions(vec![0, 720])
        .vp9_override("crf", "33")
        .extra_settings(extra)
        .build();
    encode_ladder(&spawner, &probe, &config)?;

    let calls = spawner.get_received_calls();
    // The audio-only encode never carries VP9 options, even user-supplied ones.
    assert!(value_after(&calls[0], "-threads").is_none());
    assert!(value_after(&calls[0], "-crf").is_none());
    assert_eq!(value_after(&calls[0], "-ar"), Some("44100"));
    assert_eq!(value_after(&calls[2], "-crf"), Some("33"));
    assert_eq!(value_after(&calls[2], "-threads"), Some("8"));
    Ok(())
}

#[test]
fn test_report_serializes_outcomes_by_status() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input = create_source(dir.path());

    let probe = MockFfprobeExecutor::new();
    probe.expect_video(&input, 640, 360, None);
    let spawner = MockFfmpegSpawner::new();
    spawner.add_success_expectation("libmp3lame", vec![], true);
    spawner.add_exit_error_expectation("libvpx-vp9", vec![], 1);

    let config = LadderConfigBuilder::new(input)
        .output_dir(dir.path().join("out"))
        .resolutions(vec![0, 360, 720])
        .build();
    let report = encode_ladder(&spawner, &probe, &config)?;
    let json = serde_json::to_value(&report)?;

    assert_eq!(json["dimensions"]["dar"], "16:9");
    assert_eq!(json["plan"]["tiers"], serde_json::json!([0, 360]));
    assert_eq!(json["plan"]["skipped"][0]["tier"], 720);
    assert_eq!(
        json["plan"]["skipped"][0]["reason"]["insufficient_height"]["source_height"],
        360
    );
    assert_eq!(json["outcomes"][0]["status"], "encoded");
    assert_eq!(json["outcomes"][0]["scale"], serde_json::Value::Null);
    assert_eq!(json["outcomes"][1]["status"], "failed");
    assert_eq!(json["outcomes"][1]["tier"], 360);
    assert!(json["loudness"].is_null());
    Ok(())
}
