// ============================================================================
// tierenc-core/src/encoding/audio.rs
// ============================================================================
//
// AUDIO-ONLY ENCODING: The `0` Tier
//
// Produces the stereo mp3 artifact in a single ffmpeg invocation. Video,
// subtitle and data streams are explicitly deselected, and every VP9 option
// is stripped so settings shared with the video tiers cannot leak in.
//
// KEY COMPONENTS:
// - AudioEncode: what to encode and where
// - audio_only_settings: settings layering for the mp3 output
// - audio_only_args / encode_audio_only

// ---- Internal crate imports ----
use crate::config::{
    AUDIO_EXTENSION, ExitPolicy, audio_settings, ignore_streams, map_settings, mp3_settings,
    vp9_settings,
};
use crate::error::CoreResult;
use crate::external::{EngineRun, FfmpegArgs, FfmpegSpawner};
use crate::processing::filters::FilterChain;
use crate::processing::seek::SeekRange;
use crate::settings::{Settings, SettingsLayer, merge_layers};

// ---- Standard library imports ----
use std::path::Path;

/// One audio-only encode.
#[derive(Debug, Clone, Copy)]
pub struct AudioEncode<'a> {
    pub source: &'a Path,
    pub output: &'a Path,
    pub audio_filters: &'a FilterChain,
    /// Caller passthrough options, highest priority
    pub settings: &'a Settings,
    pub seek: &'a SeekRange,
}

/// Stream deselection < audio < mp3 codec < caller options, then every VP9
/// key removed and `vn`/`sn`/`dn` forced.
pub fn audio_only_settings(user: &Settings) -> Settings {
    let vp9_keys: Vec<String> = vp9_settings().keys().map(str::to_string).collect();
    merge_layers(&[
        map_settings().into(),
        audio_settings().into(),
        mp3_settings().into(),
        user.into(),
        SettingsLayer::new(ignore_streams()).without(vp9_keys),
    ])
}

/// Argument vector for an audio-only encode.
pub fn audio_only_args(job: &AudioEncode<'_>) -> Vec<String> {
    FfmpegArgs::new()
        .input_seek(job.seek)
        .input(job.source)
        .audio_filters(job.audio_filters)
        .settings(&audio_only_settings(job.settings))
        .format(AUDIO_EXTENSION)
        .output(job.output)
        .build()
}

/// Encodes the audio-only artifact, blocking until ffmpeg exits.
pub fn encode_audio_only<S: FfmpegSpawner>(
    spawner: &S,
    job: &AudioEncode<'_>,
    policy: ExitPolicy,
) -> CoreResult<()> {
    log::info!(
        "Encoding audio-only {} -> {}",
        job.source.display(),
        job.output.display()
    );

    let mut run = EngineRun::new(spawner, policy);
    run.run("audio-only encode", &audio_only_args(job))?;
    run.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SettingValue;

    #[test]
    fn vp9_keys_are_stripped_and_streams_ignored() {
        let mut user = Settings::new();
        user.insert("crf", "30");
        user.insert("threads", "8");
        user.insert("ar", "48000");

        let merged = audio_only_settings(&user);
        assert!(merged.get("crf").is_none());
        assert!(merged.get("threads").is_none());
        assert_eq!(merged.get("ar"), Some(&SettingValue::from("48000")));
        assert_eq!(merged.get("c:a"), Some(&SettingValue::from("libmp3lame")));
        assert_eq!(merged.get("b:a"), Some(&SettingValue::from("320k")));
        assert_eq!(merged.get("ac"), Some(&SettingValue::from("2")));
        for flag in ["vn", "sn", "dn"] {
            assert_eq!(merged.get(flag), Some(&SettingValue::Flag));
        }
    }

    #[test]
    fn seek_is_input_seek() {
        let seek = SeekRange::new(Some("90".into()), Some("120".into()), None);
        let settings = Settings::new();
        let filters = FilterChain::new();
        let args = audio_only_args(&AudioEncode {
            source: Path::new("in.mkv"),
            output: Path::new("out/0.mp3"),
            audio_filters: &filters,
            settings: &settings,
            seek: &seek,
        });
        let i = args.iter().position(|a| a == "-i").unwrap();
        assert_eq!(&args[i - 5..i], ["-ss", "90", "-accurate_seek", "-to", "120"]);
        assert!(args.ends_with(&["-f".to_string(), "mp3".to_string(), "out/0.mp3".to_string()]));
    }
}
