// tierenc-core/src/external/mocks.rs

// --- Mocking Infrastructure (for testing) ---
//
// Scripted stand-ins for the ffmpeg and ffprobe seams. Integration tests drive
// the whole pipeline through these and inspect the argument vectors received.
// Compiled for the crate's own unit tests and with the "test-mocks" feature.

use super::ffmpeg_executor::{FfmpegProcess, FfmpegSpawner};
use super::ffprobe_executor::{FfprobeExecutor, StreamKind, StreamMetadata};
use crate::error::{CoreError, CoreResult};
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::rc::Rc;

/// Builds an `ExitStatus` carrying `code`.
#[cfg(unix)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

/// Builds an `ExitStatus` carrying `code`.
#[cfg(windows)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    ExitStatus::from_raw(code as u32)
}

/// Wraps diagnostic lines as the info-level log events ffmpeg produces.
pub fn log_events(lines: &[&str]) -> Vec<FfmpegEvent> {
    lines
        .iter()
        .map(|line| FfmpegEvent::Log(LogLevel::Info, (*line).to_string()))
        .collect()
}

/// Mock implementation of FfmpegProcess.
#[derive(Clone)]
pub struct MockFfmpegProcess {
    /// Events to emit when handle_events is called.
    pub events_to_emit: Rc<RefCell<Vec<FfmpegEvent>>>,
    /// Exit status to return when wait is called.
    pub exit_status: ExitStatus,
}

impl FfmpegProcess for MockFfmpegProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        let events = self.events_to_emit.borrow().clone();
        for event in events {
            handler(event)?;
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        Ok(self.exit_status)
    }
}

/// Represents an expected ffmpeg command call and its mock result.
pub struct MockFfmpegExpectation {
    pub arg_pattern: String,
    pub result: CoreResult<MockFfmpegProcess>,
    pub create_dummy_output: bool,
}

/// Mock implementation of FfmpegSpawner supporting multiple expectations.
///
/// A spawned command consumes the first remaining expectation whose pattern
/// is a substring of any of its arguments. A command with no matching
/// expectation panics.
#[derive(Clone, Default)]
pub struct MockFfmpegSpawner {
    expectations: Rc<RefCell<Vec<MockFfmpegExpectation>>>,
    received_calls: Rc<RefCell<Vec<Vec<String>>>>,
}

impl MockFfmpegSpawner {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add_expectation(
        &self,
        arg_pattern: &str,
        result: CoreResult<MockFfmpegProcess>,
        create_dummy_output: bool,
    ) {
        self.expectations.borrow_mut().push(MockFfmpegExpectation {
            arg_pattern: arg_pattern.to_string(),
            result,
            create_dummy_output,
        });
    }

    pub fn add_success_expectation(
        &self,
        arg_pattern: &str,
        events: Vec<FfmpegEvent>,
        create_dummy_output: bool,
    ) {
        let process = MockFfmpegProcess {
            events_to_emit: Rc::new(RefCell::new(events)),
            exit_status: exit_status(0),
        };
        self.add_expectation(arg_pattern, Ok(process), create_dummy_output);
    }

    pub fn add_spawn_error_expectation(&self, arg_pattern: &str, error: CoreError) {
        self.add_expectation(arg_pattern, Err(error), false);
    }

    pub fn add_exit_error_expectation(
        &self,
        arg_pattern: &str,
        events: Vec<FfmpegEvent>,
        exit_code: i32,
    ) {
        let process = MockFfmpegProcess {
            events_to_emit: Rc::new(RefCell::new(events)),
            exit_status: exit_status(exit_code),
        };
        self.add_expectation(arg_pattern, Ok(process), false);
    }

    pub fn get_received_calls(&self) -> Vec<Vec<String>> {
        self.received_calls.borrow().clone()
    }

    /// Number of expectations not yet consumed.
    pub fn pending_expectations(&self) -> usize {
        self.expectations.borrow().len()
    }
}

impl FfmpegSpawner for MockFfmpegSpawner {
    type Process = MockFfmpegProcess;

    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        let args: Vec<String> = cmd
            .get_args()
            .map(|s| s.to_string_lossy().into_owned())
            .collect();
        self.received_calls.borrow_mut().push(args.clone());

        let mut expectations = self.expectations.borrow_mut();
        let found_index = expectations
            .iter()
            .position(|exp| args.iter().any(|arg| arg.contains(&exp.arg_pattern)));

        let Some(index) = found_index else {
            log::error!("MockFfmpegSpawner: No expectation found for command args: {:?}", args);
            panic!("MockFfmpegSpawner: No expectation found for command args: {:?}", args);
        };

        let expectation = expectations.remove(index);
        log::info!(
            "MockFfmpegSpawner: Matched expectation with pattern '{}'",
            expectation.arg_pattern
        );

        match expectation.result {
            Ok(process) => {
                if expectation.create_dummy_output {
                    create_dummy_output(&args);
                }
                Ok(process)
            }
            Err(err) => {
                log::warn!(
                    "MockFfmpegSpawner simulating spawn error for pattern '{}': {:?}",
                    expectation.arg_pattern,
                    err
                );
                Err(err)
            }
        }
    }
}

fn create_dummy_output(args: &[String]) {
    let Some(output_path) = args.last().map(PathBuf::from) else {
        log::warn!("MockFfmpegSpawner couldn't find output path in args to create dummy file.");
        return;
    };
    if output_path == Path::new(super::ffmpeg_builder::NULL_SINK) {
        return;
    }
    if let Some(parent) = output_path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            log::error!("MockFfmpegSpawner failed to create parent dir {:?}: {}", parent, e);
        }
    }
    match std::fs::write(&output_path, b"mock") {
        Ok(()) => log::info!("MockFfmpegSpawner created dummy output file: {:?}", output_path),
        Err(e) => log::error!(
            "MockFfmpegSpawner failed to create dummy output file {:?}: {}",
            output_path,
            e
        ),
    }
}

/// Mock implementation of FfprobeExecutor.
///
/// Results are keyed by path and stream kind. An unscripted query fails.
#[derive(Clone, Default)]
pub struct MockFfprobeExecutor {
    stream_results: Rc<RefCell<HashMap<(PathBuf, StreamKind), Result<Option<StreamMetadata>, String>>>>,
    probed: Rc<RefCell<Vec<(PathBuf, StreamKind)>>>,
}

impl MockFfprobeExecutor {
    pub fn new() -> Self {
        Default::default()
    }

    /// Scripts the result of probing `kind` in `input_path`; `None` means
    /// the file has no such stream.
    pub fn expect_stream(&self, input_path: &Path, kind: StreamKind, stream: Option<StreamMetadata>) {
        self.stream_results
            .borrow_mut()
            .insert((input_path.to_path_buf(), kind), Ok(stream));
    }

    /// Scripts a probe failure.
    pub fn expect_error(&self, input_path: &Path, kind: StreamKind, message: &str) {
        self.stream_results
            .borrow_mut()
            .insert((input_path.to_path_buf(), kind), Err(message.to_string()));
    }

    /// Shorthand for a video stream with the given geometry.
    pub fn expect_video(&self, input_path: &Path, width: i64, height: i64, dar: Option<&str>) {
        self.expect_stream(
            input_path,
            StreamKind::Video,
            Some(StreamMetadata {
                width: Some(width),
                height: Some(height),
                sample_aspect_ratio: Some("1:1".to_string()),
                display_aspect_ratio: dar.map(str::to_string),
                duration: None,
            }),
        );
    }

    /// Shorthand for an audio stream of the given duration.
    pub fn expect_audio(&self, input_path: &Path, duration: f64) {
        self.expect_stream(
            input_path,
            StreamKind::Audio,
            Some(StreamMetadata {
                duration: Some(duration),
                ..Default::default()
            }),
        );
    }

    pub fn get_probed(&self) -> Vec<(PathBuf, StreamKind)> {
        self.probed.borrow().clone()
    }
}

impl FfprobeExecutor for MockFfprobeExecutor {
    fn probe_stream(&self, input_path: &Path, kind: StreamKind) -> CoreResult<Option<StreamMetadata>> {
        log::info!(
            "MockFfprobeExecutor::probe_stream called for {:?} on: {}",
            kind,
            input_path.display()
        );
        self.probed.borrow_mut().push((input_path.to_path_buf(), kind));
        match self
            .stream_results
            .borrow()
            .get(&(input_path.to_path_buf(), kind))
        {
            Some(Ok(stream)) => Ok(stream.clone()),
            Some(Err(message)) => Err(CoreError::FfprobeParse(format!(
                "Mock ffprobe error for {}: {message}",
                input_path.display()
            ))),
            None => {
                log::error!(
                    "MockFfprobeExecutor: No expectation set for {:?} on path: {}",
                    kind,
                    input_path.display()
                );
                Err(CoreError::FfprobeParse(format!(
                    "MockFfprobeExecutor: No expectation set for path {}",
                    input_path.display()
                )))
            }
        }
    }
}
