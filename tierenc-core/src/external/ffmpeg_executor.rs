// ============================================================================
// tierenc-core/src/external/ffmpeg_executor.rs
// ============================================================================
//
// FFMPEG EXECUTOR: FFmpeg Process Management and Abstraction
//
// This module provides abstractions for spawning ffmpeg, collecting its
// diagnostic output and applying the configured exit policy to the result.
// Every invocation is blocking: a call returns only after the process has
// exited and its full stderr has been read.
//
// KEY COMPONENTS:
// - FfmpegProcess: Trait representing an active FFmpeg process
// - FfmpegSpawner: Trait for creating new FFmpeg processes
// - SidecarSpawner: Concrete implementation using ffmpeg-sidecar
// - run_ffmpeg / EngineRun: blocking execution with exit-policy handling

use crate::config::ExitPolicy;
use crate::error::{
    CoreError, CoreResult, command_start_error, command_wait_error, encode_failed_error,
};
use ffmpeg_sidecar::child::FfmpegChild as SidecarChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::FfmpegEvent;
use std::process::ExitStatus;

// --- FFmpeg Execution Abstraction ---

/// Trait representing an active ffmpeg process instance.
pub trait FfmpegProcess {
    /// Processes events from the running command using a provided handler closure.
    fn handle_events<F>(&mut self, handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>;

    /// Waits for the command to complete and returns its exit status.
    fn wait(&mut self) -> CoreResult<ExitStatus>;
}

/// Trait representing something that can spawn an FfmpegProcess.
pub trait FfmpegSpawner {
    type Process: FfmpegProcess;
    /// Spawns the ffmpeg command, consuming the command object.
    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process>;
}

// --- Concrete Implementation using ffmpeg-sidecar ---

/// Wrapper around `ffmpeg_sidecar::child::FfmpegChild` implementing `FfmpegProcess`.
pub struct SidecarProcess(SidecarChild);

impl FfmpegProcess for SidecarProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        let iterator = self.0.iter().map_err(|e| {
            log::error!("Failed to get ffmpeg event iterator: {}", e);
            CoreError::OperationFailed(format!("ffmpeg event stream unavailable: {e}"))
        })?;
        for event in iterator {
            handler(event)?;
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        self.0
            .wait()
            .map_err(|e| command_wait_error("ffmpeg (sidecar)", e))
    }
}

/// Concrete implementation of `FfmpegSpawner` using `ffmpeg-sidecar`.
#[derive(Debug, Clone, Default)]
pub struct SidecarSpawner;

impl FfmpegSpawner for SidecarSpawner {
    type Process = SidecarProcess;

    fn spawn(&self, mut cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        cmd.spawn()
            .map(SidecarProcess)
            .map_err(|e| command_start_error("ffmpeg (sidecar)", e))
    }
}

// --- Blocking execution ---

/// Exit status and diagnostic lines of a finished ffmpeg invocation.
#[derive(Debug, Clone)]
pub struct EngineOutput {
    pub status: ExitStatus,
    pub log_lines: Vec<String>,
}

/// Runs ffmpeg with `args` and blocks until it exits.
///
/// Every log and error line ffmpeg writes is kept, in order. A non-zero exit
/// is not an error here; callers decide what it means.
pub fn run_ffmpeg<S: FfmpegSpawner>(
    spawner: &S,
    stage: &str,
    args: &[String],
) -> CoreResult<EngineOutput> {
    log::debug!("Running ffmpeg ({stage}): ffmpeg {}", args.join(" "));

    let mut cmd = FfmpegCommand::new();
    cmd.args(args);

    let mut process = spawner.spawn(cmd)?;
    let mut log_lines = Vec::new();
    process.handle_events(|event| {
        match event {
            FfmpegEvent::Log(_, line) | FfmpegEvent::Error(line) => log_lines.push(line),
            _ => {}
        }
        Ok(())
    })?;
    let status = process.wait()?;

    log::debug!("ffmpeg ({stage}) exited with {status}");
    Ok(EngineOutput { status, log_lines })
}

/// A sequence of ffmpeg invocations governed by one [`ExitPolicy`].
///
/// Under `FailFast` the first non-zero exit is returned from [`EngineRun::run`].
/// Under `BestEffort` it is logged and remembered, later stages still run, and
/// [`EngineRun::finish`] reports the first failure.
pub struct EngineRun<'a, S: FfmpegSpawner> {
    spawner: &'a S,
    policy: ExitPolicy,
    deferred: Option<CoreError>,
}

impl<'a, S: FfmpegSpawner> EngineRun<'a, S> {
    pub fn new(spawner: &'a S, policy: ExitPolicy) -> Self {
        Self {
            spawner,
            policy,
            deferred: None,
        }
    }

    pub fn run(&mut self, stage: &str, args: &[String]) -> CoreResult<EngineOutput> {
        let output = run_ffmpeg(self.spawner, stage, args)?;
        if !output.status.success() {
            let err = encode_failed_error(stage, output.status, &output.log_lines);
            match self.policy {
                ExitPolicy::FailFast => return Err(err),
                ExitPolicy::BestEffort => {
                    log::warn!("{err}; continuing");
                    self.deferred.get_or_insert(err);
                }
            }
        }
        Ok(output)
    }

    pub fn finish(self) -> CoreResult<()> {
        match self.deferred {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
