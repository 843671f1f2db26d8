// ============================================================================
// tierenc-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: Console and Run Log
//
// The CLI logs through the `log` facade into the log4rs configuration built
// by tierenc_core::file_logging. Each run gets its own timestamped log file
// unless --no-log is given. The console logger is installed first; the run
// log is attached once the command knows it will produce output.

use crate::cli::Cli;
use crate::error::{CliErrorContext, CliResult};
use log::LevelFilter;
use std::path::{Path, PathBuf};
use tierenc_core::file_logging::LoggingHandle;

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// `<log_dir>/tierenc_<command>_<timestamp>.log`
pub fn run_log_path(log_dir: &Path, command: &str, timestamp: &str) -> PathBuf {
    log_dir.join(format!("tierenc_{command}_{timestamp}.log"))
}

/// Run log location for this invocation, `None` with --no-log.
pub fn resolve_log_file(cli: &Cli) -> Option<PathBuf> {
    if cli.no_log {
        return None;
    }
    let log_dir = cli
        .log_dir
        .clone()
        .unwrap_or_else(|| cli.command.output_dir().join("logs"));
    Some(run_log_path(&log_dir, cli.command.name(), &get_timestamp()))
}

/// Installed logger plus the run log it will write once started.
pub struct RunLogger {
    handle: LoggingHandle,
    log_file: Option<PathBuf>,
}

impl RunLogger {
    /// Creates the run log and routes every later record into it as well.
    pub fn start_run_log(&self) -> CliResult<()> {
        if let Some(log_file) = &self.log_file {
            self.handle
                .attach_log_file(log_file)
                .cli_context("creating run log")?;
            log::info!("Run log: {}", log_file.display());
        }
        Ok(())
    }
}

/// Installs the console logger. The run log is not created yet.
pub fn init_logging(cli: &Cli) -> CliResult<RunLogger> {
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let handle = tierenc_core::file_logging::setup_logging(None, level)
        .cli_context("setting up logging")?;
    Ok(RunLogger {
        handle,
        log_file: resolve_log_file(cli),
    })
}
