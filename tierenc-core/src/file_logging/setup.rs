use log::LevelFilter;
use log4rs::{
    Handle,
    append::{
        console::{ConsoleAppender, Target},
        file::FileAppender,
    },
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
};
use std::path::Path;
use anyhow::Result;

/// Console lines: highlighted level, then the message.
pub const CONSOLE_PATTERN: &str = "{h({l})} {m}{n}";

/// Log file lines: timestamp, level, message.
pub const FILE_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} [{l}] {m}{n}";

/// The installed logger, kept so a run log can be added once the run is
/// known to start.
pub struct LoggingHandle {
    handle: Handle,
    level: LevelFilter,
}

impl LoggingHandle {
    /// Adds `log_file` next to the console output.
    ///
    /// The log file's directory is created if needed.
    pub fn attach_log_file(&self, log_file: &Path) -> Result<()> {
        self.handle.set_config(build_config(Some(log_file), self.level)?);
        Ok(())
    }
}

fn build_config(log_file: Option<&Path>, log_level: LevelFilter) -> Result<Config> {
    let console = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(CONSOLE_PATTERN)))
        .build();

    let mut config = Config::builder()
        .appender(Appender::builder().build("console", Box::new(console)));
    let mut root = Root::builder().appender("console");

    if let Some(log_file) = log_file {
        // Create log directory if it doesn't exist
        if let Some(parent) = log_file.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file_appender = FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new(FILE_PATTERN)))
            .build(log_file)?;

        config = config.appender(Appender::builder().build("file", Box::new(file_appender)));
        root = root.appender("file");
    }

    Ok(config.build(root.build(log_level))?)
}

/// Installs the global logger: stderr always, plus `log_file` when given.
///
/// May only succeed once per process. Further files are added through the
/// returned handle.
pub fn setup_logging(log_file: Option<&Path>, log_level: LevelFilter) -> Result<LoggingHandle> {
    let handle = log4rs::init_config(build_config(log_file, log_level)?)?;
    Ok(LoggingHandle {
        handle,
        level: log_level,
    })
}
