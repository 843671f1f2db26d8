//! log4rs setup for console and run-log output.
//!
//! Library code only ever logs through the `log` facade; installing a
//! backend is left to the binary.

pub mod setup;

pub use setup::{LoggingHandle, setup_logging};
