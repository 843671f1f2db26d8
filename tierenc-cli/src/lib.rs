// tierenc-cli/src/lib.rs
//
// Library portion of the Tierenc CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;

// Re-export items needed by the binary or integration tests
pub use cli::{Cli, Commands, EncodeArgs, MuxArgs};
pub use commands::encode::run_encode;
pub use commands::mux::run_mux;
pub use commands::validate_inputs;
