// ============================================================================
// tierenc-cli/src/error.rs
// ============================================================================
//
// CLI ERROR HANDLING: Result alias and context helpers
//
// The CLI reports failures through the core CoreError type. Anything the CLI
// itself adds (report serialization, logger installation) is folded into
// CoreError::OperationFailed with a message that says what was being done.

// ---- Internal crate imports ----
use tierenc_core::{CoreError, CoreResult};

// ---- Standard library imports ----
use std::fmt;

/// Type alias for CLI results using CoreError.
pub type CliResult<T> = CoreResult<T>;

/// Prefixes an error with what the CLI was doing when it happened.
pub trait CliErrorContext<T> {
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display;
}

impl<T, E> CliErrorContext<T> for Result<T, E>
where
    E: fmt::Display,
{
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display,
    {
        self.map_err(|e| CoreError::OperationFailed(format!("{context}: {e}")))
    }
}

/// Line printed to stderr when an input path cannot be used.
pub fn invalid_input_message(path: &str) -> String {
    format!("invalid input file provided: {path}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_is_prefixed() {
        let result: Result<(), String> = Err("disk full".to_string());
        match result.cli_context("writing report") {
            Err(CoreError::OperationFailed(msg)) => assert_eq!(msg, "writing report: disk full"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
