// tierenc-cli/src/main.rs
//
// Entry point of the `tierenc` binary.
//
// Order of work for every command:
// - parse arguments
// - validate the input paths (nothing is created for an invalid input)
// - check that ffmpeg and ffprobe can be started
// - install the console logger
// - run the command and print its report; the run log is created once the
//   command is past its probing step
//
// The process exits 0 only when every tier or file succeeded.

use clap::Parser;
use console::style;
use std::process::ExitCode;
use tierenc::error::{CliResult, invalid_input_message};
use tierenc::output::{print_ladder_report, print_mux_report};
use tierenc::{Cli, Commands, run_encode, run_mux, validate_inputs};
use tierenc_core::CoreError;
use tierenc_core::external::{CrateFfprobeExecutor, SidecarSpawner, check_dependency};

fn run(cli: &Cli) -> CliResult<bool> {
    validate_inputs(&cli.command)?;

    check_dependency("ffmpeg")?;
    check_dependency("ffprobe")?;

    let logger = tierenc::logging::init_logging(cli)?;

    let spawner = SidecarSpawner;
    let probe = CrateFfprobeExecutor::new();

    match &cli.command {
        Commands::Encode(args) => {
            let report = run_encode(&spawner, &probe, args, || logger.start_run_log())?;
            print_ladder_report(&report, args.json)?;
            Ok(report.all_succeeded())
        }
        Commands::Mux(args) => {
            logger.start_run_log()?;
            let report = run_mux(&spawner, &probe, args)?;
            print_mux_report(&report, args.json)?;
            Ok(report.all_succeeded())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(CoreError::InvalidInput(path)) => {
            eprintln!("{}", invalid_input_message(&path));
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("{} {e}", style("Error:").red().bold());
            ExitCode::FAILURE
        }
    }
}
