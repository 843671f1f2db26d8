// ============================================================================
// tierenc-cli/src/output.rs
// ============================================================================
//
// RESULT PRESENTATION: Run summaries on stdout
//
// Reports are printed either as a styled summary or, with --json, as the
// serialized report. Logging goes to stderr so stdout stays machine-readable.

use crate::error::{CliErrorContext, CliResult};
use console::style;
use serde::Serialize;
use tierenc_core::encoding::TierOutcome;
use tierenc_core::{LadderReport, MuxReport, format_bytes, format_duration};

fn print_heading(text: &str) {
    println!("{}", style("=".repeat(50)).cyan());
    println!("{}", style(text).bold());
    println!("{}", style("=".repeat(50)).cyan());
}

fn print_info(label: &str, value: impl std::fmt::Display) {
    println!("{} {}", style(format!("{label}:")).bold(), value);
}

/// Pretty-printed JSON for any report.
pub fn to_json<T: Serialize>(report: &T) -> CliResult<String> {
    serde_json::to_string_pretty(report).cli_context("serializing report")
}

pub fn print_ladder_report(report: &LadderReport, json: bool) -> CliResult<()> {
    if json {
        println!("{}", to_json(report)?);
        return Ok(());
    }

    print_heading("Encode Summary");
    print_info("Input", report.input.display());
    print_info("Output directory", report.output_dir.display());
    let dims = &report.dimensions;
    print_info(
        "Source",
        format!("{}x{} (sar {}, dar {})", dims.width, dims.height, dims.sar, dims.dar),
    );
    if let Some(gain) = report.gain {
        print_info("Loudness gain", format!("{:+.1} dB", gain.db));
    }

    for skipped in &report.plan.skipped {
        println!(
            "  {} {}: {}",
            style("[SKIP]").yellow(),
            skipped.tier,
            skipped.reason
        );
    }

    for outcome in &report.outcomes {
        match outcome {
            TierOutcome::Encoded(result) => {
                let size = result.size_bytes.map_or_else(|| "?".to_string(), format_bytes);
                println!(
                    "  {} {} -> {} ({}, {})",
                    style("[OK]").green(),
                    result.tier,
                    result.output.display(),
                    size,
                    format_duration(result.elapsed_secs)
                );
            }
            TierOutcome::Failed { tier, error, .. } => {
                println!("  {} {}: {}", style("[FAIL]").red().bold(), tier, error);
            }
        }
    }

    let failed = report.failures().count();
    if failed == 0 {
        println!("{}", style(format!("Encoded {} tier(s).", report.outcomes.len())).green());
    } else {
        println!("{}", style(format!("{failed} tier(s) failed.")).red().bold());
    }
    Ok(())
}

pub fn print_mux_report(report: &MuxReport, json: bool) -> CliResult<()> {
    if json {
        println!("{}", to_json(report)?);
        return Ok(());
    }

    print_heading("Mux Summary");
    if report.outcomes.is_empty() {
        println!("{}", style("No artifacts to mux.").yellow());
        return Ok(());
    }
    for outcome in &report.outcomes {
        match &outcome.error {
            None => println!(
                "  {} {} -> {}",
                style("[OK]").green(),
                outcome.artifact.display(),
                outcome.output.display()
            ),
            Some(error) => println!(
                "  {} {}: {}",
                style("[FAIL]").red().bold(),
                outcome.artifact.display(),
                error
            ),
        }
    }
    Ok(())
}
