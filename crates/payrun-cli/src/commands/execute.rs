use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use payrun_core::{CommandRunner, ExecutionReport, OutputStore};
use payrun_dsl::parse_and_validate_command_file;

use crate::config::OrchestratorConfig;

/// Run every command in the file in order, continuing past failures, and
/// print the per-command outcomes plus the final tally.
pub async fn execute(config: &OrchestratorConfig, file: &Path) -> Result<bool> {
    let yaml = fs::read_to_string(file)
        .with_context(|| format!("Failed to read command file {}", file.display()))?;
    let command_file = parse_and_validate_command_file(&yaml)
        .with_context(|| format!("Invalid command file {}", file.display()))?;

    info!(
        commands = command_file.commands.len(),
        file = %file.display(),
        "Executing command file"
    );

    let (auth, payments) = super::gateways(config);
    let runner = CommandRunner::new(auth, payments)
        .with_delay(Duration::from_millis(config.command_delay_ms));

    let mut store = OutputStore::new();
    let report = runner
        .execute(&command_file, &mut store)
        .await
        .context("Execution aborted")?;

    print_report(&report);
    Ok(report.all_succeeded())
}

fn print_report(report: &ExecutionReport) {
    println!();
    println!("Run {}", report.run_id);
    for outcome in &report.outcomes {
        let marker = if outcome.success { "ok  " } else { "FAIL" };
        if outcome.detail.is_empty() {
            println!("  {} {} ({})", marker, outcome.name, outcome.kind);
        } else {
            println!(
                "  {} {} ({}): {}",
                marker, outcome.name, outcome.kind, outcome.detail
            );
        }
    }
    println!();
    println!(
        "{}/{} commands succeeded",
        report.succeeded(),
        report.total()
    );
}
