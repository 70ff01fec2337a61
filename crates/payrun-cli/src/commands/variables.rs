use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use payrun_core::analyze_references;
use payrun_dsl::parse_command_file;

/// Dry analysis of every `$command.field` reference in the file: which
/// command produces it and whether it resolves given execution order.
pub async fn variables(file: &Path) -> Result<bool> {
    let yaml = fs::read_to_string(file)
        .with_context(|| format!("Failed to read command file {}", file.display()))?;
    let command_file = parse_command_file(&yaml)
        .with_context(|| format!("Invalid command file {}", file.display()))?;

    let analyses = analyze_references(&command_file);
    if analyses.is_empty() {
        println!("{}: no variable references", file.display());
        return Ok(true);
    }

    let mut all_resolvable = true;
    for analysis in &analyses {
        let verdict = if analysis.resolvable() {
            "resolves".to_string()
        } else if !analysis.producer_runs_earlier {
            all_resolvable = false;
            format!("UNRESOLVED: '{}' does not run earlier", analysis.reference.command)
        } else {
            all_resolvable = false;
            format!(
                "UNRESOLVED: '{}' does not produce field '{}'",
                analysis.reference.command, analysis.reference.field
            )
        };
        println!(
            "  {} in {}.{} -> {}",
            analysis.reference, analysis.command, analysis.parameter, verdict
        );
    }

    println!();
    println!(
        "{} references, {} resolvable",
        analyses.len(),
        analyses.iter().filter(|a| a.resolvable()).count()
    );
    Ok(all_resolvable)
}
