use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use payrun_core::Provisioner;
use payrun_dsl::parse_and_validate_setup_file;

use crate::config::OrchestratorConfig;

/// Provision users, groups, delegation tokens, assets, and bank account
/// links from a setup file, continuing past individual failures.
pub async fn setup(config: &OrchestratorConfig, file: &Path) -> Result<bool> {
    let yaml = fs::read_to_string(file)
        .with_context(|| format!("Failed to read setup file {}", file.display()))?;
    let setup_file = parse_and_validate_setup_file(&yaml)
        .with_context(|| format!("Invalid setup file {}", file.display()))?;

    info!(
        users = setup_file.users.len(),
        groups = setup_file.groups.len(),
        file = %file.display(),
        "Provisioning from setup file"
    );

    let (auth, payments) = super::gateways(config);
    let provisioner = Provisioner::new(auth, payments);
    let report = provisioner
        .provision(&setup_file)
        .await
        .context("Provisioning aborted")?;

    for outcome in &report.outcomes {
        let marker = if outcome.success { "ok  " } else { "FAIL" };
        println!("  {} {} ({})", marker, outcome.name, outcome.kind);
    }
    println!();
    println!("{}/{} setup items succeeded", report.succeeded(), report.total());

    Ok(report.all_succeeded())
}
