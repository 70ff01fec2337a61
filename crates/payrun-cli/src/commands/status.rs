use anyhow::Result;

use crate::config::OrchestratorConfig;

/// Health-check both services and print their reachability.
pub async fn status(config: &OrchestratorConfig) -> Result<bool> {
    let (auth, payments) = super::gateways(config);

    let auth_result = auth.health().await;
    let payments_result = payments.health().await;

    print_service("auth service", &config.auth_service_url, &auth_result);
    print_service(
        "payments service",
        &config.payments_service_url,
        &payments_result,
    );

    Ok(auth_result.is_ok() && payments_result.is_ok())
}

fn print_service(name: &str, url: &str, result: &Result<(), payrun_core::CoreError>) {
    match result {
        Ok(()) => println!("  ok   {} ({})", name, url),
        Err(err) => println!("  DOWN {} ({}): {}", name, url, err),
    }
}
