//! Configuration for the payrun orchestrator
//!
//! Values start from defaults and are overridden from environment
//! variables. A `.env` file, if present, is loaded before this runs.

use std::env;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Orchestrator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Base URL of the auth service
    #[serde(default = "default_auth_service_url")]
    pub auth_service_url: String,

    /// Base URL of the payments service
    #[serde(default = "default_payments_service_url")]
    pub payments_service_url: String,

    /// Pause between consecutive commands, in milliseconds
    #[serde(default = "default_command_delay_ms")]
    pub command_delay_ms: u64,

    /// Tracing filter directive
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_auth_service_url() -> String {
    "http://localhost:8081".to_string()
}

fn default_payments_service_url() -> String {
    "http://localhost:8082".to_string()
}

fn default_command_delay_ms() -> u64 {
    1000
}

fn default_log_filter() -> String {
    "info,payrun=debug".to_string()
}

impl OrchestratorConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Ok(url) = env::var("AUTH_SERVICE_URL") {
            config.auth_service_url = url;
        }

        if let Ok(url) = env::var("PAYMENTS_SERVICE_URL") {
            config.payments_service_url = url;
        }

        if let Ok(delay) = env::var("PAYRUN_COMMAND_DELAY_MS") {
            if let Ok(ms) = delay.parse::<u64>() {
                config.command_delay_ms = ms;
            } else {
                warn!("Invalid PAYRUN_COMMAND_DELAY_MS value: {}", delay);
            }
        }

        if let Ok(filter) = env::var("LOG_FILTER") {
            config.log_filter = filter;
        }

        config
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            auth_service_url: default_auth_service_url(),
            payments_service_url: default_payments_service_url(),
            command_delay_ms: default_command_delay_ms(),
            log_filter: default_log_filter(),
        }
    }
}
