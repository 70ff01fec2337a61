//! Subcommand implementations.
//!
//! Each function returns `Ok(true)` when the operation fully succeeded;
//! `main` turns `false` into a non-zero exit code.

mod execute;
mod setup;
mod status;
mod validate;
mod variables;

pub use execute::execute;
pub use setup::setup;
pub use status::status;
pub use validate::validate;
pub use variables::variables;

use std::sync::Arc;

use payrun_client::{AuthClient, PaymentsClient};
use payrun_core::{AuthGateway, PaymentsGateway};

use crate::config::OrchestratorConfig;

pub(crate) fn gateways(
    config: &OrchestratorConfig,
) -> (Arc<dyn AuthGateway>, Arc<dyn PaymentsGateway>) {
    let auth = Arc::new(AuthClient::new(config.auth_service_url.clone()));
    let payments = Arc::new(PaymentsClient::new(config.payments_service_url.clone()));
    (auth, payments)
}
