use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{error, info, warn};

use crate::descriptor::{descriptor_for, CommandDescriptor, ResolvedParams, Wire};
use crate::error::CoreError;
use crate::gateway::{AccessToken, AuthGateway, PaymentsGateway, RequestPayload};
use crate::report::{CommandOutcome, ExecutionReport};
use crate::resolver::{self, Resolution};
use crate::store::OutputStore;
use payrun_dsl::{CommandDefinition, CommandFile};

/// Executes a command file strictly in order against the two services.
///
/// A failing command is recorded and the run continues with the next one;
/// only the pre-loop health checks are fatal. One attempt per command, no
/// retries.
pub struct CommandRunner {
    auth: Arc<dyn AuthGateway>,
    payments: Arc<dyn PaymentsGateway>,

    /// Pause between consecutive commands, to avoid racing read-after-write
    /// consistency in the backends
    delay: Duration,
}

impl CommandRunner {
    pub fn new(auth: Arc<dyn AuthGateway>, payments: Arc<dyn PaymentsGateway>) -> Self {
        Self {
            auth,
            payments,
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Check both services are reachable. Run once before the command loop;
    /// a failure here aborts the run before any command executes.
    pub async fn check_preconditions(&self) -> Result<(), CoreError> {
        self.auth
            .health()
            .await
            .map_err(|e| CoreError::HealthCheckError(format!("auth service: {}", e)))?;
        self.payments
            .health()
            .await
            .map_err(|e| CoreError::HealthCheckError(format!("payments service: {}", e)))?;
        Ok(())
    }

    /// Execute every command in file order, recording outcomes into the
    /// report and storing extracted output fields into the store.
    pub async fn execute(
        &self,
        file: &CommandFile,
        store: &mut OutputStore,
    ) -> Result<ExecutionReport, CoreError> {
        self.check_preconditions().await?;

        let mut report = ExecutionReport::new();
        info!(run_id = %report.run_id, commands = file.commands.len(), "Starting command run");

        for (index, command) in file.commands.iter().enumerate() {
            let outcome = self.execute_command(command, store).await;
            match &outcome {
                Ok(detail) => {
                    info!(command = %command.name, kind = %command.kind, "Command succeeded");
                    report.record(CommandOutcome::success(
                        &command.name,
                        command.kind.as_str(),
                        detail.clone(),
                    ));
                }
                Err(err) => {
                    error!(command = %command.name, kind = %command.kind, error = %err, "Command failed");
                    report.record(CommandOutcome::failure(
                        &command.name,
                        command.kind.as_str(),
                        err.to_string(),
                    ));
                }
            }

            if !self.delay.is_zero() && index + 1 < file.commands.len() {
                tokio::time::sleep(self.delay).await;
            }
        }

        info!(
            run_id = %report.run_id,
            succeeded = report.succeeded(),
            total = report.total(),
            "Command run finished"
        );
        Ok(report)
    }

    /// Resolve, dispatch, and store one command. Returns the success detail.
    async fn execute_command(
        &self,
        command: &CommandDefinition,
        store: &mut OutputStore,
    ) -> Result<String, CoreError> {
        let params = resolve_parameters(command, store)?;

        let token = self
            .auth
            .token_for(&command.user)
            .await
            .map_err(|e| CoreError::AuthenticationError(e.to_string()))?;

        let descriptor = descriptor_for(command.kind);
        let payload = (descriptor.build)(&params)?;
        let response = dispatch(self.payments.as_ref(), descriptor, &token, &payload).await?;

        Ok(store_outputs(descriptor, &command.name, &response, store))
    }
}

/// Send a built payload over the descriptor's wire. Shared by the command
/// runner and the provisioning pipeline.
pub(crate) async fn dispatch(
    payments: &dyn PaymentsGateway,
    descriptor: &CommandDescriptor,
    token: &AccessToken,
    payload: &RequestPayload,
) -> Result<Value, CoreError> {
    match descriptor.wire {
        Wire::Rest { method, path } => payments.send_rest(method, path, token, payload).await,
        Wire::GraphQl {
            operation,
            document,
        } => {
            let RequestPayload::Json(variables) = payload else {
                return Err(CoreError::Other(
                    "GraphQL descriptor built a query-string payload".to_string(),
                ));
            };
            payments
                .send_graphql(token, operation, document, variables)
                .await
        }
    }
}

/// Resolve every declared parameter through the substitution resolver.
///
/// An unresolved reference fails the command: the literal `$x.y` text is
/// never sent to a backend.
fn resolve_parameters(
    command: &CommandDefinition,
    store: &OutputStore,
) -> Result<ResolvedParams, CoreError> {
    let mut resolved: BTreeMap<String, Value> = BTreeMap::new();

    for (name, value) in &command.parameters {
        let Some(text) = value.as_str() else {
            resolved.insert(name.clone(), value.clone());
            continue;
        };

        match resolver::resolve(text, store) {
            Resolution::Literal(s) => {
                resolved.insert(name.clone(), Value::String(s));
            }
            Resolution::Resolved { value, .. } => {
                resolved.insert(name.clone(), Value::String(value));
            }
            Resolution::Unresolved { reference, .. } => {
                return Err(CoreError::UnresolvedReference(reference.to_string()));
            }
        }
    }

    Ok(ResolvedParams::new(resolved))
}

/// Extract the descriptor's output fields from the response body and store
/// them under `"{command}_{field}"`. Returns a human-readable summary of
/// what was stored.
fn store_outputs(
    descriptor: &CommandDescriptor,
    command_name: &str,
    response: &Value,
    store: &mut OutputStore,
) -> String {
    let mut stored = Vec::new();

    for field in descriptor.outputs {
        match response.pointer(field.pointer) {
            Some(value) if !value.is_null() => {
                let text = value_to_string(value);
                store.set(command_name, field.name, text.clone());
                stored.push(format!("{}={}", field.name, text));
            }
            _ => {
                warn!(
                    command = command_name,
                    field = field.name,
                    pointer = field.pointer,
                    "Response is missing an expected output field"
                );
            }
        }
    }

    if stored.is_empty() {
        "ok".to_string()
    } else {
        stored.join(" ")
    }
}

/// Stored outputs are plain strings; scalars keep their natural text form,
/// anything structured is stored as compact JSON.
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_to_string() {
        assert_eq!(value_to_string(&json!("text")), "text");
        assert_eq!(value_to_string(&json!(42)), "42");
        assert_eq!(value_to_string(&json!(true)), "true");
        assert_eq!(value_to_string(&json!({"a": 1})), r#"{"a":1}"#);
    }

    #[test]
    fn test_store_outputs_extracts_pointers() {
        let descriptor = descriptor_for(payrun_dsl::CommandKind::Deposit);
        let mut store = OutputStore::new();
        let response = json!({"id": "dep-1", "amount": "100", "status": "success"});

        let detail = store_outputs(descriptor, "dep1", &response, &mut store);

        assert_eq!(store.get("dep1_id"), Some("dep-1"));
        assert_eq!(store.get("dep1_amount"), Some("100"));
        assert_eq!(store.get("dep1_status"), Some("success"));
        assert!(detail.contains("id=dep-1"));
    }

    #[test]
    fn test_store_outputs_skips_missing_fields() {
        let descriptor = descriptor_for(payrun_dsl::CommandKind::Deposit);
        let mut store = OutputStore::new();
        let response = json!({"id": "dep-1"});

        store_outputs(descriptor, "dep1", &response, &mut store);

        assert_eq!(store.get("dep1_id"), Some("dep-1"));
        assert_eq!(store.get("dep1_amount"), None);
        assert_eq!(store.get("dep1_status"), None);
    }
}
