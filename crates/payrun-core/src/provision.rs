//! Provisioning pipeline: creates users, groups, delegation tokens, assets,
//! and bank accounts from a setup file. Same parse → call → record pattern
//! as the command runner, sharing its gateway seams and report type.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{error, info};

use crate::descriptor::{descriptor_for, ResolvedParams};
use crate::error::CoreError;
use crate::gateway::{AuthGateway, PaymentsGateway};
use crate::report::{CommandOutcome, ExecutionReport};
use crate::runner::dispatch;
use payrun_dsl::{CommandKind, SetupFile, UserCredentials};

/// Runs a setup file section by section: users, groups, tokens, assets,
/// bank accounts. Per-item failures are recorded and processing continues.
pub struct Provisioner {
    auth: Arc<dyn AuthGateway>,
    payments: Arc<dyn PaymentsGateway>,
}

impl Provisioner {
    pub fn new(auth: Arc<dyn AuthGateway>, payments: Arc<dyn PaymentsGateway>) -> Self {
        Self { auth, payments }
    }

    pub async fn provision(&self, setup: &SetupFile) -> Result<ExecutionReport, CoreError> {
        self.auth
            .health()
            .await
            .map_err(|e| CoreError::HealthCheckError(format!("auth service: {}", e)))?;
        self.payments
            .health()
            .await
            .map_err(|e| CoreError::HealthCheckError(format!("payments service: {}", e)))?;

        let mut report = ExecutionReport::new();
        info!(run_id = %report.run_id, "Starting provisioning run");

        // Credentials by email, filled as users are registered; later
        // sections authenticate as these users.
        let mut credentials: BTreeMap<String, UserCredentials> = BTreeMap::new();

        for user in &setup.users {
            let result = self
                .auth
                .register_user(&user.id, &user.password, user.display_name.as_deref())
                .await;
            credentials.insert(
                user.id.clone(),
                UserCredentials {
                    id: user.id.clone(),
                    password: user.password.clone(),
                    group: None,
                },
            );
            record(&mut report, &user.id, "user", result.map(|_| "registered".to_string()));
        }

        for group in &setup.groups {
            let result = self.create_group(group, &credentials).await;
            record(&mut report, &group.name, "group", result);
        }

        for token in &setup.tokens {
            let result = self.mint_token(&token.user, &token.group, &credentials).await;
            record(
                &mut report,
                &format!("{}@{}", token.user, token.group),
                "token",
                result,
            );
        }

        for asset in &setup.assets {
            let result = self.create_asset(asset, &credentials).await;
            record(&mut report, &asset.symbol, "asset", result);
        }

        for account in &setup.bank_accounts {
            let result = self.link_bank_account(account, &credentials).await;
            record(&mut report, &account.account_number, "bank_account", result);
        }

        info!(
            run_id = %report.run_id,
            succeeded = report.succeeded(),
            total = report.total(),
            "Provisioning finished"
        );
        Ok(report)
    }

    async fn create_group(
        &self,
        group: &payrun_dsl::GroupDefinition,
        credentials: &BTreeMap<String, UserCredentials>,
    ) -> Result<String, CoreError> {
        let owner = known_user(credentials, &group.owner)?;
        let token = self.auth.token_for(owner).await?;

        let descriptor = descriptor_for(CommandKind::CreateGroup);
        let params = params_from([("name", json!(group.name))]);
        let payload = (descriptor.build)(&params)?;
        let response = dispatch(self.payments.as_ref(), descriptor, &token, &payload).await?;

        let group_id = response
            .pointer("/createGroup/id")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                CoreError::ServiceError("Group creation response carried no id".to_string())
            })?
            .to_string();

        let member_descriptor = descriptor_for(CommandKind::AddGroupMember);
        for member in &group.members {
            let params = params_from([("group_id", json!(group_id)), ("member", json!(member))]);
            let payload = (member_descriptor.build)(&params)?;
            dispatch(self.payments.as_ref(), member_descriptor, &token, &payload).await?;
        }

        Ok(format!("id={} members={}", group_id, group.members.len()))
    }

    /// Verify a delegation token can be minted for the user/group pair.
    async fn mint_token(
        &self,
        user: &str,
        group: &str,
        credentials: &BTreeMap<String, UserCredentials>,
    ) -> Result<String, CoreError> {
        let base = known_user(credentials, user)?;
        let scoped = UserCredentials {
            id: base.id.clone(),
            password: base.password.clone(),
            group: Some(group.to_string()),
        };

        let token = self.auth.token_for(&scoped).await?;
        match token.scope {
            crate::gateway::TokenScope::Delegated { .. } => Ok("delegated".to_string()),
            crate::gateway::TokenScope::Base => Err(CoreError::AuthenticationError(format!(
                "Delegation for group '{}' fell back to the base token",
                group
            ))),
        }
    }

    async fn create_asset(
        &self,
        asset: &payrun_dsl::AssetDefinition,
        credentials: &BTreeMap<String, UserCredentials>,
    ) -> Result<String, CoreError> {
        let issuer = known_user(credentials, &asset.issuer)?;
        let token = self.auth.token_for(issuer).await?;

        let descriptor = descriptor_for(CommandKind::CreateAsset);
        let params = params_from([
            ("symbol", json!(asset.symbol)),
            ("name", json!(asset.name)),
            ("decimals", asset.decimals.map(|d| json!(d)).unwrap_or(Value::Null)),
        ]);
        let payload = (descriptor.build)(&params)?;
        let response = dispatch(self.payments.as_ref(), descriptor, &token, &payload).await?;

        let id = response
            .pointer("/createAsset/id")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        Ok(format!("id={}", id))
    }

    async fn link_bank_account(
        &self,
        account: &payrun_dsl::BankAccountDefinition,
        credentials: &BTreeMap<String, UserCredentials>,
    ) -> Result<String, CoreError> {
        let owner = known_user(credentials, &account.owner)?;
        let token = self.auth.token_for(owner).await?;

        let descriptor = descriptor_for(CommandKind::LinkBankAccount);
        let params = params_from([
            ("account_number", json!(account.account_number)),
            ("routing_number", json!(account.routing_number)),
            (
                "label",
                account.label.as_ref().map(|l| json!(l)).unwrap_or(Value::Null),
            ),
        ]);
        let payload = (descriptor.build)(&params)?;
        let response = dispatch(self.payments.as_ref(), descriptor, &token, &payload).await?;

        let id = response
            .pointer("/id")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        Ok(format!("id={}", id))
    }
}

fn known_user<'a>(
    credentials: &'a BTreeMap<String, UserCredentials>,
    email: &str,
) -> Result<&'a UserCredentials, CoreError> {
    credentials.get(email).ok_or_else(|| {
        CoreError::ValidationError(format!("No credentials for user '{}'", email))
    })
}

fn params_from<const N: usize>(entries: [(&str, Value); N]) -> ResolvedParams {
    ResolvedParams::new(
        entries
            .into_iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
    )
}

fn record(
    report: &mut ExecutionReport,
    name: &str,
    kind: &str,
    result: Result<String, CoreError>,
) {
    match result {
        Ok(detail) => {
            info!(item = name, kind = kind, "Provisioned");
            report.record(CommandOutcome::success(name, kind, detail));
        }
        Err(err) => {
            error!(item = name, kind = kind, error = %err, "Provisioning item failed");
            report.record(CommandOutcome::failure(name, kind, err.to_string()));
        }
    }
}
