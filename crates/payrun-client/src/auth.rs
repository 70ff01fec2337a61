use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::ClientError;
use payrun_core::{AccessToken, AuthGateway, CoreError};
use payrun_dsl::UserCredentials;

/// Capability set granted to every delegation token
const DELEGATION_CAPABILITIES: &[&str] = &["payments:read", "payments:write"];

/// Fixed delegation token lifetime in seconds
const DELEGATION_EXPIRY_SECONDS: u64 = 3600;

/// Response field names a bearer token may arrive under, in preference order
const TOKEN_FIELDS: &[&str] = &["token", "access_token", "jwt"];

/// Client for the auth service.
///
/// Performs the login call and, when a group is requested, the group-id
/// lookup and delegation-token exchange. Any failure in the delegation
/// chain logs a warning and falls back to the base token. Tokens are cached
/// per `(email, group)` for the lifetime of the client, so a run with many
/// commands for one user performs one login. The cache holds whatever the
/// chain produced, including a fallback base token: delegation is attempted
/// once per `(email, group)` per run, and the warning fires once.
pub struct AuthClient {
    base_url: String,
    client: reqwest::Client,
    cache: Mutex<HashMap<(String, Option<String>), AccessToken>>,
}

impl AuthClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .connect_timeout(Duration::from_secs(10))
                .build()
                .unwrap(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Log in and extract the bearer token from the response.
    async fn login(&self, email: &str, password: &str) -> Result<String, ClientError> {
        let response = self
            .client
            .post(self.url("/api/v1/login"))
            .json(&json!({"email": email, "password": password}))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Authentication(format!(
                "Login for {} failed with status {}: {}",
                email, status, body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ClientError::MalformedResponse(e.to_string()))?;

        extract_bearer(&body).ok_or_else(|| {
            ClientError::Authentication(format!(
                "Login response for {} carried no token field", email
            ))
        })
    }

    /// Resolve a group's identifier by name.
    async fn lookup_group_id(&self, token: &str, name: &str) -> Result<String, ClientError> {
        let response = self
            .client
            .get(self.url("/api/v1/groups"))
            .bearer_auth(token)
            .query(&[("name", name)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::ServiceFailure(format!(
                "Group lookup for '{}' failed with status {}",
                name,
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ClientError::MalformedResponse(e.to_string()))?;

        body.pointer("/id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                ClientError::MalformedResponse(format!(
                    "Group lookup response for '{}' carried no id", name
                ))
            })
    }

    /// Exchange a base token for a group-scoped delegation token.
    async fn delegate(&self, base_token: &str, group_id: &str) -> Result<String, ClientError> {
        let response = self
            .client
            .post(self.url("/api/v1/tokens/delegate"))
            .bearer_auth(base_token)
            .json(&json!({
                "group_id": group_id,
                "capabilities": DELEGATION_CAPABILITIES,
                "expires_in": DELEGATION_EXPIRY_SECONDS,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::Authentication(format!(
                "Delegation exchange failed with status {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ClientError::MalformedResponse(e.to_string()))?;

        extract_bearer(&body).ok_or_else(|| {
            ClientError::Authentication("Delegation response carried no token field".to_string())
        })
    }

    /// The full token chain for a set of credentials: login, then the
    /// optional group lookup + delegation exchange with base-token fallback.
    async fn obtain(&self, user: &UserCredentials) -> Result<AccessToken, ClientError> {
        let base = self.login(&user.id, &user.password).await?;

        let Some(group) = &user.group else {
            return Ok(AccessToken::base(base));
        };

        let delegated = async {
            let group_id = self.lookup_group_id(&base, group).await?;
            self.delegate(&base, &group_id).await
        }
        .await;

        match delegated {
            Ok(token) => Ok(AccessToken::delegated(token, group.clone())),
            Err(err) => {
                warn!(
                    user = %user.id,
                    group = %group,
                    error = %err,
                    "Delegation chain failed, falling back to the base token"
                );
                Ok(AccessToken::base(base))
            }
        }
    }
}

/// Take the bearer token from the first of the known field names present.
fn extract_bearer(body: &Value) -> Option<String> {
    TOKEN_FIELDS
        .iter()
        .find_map(|field| body.get(*field).and_then(Value::as_str))
        .map(str::to_string)
}

#[async_trait]
impl AuthGateway for AuthClient {
    async fn token_for(&self, user: &UserCredentials) -> Result<AccessToken, CoreError> {
        let cache_key = (user.id.clone(), user.group.clone());

        if let Some(token) = self.cache.lock().unwrap().get(&cache_key) {
            debug!(user = %user.id, "Using cached token");
            return Ok(token.clone());
        }

        let token = self.obtain(user).await.map_err(CoreError::from)?;
        self.cache
            .lock()
            .unwrap()
            .insert(cache_key, token.clone());
        Ok(token)
    }

    async fn register_user<'a>(
        &self,
        id: &str,
        password: &str,
        display_name: Option<&'a str>,
    ) -> Result<(), CoreError> {
        let response = self
            .client
            .post(self.url("/api/v1/users"))
            .json(&json!({
                "email": id,
                "password": password,
                "display_name": display_name,
            }))
            .send()
            .await
            .map_err(|e| CoreError::TransportError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CoreError::ServiceError(format!(
                "User registration for {} failed with status {}: {}",
                id, status, body
            )));
        }

        Ok(())
    }

    async fn health(&self) -> Result<(), CoreError> {
        let response = self
            .client
            .get(self.url("/health"))
            .send()
            .await
            .map_err(|e| CoreError::TransportError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CoreError::ServiceError(format!(
                "Auth service health check returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_bearer_preference_order() {
        let body = json!({"access_token": "second", "token": "first", "jwt": "third"});
        assert_eq!(extract_bearer(&body), Some("first".to_string()));

        let body = json!({"jwt": "third", "access_token": "second"});
        assert_eq!(extract_bearer(&body), Some("second".to_string()));

        let body = json!({"jwt": "third"});
        assert_eq!(extract_bearer(&body), Some("third".to_string()));

        assert_eq!(extract_bearer(&json!({"other": "x"})), None);
    }

    #[test]
    fn test_url_join_handles_trailing_slash() {
        let client = AuthClient::new("http://localhost:9000/");
        assert_eq!(client.url("/health"), "http://localhost:9000/health");
    }
}
