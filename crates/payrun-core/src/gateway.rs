use async_trait::async_trait;
use serde_json::Value;

use crate::error::CoreError;
use payrun_dsl::UserCredentials;

/// A bearer token obtained from the auth service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    /// The raw bearer value for the Authorization header
    pub bearer: String,

    /// Scope of the token
    pub scope: TokenScope,
}

/// Whether a token is a user's base token or a group-scoped delegation token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenScope {
    /// Base token straight from login
    Base,

    /// Delegation token authorized to act on behalf of a named group
    Delegated { group: String },
}

impl AccessToken {
    pub fn base(bearer: impl Into<String>) -> Self {
        Self {
            bearer: bearer.into(),
            scope: TokenScope::Base,
        }
    }

    pub fn delegated(bearer: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            bearer: bearer.into(),
            scope: TokenScope::Delegated {
                group: group.into(),
            },
        }
    }
}

/// HTTP method for REST-style calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestMethod {
    Get,
    Post,
}

/// Payload of an outbound request, built by a command descriptor
#[derive(Debug, Clone, PartialEq)]
pub enum RequestPayload {
    /// Query-string parameters for a GET
    Query(Vec<(String, String)>),

    /// JSON body for a POST
    Json(Value),
}

/// Seam to the auth service.
///
/// Implementations perform the login call and, when a group is supplied,
/// the group-id lookup plus delegation-token exchange, falling back to the
/// base token on any failure in that chain.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Obtain a token for the given credentials (delegated if `group` is set)
    async fn token_for(&self, user: &UserCredentials) -> Result<AccessToken, CoreError>;

    /// Register a new user (provisioning only)
    async fn register_user<'a>(
        &self,
        id: &str,
        password: &str,
        display_name: Option<&'a str>,
    ) -> Result<(), CoreError>;

    /// Check that the auth service is reachable
    async fn health(&self) -> Result<(), CoreError>;
}

/// Seam to the payments service.
///
/// Implementations return the parsed response body on success. A non-2xx
/// status, an explicit non-"success" status field, or a GraphQL `errors`
/// array must surface as `CoreError::ServiceError`; transport failures as
/// `CoreError::TransportError`. No retries - a single attempt per call.
#[async_trait]
pub trait PaymentsGateway: Send + Sync {
    /// Send a REST request; returns the parsed JSON body
    async fn send_rest(
        &self,
        method: RestMethod,
        path: &str,
        token: &AccessToken,
        payload: &RequestPayload,
    ) -> Result<Value, CoreError>;

    /// Send a GraphQL operation; returns the `data` object
    async fn send_graphql(
        &self,
        token: &AccessToken,
        operation: &str,
        document: &str,
        variables: &Value,
    ) -> Result<Value, CoreError>;

    /// Check that the payments service is reachable
    async fn health(&self) -> Result<(), CoreError>;
}
