use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::error::ClientError;
use crate::graphql::{GraphQlRequest, GraphQlResponse};
use payrun_core::{AccessToken, CoreError, PaymentsGateway, RequestPayload, RestMethod};

/// Client for the payments service: REST endpoints and GraphQL-over-HTTP.
///
/// One attempt per call, no retries. Success requires an HTTP 2xx status
/// and, for REST bodies carrying a `status` field, the value `"success"`;
/// for GraphQL, an empty `errors` array.
pub struct PaymentsClient {
    base_url: String,
    client: reqwest::Client,
}

impl PaymentsClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .connect_timeout(Duration::from_secs(10))
                .build()
                .unwrap(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn rest(
        &self,
        method: RestMethod,
        path: &str,
        token: &AccessToken,
        payload: &RequestPayload,
    ) -> Result<Value, ClientError> {
        let url = self.url(path);
        debug!(%url, ?method, "Sending REST request");

        let request = match (method, payload) {
            (RestMethod::Get, RequestPayload::Query(params)) => {
                self.client.get(&url).query(params)
            }
            (RestMethod::Get, RequestPayload::Json(_)) => {
                return Err(ClientError::ServiceFailure(
                    "GET requests carry query parameters, not a body".to_string(),
                ))
            }
            (RestMethod::Post, RequestPayload::Json(body)) => self.client.post(&url).json(body),
            (RestMethod::Post, RequestPayload::Query(_)) => {
                return Err(ClientError::ServiceFailure(
                    "POST requests carry a JSON body, not query parameters".to_string(),
                ))
            }
        };

        let response = request.bearer_auth(&token.bearer).send().await?;
        let status = response.status();
        let text = response.text().await?;

        let body: Value = serde_json::from_str(&text).map_err(|_| {
            ClientError::MalformedResponse(format!(
                "Non-JSON response (status {}): {}",
                status, text
            ))
        })?;

        if !status.is_success() {
            return Err(ClientError::ServiceFailure(format!(
                "{} {} returned {}: {}",
                match method {
                    RestMethod::Get => "GET",
                    RestMethod::Post => "POST",
                },
                path,
                status,
                body
            )));
        }

        // Some endpoints report failure in-band with a 2xx status
        if let Some(response_status) = body.get("status").and_then(Value::as_str) {
            if response_status != "success" && !is_acceptable_in_band_status(response_status) {
                return Err(ClientError::ServiceFailure(format!(
                    "{} reported status '{}': {}",
                    path, response_status, body
                )));
            }
        }

        Ok(body)
    }

    async fn graphql(
        &self,
        token: &AccessToken,
        operation: &str,
        document: &str,
        variables: &Value,
    ) -> Result<Value, ClientError> {
        let url = self.url("/graphql");
        debug!(%url, operation, "Sending GraphQL request");

        let request = GraphQlRequest::new(document, operation, variables.clone());
        let response = self
            .client
            .post(&url)
            .bearer_auth(&token.bearer)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::ServiceFailure(format!(
                "GraphQL operation {} returned {}: {}",
                operation, status, body
            )));
        }

        let body: GraphQlResponse = response
            .json()
            .await
            .map_err(|e| ClientError::MalformedResponse(e.to_string()))?;

        // GraphQL failures arrive on HTTP 200
        if !body.errors.is_empty() {
            return Err(ClientError::ServiceFailure(format!(
                "GraphQL operation {} failed: {}",
                operation,
                body.error_summary()
            )));
        }

        body.data.ok_or_else(|| {
            ClientError::MalformedResponse(format!(
                "GraphQL operation {} returned no data", operation
            ))
        })
    }
}

/// Transaction lookups legitimately return in-flight or settled states;
/// those are not failures even though the field is not "success".
fn is_acceptable_in_band_status(status: &str) -> bool {
    matches!(status, "pending" | "processing" | "completed" | "settled")
}

#[async_trait]
impl PaymentsGateway for PaymentsClient {
    async fn send_rest(
        &self,
        method: RestMethod,
        path: &str,
        token: &AccessToken,
        payload: &RequestPayload,
    ) -> Result<Value, CoreError> {
        self.rest(method, path, token, payload)
            .await
            .map_err(CoreError::from)
    }

    async fn send_graphql(
        &self,
        token: &AccessToken,
        operation: &str,
        document: &str,
        variables: &Value,
    ) -> Result<Value, CoreError> {
        self.graphql(token, operation, document, variables)
            .await
            .map_err(CoreError::from)
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
                "Payments service health check returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_flight_states_are_not_failures() {
        assert!(is_acceptable_in_band_status("pending"));
        assert!(is_acceptable_in_band_status("completed"));
        assert!(!is_acceptable_in_band_status("failed"));
        assert!(!is_acceptable_in_band_status("rejected"));
    }

    #[test]
    fn test_url_join() {
        let client = PaymentsClient::new("http://localhost:9100");
        assert_eq!(client.url("/graphql"), "http://localhost:9100/graphql");
    }
}
