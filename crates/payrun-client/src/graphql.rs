use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A GraphQL-over-HTTP request body.
///
/// Serialized by serde; variables are a JSON object, so embedded quotes and
/// special characters never need manual escaping.
#[derive(Debug, Clone, Serialize)]
pub struct GraphQlRequest {
    pub query: String,

    #[serde(rename = "operationName", skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,

    #[serde(skip_serializing_if = "Value::is_null")]
    pub variables: Value,
}

impl GraphQlRequest {
    pub fn new(document: &str, operation: &str, variables: Value) -> Self {
        Self {
            query: document.to_string(),
            operation_name: Some(operation.to_string()),
            variables,
        }
    }
}

/// A GraphQL-over-HTTP response body
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlResponse {
    #[serde(default)]
    pub data: Option<Value>,

    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

/// One entry of a GraphQL `errors` array
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlError {
    pub message: String,

    #[serde(default)]
    pub path: Option<Value>,
}

impl GraphQlResponse {
    /// Join all error messages for reporting
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    }
}
