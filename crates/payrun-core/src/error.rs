use thiserror::Error;

/// Core error type for the payrun orchestration runtime
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A parameter referenced an output that was never stored
    #[error("Unresolved variable reference: {0}")]
    UnresolvedReference(String),

    /// A required parameter is missing or has the wrong shape
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Login or delegation-token failure
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The backend reported a non-success response
    #[error("Service error: {0}")]
    ServiceError(String),

    /// Transport-level failure (connect, timeout, malformed body)
    #[error("Transport error: {0}")]
    TransportError(String),

    /// A service health check failed before the run started
    #[error("Health check failed: {0}")]
    HealthCheckError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let errors = vec![
            (
                CoreError::UnresolvedReference("$dep1.missing".to_string()),
                "Unresolved variable reference: $dep1.missing",
            ),
            (
                CoreError::AuthenticationError("bad password".to_string()),
                "Authentication error: bad password",
            ),
            (
                CoreError::ServiceError("insufficient funds".to_string()),
                "Service error: insufficient funds",
            ),
            (
                CoreError::TransportError("connection refused".to_string()),
                "Transport error: connection refused",
            ),
            (
                CoreError::HealthCheckError("auth service: timed out".to_string()),
                "Health check failed: auth service: timed out",
            ),
            (CoreError::Other("other_err".to_string()), "other_err"),
        ];

        for (error, expected_msg) in errors {
            assert_eq!(error.to_string(), expected_msg);
        }
    }
}
