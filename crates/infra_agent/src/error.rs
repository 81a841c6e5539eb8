//! Agent adapter error types
//!
//! HTTP-level failures are captured here and mapped onto `PortError` at the
//! port boundary:
//! - 404 -> `PortError::NotFound`
//! - 401/403 -> `PortError::Unauthorized`
//! - 5xx -> `PortError::ServiceUnavailable`
//! - Timeouts -> `PortError::Timeout`
//! - Undecodable bodies -> `PortError::Transformation`
//! - Other -> `PortError::Connection` or `PortError::Internal`

use thiserror::Error;

use core_kernel::PortError;

/// Errors raised while talking to the agent admin API
#[derive(Debug, Error)]
pub enum AgentError {
    /// The HTTP client could not be built
    #[error("Invalid client configuration: {0}")]
    Configuration(String),

    /// The agent answered with a non-success status
    #[error("Agent returned {status} for {operation}: {body}")]
    Status {
        operation: &'static str,
        status: u16,
        body: String,
    },

    /// The request timed out
    #[error("Agent request timed out after {timeout_ms}ms: {operation}")]
    Timeout {
        operation: &'static str,
        timeout_ms: u64,
    },

    /// The response body did not match the expected shape
    #[error("Cannot decode agent response for {operation}: {message}")]
    Decode {
        operation: &'static str,
        message: String,
    },

    /// Transport-level failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl AgentError {
    /// Classifies a reqwest error raised during `operation`
    pub fn from_request(operation: &'static str, timeout_ms: u64, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            AgentError::Timeout { operation, timeout_ms }
        } else if error.is_decode() {
            AgentError::Decode {
                operation,
                message: error.to_string(),
            }
        } else {
            AgentError::Http(error)
        }
    }
}

impl From<AgentError> for PortError {
    fn from(error: AgentError) -> Self {
        match error {
            AgentError::Configuration(message) => PortError::internal(message),
            AgentError::Status { operation, status, body } => match status {
                404 => PortError::not_found("ExchangeRecord", format!("{operation}: {body}")),
                401 | 403 => PortError::Unauthorized {
                    message: format!("{operation} rejected with {status}"),
                },
                500..=599 => PortError::ServiceUnavailable {
                    service: format!("agent {operation} returned {status}: {body}"),
                },
                _ => PortError::validation(format!("{operation} returned {status}: {body}")),
            },
            AgentError::Timeout { operation, timeout_ms } => PortError::Timeout {
                operation: operation.to_string(),
                duration_ms: timeout_ms,
            },
            AgentError::Decode { operation, message } => {
                PortError::transformation(format!("{operation}: {message}"))
            }
            AgentError::Http(source) => PortError::Connection {
                message: source.to_string(),
                source: Some(Box::new(source)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> PortError {
        AgentError::Status {
            operation: "get_exchange_record",
            status: code,
            body: String::new(),
        }
        .into()
    }

    #[test]
    fn test_status_mapping() {
        assert!(status(404).is_not_found());
        assert!(matches!(status(401), PortError::Unauthorized { .. }));
        assert!(status(503).is_transient());
        assert!(matches!(status(422), PortError::Validation { .. }));
    }

    #[test]
    fn test_timeout_is_transient() {
        let error: PortError = AgentError::Timeout {
            operation: "verify_presentation",
            timeout_ms: 10_000,
        }
        .into();
        assert!(error.is_transient());
    }
}
