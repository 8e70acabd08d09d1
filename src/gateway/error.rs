// Gateway error kinds
// Every failure is converted to a JSON body at the dispatch boundary; none
// may propagate past it.

use hyper::StatusCode;
use serde_json::{json, Value};
use thiserror::Error;

/// Errors a gateway endpoint can produce
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Missing or invalid required field, unsupported election label
    #[error("{0}")]
    Validation(String),

    /// Endpoint exists but does not accept this method
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Request body was not valid JSON
    #[error("Invalid JSON in request body")]
    InvalidBody { details: String },

    /// Network failure, non-2xx status, or undecodable response from the
    /// analytical database
    #[error("{0}")]
    Upstream(String),

    /// Unexpected local failure
    #[error("{0}")]
    Internal(String),
}

impl GatewayError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidBody { .. } => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Upstream(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// JSON body for this error: `{error}` plus `details` for parse failures
    pub fn to_body(&self) -> Value {
        match self {
            Self::InvalidBody { details } => json!({
                "error": self.to_string(),
                "details": details,
            }),
            _ => json!({ "error": self.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            GatewayError::Validation("Unsupported election period".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::MethodNotAllowed.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            GatewayError::Upstream("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn invalid_body_carries_details() {
        let err = GatewayError::InvalidBody {
            details: "expected value at line 1".into(),
        };
        let body = err.to_body();
        assert_eq!(body["error"], "Invalid JSON in request body");
        assert_eq!(body["details"], "expected value at line 1");
    }

    #[test]
    fn plain_errors_have_no_details() {
        let body = GatewayError::MethodNotAllowed.to_body();
        assert_eq!(body["error"], "Method not allowed");
        assert!(body.get("details").is_none());
    }
}
