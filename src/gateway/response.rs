// Gateway response utility functions module
// Every gateway response, success or error, carries the fixed CORS headers.

use super::error::GatewayError;
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::http::response::Builder;
use hyper::{Response, StatusCode};
use serde::Serialize;

fn with_cors(builder: Builder) -> Builder {
    builder
        .header("Access-Control-Allow-Origin", "*")
        .header(
            "Access-Control-Allow-Methods",
            "GET, POST, PUT, DELETE, OPTIONS",
        )
        .header("Access-Control-Allow-Headers", "Content-Type, Authorization")
}

/// CORS preflight response: 200 with an empty body
pub fn preflight_response() -> Response<Full<Bytes>> {
    with_cors(Response::builder().status(StatusCode::OK))
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            logger::log_error(&format!("Failed to build preflight response: {e}"));
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build JSON response
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let json = match serde_json::to_string(body) {
        Ok(j) => j,
        Err(e) => {
            logger::log_error(&format!("Failed to serialize response: {e}"));
            return error_response(&GatewayError::Internal("Internal server error".to_string()));
        }
    };

    with_cors(Response::builder().status(status))
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|e| {
            logger::log_error(&format!("Failed to build response: {e}"));
            Response::new(Full::new(Bytes::from(r#"{"error":"Internal server error"}"#)))
        })
}

/// Build JSON error response with the status the error kind maps to
pub fn error_response(error: &GatewayError) -> Response<Full<Bytes>> {
    let body = error.to_body().to_string();
    with_cors(Response::builder().status(error.status()))
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|e| {
            logger::log_error(&format!("Failed to build error response: {e}"));
            Response::new(Full::new(Bytes::from(r#"{"error":"Internal server error"}"#)))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn preflight_is_200_and_empty_with_cors() {
        let resp = preflight_response();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()
                .get("Access-Control-Allow-Origin")
                .and_then(|v| v.to_str().ok()),
            Some("*")
        );
    }

    #[test]
    fn json_response_sets_content_type_and_cors() {
        let resp = json_response(StatusCode::OK, &json!({"ok": true}));
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()
                .get("Content-Type")
                .and_then(|v| v.to_str().ok()),
            Some("application/json")
        );
        assert!(resp.headers().contains_key("Access-Control-Allow-Headers"));
    }

    #[test]
    fn error_response_uses_error_status() {
        let resp = error_response(&GatewayError::MethodNotAllowed);
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert!(resp.headers().contains_key("Access-Control-Allow-Origin"));
    }
}
