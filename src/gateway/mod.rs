// Query gateway module entry
// Table-driven dispatch for the dashboard API endpoints

pub mod error;
pub mod handlers;
pub mod queries;
pub mod response;
pub mod transport;

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Method, Request, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

use crate::config::AppState;
use crate::logger;
pub use error::GatewayError;

/// Fixed route table; paths not listed here fall through to the static
/// file router
pub const ROUTES: &[&str] = &[
    "/api/hello",
    "/api/test-clickhouse",
    "/api/query",
    "/api/election-metrics",
    "/api/jurisdiction-map",
    "/api/top-jurisdictions",
    "/api/turnout-series",
];

pub fn is_gateway_path(path: &str) -> bool {
    ROUTES.contains(&path)
}

/// Gateway entry point
///
/// Reads the body once, routes to the endpoint handler, and converts the
/// outcome into a CORS-bearing JSON response. Errors never escape this
/// boundary.
pub async fn dispatch(
    req: Request<hyper::body::Incoming>,
    state: &Arc<AppState>,
) -> Response<Full<Bytes>> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let body = match req.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            let err = GatewayError::Internal(format!("Failed to read request body: {e}"));
            logger::log_api_request(method.as_str(), &path, err.status().as_u16());
            return response::error_response(&err);
        }
    };

    match route(&method, &path, &body, state).await {
        Ok((status, value)) => {
            logger::log_api_request(method.as_str(), &path, status.as_u16());
            response::json_response(status, &value)
        }
        Err(err) => {
            logger::log_api_request(method.as_str(), &path, err.status().as_u16());
            response::error_response(&err)
        }
    }
}

async fn route(
    method: &Method,
    path: &str,
    body: &Bytes,
    state: &Arc<AppState>,
) -> Result<(StatusCode, Value), GatewayError> {
    let transport = state.transport.as_ref();

    match path {
        "/api/hello" => {
            require_method(method, &[Method::GET, Method::POST])?;
            Ok(handlers::hello(method))
        }
        "/api/test-clickhouse" => {
            require_method(method, &[Method::GET, Method::POST])?;
            Ok(handlers::test_connection(transport, &state.config.clickhouse).await)
        }
        "/api/query" => {
            require_method(method, &[Method::POST])?;
            handlers::run_query(parse_body(body)?, transport).await
        }
        "/api/election-metrics" => {
            require_method(method, &[Method::POST])?;
            handlers::election_metrics(parse_body(body)?, transport).await
        }
        "/api/jurisdiction-map" => {
            require_method(method, &[Method::POST])?;
            handlers::jurisdiction_map(parse_body(body)?, transport).await
        }
        "/api/top-jurisdictions" => {
            require_method(method, &[Method::POST])?;
            handlers::top_jurisdictions(parse_body(body)?, transport).await
        }
        "/api/turnout-series" => {
            require_method(method, &[Method::GET])?;
            handlers::turnout_series(transport).await
        }
        // Unreachable: the router only dispatches paths from ROUTES
        _ => Err(GatewayError::Internal(format!("No handler for {path}"))),
    }
}

fn require_method(method: &Method, allowed: &[Method]) -> Result<(), GatewayError> {
    if allowed.contains(method) {
        Ok(())
    } else {
        Err(GatewayError::MethodNotAllowed)
    }
}

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, GatewayError> {
    serde_json::from_slice(body).map_err(|e| GatewayError::InvalidBody {
        details: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use handlers::ElectionRequest;

    #[test]
    fn route_table_membership() {
        for route in ROUTES {
            assert!(is_gateway_path(route));
        }
        assert!(!is_gateway_path("/api/unknown"));
        assert!(!is_gateway_path("/dashboard_1"));
        assert!(!is_gateway_path("/"));
    }

    #[test]
    fn require_method_rejects_others() {
        assert!(require_method(&Method::POST, &[Method::POST]).is_ok());
        let err = require_method(&Method::DELETE, &[Method::POST]).unwrap_err();
        assert_eq!(err.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(err.to_string(), "Method not allowed");
    }

    #[test]
    fn parse_body_maps_json_failures_to_invalid_body() {
        let err = parse_body::<ElectionRequest>(&Bytes::from_static(b"not json")).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.to_body().get("details").is_some());

        let ok: ElectionRequest =
            parse_body(&Bytes::from_static(b"{\"election\":\"Nov 2024\"}")).expect("parse");
        assert_eq!(ok.election.as_deref(), Some("Nov 2024"));
    }

    #[test]
    fn empty_body_is_invalid_json() {
        // JSON.parse('') has always thrown; an empty POST body is a 400
        let err = parse_body::<ElectionRequest>(&Bytes::new()).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
