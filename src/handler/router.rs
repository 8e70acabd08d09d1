//! Request routing dispatch module
//!
//! Entry point for HTTP request processing. The gateway route table is
//! consulted first; anything else falls through to the static file router.

use crate::config::AppState;
use crate::gateway;
use crate::handler::static_files;
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::sync::Arc;

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let access_log = state.config.logging.access_log;
    if access_log {
        logger::log_request(&method, req.uri(), req.version());
    }
    logger::log_headers_count(req.headers().len(), state.config.logging.show_headers);

    // CORS preflight short-circuits before any routing
    if method == Method::OPTIONS {
        return Ok(gateway::response::preflight_response());
    }

    if gateway::is_gateway_path(&path) {
        return Ok(gateway::dispatch(req, &state).await);
    }

    Ok(static_files::serve(&path, &method, &state.config.assets.root, access_log).await)
}
