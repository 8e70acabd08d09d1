//! Static file serving module
//!
//! Resolves clean URLs against the served root, enforces path containment,
//! and builds file responses.

use crate::http::{self, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Response};
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Fixed clean-URL alias table: extensionless dashboard paths mapped to the
/// HTML files that back them
pub const CLEAN_URLS: &[(&str, &str)] = &[
    ("/", "index.html"),
    ("/test", "test.html"),
    ("/login", "login.html"),
    ("/dashboard_1", "dashboard_1.html"),
    ("/dashboard_2", "dashboard_2.html"),
    ("/dashboard_3", "dashboard_3.html"),
    ("/dashboard_4", "dashboard_4.html"),
];

/// Outcome of resolving a URL path against the served root
#[derive(Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Safe, existing file under the root
    File(PathBuf),
    /// Path escapes the served root
    Forbidden,
    /// Nothing on disk at the resolved location
    NotFound,
}

/// Serve a static asset for the given URL path
pub async fn serve(
    url_path: &str,
    method: &Method,
    root: &str,
    access_log: bool,
) -> Response<Full<Bytes>> {
    if *method != Method::GET && *method != Method::HEAD {
        logger::log_warning(&format!("Method not allowed for static path: {method}"));
        return http::build_405_response();
    }
    let is_head = *method == Method::HEAD;

    match resolve(Path::new(root), url_path) {
        Resolution::Forbidden => {
            logger::log_warning(&format!("Path traversal attempt blocked: {url_path}"));
            http::build_403_response()
        }
        Resolution::NotFound => http::build_404_response(),
        Resolution::File(file_path) => match fs::read(&file_path).await {
            Ok(content) => {
                if access_log {
                    logger::log_response(content.len());
                }
                let content_type =
                    mime::get_content_type(file_path.extension().and_then(|e| e.to_str()));
                http::build_file_response(content, content_type, is_head)
            }
            Err(e) => {
                logger::log_error(&format!(
                    "Failed to read file '{}': {e}",
                    file_path.display()
                ));
                http::build_500_response()
            }
        },
    }
}

/// Resolve a URL path to a file under `root`
///
/// Alias substitution first, then leading slashes are stripped and the
/// remainder is normalized lexically. The containment check runs on the
/// normalized path, so traversal sequences are collapsed before it and a
/// `..` that climbs past the root is rejected whether or not the target
/// exists.
pub fn resolve(root: &Path, url_path: &str) -> Resolution {
    let target = alias_for(url_path).unwrap_or(url_path);
    let relative = target.trim_start_matches('/');

    let Some(clean) = normalize_relative(Path::new(relative)) else {
        return Resolution::Forbidden;
    };

    let full = root.join(&clean);
    if !full.starts_with(root) {
        return Resolution::Forbidden;
    }

    if full.exists() {
        Resolution::File(full)
    } else {
        Resolution::NotFound
    }
}

/// Look up a clean-URL alias
fn alias_for(url_path: &str) -> Option<&'static str> {
    CLEAN_URLS
        .iter()
        .find(|(alias, _)| *alias == url_path)
        .map(|(_, file)| *file)
}

/// Collapse `.` and `..` components without touching the filesystem
///
/// Returns `None` when the path climbs above its starting point or smuggles
/// in an absolute component.
fn normalize_relative(path: &Path) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    return None;
                }
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(out)
}
