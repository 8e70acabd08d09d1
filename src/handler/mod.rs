//! Request handler module
//!
//! Responsible for request routing dispatch: CORS preflight, the query
//! gateway, and static file serving as the fallthrough.

pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
