use crate::config::Config;
use hyper::{Method, Uri, Version};
use std::net::SocketAddr;

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    println!("======================================");
    println!("Turnout gateway started successfully");
    println!("Listening on: http://{addr}");
    println!("Serving static files from: {}", config.assets.root);
    if let Some(workers) = config.server.workers {
        println!("Worker threads: {workers}");
    }
    println!("Pages (clean URLs):");
    for (alias, file) in crate::handler::static_files::CLEAN_URLS {
        println!("  - http://{addr}{alias} ({file})");
    }
    println!("API endpoints:");
    for route in crate::gateway::ROUTES {
        println!("  - http://{addr}{route}");
    }
    println!("======================================\n");
}

pub fn log_clickhouse_config(config: &Config) {
    let ch = &config.clickhouse;
    println!("ClickHouse configuration:");
    println!("  Endpoint: {}", ch.endpoint().as_deref().unwrap_or("NOT SET"));
    println!("  Username: {}", ch.username());
    println!(
        "  Password: {}",
        if ch.password.is_some() { "***SET***" } else { "NOT SET" }
    );
    println!("  Database: {}", ch.database);
    if let Some(proxy) = &ch.proxy_url {
        println!("  Proxy: {proxy}");
    }
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    println!("[Connection] Accepted from: {peer_addr}");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    eprintln!("[Error] Failed to serve connection: {err:?}");
}

pub fn log_request(method: &Method, uri: &Uri, version: Version) {
    println!("[Request] {method} {uri} {version:?}");
}

pub fn log_headers_count(count: usize, show: bool) {
    if show {
        println!("[Headers] Count: {count}");
    }
}

pub fn log_response(size: usize) {
    println!("[Response] Sent 200 OK ({size} bytes)\n");
}

pub fn log_api_request(method: &str, path: &str, status: u16) {
    println!("[API] {method} {path} - {status}");
}

pub fn log_warning(message: &str) {
    eprintln!("[WARN] {message}");
}

pub fn log_error(message: &str) {
    eprintln!("[ERROR] {message}");
}
