//! Logger module
//!
//! Provides logging utilities for the layer service including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Layer store events
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::Config;
use std::net::SocketAddr;
use std::path::Path;
use writer::Level;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
        Level::parse(&config.logging.level),
    )
}

/// Write to info log
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_info(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(level: Level, message: &str) {
    match writer::get() {
        Some(w) => w.write_error(level, message),
        None => eprintln!("{message}"),
    }
}

/// Write to access log specifically
fn write_access(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info("======================================");
    write_info("Layer service started successfully");
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("  - GET  http://{addr}/           (landing page)"));
    write_info(&format!("  - POST http://{addr}/add_layer  (append a layer)"));
    write_info(&format!("Layer store: {}", config.store.path));
    write_info(&format!("Static assets: {}", config.site.static_dir));
    if !Path::new(&config.site.static_dir).is_dir() {
        log_warning(&format!(
            "Static directory '{}' not found; serving the built-in landing page only",
            config.site.static_dir
        ));
    }
    write_info(&format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================\n");
}

pub fn log_store_ready(path: &Path, created: bool) {
    if created {
        write_info(&format!(
            "[Store] Created {} with an empty layer list",
            path.display()
        ));
    } else {
        write_info(&format!("[Store] Using existing {}", path.display()));
    }
}

pub fn log_layer_appended(count: usize) {
    write_info(&format!("[Store] Layer added, {count} layer(s) stored"));
}

pub fn log_store_failure(operation: &str, err: &crate::store::StoreError) {
    log_error(&format!("[Store] {operation} failed: {err}"));
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    write_info(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(
        Level::Error,
        &format!("[ERROR] Failed to serve connection: {err:?}"),
    );
}

pub fn log_error(message: &str) {
    write_error(Level::Error, &format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(Level::Warn, &format!("[WARN] {message}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}

pub fn log_shutdown(active_connections: usize) {
    write_info(&format!(
        "\n[Shutdown] Listener closed, {active_connections} connection(s) still active"
    ));
}
