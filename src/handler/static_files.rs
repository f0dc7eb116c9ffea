//! Static asset serving module
//!
//! Serves the landing page and the front-end files (scripts, data files,
//! images) from the configured static directory.

use crate::config::SiteConfig;
use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime, response};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Built-in page used when the static directory has no index file
const BUILTIN_LANDING_PAGE: &str = include_str!("landing.html");

/// Serve `GET /`
pub async fn serve_landing(ctx: &RequestContext<'_>, site: &SiteConfig) -> Response<Full<Bytes>> {
    let index_path = Path::new(&site.static_dir).join(&site.index_file);
    let html = match fs::read(&index_path).await {
        Ok(content) => Bytes::from(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Bytes::from_static(BUILTIN_LANDING_PAGE.as_bytes())
        }
        Err(e) => {
            logger::log_warning(&format!(
                "Failed to read landing page '{}': {e}, using built-in page",
                index_path.display()
            ));
            Bytes::from_static(BUILTIN_LANDING_PAGE.as_bytes())
        }
    };

    response::build_html_response(html, ctx.is_head)
}

/// Serve any other `GET` path from the static directory
pub async fn serve_asset(ctx: &RequestContext<'_>, site: &SiteConfig) -> Response<Full<Bytes>> {
    let Some(file_path) = resolve_asset(&site.static_dir, ctx.path) else {
        return http::build_404_response();
    };

    let content = match fs::read(&file_path).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {e}",
                file_path.display()
            ));
            return http::build_404_response();
        }
    };

    let etag = cache::generate_etag(&content);
    if cache::check_etag_match(ctx.if_none_match.as_deref(), &etag) {
        return http::build_304_response(&etag);
    }

    response::build_cached_response(
        Bytes::from(content),
        mime::content_type_for(&file_path),
        &etag,
        ctx.is_head,
    )
}

/// Map a request path onto a regular file inside `static_dir`
///
/// Returns `None` for missing files, directories and anything that resolves
/// outside the static directory.
fn resolve_asset(static_dir: &str, path: &str) -> Option<PathBuf> {
    let relative = path.trim_start_matches('/');
    if relative.is_empty() {
        return None;
    }

    let root = match static_root(static_dir) {
        Ok(root) => root?,
        Err(e) => {
            logger::log_warning(&format!(
                "Static directory inaccessible '{static_dir}': {e}"
            ));
            return None;
        }
    };

    // Missing files are ordinary 404s, not worth a log line
    let candidate = root.join(relative).canonicalize().ok()?;
    if !candidate.starts_with(&root) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            path,
            candidate.display()
        ));
        return None;
    }

    candidate.is_file().then_some(candidate)
}

/// Canonical static directory, or `None` when it does not exist
///
/// A missing directory is the default setup and is reported once at startup.
fn static_root(static_dir: &str) -> std::io::Result<Option<PathBuf>> {
    match Path::new(static_dir).canonicalize() {
        Ok(root) => Ok(Some(root)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}
