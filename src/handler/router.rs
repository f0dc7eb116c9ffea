//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: matches method and path and
//! dispatches to the layer endpoints or static asset serving.

use crate::config::AppState;
use crate::handler::{layers, static_files};
use crate::http;
use crate::logger;
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN, IF_NONE_MATCH, SERVER};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::sync::Arc;

/// Append endpoint
pub const ADD_LAYER_PATH: &str = "/add_layer";
/// Public URL of the store document, fetched by the front end
pub const STORE_DOCUMENT_PATH: &str = "/layer_config.json";

/// `Allow` value for the append endpoint
const ADD_LAYER_METHODS: &str = "POST, OPTIONS";
/// `Allow` value for every read-only path
const READ_METHODS: &str = "GET, HEAD, OPTIONS";

/// Request fields needed by the read-only handlers
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub is_head: bool,
    pub if_none_match: Option<String>,
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let mut response = route_request(req, &state).await;
    decorate(&mut response, &state);
    Ok(response)
}

async fn route_request<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let allow = allowed_methods(&path);

    match method {
        Method::POST if path == ADD_LAYER_PATH => layers::add_layer(req, state).await,
        Method::GET | Method::HEAD if path != ADD_LAYER_PATH => {
            let ctx = RequestContext {
                path: &path,
                is_head: method == Method::HEAD,
                if_none_match: req
                    .headers()
                    .get(IF_NONE_MATCH)
                    .and_then(|v| v.to_str().ok())
                    .map(ToString::to_string),
            };
            match ctx.path {
                "/" => static_files::serve_landing(&ctx, &state.config.site).await,
                STORE_DOCUMENT_PATH => layers::serve_store(state, ctx.is_head).await,
                _ => static_files::serve_asset(&ctx, &state.config.site).await,
            }
        }
        Method::OPTIONS => http::build_options_response(allow, state.config.http.enable_cors),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method} {path}"));
            http::build_405_response(allow)
        }
    }
}

/// Methods accepted on `path`
fn allowed_methods(path: &str) -> &'static str {
    if path == ADD_LAYER_PATH {
        ADD_LAYER_METHODS
    } else {
        READ_METHODS
    }
}

/// Add headers common to every response
fn decorate(response: &mut Response<Full<Bytes>>, state: &AppState) {
    let headers = response.headers_mut();
    match HeaderValue::from_str(&state.config.http.server_name) {
        Ok(value) => {
            headers.insert(SERVER, value);
        }
        Err(e) => logger::log_warning(&format!("Invalid server_name header value: {e}")),
    }
    if state.config.http.enable_cors && !headers.contains_key(ACCESS_CONTROL_ALLOW_ORIGIN) {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    }
}
