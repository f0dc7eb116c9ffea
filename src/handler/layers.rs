//! Layer endpoints
//!
//! `POST /add_layer` appends the request body to the store,
//! `GET /layer_config.json` returns the stored document.

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::{Request, Response, StatusCode};
use serde::Serialize;
use serde_json::Value;

use crate::config::AppState;
use crate::http;
use crate::logger;

/// Message returned after a successful append
pub const ADDED_MESSAGE: &str = "Layer added successfully!";

#[derive(Serialize)]
struct AddLayerReply {
    message: &'static str,
}

/// Append the JSON request body to the layer store
///
/// Any store fault becomes `{"error": <description>}` with status 500.
pub async fn add_layer<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let max_body_size = state.config.http.max_body_size;
    let layer = match read_json_body(req, max_body_size).await {
        Ok(layer) => layer,
        Err(resp) => return resp,
    };

    match state.store.append(layer).await {
        Ok(count) => {
            logger::log_layer_appended(count);
            http::build_json_response(
                StatusCode::OK,
                &AddLayerReply {
                    message: ADDED_MESSAGE,
                },
            )
        }
        Err(e) => {
            logger::log_store_failure("append", &e);
            http::build_error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

/// Return the stored document as served by the front end
pub async fn serve_store(state: &AppState, is_head: bool) -> Response<Full<Bytes>> {
    match state.store.load().await {
        Ok(document) => http::build_document_response(&document, is_head),
        Err(e) => {
            logger::log_store_failure("load", &e);
            http::build_error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

/// Collect the body (bounded by `max_body_size`) and decode it as JSON
async fn read_json_body<B>(req: Request<B>, max_body_size: u64) -> Result<Value, Response<Full<Bytes>>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    let bytes = match Limited::new(req.into_body(), limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            logger::log_warning(&format!(
                "Request body too large (max: {max_body_size} bytes)"
            ));
            return Err(http::build_413_response(max_body_size));
        }
        Err(e) => {
            logger::log_error(&format!("Failed to read request body: {e}"));
            return Err(http::build_error_response(
                StatusCode::BAD_REQUEST,
                "Failed to read request body",
            ));
        }
    };

    serde_json::from_slice(&bytes).map_err(|e| {
        logger::log_warning(&format!("Rejected non-JSON layer body: {e}"));
        http::build_error_response(
            StatusCode::BAD_REQUEST,
            &format!("Request body is not valid JSON: {e}"),
        )
    })
}
