//! HTTP protocol layer module
//!
//! Response builders, cache validation and MIME detection, independent of the
//! layer store.

pub mod cache;
pub mod mime;
pub mod response;

// Re-export commonly used builders
pub use response::{
    build_304_response, build_404_response, build_405_response, build_413_response,
    build_document_response, build_error_response, build_json_response, build_options_response,
};
