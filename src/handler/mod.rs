//! Request handler module
//!
//! Routing, the layer endpoints and static asset serving.

mod layers;
pub mod router;
mod static_files;

// Re-export main entry point
pub use router::handle_request;
