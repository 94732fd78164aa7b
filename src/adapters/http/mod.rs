//! HTTP surface.

pub mod api;
pub mod error;

pub use api::{build_router, HttpServer};
pub use error::{ApiError, ErrorResponse};
