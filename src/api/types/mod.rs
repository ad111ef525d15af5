//! Shared HTTP types: error bodies and extractors

pub mod error;
pub mod json;
pub mod query;

pub use error::{ApiError, ApiErrorDetail, ApiErrorResponse};
pub use json::Json;
pub use query::Query;
