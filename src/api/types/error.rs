//! Error responses rendered at the HTTP boundary

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Local;
use serde::Serialize;
use tracing::{error, warn};

use crate::domain::error::{FALLBACK_CODE, FALLBACK_DESCRIPTION};
use crate::domain::DomainError;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Standard error body
#[derive(Debug, Clone, Serialize)]
pub struct ApiErrorResponse {
    pub timestamp: String,
    pub path: String,
    pub error: ApiErrorDetail,
}

/// Error detail structure
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorDetail {
    pub description: String,
    pub internal_code: String,
}

/// API error with status code
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub description: String,
    pub code: i64,
    pub path: String,
}

impl ApiError {
    /// Create a new API error
    pub fn new(status: StatusCode, description: impl Into<String>, code: i64) -> Self {
        let description = description.into();

        Self {
            status,
            description: if description.trim().is_empty() {
                FALLBACK_DESCRIPTION.to_string()
            } else {
                description
            },
            code,
            path: String::new(),
        }
    }

    /// Record the request path the error answers
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Malformed request that never reached validation
    pub fn bad_request(description: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, description, FALLBACK_CODE)
    }

    /// Render the body, stamped with the current local time
    pub fn body(&self) -> ApiErrorResponse {
        ApiErrorResponse {
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            path: self.path.clone(),
            error: ApiErrorDetail {
                description: self.description.clone(),
                internal_code: self.code.to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body())).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        let status = match &err {
            DomainError::BadRequest { .. } | DomainError::InvalidIdentifier { .. } => {
                StatusCode::BAD_REQUEST
            }
            DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
            DomainError::Internal { .. } | DomainError::Storage { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status.is_server_error() {
            error!(error = %err, "Request failed");
        } else {
            warn!(error = %err, "Request rejected");
        }

        Self::new(status, err.description(), err.code())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.status, self.code, self.description)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_status_mapping() {
        let cases = [
            (DomainError::bad_request("Invalid name.", 1001), StatusCode::BAD_REQUEST, 1001),
            (DomainError::invalid_identifier("abc"), StatusCode::BAD_REQUEST, 1004),
            (DomainError::user_not_found(), StatusCode::NOT_FOUND, 2001),
            (DomainError::internal("Internal error", 5010), StatusCode::INTERNAL_SERVER_ERROR, 5010),
            (DomainError::storage("pool timed out"), StatusCode::INTERNAL_SERVER_ERROR, -1),
        ];

        for (domain_err, status, code) in cases {
            let api_err = ApiError::from(domain_err);
            assert_eq!(api_err.status, status);
            assert_eq!(api_err.code, code);
        }
    }

    #[test]
    fn test_storage_details_are_not_exposed() {
        let api_err = ApiError::from(DomainError::storage("password=hunter2"));
        assert_eq!(api_err.description, FALLBACK_DESCRIPTION);
    }

    #[test]
    fn test_error_body_shape() {
        let api_err = ApiError::from(DomainError::user_not_found()).with_path("/users/10");
        let json = serde_json::to_value(api_err.body()).unwrap();

        assert_eq!(json["path"], "/users/10");
        assert_eq!(json["error"]["description"], "The user was not found");
        assert_eq!(json["error"]["internalCode"], "2001");

        let timestamp = json["timestamp"].as_str().unwrap();
        assert!(chrono::NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT).is_ok());
    }

    #[test]
    fn test_blank_description_falls_back() {
        let api_err = ApiError::bad_request("");
        assert_eq!(api_err.description, FALLBACK_DESCRIPTION);
        assert_eq!(api_err.code, FALLBACK_CODE);
    }

    #[test]
    fn test_into_response_status() {
        let response = ApiError::from(DomainError::user_not_found()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
