//! JSON extractor that answers rejections with the standard error body

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json as AxumJson,
};
use serde::de::DeserializeOwned;

use super::error::ApiError;

/// Wrapper around `axum::Json`
///
/// Unreadable bodies are rendered as a 400 [`ApiError`] (415 when the content
/// type is wrong), so clients always receive the same error shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    /// Consume the extractor and return the inner value
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<S, T> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let path = req.uri().path().to_string();

        AxumJson::<T>::from_request(req, state)
            .await
            .map(|AxumJson(value)| Json(value))
            .map_err(|rejection| {
                tracing::debug!(path = %path, error = %rejection.body_text(), "Rejected JSON body");

                let (status, description) = describe(&rejection);
                let mut err = ApiError::bad_request(description).with_path(path);
                err.status = status;
                err
            })
    }
}

/// Status and client-facing text for an unreadable body
///
/// Only a wrong content type keeps its own status; everything else is a 400.
fn describe(rejection: &JsonRejection) -> (StatusCode, String) {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Expected request with `Content-Type: application/json`".to_string(),
        ),
        JsonRejection::JsonSyntaxError(e) => (
            StatusCode::BAD_REQUEST,
            format!("Malformed JSON body: {}", e.body_text()),
        ),
        JsonRejection::JsonDataError(e) => (
            StatusCode::BAD_REQUEST,
            format!("Unexpected JSON field type: {}", e.body_text()),
        ),
        other => (StatusCode::BAD_REQUEST, other.body_text()),
    }
}

impl<T> IntoResponse for Json<T>
where
    T: serde::Serialize,
{
    fn into_response(self) -> Response {
        AxumJson(self.0).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::header;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Named {
        name: String,
    }

    fn json_request(body: &'static str) -> Request {
        Request::builder()
            .uri("/users")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_extracts_valid_body() {
        let Json(named) = Json::<Named>::from_request(json_request(r#"{"name":"Ana"}"#), &())
            .await
            .unwrap();
        assert_eq!(named.name, "Ana");
    }

    #[tokio::test]
    async fn test_syntax_error_keeps_path() {
        let err = Json::<Named>::from_request(json_request("{"), &())
            .await
            .unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.path, "/users");
        assert_eq!(err.code, -1);
        assert!(err.description.starts_with("Malformed JSON body"));
    }

    #[tokio::test]
    async fn test_data_error_is_bad_request() {
        let err = Json::<Named>::from_request(json_request(r#"{"name":5}"#), &())
            .await
            .unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.description.starts_with("Unexpected JSON field type"));
    }

    #[tokio::test]
    async fn test_missing_content_type() {
        let request = Request::builder()
            .uri("/users")
            .body(Body::from(r#"{"name":"Ana"}"#))
            .unwrap();

        let err = Json::<Named>::from_request(request, &()).await.unwrap_err();
        assert_eq!(err.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[test]
    fn test_json_into_inner() {
        assert_eq!(Json(42).into_inner(), 42);
    }
}
