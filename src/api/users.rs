//! User record endpoints

use axum::{
    extract::{FromRequestParts, OriginalUri, Path, State},
    http::{header, request::Parts, StatusCode, Uri},
    response::IntoResponse,
    routing::get,
    Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, Query};
use crate::domain::{DomainError, User, UserId};
use crate::infrastructure::user::SaveUserRequest;

/// Body accepted by create and full update
///
/// A JSON `null` deserializes the same as an omitted field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveUserApiRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub surname: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
}

impl From<SaveUserApiRequest> for SaveUserRequest {
    fn from(request: SaveUserApiRequest) -> Self {
        Self {
            name: request.name,
            surname: request.surname,
            birth_date: request.birth_date,
        }
    }
}

/// Query parameters accepted by the field-level update
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFieldsQuery {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub birth_date: Option<String>,
}

/// User representation returned to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub name: String,
    pub surname: String,
    pub birth_date: Option<NaiveDate>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            name: user.name().to_string(),
            surname: user.surname().to_string(),
            birth_date: user.birth_date(),
        }
    }
}

/// Path id, stripped of non-digits before parsing
#[derive(Debug, Clone, Copy)]
pub struct UserIdPath(pub UserId);

impl<S> FromRequestParts<S> for UserIdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let path = parts.uri.path().to_string();

        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()).with_path(&path))?;

        UserId::sanitize(&raw)
            .map(UserIdPath)
            .map_err(|e| ApiError::from(e).with_path(path))
    }
}

/// Attach the request path to a service failure
fn at(uri: &Uri) -> impl Fn(DomainError) -> ApiError + '_ {
    move |err| ApiError::from(err).with_path(uri.path())
}

/// Create the users router
pub fn create_users_router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{user_id}",
            get(get_user)
                .put(alter_user)
                .patch(alter_user_fields)
                .delete(delete_user),
        )
}

/// POST /users
pub async fn create_user(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Json(request): Json<SaveUserApiRequest>,
) -> Result<impl IntoResponse, ApiError> {
    debug!(name = ?request.name, surname = ?request.surname, "Creating user");

    let user = state
        .user_service
        .create(request.into())
        .await
        .map_err(at(&uri))?;

    let location = format!("/users/{}", user.id());

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(UserResponse::from(&user)),
    ))
}

/// GET /users
pub async fn list_users(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    debug!("Listing users");

    let users = state.user_service.find_all().await.map_err(at(&uri))?;

    Ok(Json(users.iter().map(UserResponse::from).collect()))
}

/// GET /users/{user_id}
pub async fn get_user(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    UserIdPath(user_id): UserIdPath,
) -> Result<Json<UserResponse>, ApiError> {
    debug!(user_id = %user_id, "Getting user");

    let user = state
        .user_service
        .find_one_by_id(user_id)
        .await
        .map_err(at(&uri))?;

    Ok(Json(UserResponse::from(&user)))
}

/// PUT /users/{user_id}
pub async fn alter_user(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    UserIdPath(user_id): UserIdPath,
    Json(request): Json<SaveUserApiRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    debug!(user_id = %user_id, "Updating user");

    let user = state
        .user_service
        .alter_by_id(user_id, request.into())
        .await
        .map_err(at(&uri))?;

    Ok(Json(UserResponse::from(&user)))
}

/// PATCH /users/{user_id}?name=&surname=&birthDate=
pub async fn alter_user_fields(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    UserIdPath(user_id): UserIdPath,
    Query(fields): Query<UserFieldsQuery>,
) -> Result<Json<UserResponse>, ApiError> {
    debug!(user_id = %user_id, "Patching user fields");

    let user = state
        .user_service
        .alter_fields_by_id(user_id, fields.name, fields.surname, fields.birth_date)
        .await
        .map_err(at(&uri))?;

    Ok(Json(UserResponse::from(&user)))
}

/// DELETE /users/{user_id}
pub async fn delete_user(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    UserIdPath(user_id): UserIdPath,
) -> Result<StatusCode, ApiError> {
    debug!(user_id = %user_id, "Deleting user");

    state
        .user_service
        .delete_by_id(user_id)
        .await
        .map_err(at(&uri))?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_response_shape() {
        let user = User::new(
            UserId::new(3),
            "Ana".to_string(),
            "Souza".to_string(),
            NaiveDate::from_ymd_opt(1990, 5, 17),
        );

        let json = serde_json::to_value(UserResponse::from(&user)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "Ana", "surname": "Souza", "birthDate": "1990-05-17"})
        );
    }

    #[test]
    fn test_user_response_without_birth_date() {
        let user = User::new(UserId::new(3), "Ana".to_string(), "Souza".to_string(), None);

        let json = serde_json::to_value(UserResponse::from(&user)).unwrap();
        assert!(json["birthDate"].is_null());
    }

    #[test]
    fn test_null_fields_read_as_absent() {
        let request: SaveUserApiRequest =
            serde_json::from_str(r#"{"surname": "Lima", "name": null}"#).unwrap();

        assert!(request.name.is_none());
        assert!(request.birth_date.is_none());
        assert_eq!(request.surname.as_deref(), Some("Lima"));
    }

    #[test]
    fn test_request_conversion_keeps_raw_values() {
        let request = SaveUserApiRequest {
            name: Some(" ".to_string()),
            surname: None,
            birth_date: Some("2023-13-40".to_string()),
        };

        let converted = SaveUserRequest::from(request);
        assert_eq!(converted.name.as_deref(), Some(" "));
        assert_eq!(converted.birth_date.as_deref(), Some("2023-13-40"));
    }
}
