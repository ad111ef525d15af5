//! Liveness, readiness and version probes

use std::time::{Duration, Instant};

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use crate::api::types::Json;
use crate::domain::DomainError;

use super::state::AppState;

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

impl HealthStatus {
    fn status_code(self) -> StatusCode {
        match self {
            Self::Healthy => StatusCode::OK,
            Self::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Probe body; `checks` only appears on readiness
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<ComponentCheck>,
}

/// Outcome of probing one dependency
#[derive(Debug, Serialize)]
pub struct ComponentCheck {
    pub name: &'static str,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub latency_ms: u64,
}

impl ComponentCheck {
    fn from_probe<T>(name: &'static str, elapsed: Duration, probe: Result<T, DomainError>) -> Self {
        let (status, message) = match probe {
            Ok(_) => (HealthStatus::Healthy, None),
            Err(e) => {
                tracing::warn!(component = name, error = %e, "Readiness probe failed");
                (HealthStatus::Unhealthy, Some(e.description().to_string()))
            }
        };

        Self {
            name,
            status,
            message,
            latency_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: HealthStatus::Healthy,
        version: env!("CARGO_PKG_VERSION"),
        checks: Vec::new(),
    })
}

/// GET /ready: 503 until the user store answers
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let store = probe_user_store(&state).await;
    let status = store.status;

    let body = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        checks: vec![store],
    };

    (status.status_code(), Json(body))
}

/// GET /live
pub async fn live_check() -> StatusCode {
    StatusCode::OK
}

async fn probe_user_store(state: &AppState) -> ComponentCheck {
    let start = Instant::now();
    let probe = state.user_service.count().await;

    ComponentCheck::from_probe("user_store", start.elapsed(), probe)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::MockUserRepository;

    fn failing_state() -> AppState {
        let mut repository = MockUserRepository::new();
        repository
            .expect_count()
            .returning(|| Err(DomainError::storage("connection refused")));

        AppState::with_repository(repository)
    }

    #[test]
    fn test_health_body_omits_checks() {
        let body = HealthResponse {
            status: HealthStatus::Healthy,
            version: "1.0.0",
            checks: Vec::new(),
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({"status": "healthy", "version": "1.0.0"}));
    }

    #[tokio::test]
    async fn test_store_probe_healthy() {
        let check = probe_user_store(&AppState::in_memory()).await;

        assert_eq!(check.name, "user_store");
        assert_eq!(check.status, HealthStatus::Healthy);
        assert!(check.message.is_none());
    }

    #[tokio::test]
    async fn test_store_probe_unhealthy() {
        let check = probe_user_store(&failing_state()).await;

        assert_eq!(check.status, HealthStatus::Unhealthy);
        let message = check.message.unwrap();
        assert!(!message.contains("connection refused"));
        assert_eq!(message, crate::domain::error::FALLBACK_DESCRIPTION);
    }

    #[tokio::test]
    async fn test_ready_unavailable_when_store_fails() {
        let response = ready_check(State(failing_state())).await.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
