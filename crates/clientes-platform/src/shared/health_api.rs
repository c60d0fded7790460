//! Health Check Endpoints
//!
//! - /health - Combined health status
//! - /health/live - Liveness check
//! - /health/ready - Readiness check

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use utoipa::ToSchema;

/// Health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    Up,
    Down,
}

/// Individual health check result
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

/// Full health response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Seconds since the server state was created
    pub uptime_seconds: i64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<HealthCheck>,
}

/// Simple health status response
#[derive(Debug, Serialize, ToSchema)]
pub struct SimpleHealthResponse {
    pub status: HealthStatus,
}

/// Ping the MongoDB deployment backing the clientes collection
async fn check_mongo(db: &mongodb::Database) -> HealthCheck {
    let start = std::time::Instant::now();

    let (status, message) = match db.run_command(mongodb::bson::doc! { "ping": 1 }).await {
        Ok(_) => (HealthStatus::Up, None),
        Err(e) => (HealthStatus::Down, Some(format!("Connection failed: {}", e))),
    };

    HealthCheck {
        name: "mongodb".to_string(),
        status,
        message,
        duration_ms: Some(start.elapsed().as_millis() as u64),
    }
}

/// Health service state
#[derive(Clone)]
pub struct HealthState {
    /// Present only when the MongoDB backend is in use
    pub db: Option<mongodb::Database>,
    pub version: Option<String>,
    pub started_at: DateTime<Utc>,
    ready: Arc<AtomicBool>,
}

impl HealthState {
    pub fn new(db: Option<mongodb::Database>, version: Option<String>) -> Self {
        Self {
            db,
            version,
            started_at: Utc::now(),
            ready: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Mark the service as ready
    pub fn set_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds().max(0)
    }

    async fn run_checks(&self) -> Vec<HealthCheck> {
        match &self.db {
            Some(db) => vec![check_mongo(db).await],
            None => Vec::new(),
        }
    }
}

fn status_code_for(status: HealthStatus) -> StatusCode {
    match status {
        HealthStatus::Up => StatusCode::OK,
        HealthStatus::Down => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Combined health check
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is unhealthy", body = HealthResponse)
    )
)]
pub async fn get_health(State(state): State<HealthState>) -> Response {
    let checks = state.run_checks().await;

    let status = if checks.iter().any(|c| c.status == HealthStatus::Down) {
        HealthStatus::Down
    } else {
        HealthStatus::Up
    };

    let response = HealthResponse {
        status,
        timestamp: Utc::now(),
        version: state.version.clone(),
        uptime_seconds: state.uptime_seconds(),
        checks,
    };

    (status_code_for(status), Json(response)).into_response()
}

/// Liveness check
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "health",
    responses(
        (status = 200, description = "Service is alive", body = SimpleHealthResponse)
    )
)]
pub async fn get_liveness() -> Json<SimpleHealthResponse> {
    Json(SimpleHealthResponse {
        status: HealthStatus::Up,
    })
}

/// Readiness check
///
/// Returns 503 until startup completed or while the store is unreachable.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "health",
    responses(
        (status = 200, description = "Service is ready", body = SimpleHealthResponse),
        (status = 503, description = "Service is not ready", body = SimpleHealthResponse)
    )
)]
pub async fn get_readiness(State(state): State<HealthState>) -> Response {
    let status = if !state.is_ready() {
        HealthStatus::Down
    } else if state.run_checks().await.iter().all(|c| c.status == HealthStatus::Up) {
        HealthStatus::Up
    } else {
        HealthStatus::Down
    };

    (status_code_for(status), Json(SimpleHealthResponse { status })).into_response()
}

/// Create the health router
pub fn health_router(state: HealthState) -> Router {
    Router::new()
        .route("/health", get(get_health))
        .route("/health/live", get(get_liveness))
        .route("/health/ready", get(get_readiness))
        .with_state(state)
}
