//! Health Routes
//!
//! Health check endpoints for monitoring and Kubernetes probes.
//!
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health/ready - Readiness probe (ready to serve traffic)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use std::path::Path;
use std::sync::Arc;

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;
use crate::clipboard::RequestContext;
use crate::storage::Room;

/// GET /health/live
///
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// Returns 200 if the entry store and the shelf are reachable.
pub async fn readiness(State(state): State<Arc<AppState>>) -> StatusCode {
    if check_storage_health(&state).await && check_shelf_health(&state).await {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /health
///
/// Full health status with component details.
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let storage_ok = check_storage_health(&state).await;
    let shelf_ok = check_shelf_health(&state).await;

    let status_of = |ok: bool| if ok { "ok" } else { "error" }.to_string();

    let overall_status = if storage_ok && shelf_ok {
        "healthy"
    } else if storage_ok || shelf_ok {
        "degraded"
    } else {
        "unhealthy"
    };

    Json(HealthResponse {
        status: overall_status.to_string(),
        storage: status_of(storage_ok),
        shelf: status_of(shelf_ok),
        uptime_seconds: state.uptime_seconds(),
        ws_connections: state.ws_connection_count().await,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// The default room loads without an I/O error
async fn check_storage_health(state: &AppState) -> bool {
    let ctx = RequestContext::new(Room::Default);
    match state.clipboard.entries(&ctx).await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Entry store health check failed");
            false
        }
    }
}

/// The shelf directory exists and is a directory
async fn check_shelf_health(state: &AppState) -> bool {
    is_dir(state.shelf.dir()).await
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_liveness() {
        let status = liveness().await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_is_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(is_dir(dir.path()).await);
        assert!(!is_dir(&dir.path().join("missing")).await);
    }
}
