//! Health and Infrastructure Handlers
//!
//! Kubernetes probes, metrics, and store health.

use axum::{extract::State, http::StatusCode, response::Json};

use super::router::AppState;
use super::utils::with_store;
use crate::errors::AppError;
use crate::gesture::StoreStats;
use crate::metrics;

/// Health response for main health endpoint
#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    #[serde(flatten)]
    pub store: StoreStats,
}

/// Main health check endpoint
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, AppError> {
    let store = with_store(&state, |store| Ok(store.stats())).await?;
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store,
    }))
}

/// Liveness probe - the process is up and serving
pub async fn health_live() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "alive",
            "timestamp": chrono::Utc::now().to_rfc3339()
        })),
    )
}

/// Readiness probe
///
/// The store finishes its startup check before the listener binds, so a
/// reachable server is a ready one.
pub async fn health_ready(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let records = with_store(&state, |store| Ok(store.len())).await?;
    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ready",
            "version": env!("CARGO_PKG_VERSION"),
            "records": records,
            "timestamp": chrono::Utc::now().to_rfc3339()
        })),
    ))
}

/// Prometheus metrics endpoint
pub async fn metrics_endpoint(State(state): State<AppState>) -> Result<String, StatusCode> {
    let records = with_store(&state, |store| Ok(store.len()))
        .await
        .map_err(|e| {
            tracing::error!("Failed to read index size: {e}");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
    metrics::INDEX_SIZE.set(records as i64);

    metrics::gather_text().map_err(|e| {
        tracing::error!("Failed to encode metrics: {e}");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

#[cfg(test)]
mod tests {
    use super::super::test_helpers::*;
    use axum::http::StatusCode;
    use std::sync::mpsc;
    use std::time::{Duration, Instant};

    #[tokio::test]
    async fn test_health_reports_store() {
        let h = TestHarness::new(3);
        h.store.insert("Wave", vec![0.1, 0.2, 0.3]).unwrap();

        let (status, body) = send(h.router(), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["records"], 1);
        assert_eq!(body["vector_size"], 3);
        assert_eq!(body["backup_present"], true);
    }

    #[tokio::test]
    async fn test_probes() {
        let h = TestHarness::new(3);
        let (status, body) = send(h.router(), get("/health/live")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "alive");

        let (status, body) = send(h.router(), get("/health/ready")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["records"], 0);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_health_waits_off_the_runtime() {
        let h = TestHarness::new(3);
        let index = h
            .store
            .catalog()
            .get(&h.store.config().collection)
            .unwrap();

        let (locked_tx, locked_rx) = mpsc::channel();
        let writer = std::thread::spawn(move || {
            let _guard = index.write();
            locked_tx.send(()).unwrap();
            std::thread::sleep(Duration::from_millis(400));
        });
        locked_rx.recv().unwrap();

        let health = tokio::spawn(send(h.router(), get("/health")));
        let ready = tokio::spawn(send(h.router(), get("/health/ready")));

        let started = Instant::now();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(started.elapsed() < Duration::from_millis(300));

        assert_eq!(health.await.unwrap().0, StatusCode::OK);
        assert_eq!(ready.await.unwrap().0, StatusCode::OK);
        writer.join().unwrap();
    }
}
