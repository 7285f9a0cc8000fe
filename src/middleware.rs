//! HTTP request tracking middleware for observability

use axum::{extract::Request, http::StatusCode, middleware::Next, response::Response};
use std::time::Instant;

/// Middleware to track HTTP request latency and counts
pub async fn track_metrics(req: Request, next: Next) -> Result<Response, StatusCode> {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();
    let endpoint = normalize_path(&path);

    crate::metrics::HTTP_REQUEST_DURATION
        .with_label_values(&[method.as_str(), endpoint, status.as_str()])
        .observe(duration);

    crate::metrics::HTTP_REQUESTS_TOTAL
        .with_label_values(&[method.as_str(), endpoint, status.as_str()])
        .inc();

    Ok(response)
}

/// Map a request path onto its route template
///
/// Gesture labels appear in paths (`/signs/{label}`) and must never become
/// metric label values. Anything that is not a known route collapses into
/// one bucket.
fn normalize_path(path: &str) -> &'static str {
    let trimmed = path.trim_end_matches('/');
    match trimmed {
        "" => "/",
        "/save_sign" => "/save_sign",
        "/predict_sign" => "/predict_sign",
        "/reset_memory" => "/reset_memory",
        "/delete_sign" => "/delete_sign",
        "/search" => "/search",
        "/signs" => "/signs",
        "/health" => "/health",
        "/health/live" => "/health/live",
        "/health/ready" => "/health/ready",
        "/metrics" => "/metrics",
        other if is_label_path(other) => "/signs/{label}",
        _ => "/{unmatched}",
    }
}

fn is_label_path(path: &str) -> bool {
    path.strip_prefix("/signs/")
        .is_some_and(|rest| !rest.is_empty() && !rest.contains('/'))
}
