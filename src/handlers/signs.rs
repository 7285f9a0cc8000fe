//! Gesture Handlers
//!
//! Save, predict, search, list, delete and reset. Store calls do disk I/O
//! (every mutation rewrites the backup), so they run on the blocking pool.

use axum::{
    extract::{Path, State},
    response::Json,
};

use super::router::AppState;
use super::types::{
    DeleteSignRequest, DeleteSignResponse, PredictRequest, PredictResponse, RootResponse,
    SaveSignRequest, SaveSignResponse, SearchRequest, SearchResponse, SignsResponse,
    StatusResponse,
};
use super::utils::with_store;
use crate::errors::{AppError, ValidationErrorExt};
use crate::validation;

/// GET / - liveness banner kept for the recording client
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Sign-Bridge API is running".to_string(),
    })
}

/// POST /save_sign - store a labeled gesture
#[tracing::instrument(skip(state, req), fields(label = %req.label, len = req.landmarks.len()))]
pub async fn save_sign(
    State(state): State<AppState>,
    Json(req): Json<SaveSignRequest>,
) -> Result<Json<SaveSignResponse>, AppError> {
    let SaveSignRequest { label, landmarks } = req;
    let stored_label = label.clone();

    let id = with_store(&state, move |store| store.insert(&label, landmarks)).await?;

    Ok(Json(SaveSignResponse {
        status: "success".to_string(),
        id: id.to_string(),
        label: stored_label,
    }))
}

/// POST /predict_sign - recognize a gesture
#[tracing::instrument(skip(state, req), fields(len = req.landmarks.len()))]
pub async fn predict_sign(
    State(state): State<AppState>,
    Json(req): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, AppError> {
    let prediction = with_store(&state, move |store| store.predict(&req.landmarks)).await?;
    tracing::debug!(
        label = %prediction.label,
        confidence = prediction.confidence,
        "Prediction"
    );
    Ok(Json(prediction.into()))
}

/// POST /search - ranked matches for diagnostics
pub async fn search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, AppError> {
    let k = req.k.unwrap_or(state.config().search_depth);
    validation::validate_search_depth(k).map_validation_err("k")?;

    let matches = with_store(&state, move |store| store.search(&req.landmarks, k)).await?;
    Ok(Json(SearchResponse { k, matches }))
}

/// GET /signs - distinct labels, sorted
pub async fn list_signs(State(state): State<AppState>) -> Result<Json<SignsResponse>, AppError> {
    let labels = with_store(&state, |store| Ok(store.list_labels())).await?;
    Ok(Json(SignsResponse {
        signs: labels.into_iter().collect(),
    }))
}

/// POST /delete_sign - remove every record with a label
pub async fn delete_sign(
    State(state): State<AppState>,
    Json(req): Json<DeleteSignRequest>,
) -> Result<Json<DeleteSignResponse>, AppError> {
    remove_label(state, req.label).await
}

/// DELETE /signs/{label}
pub async fn delete_sign_by_path(
    State(state): State<AppState>,
    Path(label): Path<String>,
) -> Result<Json<DeleteSignResponse>, AppError> {
    remove_label(state, label).await
}

async fn remove_label(state: AppState, label: String) -> Result<Json<DeleteSignResponse>, AppError> {
    let target = label.clone();
    let removed = with_store(&state, move |store| Ok(store.delete_by_label(&target))).await?;

    Ok(Json(DeleteSignResponse {
        status: "success".to_string(),
        message: format!("Deleted {label}"),
        removed,
    }))
}

/// POST /reset_memory - drop every gesture and the backup file
pub async fn reset_memory(State(state): State<AppState>) -> Result<Json<StatusResponse>, AppError> {
    with_store(&state, |store| store.reset_all()).await?;
    Ok(Json(StatusResponse::success("Memory cleared.")))
}
