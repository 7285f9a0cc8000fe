//! Request and response bodies
//!
//! Field names follow the recording client's JSON: `landmarks` is the
//! flattened motion signature, `label` the gesture name.

use serde::{Deserialize, Serialize};

use crate::gesture::{Prediction, SearchHit};

/// POST /save_sign
#[derive(Debug, Deserialize, Serialize)]
pub struct SaveSignRequest {
    pub label: String,
    pub landmarks: Vec<f32>,
}

/// POST /predict_sign
#[derive(Debug, Deserialize, Serialize)]
pub struct PredictRequest {
    pub landmarks: Vec<f32>,
}

/// POST /delete_sign
#[derive(Debug, Deserialize, Serialize)]
pub struct DeleteSignRequest {
    pub label: String,
}

/// POST /search
#[derive(Debug, Deserialize, Serialize)]
pub struct SearchRequest {
    pub landmarks: Vec<f32>,
    /// Defaults to the configured search depth
    #[serde(default)]
    pub k: Option<usize>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct RootResponse {
    pub message: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SaveSignResponse {
    pub status: String,
    pub id: String,
    pub label: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PredictResponse {
    pub label: String,
    pub confidence: f32,
    pub matches: Vec<SearchHit>,
}

impl From<Prediction> for PredictResponse {
    fn from(prediction: Prediction) -> Self {
        Self {
            label: prediction.label,
            confidence: prediction.confidence,
            matches: prediction.matches,
        }
    }
}

/// Generic `{"status", "message"}` acknowledgement
#[derive(Debug, Deserialize, Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
}

impl StatusResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct DeleteSignResponse {
    pub status: String,
    pub message: String,
    pub removed: usize,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SignsResponse {
    pub signs: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SearchResponse {
    pub k: usize,
    pub matches: Vec<SearchHit>,
}
