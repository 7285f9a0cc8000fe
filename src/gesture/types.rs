//! Gesture record types shared by the index, the backup artifact and the API

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

/// Opaque record identifier
///
/// Freshly inserted records get a UUID v4 string. Records replayed from a
/// backup keep whatever string they were saved with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GestureId(pub String);

impl GestureId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GestureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GestureId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One labeled motion signature
#[derive(Debug, Clone, PartialEq)]
pub struct GestureRecord {
    pub id: GestureId,
    pub vector: Vec<f32>,
    pub label: String,
}

impl GestureRecord {
    pub fn new(label: impl Into<String>, vector: Vec<f32>) -> Self {
        Self {
            id: GestureId::generate(),
            vector,
            label: label.into(),
        }
    }
}

/// A ranked search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub label: String,
    /// Cosine similarity in [-1, 1]; 1.0 is an identical direction
    pub score: f32,
}

/// Outcome of recognizing an unlabeled gesture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Best label, or `Unknown` when nothing cleared the threshold
    pub label: String,
    pub confidence: f32,
    /// Top matches inspected, best first
    pub matches: Vec<SearchHit>,
}

impl Prediction {
    pub fn is_known(&self) -> bool {
        self.label != crate::constants::UNKNOWN_LABEL
    }
}

/// How the store came up
///
/// Each variant is one exit of the startup check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupOutcome {
    /// A live index with the configured size was reused as-is
    Reused { records: usize },
    /// A live index had a different size; it and the backup were discarded
    DimensionReset { previous: usize, current: usize },
    /// No live index existed; a fresh one was filled from the backup
    Replayed { restored: usize, skipped: usize },
}

/// Store summary for health reporting
#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub records: usize,
    pub labels: usize,
    pub vector_size: usize,
    pub collection: String,
    pub backup_path: PathBuf,
    pub backup_present: bool,
}
