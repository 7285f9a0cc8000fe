//! Backup artifact: a JSON mirror of the similarity index
//!
//! The artifact is one JSON array rewritten in full after every mutation:
//!
//! ```json
//! [{"id": "6f1c…", "vector": [0.1, …], "payload": {"label": "Wave"}}]
//! ```
//!
//! Writes go to a temporary sibling file which is fsynced and renamed over
//! the target, so a crash leaves either the previous artifact or the new one,
//! never a truncated file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::constants::BACKUP_TEMP_SUFFIX;
use crate::errors::AppError;
use crate::gesture::types::{GestureId, GestureRecord};

/// Identifier as found in an artifact
///
/// Older artifacts may carry numeric point ids; both forms are accepted and
/// normalized to strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Text(String),
    Number(u64),
}

impl From<RawId> for GestureId {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => GestureId(s),
            RawId::Number(n) => GestureId(n.to_string()),
        }
    }
}

/// Per-record payload; only the label is meaningful
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackupPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// One record as stored in the artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupRecord {
    pub id: RawId,
    pub vector: Vec<f32>,
    #[serde(default)]
    pub payload: BackupPayload,
}

impl From<&GestureRecord> for BackupRecord {
    fn from(record: &GestureRecord) -> Self {
        Self {
            id: RawId::Text(record.id.0.clone()),
            vector: record.vector.clone(),
            payload: BackupPayload {
                label: Some(record.label.clone()),
            },
        }
    }
}

impl BackupRecord {
    /// Convert to a gesture record; `None` when the label is missing or empty
    pub fn into_gesture(self) -> Option<GestureRecord> {
        let label = self.payload.label.filter(|l| !l.is_empty())?;
        Some(GestureRecord {
            id: self.id.into(),
            vector: self.vector,
            label,
        })
    }
}

/// The single on-disk backup file
#[derive(Debug, Clone)]
pub struct BackupArtifact {
    path: PathBuf,
}

impl BackupArtifact {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Sibling file the next export is staged in
    pub fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".");
        name.push(BACKUP_TEMP_SUFFIX);
        self.path.with_file_name(name)
    }

    /// Overwrite the artifact with `records`; returns the number written
    pub fn export(&self, records: &[GestureRecord]) -> Result<usize> {
        let data: Vec<BackupRecord> = records.iter().map(BackupRecord::from).collect();

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create backup directory {parent:?}"))?;
        }

        let temp_path = self.temp_path();
        if let Err(e) = write_json(&temp_path, &data) {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }

        fs::rename(&temp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            anyhow::anyhow!("Failed to replace backup {:?}: {e}", self.path)
        })?;
        sync_parent_directory(&self.path);

        tracing::debug!(
            records = data.len(),
            path = %self.path.display(),
            "Backup artifact written"
        );
        Ok(data.len())
    }

    /// Read the artifact
    ///
    /// `Ok(None)` when there is no artifact. Unreadable files map to
    /// `PersistenceFailure`, unparsable content to `CorruptArtifact`.
    pub fn load(&self) -> std::result::Result<Option<Vec<BackupRecord>>, AppError> {
        if !self.exists() {
            return Ok(None);
        }

        let file = File::open(&self.path).map_err(|e| {
            AppError::PersistenceFailure(format!("cannot open {:?}: {e}", self.path))
        })?;

        let records: Vec<BackupRecord> = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| AppError::CorruptArtifact(format!("{:?}: {e}", self.path)))?;

        Ok(Some(records))
    }

    /// Delete the artifact and any stale staging file; returns whether the
    /// artifact existed
    pub fn remove(&self) -> Result<bool> {
        let _ = fs::remove_file(self.temp_path());
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("Failed to delete backup {:?}", self.path)),
        }
    }
}

fn write_json(path: &Path, data: &[BackupRecord]) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create staging file {path:?}"))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, data).context("Failed to serialize backup records")?;
    writer.flush()?;
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush staging file: {e}"))?
        .sync_all()
        .context("Failed to fsync staging file")?;
    Ok(())
}

/// Persist the rename itself; best-effort, not every platform supports it
fn sync_parent_directory(path: &Path) {
    #[cfg(unix)]
    {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        if let Ok(dir) = File::open(parent) {
            let _ = dir.sync_all();
        }
    }
    #[cfg(not(unix))]
    let _ = path;
}
