//! Gesture store: similarity index plus its durable backup
//!
//! `GestureStore` owns one live index (looked up in an [`IndexCatalog`]) and
//! one [`BackupArtifact`]. Startup runs an explicit check:
//!
//! - live index with the configured size: reuse it, no replay
//! - live index with another size: drop it, delete the artifact, start empty
//! - no live index: create one and replay the artifact into it
//!
//! Every mutation takes the index write lock, changes the index, then
//! exports the full record set while still excluding other writers. The
//! write guard is downgraded for the export so searches are not blocked by
//! disk I/O. Export failures are logged and never undo the mutation.

pub mod types;

use parking_lot::RwLockWriteGuard;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

use crate::backup::{BackupArtifact, BackupRecord};
use crate::constants::{
    DEFAULT_BACKUP_FILE, DEFAULT_COLLECTION_NAME, DEFAULT_MATCH_THRESHOLD, DEFAULT_SEARCH_DEPTH,
    DEFAULT_VECTOR_SIZE, UNKNOWN_LABEL,
};
use crate::errors::{AppError, Result, ValidationErrorExt};
use crate::metrics;
use crate::validation;
use crate::vector_db::{IndexCatalog, SharedIndex, SimilarityIndex};

pub use types::{
    GestureId, GestureRecord, Prediction, SearchHit, StartupOutcome, StoreStats,
};

/// Options the store needs; derived from `ServerConfig` by the server
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Required length of every vector (`VECTOR_SIZE`)
    pub vector_size: usize,
    /// Backup artifact location
    pub backup_path: PathBuf,
    /// Live collection name in the catalog
    pub collection: String,
    /// Neighbours inspected per prediction
    pub search_depth: usize,
    /// Minimum score for a prediction to name a label
    pub match_threshold: f32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            vector_size: DEFAULT_VECTOR_SIZE,
            backup_path: PathBuf::from(DEFAULT_BACKUP_FILE),
            collection: DEFAULT_COLLECTION_NAME.to_string(),
            search_depth: DEFAULT_SEARCH_DEPTH,
            match_threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }
}

impl StoreConfig {
    /// Config with the given size and artifact path, defaults elsewhere
    pub fn new(vector_size: usize, backup_path: impl Into<PathBuf>) -> Self {
        Self {
            vector_size,
            backup_path: backup_path.into(),
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if self.vector_size == 0 {
            return Err(AppError::InvalidInput {
                field: "vector_size".to_string(),
                reason: "must be a positive integer".to_string(),
            });
        }
        if self.collection.is_empty() {
            return Err(AppError::InvalidInput {
                field: "collection".to_string(),
                reason: "cannot be empty".to_string(),
            });
        }
        validation::validate_search_depth(self.search_depth).map_validation_err("search_depth")
    }
}

/// Single-collection gesture store with durable backup
pub struct GestureStore {
    config: StoreConfig,
    catalog: IndexCatalog,
    index: SharedIndex,
    artifact: BackupArtifact,
    startup: StartupOutcome,
}

impl GestureStore {
    /// Open a store with its own private catalog
    ///
    /// Nothing is live yet, so this always replays the backup artifact.
    pub fn open(config: StoreConfig) -> Result<Self> {
        Self::open_in(&IndexCatalog::new(), config)
    }

    /// Open a store against a shared catalog of live indexes
    pub fn open_in(catalog: &IndexCatalog, config: StoreConfig) -> Result<Self> {
        config.validate()?;
        let artifact = BackupArtifact::new(config.backup_path.clone());

        let live = catalog.get(&config.collection).map(|index| {
            let dimension = index.read().dimension();
            (index, dimension)
        });

        let (index, startup) = match live {
            Some((index, dimension)) if dimension == config.vector_size => {
                let records = index.read().len();
                info!(
                    collection = %config.collection,
                    dimension,
                    records,
                    "Collection ready"
                );
                (index, StartupOutcome::Reused { records })
            }
            Some((_, previous)) => {
                warn!(
                    collection = %config.collection,
                    expected = config.vector_size,
                    found = previous,
                    "Dimension mismatch, resetting collection"
                );
                catalog.remove(&config.collection);
                match artifact.remove() {
                    Ok(true) => info!(
                        path = %artifact.path().display(),
                        "Deleted incompatible backup file"
                    ),
                    Ok(false) => {}
                    Err(e) => error!("Failed to delete incompatible backup: {e:#}"),
                }
                let index = catalog.create(&config.collection, config.vector_size);
                (
                    index,
                    StartupOutcome::DimensionReset {
                        previous,
                        current: config.vector_size,
                    },
                )
            }
            None => {
                let index = catalog.create(&config.collection, config.vector_size);
                info!(
                    collection = %config.collection,
                    dimension = config.vector_size,
                    "Collection created"
                );
                let (restored, skipped) = {
                    let mut guard = index.write();
                    replay(&mut guard, &artifact)
                };
                (index, StartupOutcome::Replayed { restored, skipped })
            }
        };

        metrics::INDEX_SIZE.set(index.read().len() as i64);

        Ok(Self {
            config,
            catalog: catalog.clone(),
            index,
            artifact,
            startup,
        })
    }

    /// Flush a final export; the live index stays in the catalog
    pub fn close(&self) -> bool {
        let guard = self.index.write();
        let guard = RwLockWriteGuard::downgrade(guard);
        let exported = self.export_locked(&guard);
        info!(
            collection = %self.config.collection,
            records = guard.len(),
            exported,
            "Gesture store closed"
        );
        exported
    }

    /// How the startup check resolved
    pub fn startup_outcome(&self) -> StartupOutcome {
        self.startup
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn vector_size(&self) -> usize {
        self.config.vector_size
    }

    pub fn catalog(&self) -> &IndexCatalog {
        &self.catalog
    }

    pub fn backup(&self) -> &BackupArtifact {
        &self.artifact
    }

    /// Store a labeled vector; returns its new id
    ///
    /// Fails with `DimensionMismatch` when the vector has the wrong length,
    /// and with `InvalidInput` for an empty label or non-finite values. The
    /// backup is rewritten afterwards; a failed write is logged only.
    pub fn insert(&self, label: &str, vector: Vec<f32>) -> Result<GestureId> {
        if let Err(e) = self.check_input(Some(label), &vector) {
            let result = match e {
                AppError::DimensionMismatch { .. } => "dimension_mismatch",
                _ => "invalid",
            };
            metrics::GESTURE_INSERT_TOTAL
                .with_label_values(&[result])
                .inc();
            return Err(e);
        }

        let id = self.mutate(|index| index.insert(label, vector))?;
        metrics::GESTURE_INSERT_TOTAL.with_label_values(&["ok"]).inc();
        info!(id = %id, label, "Gesture saved");
        Ok(id)
    }

    /// Ranked matches for `query`, best first, at most `k`
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        if let Err(e) = self.check_input(None, query) {
            if matches!(e, AppError::DimensionMismatch { .. }) {
                metrics::GESTURE_SEARCH_TOTAL
                    .with_label_values(&["dimension_mismatch"])
                    .inc();
            }
            return Err(e);
        }

        let _timer = metrics::Timer::new(metrics::GESTURE_SEARCH_DURATION.clone());
        let hits = self.index.read().search(query, k)?;

        match hits.first() {
            Some(best) => {
                metrics::GESTURE_SEARCH_TOTAL.with_label_values(&["hit"]).inc();
                debug!(label = %best.label, score = best.score, "Top match");
            }
            None => {
                metrics::GESTURE_SEARCH_TOTAL.with_label_values(&["empty"]).inc();
                debug!("No matches found");
            }
        }
        Ok(hits)
    }

    /// Recognize a gesture using the configured depth and threshold
    ///
    /// An empty store yields `Unknown` with confidence 0.0. A best match
    /// below the threshold yields `Unknown` with that match's score, and so
    /// does a best score of exactly 0.0 (zero query or orthogonal match).
    pub fn predict(&self, query: &[f32]) -> Result<Prediction> {
        let matches = self.search(query, self.config.search_depth)?;

        let (label, confidence) = match matches.first() {
            None => (UNKNOWN_LABEL.to_string(), 0.0),
            Some(best)
                if best.score < self.config.match_threshold || best.score == 0.0 =>
            {
                debug!(
                    label = %best.label,
                    score = best.score,
                    threshold = self.config.match_threshold,
                    "Best match below threshold"
                );
                (UNKNOWN_LABEL.to_string(), best.score)
            }
            Some(best) => (best.label.clone(), best.score),
        };

        Ok(Prediction {
            label,
            confidence,
            matches,
        })
    }

    /// Distinct labels currently stored
    pub fn list_labels(&self) -> BTreeSet<String> {
        self.index.read().labels()
    }

    /// Remove every record with this exact label; returns how many went
    ///
    /// Deleting an absent label is a no-op returning 0.
    pub fn delete_by_label(&self, label: &str) -> usize {
        let removed = self
            .mutate(|index| Ok(index.delete_by_label(label)))
            .unwrap_or(0);
        metrics::GESTURE_DELETED_TOTAL
            .with_label_values(&["label"])
            .inc_by(removed as u64);
        info!(label, removed, "Deleted gestures by label");
        removed
    }

    /// Delete the backup artifact, then empty the index
    ///
    /// If the artifact cannot be deleted the index is left untouched and
    /// `PersistenceFailure` is returned, so a later restart cannot resurrect
    /// records the caller believes are gone.
    pub fn reset_all(&self) -> Result<()> {
        let mut guard = self.index.write();

        self.artifact.remove().map_err(|e| {
            error!("Failed to delete backup during reset: {e:#}");
            AppError::PersistenceFailure(format!("{e:#}"))
        })?;

        let removed = guard.len();
        guard.clear();
        metrics::INDEX_SIZE.set(0);
        metrics::GESTURE_DELETED_TOTAL
            .with_label_values(&["reset"])
            .inc_by(removed as u64);
        info!(removed, "Gesture store reset");
        Ok(())
    }

    /// Rewrite the artifact from the current index
    pub fn export(&self) -> bool {
        let guard = RwLockWriteGuard::downgrade(self.index.write());
        self.export_locked(&guard)
    }

    pub fn len(&self) -> usize {
        self.index.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.read().is_empty()
    }

    /// Snapshot of every record in insertion order
    pub fn records(&self) -> Vec<GestureRecord> {
        self.index.read().records().to_vec()
    }

    pub fn stats(&self) -> StoreStats {
        let index = self.index.read();
        StoreStats {
            records: index.len(),
            labels: index.labels().len(),
            vector_size: index.dimension(),
            collection: self.config.collection.clone(),
            backup_path: self.artifact.path().to_path_buf(),
            backup_present: self.artifact.exists(),
        }
    }

    fn check_input(&self, label: Option<&str>, vector: &[f32]) -> Result<()> {
        if vector.len() != self.config.vector_size {
            return Err(AppError::DimensionMismatch {
                expected: self.config.vector_size,
                actual: vector.len(),
            });
        }
        if let Some(label) = label {
            validation::validate_label(label).map_validation_err("label")?;
        }
        validation::validate_landmarks(vector).map_validation_err("landmarks")
    }

    /// Apply `op` under the write lock, then export before letting the next
    /// writer in
    fn mutate<R>(&self, op: impl FnOnce(&mut SimilarityIndex) -> Result<R>) -> Result<R> {
        let mut guard = self.index.write();
        let result = op(&mut guard)?;
        let guard = RwLockWriteGuard::downgrade(guard);
        metrics::INDEX_SIZE.set(guard.len() as i64);
        self.export_locked(&guard);
        Ok(result)
    }

    fn export_locked(&self, index: &SimilarityIndex) -> bool {
        let _timer = metrics::Timer::new(metrics::BACKUP_EXPORT_DURATION.clone());
        match self.artifact.export(index.records()) {
            Ok(count) => {
                metrics::BACKUP_EXPORT_TOTAL.with_label_values(&["ok"]).inc();
                info!(
                    records = count,
                    path = %self.artifact.path().display(),
                    "Backed up gestures"
                );
                true
            }
            Err(e) => {
                metrics::BACKUP_EXPORT_TOTAL
                    .with_label_values(&["failed"])
                    .inc();
                error!(path = %self.artifact.path().display(), "Backup failed: {e:#}");
                false
            }
        }
    }
}

/// Load the artifact into an empty index; returns (restored, skipped)
///
/// A missing artifact is a no-op and an unreadable one is treated the same
/// way. Records with the wrong vector length, non-finite values or a label
/// that would be rejected on insert are skipped; the artifact is then
/// rewritten (or removed, if nothing survived) so they are never offered
/// for replay again.
fn replay(index: &mut SimilarityIndex, artifact: &BackupArtifact) -> (usize, usize) {
    let records = match artifact.load() {
        Ok(Some(records)) => records,
        Ok(None) => {
            debug!(path = %artifact.path().display(), "No backup artifact to restore");
            return (0, 0);
        }
        Err(e) => {
            warn!("Restore failed, starting empty: {e}");
            return (0, 0);
        }
    };

    let mut restored = 0;
    let mut wrong_size = 0;
    let mut invalid = 0;
    let mut unlabeled = 0;

    for (position, raw) in records.into_iter().enumerate() {
        let Some(record) = raw.into_gesture() else {
            warn!(position, "Skipping backup record without a label");
            unlabeled += 1;
            continue;
        };
        if record.vector.len() != index.dimension() {
            warn!(
                position,
                id = %record.id,
                expected = index.dimension(),
                found = record.vector.len(),
                "Skipping backup record with wrong vector length"
            );
            wrong_size += 1;
            continue;
        }
        if let Err(e) = validation::validate_label(&record.label)
            .and_then(|()| validation::validate_landmarks(&record.vector))
        {
            warn!(position, id = %record.id, "Skipping invalid backup record: {e}");
            invalid += 1;
            continue;
        }
        match index.upsert(record) {
            Ok(false) => restored += 1,
            Ok(true) => debug!(position, "Duplicate id in backup, later record wins"),
            Err(e) => {
                warn!(position, "Skipping backup record: {e}");
                wrong_size += 1;
            }
        }
    }

    let purged = wrong_size + invalid;
    if purged > 0 {
        let cleanup = if index.is_empty() {
            artifact.remove().map(|_| ())
        } else {
            artifact.export(index.records()).map(|_| ())
        };
        match cleanup {
            Ok(()) => info!(skipped = purged, "Purged incompatible records from backup"),
            Err(e) => error!("Failed to purge incompatible backup records: {e:#}"),
        }
    }

    info!(
        restored,
        skipped = purged + unlabeled,
        path = %artifact.path().display(),
        "Restored gestures from backup"
    );
    (restored, purged + unlabeled)
}

/// Records of an artifact converted for inspection, skipping unlabeled ones
pub fn read_backup_records(artifact: &BackupArtifact) -> Result<Vec<GestureRecord>> {
    Ok(artifact
        .load()?
        .unwrap_or_default()
        .into_iter()
        .filter_map(BackupRecord::into_gesture)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(dir: &TempDir, vector_size: usize) -> StoreConfig {
        StoreConfig::new(vector_size, dir.path().join("backup.json"))
    }

    #[test]
    fn test_open_rejects_zero_vector_size() {
        let dir = TempDir::new().unwrap();
        let err = GestureStore::open(config(&dir, 0)).err().unwrap();
        assert_eq!(err.code(), "INVALID_INPUT");
    }

    #[test]
    fn test_fresh_open_replays_nothing() {
        let dir = TempDir::new().unwrap();
        let store = GestureStore::open(config(&dir, 4)).unwrap();
        assert_eq!(
            store.startup_outcome(),
            StartupOutcome::Replayed {
                restored: 0,
                skipped: 0
            }
        );
        assert!(store.is_empty());
        assert!(!store.backup().exists());
    }

    #[test]
    fn test_insert_exports_immediately() {
        let dir = TempDir::new().unwrap();
        let store = GestureStore::open(config(&dir, 4)).unwrap();
        let id = store.insert("Wave", vec![0.1, 0.2, 0.3, 0.4]).unwrap();

        let saved = read_backup_records(store.backup()).unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].id, id);
        assert_eq!(saved[0].label, "Wave");
    }

    #[test]
    fn test_insert_rejects_bad_input_without_mutation() {
        let dir = TempDir::new().unwrap();
        let store = GestureStore::open(config(&dir, 3)).unwrap();

        assert!(matches!(
            store.insert("Wave", vec![0.1, 0.2]),
            Err(AppError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));
        assert!(matches!(
            store.insert("", vec![0.1, 0.2, 0.3]),
            Err(AppError::InvalidInput { .. })
        ));
        assert!(matches!(
            store.insert("Wave", vec![0.1, f32::NAN, 0.3]),
            Err(AppError::InvalidInput { .. })
        ));
        assert!(store.is_empty());
        assert!(!store.backup().exists());
    }

    #[test]
    fn test_predict_unknown_on_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = GestureStore::open(config(&dir, 3)).unwrap();
        let prediction = store.predict(&[0.5, 0.5, 0.5]).unwrap();
        assert_eq!(prediction.label, UNKNOWN_LABEL);
        assert_eq!(prediction.confidence, 0.0);
        assert!(prediction.matches.is_empty());
        assert!(!prediction.is_known());
    }

    #[test]
    fn test_predict_applies_threshold() {
        let dir = TempDir::new().unwrap();
        let store = GestureStore::open(StoreConfig {
            match_threshold: 0.9,
            ..config(&dir, 2)
        })
        .unwrap();
        store.insert("Right", vec![1.0, 0.0]).unwrap();

        let known = store.predict(&[1.0, 0.05]).unwrap();
        assert_eq!(known.label, "Right");
        assert!(known.confidence > 0.9);

        let unknown = store.predict(&[0.0, 1.0]).unwrap();
        assert_eq!(unknown.label, UNKNOWN_LABEL);
        assert!(unknown.confidence.abs() < 1e-6);
        assert_eq!(unknown.matches.len(), 1);
    }

    #[test]
    fn test_predict_zero_query_is_unknown() {
        let dir = TempDir::new().unwrap();
        let store = GestureStore::open(config(&dir, 3)).unwrap();
        store.insert("Wave", vec![0.1, 0.2, 0.3]).unwrap();

        let prediction = store.predict(&[0.0, 0.0, 0.0]).unwrap();
        assert_eq!(prediction.label, UNKNOWN_LABEL);
        assert_eq!(prediction.confidence, 0.0);
        assert_eq!(prediction.matches.len(), 1);

        // Lowering the threshold does not turn a zero score into a label
        let lenient = GestureStore::open(StoreConfig {
            match_threshold: -1.0,
            ..config(&dir, 3)
        })
        .unwrap();
        assert_eq!(lenient.predict(&[0.0, 0.0, 0.0]).unwrap().label, UNKNOWN_LABEL);
        assert_eq!(lenient.predict(&[0.1, 0.2, 0.3]).unwrap().label, "Wave");
    }

    #[test]
    fn test_predict_inspects_configured_depth() {
        let dir = TempDir::new().unwrap();
        let store = GestureStore::open(StoreConfig {
            search_depth: 2,
            ..config(&dir, 2)
        })
        .unwrap();
        for label in ["A", "B", "C"] {
            store.insert(label, vec![1.0, 0.5]).unwrap();
        }
        let prediction = store.predict(&[1.0, 0.5]).unwrap();
        assert_eq!(prediction.matches.len(), 2);
        assert_eq!(prediction.label, "A");
    }

    #[test]
    fn test_delete_exports_remaining_records() {
        let dir = TempDir::new().unwrap();
        let store = GestureStore::open(config(&dir, 2)).unwrap();
        store.insert("Wave", vec![1.0, 0.0]).unwrap();
        store.insert("Stop", vec![0.0, 1.0]).unwrap();

        assert_eq!(store.delete_by_label("Wave"), 1);
        assert_eq!(store.delete_by_label("Wave"), 0);

        let saved = read_backup_records(store.backup()).unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].label, "Stop");
    }

    #[test]
    fn test_reset_all_clears_index_and_artifact() {
        let dir = TempDir::new().unwrap();
        let store = GestureStore::open(config(&dir, 2)).unwrap();
        store.insert("Wave", vec![1.0, 0.0]).unwrap();
        assert!(store.backup().exists());

        store.reset_all().unwrap();
        assert!(store.is_empty());
        assert!(!store.backup().exists());
        assert!(store.search(&[1.0, 0.0], 1).unwrap().is_empty());

        // Reset of an already empty store succeeds too
        store.reset_all().unwrap();
    }

    #[test]
    fn test_reopen_in_same_catalog_reuses_live_index() {
        let dir = TempDir::new().unwrap();
        let catalog = IndexCatalog::new();
        let store = GestureStore::open_in(&catalog, config(&dir, 2)).unwrap();
        store.insert("Wave", vec![1.0, 0.0]).unwrap();
        store.close();

        // Artifact removed behind the store's back: reuse must not replay
        std::fs::remove_file(dir.path().join("backup.json")).unwrap();

        let reopened = GestureStore::open_in(&catalog, config(&dir, 2)).unwrap();
        assert_eq!(
            reopened.startup_outcome(),
            StartupOutcome::Reused { records: 1 }
        );
        assert_eq!(reopened.len(), 1);
    }

    #[test]
    fn test_close_writes_artifact() {
        let dir = TempDir::new().unwrap();
        let store = GestureStore::open(config(&dir, 2)).unwrap();
        assert!(store.close());
        assert!(store.backup().exists());
        assert!(read_backup_records(store.backup()).unwrap().is_empty());
    }

    #[test]
    fn test_stats() {
        let dir = TempDir::new().unwrap();
        let store = GestureStore::open(config(&dir, 2)).unwrap();
        store.insert("Wave", vec![1.0, 0.0]).unwrap();
        store.insert("Wave", vec![0.9, 0.1]).unwrap();
        store.insert("Stop", vec![0.0, 1.0]).unwrap();

        let stats = store.stats();
        assert_eq!(stats.records, 3);
        assert_eq!(stats.labels, 2);
        assert_eq!(stats.vector_size, 2);
        assert!(stats.backup_present);
    }
}
