//! Flat similarity index over gesture records
//!
//! Records live in insertion order in a `Vec`; a side map gives O(1) lookup
//! by id. Search is a linear cosine scan, which is plenty for the few
//! thousand signatures a user records by hand.

use std::collections::{BTreeSet, HashMap};

use crate::errors::{AppError, Result};
use crate::gesture::types::{GestureId, GestureRecord, SearchHit};
use crate::similarity::top_k_similar;

/// In-memory authoritative store of gesture records
#[derive(Debug, Clone)]
pub struct SimilarityIndex {
    dimension: usize,
    records: Vec<GestureRecord>,
    positions: HashMap<GestureId, usize>,
}

impl SimilarityIndex {
    /// Create an empty index accepting vectors of exactly `dimension` values
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            records: Vec::new(),
            positions: HashMap::new(),
        }
    }

    /// Configured vector length
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Reject vectors whose length differs from the configured dimension
    pub fn check_dimension(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(AppError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(())
    }

    /// Store a new record under a freshly generated id
    pub fn insert(&mut self, label: &str, vector: Vec<f32>) -> Result<GestureId> {
        self.check_dimension(&vector)?;
        let record = GestureRecord::new(label, vector);
        let id = record.id.clone();
        self.push(record);
        Ok(id)
    }

    /// Insert or replace a record keeping its id
    ///
    /// A replaced record keeps its original position. Returns true when an
    /// existing record was replaced.
    pub fn upsert(&mut self, record: GestureRecord) -> Result<bool> {
        self.check_dimension(&record.vector)?;
        match self.positions.get(&record.id) {
            Some(&pos) => {
                self.records[pos] = record;
                Ok(true)
            }
            None => {
                self.push(record);
                Ok(false)
            }
        }
    }

    fn push(&mut self, record: GestureRecord) {
        self.positions.insert(record.id.clone(), self.records.len());
        self.records.push(record);
    }

    /// Top-`k` records by descending cosine similarity
    ///
    /// Equal scores are returned in insertion order. An empty index yields an
    /// empty result, not an error.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        self.check_dimension(query)?;

        let hits = top_k_similar(
            query,
            self.records
                .iter()
                .map(|r| (r.vector.as_slice(), r.label.as_str())),
            k,
        );

        Ok(hits
            .into_iter()
            .map(|(score, label)| SearchHit {
                label: label.to_string(),
                score,
            })
            .collect())
    }

    /// Distinct labels across all records
    pub fn labels(&self) -> BTreeSet<String> {
        self.records.iter().map(|r| r.label.clone()).collect()
    }

    /// Remove every record whose label matches exactly; returns the count
    pub fn delete_by_label(&mut self, label: &str) -> usize {
        let before = self.records.len();
        self.records.retain(|r| r.label != label);
        let removed = before - self.records.len();
        if removed > 0 {
            self.reindex();
        }
        removed
    }

    /// Drop every record
    pub fn clear(&mut self) {
        self.records.clear();
        self.positions.clear();
    }

    pub fn get(&self, id: &GestureId) -> Option<&GestureRecord> {
        self.positions.get(id).map(|&pos| &self.records[pos])
    }

    /// All records in insertion order
    pub fn records(&self) -> &[GestureRecord] {
        &self.records
    }

    fn reindex(&mut self) {
        self.positions = self
            .records
            .iter()
            .enumerate()
            .map(|(pos, r)| (r.id.clone(), pos))
            .collect();
    }
}
