//! Registry of live similarity indexes
//!
//! An index registered here outlives the store that created it, the way a
//! long-lived vector client keeps its collections between re-inits. The
//! startup check asks the catalog whether a live collection already exists
//! and what size it was created with.

use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;

use super::flat::SimilarityIndex;

/// Index handle shared between the catalog and the store using it
pub type SharedIndex = Arc<RwLock<SimilarityIndex>>;

/// Named live collections
#[derive(Debug, Default, Clone)]
pub struct IndexCatalog {
    collections: Arc<Mutex<HashMap<String, SharedIndex>>>,
}

impl IndexCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live index for `name`, if one exists
    pub fn get(&self, name: &str) -> Option<SharedIndex> {
        self.collections.lock().get(name).cloned()
    }

    /// Create an empty collection, replacing any previous one with that name
    pub fn create(&self, name: &str, dimension: usize) -> SharedIndex {
        let index = Arc::new(RwLock::new(SimilarityIndex::new(dimension)));
        self.collections
            .lock()
            .insert(name.to_string(), Arc::clone(&index));
        index
    }

    /// Drop a collection; returns whether it existed
    pub fn remove(&self, name: &str) -> bool {
        self.collections.lock().remove(name).is_some()
    }

    /// Configured dimension of a live collection
    pub fn dimension_of(&self, name: &str) -> Option<usize> {
        self.get(name).map(|index| index.read().dimension())
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.lock().keys().cloned().collect();
        names.sort();
        names
    }
}
