//! In-memory vector collections
//!
//! `flat` holds the similarity index itself; `catalog` keeps live indexes
//! alive across store re-opens inside one process.

pub mod catalog;
pub mod flat;

pub use catalog::{IndexCatalog, SharedIndex};
pub use flat::SimilarityIndex;
