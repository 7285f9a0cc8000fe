//! Sign-Bridge Library
//!
//! Gesture vector store for sign-language recognition. Labeled motion
//! signatures (30 frames × 21 hand landmarks × 3 coordinates, flattened)
//! are kept in a cosine-similarity index and mirrored to a JSON backup file
//! after every change, so recordings survive restarts.
//!
//! # Key Features
//! - Exact cosine search with deterministic tie-breaking
//! - Atomic, full-rewrite backup after each mutation
//! - Startup check that resets the store when the vector size changes
//! - Axum HTTP API matching the recording client

pub mod backup;
pub mod config;
pub mod constants;
pub mod errors;
pub mod gesture;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod similarity;
pub mod tracing_setup;
pub mod validation;
pub mod vector_db;

pub use errors::{AppError, Result};
pub use gesture::{GestureStore, StoreConfig};

// Re-export dependencies to ensure tests/benchmarks use the same version
pub use chrono;
pub use parking_lot;
pub use uuid;
