//! HTTP API Handlers
//!
//! The recording client talks to these endpoints: save a gesture, predict a
//! gesture, list, delete and reset. Health and metrics sit alongside.

// Core modules
pub mod router;
pub mod types;

// Health and utilities
pub mod health;
pub mod utils;

// Gesture operations
pub mod signs;

// Test utilities (compiled only in test builds)
#[cfg(test)]
pub mod test_helpers;

// Re-export commonly used items
pub use router::{build_router, AppState};
pub use types::*;
