//! Documented constants for the gesture store
//!
//! Tunable defaults live here so configuration and tests agree on them.

// =============================================================================
// VECTOR SHAPE
// A gesture is a clip of hand landmarks flattened frame by frame.
// =============================================================================

/// Frames captured per gesture clip
pub const FRAMES_PER_GESTURE: usize = 30;

/// Hand landmarks reported per frame by the capture client
pub const LANDMARKS_PER_FRAME: usize = 21;

/// Coordinates per landmark (x, y, z)
pub const COORDS_PER_LANDMARK: usize = 3;

/// Default `VECTOR_SIZE`: 30 × 21 × 3 = 1890 floats
///
/// Changing this between runs invalidates every stored vector; the store
/// detects the change at startup and rebuilds empty.
pub const DEFAULT_VECTOR_SIZE: usize =
    FRAMES_PER_GESTURE * LANDMARKS_PER_FRAME * COORDS_PER_LANDMARK;

// =============================================================================
// SEARCH
// =============================================================================

/// Number of neighbours inspected per prediction
///
/// Only the best one decides the label; the rest are returned for
/// diagnostics so a client can see how close the runner-up was.
pub const DEFAULT_SEARCH_DEPTH: usize = 3;

/// Upper bound for any caller-supplied `k`
pub const MAX_SEARCH_DEPTH: usize = 100;

/// Minimum cosine score for a prediction to name a label
///
/// Landmark coordinates are non-negative, so real gestures score in [0, 1]
/// against each other. 0.0 keeps every such match and only rejects
/// anti-correlated vectors.
///
/// A best score of exactly 0.0 never names a label, whatever the threshold.
/// An all-zero query (no hand in frame) scores 0.0 against everything.
pub const DEFAULT_MATCH_THRESHOLD: f32 = 0.0;

/// Label reported when nothing matches
pub const UNKNOWN_LABEL: &str = "Unknown";

// =============================================================================
// STORAGE
// =============================================================================

/// Default backup artifact location (same file name the service always used)
pub const DEFAULT_BACKUP_FILE: &str = "qdrant_backup.json";

/// Default live collection name
pub const DEFAULT_COLLECTION_NAME: &str = "sign_language_gestures";

/// Suffix of the temporary file written before the atomic rename
pub const BACKUP_TEMP_SUFFIX: &str = "tmp";

// =============================================================================
// INPUT LIMITS
// =============================================================================

/// Maximum label length in bytes
pub const MAX_LABEL_LENGTH: usize = 128;
