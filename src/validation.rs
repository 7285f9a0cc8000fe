//! Input validation for labels, landmark vectors and search depth
//! Length checks against `VECTOR_SIZE` are the index's job; this module
//! covers everything else a request can get wrong.

use anyhow::{anyhow, Result};

use crate::constants::{MAX_LABEL_LENGTH, MAX_SEARCH_DEPTH};

/// Validate a gesture label
pub fn validate_label(label: &str) -> Result<()> {
    if label.trim().is_empty() {
        return Err(anyhow!("label cannot be empty"));
    }

    if label.len() > MAX_LABEL_LENGTH {
        return Err(anyhow!(
            "label too long: {} bytes (max: {})",
            label.len(),
            MAX_LABEL_LENGTH
        ));
    }

    // Only allow printable characters, no control characters
    if label.chars().any(|c| c.is_control()) {
        return Err(anyhow!("label contains invalid control characters"));
    }

    Ok(())
}

/// Validate landmark values
pub fn validate_landmarks(landmarks: &[f32]) -> Result<()> {
    if let Some(pos) = landmarks.iter().position(|v| !v.is_finite()) {
        return Err(anyhow!("landmarks contain NaN or Inf at position {pos}"));
    }
    Ok(())
}

/// Validate a caller-supplied search depth
pub fn validate_search_depth(k: usize) -> Result<()> {
    if k == 0 {
        return Err(anyhow!("k must be greater than 0"));
    }

    if k > MAX_SEARCH_DEPTH {
        return Err(anyhow!("k too large: {k} (max: {MAX_SEARCH_DEPTH})"));
    }

    Ok(())
}
