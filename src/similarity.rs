//! Vector similarity for gesture matching
//!
//! Flat cosine scoring. Accumulates in f64 because gesture vectors are long
//! (1890 values) and f32 sums drift enough to reorder equal matches.

use ordered_float::OrderedFloat;

#[inline]
fn dot_f64(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| x as f64 * y as f64)
        .sum()
}

/// Compute cosine similarity between two vectors
///
/// Returns 0.0 for mismatched lengths or when either vector has zero
/// magnitude. The result is clamped to [-1, 1].
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot = dot_f64(a, b);
    let norm_a = dot_f64(a, a).sqrt();
    let norm_b = dot_f64(b, b).sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0) as f32
}

/// Find top-k most similar vectors
///
/// Candidates are scored in iteration order; the sort is stable so equal
/// scores keep that order.
pub fn top_k_similar<'a, T, I>(query: &[f32], candidates: I, k: usize) -> Vec<(f32, T)>
where
    I: IntoIterator<Item = (&'a [f32], T)>,
{
    if k == 0 {
        return Vec::new();
    }

    let mut scored: Vec<(OrderedFloat<f32>, T)> = candidates
        .into_iter()
        .map(|(vec, item)| (OrderedFloat(cosine_similarity(query, vec)), item))
        .collect();

    // Sort by score descending
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    // Take top k
    scored
        .into_iter()
        .take(k)
        .map(|(score, item)| (score.0, item))
        .collect()
}
