/// Minimum similarity a candidate must exceed to count as a positive
/// signal. Tunable; a small positive epsilon here would suppress
/// floating-point noise at the boundary.
pub const SIMILARITY_CUTOFF: f64 = 0.0;

/// Two vectors of unequal length were compared.
///
/// All stored feature vectors live in one shared space, so a length
/// mismatch means corrupt or stale data rather than "no signal". Callers
/// log it and exclude the offending candidate instead of failing the
/// whole request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("vector dimension mismatch: {left} vs {right}")]
pub struct DimensionMismatch {
    pub left: usize,
    pub right: usize,
}

/// Cosine similarity between two vectors (1 minus cosine distance).
///
/// Empty vectors and zero-norm vectors yield 0.0 rather than an error:
/// both mean "no signal", not corrupt data.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> Result<f64, DimensionMismatch> {
    if a.is_empty() || b.is_empty() {
        return Ok(0.0);
    }
    if a.len() != b.len() {
        return Err(DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    Ok(dot / (norm_a.sqrt() * norm_b.sqrt()))
}
