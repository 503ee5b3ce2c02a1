use icsig_core::CHANNELS;

/// Sum of squared per-channel differences between two vectors.
#[must_use]
pub fn sse(a: &[f64; CHANNELS], b: &[f64; CHANNELS]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

/// Similarity percentage for a distance: exactly 100 for an exact match,
/// `100 / (1 + distance)` otherwise.
#[must_use]
pub fn similarity(distance: f64) -> f64 {
    if distance > 0.0 {
        100.0 / (1.0 + distance)
    } else {
        100.0
    }
}
