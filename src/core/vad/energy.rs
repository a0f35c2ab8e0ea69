//! Short-window signal energy estimation.

/// Root-mean-square amplitude of a window of PCM samples, on the i16 scale.
///
/// Returns 0.0 for an empty window.
#[inline]
pub fn rms(samples: &[i16]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f64 = samples
        .iter()
        .map(|&s| {
            let v = s as f64;
            v * v
        })
        .sum();
    (sum_squares / samples.len() as f64).sqrt() as f32
}
