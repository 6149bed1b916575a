//! Cosine distance between unit-length embeddings

/// Cosine distance for vectors already scaled to unit length: `1 - cos(theta)`,
/// clamped to `[0, 2]` against rounding.
#[inline]
pub fn unit_cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    (1.0 - dot_product(a, b)).clamp(0.0, 2.0)
}

pub fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
