/// Calculate cosine similarity between two embeddings.
///
/// Returns 0.0 for mismatched lengths or zero-magnitude vectors. The result is
/// clamped to [-1, 1] to absorb floating point drift on normalised inputs.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
  if a.len() != b.len() || a.is_empty() {
    return 0.0;
  }

  let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
  let magnitude_a = magnitude(a);
  let magnitude_b = magnitude(b);

  if magnitude_a == 0.0 || magnitude_b == 0.0 {
    0.0
  } else {
    (dot_product / (magnitude_a * magnitude_b)).clamp(-1.0, 1.0)
  }
}

/// L2 norm of a vector
pub fn magnitude(v: &[f32]) -> f32 {
  v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Scale a vector to unit length; zero vectors are returned unchanged
pub fn normalize(mut v: Vec<f32>) -> Vec<f32> {
  let magnitude = magnitude(&v);
  if magnitude > f32::EPSILON {
    for value in v.iter_mut() {
      *value /= magnitude;
    }
  }
  v
}
