//! Vector helpers shared by scan loading and query scoring.

/// Dot product over the common prefix of both slices.
/// Callers check dimensionality first; scoring never mixes lengths.
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// L2-normalize in place. A zero vector is left untouched.
pub fn normalize(vector: &mut [f32]) {
    let norm = dot(vector, vector).sqrt();
    if norm == 0.0 {
        return;
    }
    for component in vector.iter_mut() {
        *component /= norm;
    }
}

/// Owned variant of [`normalize`].
pub fn normalized(mut vector: Vec<f32>) -> Vec<f32> {
    normalize(&mut vector);
    vector
}
