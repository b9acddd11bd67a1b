//! Core vector types shared by the index and its storage.

use serde::Serialize;

use super::VectorError;

/// Validated, non-zero embedding dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VectorDimension(usize);

impl VectorDimension {
    /// Create a dimension, rejecting zero.
    pub fn new(dimension: usize) -> Result<Self, VectorError> {
        if dimension == 0 {
            return Err(VectorError::InvalidDimension(dimension));
        }
        Ok(Self(dimension))
    }

    pub fn get(&self) -> usize {
        self.0
    }

    /// Check that `vector` has exactly this dimension.
    pub fn validate_vector(&self, vector: &[f32]) -> Result<(), VectorError> {
        if vector.len() != self.0 {
            return Err(VectorError::DimensionMismatch {
                expected: self.0,
                actual: vector.len(),
            });
        }
        Ok(())
    }
}

/// One search result: stored position, cosine similarity and chunk text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    /// Insertion position of the matched vector.
    pub position: usize,

    /// Inner product of the normalized query and stored vector.
    pub score: f32,

    /// Chunk text stored alongside the vector.
    pub text: String,
}

/// Divide `vector` by its Euclidean norm in place.
///
/// All-zero vectors are left unchanged.
pub fn normalize_l2(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in vector.iter_mut() {
            *value /= norm;
        }
    }
}

/// Inner product of two equal-length vectors.
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
