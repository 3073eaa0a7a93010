
use serde::{Deserialize, Serialize};

use super::StoreError;

/// Flat (brute-force) similarity index.
///
/// Vectors are stored in one contiguous buffer and every search scans all of
/// them, so results are exact. Append-only: no deletion or update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatIndex {
    dimension: usize,
    vectors: Vec<f32>,
}

impl FlatIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: Vec::new(),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of stored vectors.
    pub fn len(&self) -> usize {
        if self.dimension == 0 {
            0
        } else {
            self.vectors.len() / self.dimension
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Append a batch of vectors, preserving their order.
    pub fn add_batch(&mut self, vectors: &[Vec<f32>]) -> Result<(), StoreError> {
        for vector in vectors {
            if vector.len() != self.dimension {
                return Err(StoreError::DimensionMismatch {
                    expected: self.dimension,
                    actual: vector.len(),
                });
            }
        }

        self.vectors.reserve(vectors.len() * self.dimension);
        for vector in vectors {
            self.vectors.extend_from_slice(vector);
        }
        Ok(())
    }

    /// Exhaustive nearest-neighbor scan.
    ///
    /// Returns up to `top_k` `(position, distance)` pairs ordered by
    /// ascending squared L2 distance; ties keep insertion order. When fewer
    /// than `top_k` vectors are stored, all of them are returned.
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<(usize, f32)>, StoreError> {
        if query.len() != self.dimension {
            return Err(StoreError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut distances: Vec<(usize, f32)> = self
            .vectors
            .chunks_exact(self.dimension)
            .map(|stored| squared_l2_distance(query, stored))
            .enumerate()
            .collect();

        distances.sort_by(|a, b| a.1.total_cmp(&b.1));
        distances.truncate(top_k);
        Ok(distances)
    }
}

/// Squared Euclidean distance; ordering is identical to true L2 and this is
/// what flat L2 indexes conventionally report.
fn squared_l2_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
