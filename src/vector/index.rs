//! Flat inner-product index over L2-normalized embeddings.
//!
//! Vectors are normalized on insertion and queries are normalized the same
//! way, so the inner product equals cosine similarity. Search is exact and
//! linear in the number of stored vectors.

use std::path::{Path, PathBuf};

use super::storage;
use super::types::{SearchHit, VectorDimension, dot, normalize_l2};
use super::VectorError;
use crate::config::IndexConfig;

/// Append-only vector store with chunk texts kept in parallel.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    dimension: VectorDimension,
    /// Row-major, `len() == metadata.len() * dimension`
    vectors: Vec<f32>,
    metadata: Vec<String>,
    index_path: PathBuf,
    metadata_path: PathBuf,
}

impl VectorIndex {
    /// Create an empty index for the configured dimension and paths.
    pub fn new(config: &IndexConfig) -> Result<Self, VectorError> {
        Ok(Self {
            dimension: VectorDimension::new(config.embedding_dim)?,
            vectors: Vec::new(),
            metadata: Vec::new(),
            index_path: config.index_path.clone(),
            metadata_path: config.metadata_path.clone(),
        })
    }

    /// Load the persisted index if both artifacts exist, otherwise start empty.
    pub fn open(config: &IndexConfig) -> Result<Self, VectorError> {
        let mut index = Self::new(config)?;
        if index.exists() {
            index.load_index()?;
        } else {
            tracing::debug!(
                target: "vector",
                "no persisted index at {}, starting empty",
                index.index_path.display()
            );
        }
        Ok(index)
    }

    /// Whether both persisted artifacts are present.
    pub fn exists(&self) -> bool {
        self.index_path.exists() && self.metadata_path.exists()
    }

    pub fn dimension(&self) -> usize {
        self.dimension.get()
    }

    pub fn len(&self) -> usize {
        self.metadata.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty()
    }

    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    pub fn metadata_path(&self) -> &Path {
        &self.metadata_path
    }

    /// Stored chunk texts in insertion order.
    pub fn texts(&self) -> &[String] {
        &self.metadata
    }

    /// Normalized vector stored at `position`.
    pub fn vector(&self, position: usize) -> Option<&[f32]> {
        let dim = self.dimension.get();
        self.vectors.get(position * dim..(position + 1) * dim)
    }

    /// Normalize and append vectors with their texts, preserving order.
    ///
    /// Every vector is validated before anything is appended, so a failed
    /// call leaves the index unchanged.
    pub fn add_embeddings<V, T>(&mut self, vectors: &[V], texts: &[T]) -> Result<(), VectorError>
    where
        V: AsRef<[f32]>,
        T: AsRef<str>,
    {
        if vectors.len() != texts.len() {
            return Err(VectorError::CountMismatch {
                vectors: vectors.len(),
                texts: texts.len(),
            });
        }
        for vector in vectors {
            self.dimension.validate_vector(vector.as_ref())?;
        }

        self.vectors.reserve(vectors.len() * self.dimension.get());
        self.metadata.reserve(texts.len());
        for (vector, text) in vectors.iter().zip(texts) {
            let start = self.vectors.len();
            self.vectors.extend_from_slice(vector.as_ref());
            normalize_l2(&mut self.vectors[start..]);
            self.metadata.push(text.as_ref().to_string());
        }

        tracing::debug!(
            target: "vector",
            "added {} vectors, index now holds {}",
            texts.len(),
            self.len()
        );
        Ok(())
    }

    /// Texts of the `top_k` most similar entries, most similar first.
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<String>, VectorError> {
        Ok(self
            .search_scored(query, top_k)?
            .into_iter()
            .map(|hit| hit.text)
            .collect())
    }

    /// Scored variant of [`search`](Self::search).
    ///
    /// Equal scores keep insertion order (earlier entry first).
    pub fn search_scored(&self, query: &[f32], top_k: usize) -> Result<Vec<SearchHit>, VectorError> {
        self.dimension.validate_vector(query)?;
        if self.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let mut query = query.to_vec();
        normalize_l2(&mut query);

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .chunks_exact(self.dimension.get())
            .map(|stored| dot(&query, stored))
            .enumerate()
            .collect();

        // Stable sort keeps insertion order among equal scores.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(top_k);

        Ok(scored
            .into_iter()
            .map(|(position, score)| SearchHit {
                position,
                score,
                text: self.metadata[position].clone(),
            })
            .collect())
    }

    /// Persist vectors and texts to the configured paths.
    ///
    /// On failure the previously saved artifacts stay in place.
    pub fn save_index(&self) -> Result<(), VectorError> {
        storage::write_index(
            &self.index_path,
            self.dimension.get(),
            &self.vectors,
            &self.metadata_path,
            &self.metadata,
        )?;
        tracing::info!(
            target: "vector",
            "saved {} vectors to {} and {}",
            self.len(),
            self.index_path.display(),
            self.metadata_path.display()
        );
        Ok(())
    }

    /// Replace in-memory state with the persisted artifacts.
    ///
    /// The index is left untouched when loading fails.
    pub fn load_index(&mut self) -> Result<(), VectorError> {
        let stored = storage::read_vectors(&self.index_path)?;
        if stored.dimension != self.dimension.get() {
            return Err(VectorError::DimensionMismatch {
                expected: self.dimension.get(),
                actual: stored.dimension,
            });
        }

        let metadata = storage::read_metadata(&self.metadata_path)?;
        if metadata.len() != stored.count {
            return Err(VectorError::CorruptIndex {
                path: self.metadata_path.clone(),
                reason: format!(
                    "{} chunk texts for {} vectors",
                    metadata.len(),
                    stored.count
                ),
            });
        }

        self.vectors = stored.data;
        self.metadata = metadata;
        tracing::info!(
            target: "vector",
            "loaded {} vectors (dimension {}) from {}",
            self.len(),
            self.dimension.get(),
            self.index_path.display()
        );
        Ok(())
    }
}
