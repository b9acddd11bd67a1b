//! Dense vector index for chunk retrieval.
//!
//! Exact cosine-similarity search over L2-normalized embeddings, persisted
//! as a memory-mapped binary artifact plus a JSON list of chunk texts.

pub mod index;
pub mod storage;
pub mod types;

pub use index::VectorIndex;
pub use types::{SearchHit, VectorDimension, dot, normalize_l2};

use std::path::PathBuf;
use thiserror::Error;

/// Errors from building, searching or persisting the vector index.
#[derive(Error, Debug)]
pub enum VectorError {
    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Got {vectors} vectors but {texts} chunk texts")]
    CountMismatch { vectors: usize, texts: usize },

    #[error("Invalid vector dimension: {0}")]
    InvalidDimension(usize),

    #[error("Corrupt index artifact {path}: {reason}")]
    CorruptIndex { path: PathBuf, reason: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid chunk metadata in {path}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
