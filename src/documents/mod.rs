//! Document loading and chunking for retrieval.
//!
//! This module provides:
//! - Text cleanup for PDF-exported regulatory documents
//! - Sentence boundary detection tuned for German legal prose
//! - Structure-aware chunking on section and paragraph markers

pub mod chunker;
pub mod loader;
pub mod sentences;
pub mod types;

pub use chunker::{Chunker, StructuralChunker, boundary_offsets, split_into_chunks};
pub use loader::{DocumentLoader, clean_text, cleaned_path};
pub use sentences::SentenceSplitter;
pub use types::Chunk;

use std::path::PathBuf;
use thiserror::Error;

/// Errors from reading or writing documents.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Failed to read document {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write cleaned document {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
