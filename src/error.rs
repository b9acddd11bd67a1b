//! Crate-level error type.

use thiserror::Error;

use crate::documents::DocumentError;
use crate::embedding::EmbeddingError;
use crate::generation::GenerationError;
use crate::vector::VectorError;

/// Any failure surfaced by the ingestion or query pipeline.
#[derive(Error, Debug)]
pub enum RagError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Vector(#[from] VectorError),

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type RagResult<T> = Result<T, RagError>;

impl RagError {
    /// Hints printed below the error message by the CLI.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::Document(DocumentError::Read { .. }) => vec![
                "Check that [document] path in .lexrag/settings.toml points to an existing file",
                "Or pass the file explicitly with 'lexrag index --document <PATH>'",
            ],
            Self::Document(DocumentError::Write { .. }) => {
                vec!["Make sure the document directory is writable"]
            }
            Self::Vector(VectorError::DimensionMismatch { .. }) => vec![
                "The index was built with a different embedding dimension",
                "Set [index] embedding_dim to the model dimension and run 'lexrag index --force'",
            ],
            Self::Vector(VectorError::CorruptIndex { .. } | VectorError::Metadata { .. }) => {
                vec!["Rebuild the index with 'lexrag index --force'"]
            }
            Self::Vector(VectorError::Io { .. }) => {
                vec!["Check that the vector_store directory exists and is writable"]
            }
            Self::Embedding(EmbeddingError::UnknownModel(_)) => vec![
                "Use one of: MultilingualE5Small, MultilingualE5Base, MultilingualE5Large, ParaphraseMLMpnetBaseV2, AllMiniLML6V2",
            ],
            Self::Embedding(EmbeddingError::ModelInit(_)) => vec![
                "The model is downloaded on first use; check network access and the cache directory",
            ],
            Self::Generation(GenerationError::MissingApiKey(_)) => {
                vec!["Export the API key, e.g. 'export OPENAI_API_KEY=sk-...'"]
            }
            Self::Config(_) => vec!["Run 'lexrag config' to inspect the effective settings"],
            _ => Vec::new(),
        }
    }
}
