//! Retrieval-augmented question answering over German regulatory texts.
//!
//! Ingestion cleans one source document, cuts it into structure-aware
//! chunks, embeds them and persists a flat inner-product index. Queries embed
//! the question, retrieve the closest chunks and hand them to an answer
//! generator as context.

pub mod cli;
pub mod config;
pub mod documents;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod indexing;
pub mod logging;
pub mod query;
pub mod vector;

pub use config::Settings;
pub use documents::{Chunk, Chunker, DocumentLoader, SentenceSplitter, StructuralChunker};
pub use embedding::{EmbeddingError, EmbeddingProvider, FastEmbedProvider};
pub use error::{RagError, RagResult};
pub use generation::{AnswerGenerator, FALLBACK_ANSWER, GenerationError, OpenAiGenerator};
pub use indexing::{IngestReport, build_index, chunk_document};
pub use query::{Answer, QueryOrchestrator};
pub use vector::{SearchHit, VectorError, VectorIndex};
