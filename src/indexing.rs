//! Batch ingestion: document -> chunks -> embeddings -> persisted index.
//!
//! Everything is computed in memory first; the index artifacts are written
//! only after every chunk has been embedded and inserted, so a failed run
//! never leaves a partial index on disk.

use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::config::Settings;
use crate::documents::{Chunk, Chunker, DocumentLoader, SentenceSplitter, StructuralChunker};
use crate::embedding::{EmbeddingProvider, embed_batched};
use crate::error::{RagError, RagResult};
use crate::vector::VectorIndex;

/// Summary of a completed ingestion run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestReport {
    pub chunk_count: usize,
    pub dimension: usize,
    pub elapsed: Duration,
}

/// Load and chunk the configured document without embedding it.
pub fn chunk_document(settings: &Settings, splitter: &SentenceSplitter) -> RagResult<Vec<Chunk>> {
    let path = &settings.document.path;
    let text = DocumentLoader::new(&settings.document).load(path)?;
    let chunks = StructuralChunker::new(&settings.chunking, splitter).chunk(&text);
    crate::log_event!("ingest", "chunked", "{} chunks from {}", chunks.len(), path.display());
    if let Some(first) = chunks.first() {
        crate::debug_event!("ingest", "first chunk", "{}...", first.preview(500));
    }
    Ok(chunks)
}

/// Build the index from `settings.document.path` and persist it.
///
/// The provider's dimension must equal `settings.index.embedding_dim`.
pub fn build_index<P>(
    settings: &Settings,
    splitter: &SentenceSplitter,
    provider: &P,
) -> RagResult<IngestReport>
where
    P: EmbeddingProvider + ?Sized,
{
    let started = Instant::now();
    let dimension = settings.index.embedding_dim;
    if provider.dimension() != dimension {
        return Err(RagError::Config(format!(
            "embedding model produces {}-dimensional vectors but index.embedding_dim is {dimension}",
            provider.dimension()
        )));
    }

    let chunks = chunk_document(settings, splitter)?;
    let texts: Vec<&str> = chunks.iter().map(|chunk| chunk.text.as_str()).collect();

    let bar = embedding_progress(texts.len() as u64);
    let vectors = embed_batched(provider, &texts, settings.embedding.batch_size, |done| {
        bar.set_position(done as u64)
    });
    bar.finish_and_clear();
    let vectors = vectors?;

    let mut index = VectorIndex::new(&settings.index)?;
    index.add_embeddings(&vectors, &texts)?;
    index.save_index()?;

    let report = IngestReport {
        chunk_count: index.len(),
        dimension,
        elapsed: started.elapsed(),
    };
    crate::log_event!(
        "ingest",
        "index saved",
        "{} chunks, dimension {}, {:.2?}",
        report.chunk_count,
        report.dimension,
        report.elapsed
    );
    Ok(report)
}

fn embedding_progress(len: u64) -> ProgressBar {
    let bar = ProgressBar::new(len);
    if let Ok(style) =
        ProgressStyle::with_template("{spinner} embedding [{bar:32}] {pos}/{len} chunks ({elapsed})")
    {
        bar.set_style(style.progress_chars("=> "));
    }
    bar
}
