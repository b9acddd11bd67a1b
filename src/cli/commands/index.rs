//! Index command - build the vector index from the source document.

use std::path::PathBuf;

use anyhow::{Context, Result};
use console::style;

use crate::config::Settings;
use crate::documents::SentenceSplitter;
use crate::embedding::{EmbeddingProvider, FastEmbedProvider};
use crate::error::RagError;
use crate::indexing::{self, IngestReport};
use crate::vector::VectorIndex;

/// Run the index command.
pub fn run(settings: &Settings, document: Option<PathBuf>, force: bool, dry_run: bool) -> Result<()> {
    let mut settings = settings.clone();
    if let Some(path) = document {
        settings.document.path = path;
    }
    let splitter = SentenceSplitter::new();

    if dry_run {
        let chunks = indexing::chunk_document(&settings, &splitter)
            .with_context(|| format!("failed to chunk {}", settings.document.path.display()))?;
        println!(
            "{} chunks from {} (dry run, nothing written)",
            chunks.len(),
            settings.document.path.display()
        );
        for chunk in chunks.iter().take(3) {
            println!(
                "\n{} ({} chars)\n{}...",
                style(format!("Chunk {}", chunk.index)).cyan().bold(),
                chunk.char_count(),
                chunk.preview(500)
            );
        }
        return Ok(());
    }

    let index = VectorIndex::new(&settings.index).map_err(RagError::from)?;
    if index.exists() && !force {
        println!(
            "Index already exists at {}. Use --force to rebuild.",
            index.index_path().display()
        );
        return Ok(());
    }

    let provider = FastEmbedProvider::from_config(&settings.embedding).map_err(RagError::from)?;
    let report = build(&settings, &splitter, &provider)?;
    print_report(&settings, &report);
    Ok(())
}

/// Build the index unless both artifacts already exist.
///
/// Returns the report when a build happened.
pub fn ensure_index<P>(
    settings: &Settings,
    splitter: &SentenceSplitter,
    provider: &P,
) -> Result<Option<IngestReport>>
where
    P: EmbeddingProvider + ?Sized,
{
    if VectorIndex::new(&settings.index).map_err(RagError::from)?.exists() {
        tracing::debug!(target: "ingest", "index present, skipping build");
        return Ok(None);
    }
    eprintln!("No index found, building it from {}", settings.document.path.display());
    let report = build(settings, splitter, provider)?;
    print_report(settings, &report);
    Ok(Some(report))
}

fn build<P>(settings: &Settings, splitter: &SentenceSplitter, provider: &P) -> Result<IngestReport>
where
    P: EmbeddingProvider + ?Sized,
{
    indexing::build_index(settings, splitter, provider)
        .with_context(|| format!("failed to index {}", settings.document.path.display()))
}

fn print_report(settings: &Settings, report: &IngestReport) {
    eprintln!(
        "{} Indexed {} chunks ({} dimensions) in {:.1?}",
        style("✓").green(),
        report.chunk_count,
        report.dimension,
        report.elapsed
    );
    eprintln!("  vectors:  {}", settings.index.index_path.display());
    eprintln!("  metadata: {}", settings.index.metadata_path.display());
}

/// Fail when the persisted index and the embedding model disagree on dimension.
pub fn check_dimension<P>(index: &VectorIndex, provider: &P) -> Result<(), RagError>
where
    P: EmbeddingProvider + ?Sized,
{
    if index.dimension() != provider.dimension() {
        return Err(RagError::Config(format!(
            "embedding model produces {}-dimensional vectors but the index expects {}",
            provider.dimension(),
            index.dimension()
        )));
    }
    Ok(())
}
