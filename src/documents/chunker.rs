//! Document chunking strategies.
//!
//! Provides the `Chunker` trait and the structure-aware chunker used for
//! German regulatory texts.

use std::sync::LazyLock;

use regex::Regex;

use super::sentences::SentenceSplitter;
use super::types::Chunk;
use crate::config::ChunkingConfig;

/// Section, subsection and paragraph-symbol markers.
static BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
    match Regex::new(r"Abschnitt\s+\d+|Unterabschnitt\s+\d+\s+\w+|§\s*\d+") {
        Ok(re) => re,
        Err(e) => panic!("invalid boundary pattern: {e}"),
    }
});

/// Trait for document chunking strategies.
pub trait Chunker {
    /// Split cleaned document text into chunks in document order.
    fn chunk(&self, text: &str) -> Vec<Chunk>;
}

/// Structure-aware chunker: packs whole sections/paragraphs greedily.
///
/// Algorithm:
/// 1. Find boundary markers (`Abschnitt N`, `Unterabschnitt N Name`, `§ N`)
/// 2. Cut the text into units from one marker to the next
/// 3. Pack units into a buffer until the next one would overflow `chunk_size`
/// 4. On overflow emit the buffer and seed the next one with its last sentences
///
/// A single unit longer than `chunk_size` is never split.
#[derive(Debug)]
pub struct StructuralChunker<'s> {
    config: ChunkingConfig,
    sentences: &'s SentenceSplitter,
}

impl<'s> StructuralChunker<'s> {
    /// Create a chunker borrowing the shared sentence splitter.
    pub fn new(config: &ChunkingConfig, sentences: &'s SentenceSplitter) -> Self {
        Self {
            config: config.clone(),
            sentences,
        }
    }

    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }
}

impl Chunker for StructuralChunker<'_> {
    fn chunk(&self, text: &str) -> Vec<Chunk> {
        let units = structural_units(text, self.config.keep_preamble);
        if units.is_empty() {
            // No markers: the whole text is one chunk.
            let whole = text.trim();
            if whole.is_empty() {
                return Vec::new();
            }
            tracing::debug!(target: "chunker", "no boundary markers found, emitting whole text");
            return vec![Chunk::new(0, whole.to_string())];
        }

        tracing::info!(target: "chunker", "detected {} structural units", units.len());
        let chunks = pack_units(
            &units,
            self.config.chunk_size,
            self.config.overlap_sentences,
            self.sentences,
        );
        tracing::info!(target: "chunker", "generated {} chunks", chunks.len());
        chunks
    }
}

/// Split `text` into chunks with the given size and sentence overlap.
pub fn split_into_chunks(
    text: &str,
    chunk_size: usize,
    overlap_sentences: usize,
    sentences: &SentenceSplitter,
) -> Vec<Chunk> {
    let config = ChunkingConfig {
        chunk_size,
        overlap_sentences,
        ..ChunkingConfig::default()
    };
    StructuralChunker::new(&config, sentences).chunk(text)
}

/// Byte offsets of every boundary marker, in text order.
pub fn boundary_offsets(text: &str) -> Vec<usize> {
    BOUNDARY.find_iter(text).map(|m| m.start()).collect()
}

/// Trimmed, non-empty units between consecutive markers.
///
/// Returns an empty vector when the text has no markers.
fn structural_units(text: &str, keep_preamble: bool) -> Vec<&str> {
    let mut positions = boundary_offsets(text);
    let Some(&first) = positions.first() else {
        return Vec::new();
    };

    if first > 0 {
        if keep_preamble {
            positions.insert(0, 0);
        } else {
            tracing::debug!(
                target: "chunker",
                "skipping {} bytes of preamble before the first marker",
                first
            );
        }
    }
    positions.push(text.len());

    positions
        .windows(2)
        .map(|w| text[w[0]..w[1]].trim())
        .filter(|unit| !unit.is_empty())
        .collect()
}

/// Accumulating chunk buffer that tracks its length in characters.
#[derive(Default)]
struct Buffer {
    text: String,
    chars: usize,
}

impl Buffer {
    fn seeded(text: String) -> Self {
        let chars = text.chars().count();
        Self { text, chars }
    }

    fn push_unit(&mut self, unit: &str, unit_chars: usize) {
        self.text.push(' ');
        self.text.push_str(unit);
        self.chars += unit_chars + 1;
    }

    fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

fn pack_units(
    units: &[&str],
    chunk_size: usize,
    overlap_sentences: usize,
    sentences: &SentenceSplitter,
) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut buffer = Buffer::default();

    for unit in units {
        let unit_chars = unit.chars().count();

        if buffer.chars + unit_chars + 1 > chunk_size && !buffer.is_empty() {
            let closed = std::mem::take(&mut buffer);
            emit(&mut chunks, &closed.text);

            let overlap = if overlap_sentences == 0 {
                String::new()
            } else {
                sentences
                    .tail(&closed.text, overlap_sentences)
                    .unwrap_or(closed.text)
            };
            tracing::trace!(
                target: "chunker",
                "next chunk starts with overlap: {}",
                overlap.trim().chars().take(60).collect::<String>()
            );
            buffer = Buffer::seeded(overlap);
        }

        buffer.push_unit(unit, unit_chars);
    }

    emit(&mut chunks, &buffer.text);
    chunks
}

fn emit(chunks: &mut Vec<Chunk>, text: &str) {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return;
    }
    tracing::debug!(
        target: "chunker",
        "chunk {} ({} chars): {}...",
        chunks.len(),
        trimmed.chars().count(),
        trimmed.chars().take(60).collect::<String>()
    );
    chunks.push(Chunk::new(chunks.len(), trimmed.to_string()));
}
