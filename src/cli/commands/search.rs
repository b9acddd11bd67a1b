//! Search command - retrieval without answer generation.

use anyhow::{Result, bail};
use console::style;
use serde::Serialize;

use super::index::check_dimension;
use crate::config::Settings;
use crate::embedding::FastEmbedProvider;
use crate::error::RagError;
use crate::query;
use crate::vector::{SearchHit, VectorIndex};

#[derive(Serialize)]
struct SearchOutput<'a> {
    query: &'a str,
    results: &'a [SearchHit],
}

/// Run the search command.
pub fn run(settings: &Settings, query_text: &str, limit: Option<usize>, json: bool) -> Result<()> {
    let index = VectorIndex::open(&settings.index).map_err(RagError::from)?;
    if index.is_empty() {
        bail!(
            "Index at {} is empty or missing. Run 'lexrag index' first",
            settings.index.index_path.display()
        );
    }

    let provider = FastEmbedProvider::from_config(&settings.embedding).map_err(RagError::from)?;
    check_dimension(&index, &provider)?;

    let top_k = limit.unwrap_or(settings.retrieval.top_k);
    let hits = query::retrieve(&index, &provider, query_text, top_k)?;

    if json {
        let output = SearchOutput {
            query: query_text,
            results: &hits,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if hits.is_empty() {
        println!("No results for: {query_text}");
        return Ok(());
    }
    print_hits(&hits);
    Ok(())
}

/// Print scored chunks, most similar first.
pub fn print_hits(hits: &[SearchHit]) {
    for (rank, hit) in hits.iter().enumerate() {
        println!(
            "{} {} {}",
            style(format!("{}.", rank + 1)).cyan().bold(),
            style(format!("[{:.3}]", hit.score)).dim(),
            style(format!("chunk #{}", hit.position)).dim()
        );
        println!("{}\n", hit.text);
    }
}
