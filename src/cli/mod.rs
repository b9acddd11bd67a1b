//! CLI module for the question answering pipeline.
//!
//! Provides command-line interface parsing and command dispatch.

pub mod args;
pub mod commands;

pub use args::{Cli, Commands};

use crate::error::RagError;

/// Print an error with its recovery hints to stderr.
pub fn report_error(err: &anyhow::Error) {
    eprintln!("Error: {err:#}");

    let suggestions = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<RagError>())
        .map(RagError::recovery_suggestions)
        .unwrap_or_default();
    if !suggestions.is_empty() {
        eprintln!("\nSuggestions:");
        for suggestion in suggestions {
            eprintln!("  - {suggestion}");
        }
    }
}
