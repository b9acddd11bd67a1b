//! Core types for document chunking.

use serde::{Deserialize, Serialize};

/// A retrieval unit cut from one cleaned document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Position in emission order (0-based), for diagnostics only.
    pub index: usize,

    /// Trimmed, non-empty chunk text.
    pub text: String,
}

impl Chunk {
    /// Create a new chunk.
    pub fn new(index: usize, text: String) -> Self {
        Self { index, text }
    }

    /// Get character count.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Get a preview of the content (first N characters).
    pub fn preview(&self, max_chars: usize) -> &str {
        match self.text.char_indices().nth(max_chars) {
            Some((end, _)) => &self.text[..end],
            None => &self.text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_count_counts_umlauts_once() {
        let chunk = Chunk::new(0, "§ 2 Böden".to_string());
        assert_eq!(chunk.char_count(), 9);
    }

    #[test]
    fn test_preview_respects_char_boundaries() {
        let chunk = Chunk::new(0, "Überwachung".to_string());
        assert_eq!(chunk.preview(3), "Übe");
        assert_eq!(chunk.preview(100), "Überwachung");
    }
}
