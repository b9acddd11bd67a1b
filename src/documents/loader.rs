//! Document loading and text cleanup.
//!
//! Regulatory texts exported from PDF carry line-break hyphenation and
//! hard-wrapped lines. [`clean_text`] normalizes them into a single run of
//! text; [`DocumentLoader`] reads a file, cleans it and keeps a copy of the
//! cleaned text next to the source for inspection.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use super::DocumentError;
use crate::config::DocumentConfig;

static LINE_END_HYPHEN: LazyLock<Regex> = LazyLock::new(|| compile(r"-\s*\n\s*"));
static HYPHEN_SPACE: LazyLock<Regex> = LazyLock::new(|| compile(r"-\s+"));
static DASH_SPACE: LazyLock<Regex> = LazyLock::new(|| compile(r"[-–—]\s+"));
static SPLIT_WORD: LazyLock<Regex> = LazyLock::new(|| compile(r"(\w+)-\s+(\w+)"));
static BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| compile(r"\n\s*\n"));
static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| compile(r"\s+"));

fn compile(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(re) => re,
        Err(e) => panic!("invalid built-in cleanup pattern {pattern:?}: {e}"),
    }
}

/// Apply the cleanup rules in order.
///
/// 1. end-of-line hyphenation (`einzu-\nstufen` -> `einzustufen`)
/// 2. hyphen followed by whitespace inside a line (`Ab- satz` -> `Absatz`)
/// 3. any dash variant followed by whitespace
/// 4. leftover `word- word` splits
/// 5. blank-line runs become one paragraph break, single breaks become spaces
/// 6. whitespace runs collapse to one space
pub fn clean_text(raw: &str) -> String {
    let text = LINE_END_HYPHEN.replace_all(raw, "");
    let text = HYPHEN_SPACE.replace_all(&text, "");
    let text = DASH_SPACE.replace_all(&text, "");
    let text = SPLIT_WORD.replace_all(&text, "${1}${2}");
    let text = BLANK_LINES.replace_all(&text, "\n\n");
    let text = text.replace('\n', " ");
    WHITESPACE_RUN.replace_all(&text, " ").into_owned()
}

/// Path of the cleaned copy: `<stem><suffix>.<ext>` beside the source.
pub fn cleaned_path(source: &Path, suffix: &str) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match source.extension() {
        Some(ext) => format!("{stem}{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}{suffix}.txt"),
    };
    source.with_file_name(file_name)
}

/// Reads and cleans source documents.
#[derive(Debug, Clone)]
pub struct DocumentLoader {
    cleaned_suffix: String,
}

impl DocumentLoader {
    pub fn new(config: &DocumentConfig) -> Self {
        Self {
            cleaned_suffix: config.cleaned_suffix.clone(),
        }
    }

    /// Load `path`, clean it and write the cleaned copy beside it.
    pub fn load(&self, path: &Path) -> Result<String, DocumentError> {
        let raw = std::fs::read_to_string(path).map_err(|source| DocumentError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(
            target: "documents",
            "loaded {} ({} chars)",
            path.display(),
            raw.chars().count()
        );

        let text = clean_text(&raw);
        tracing::debug!(
            target: "documents",
            "cleaned text: {} chars, preview: {}",
            text.chars().count(),
            text.chars().take(500).collect::<String>()
        );

        let cleaned = cleaned_path(path, &self.cleaned_suffix);
        std::fs::write(&cleaned, &text).map_err(|source| DocumentError::Write {
            path: cleaned.clone(),
            source,
        })?;
        tracing::info!(target: "documents", "cleaned copy written to {}", cleaned.display());

        Ok(text)
    }
}

impl Default for DocumentLoader {
    fn default() -> Self {
        Self::new(&DocumentConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_line_end_hyphenation_rejoined() {
        assert_eq!(clean_text("einzu-\nstufen"), "einzustufen");
        assert_eq!(clean_text("einzu-  \n   stufen"), "einzustufen");
    }

    #[test]
    fn test_inline_hyphen_space_rejoined() {
        assert_eq!(clean_text("Ab- satz"), "Absatz");
        assert_eq!(clean_text("Sicher- heitsabstandes"), "Sicherheitsabstandes");
    }

    #[test]
    fn test_dash_variants_removed() {
        assert_eq!(clean_text("Boden– material"), "Bodenmaterial");
        assert_eq!(clean_text("Boden— material"), "Bodenmaterial");
    }

    #[test]
    fn test_compound_hyphen_without_space_kept() {
        assert_eq!(clean_text("Bundes-Bodenschutzgesetz"), "Bundes-Bodenschutzgesetz");
    }

    #[test]
    fn test_line_breaks_and_whitespace_collapsed() {
        let raw = "§ 1 Anwendungsbereich\nDiese Verordnung\n\n\n§ 2   Begriffe\t gelten.";
        assert_eq!(
            clean_text(raw),
            "§ 1 Anwendungsbereich Diese Verordnung § 2 Begriffe gelten."
        );
    }

    #[test]
    fn test_cleaned_path() {
        assert_eq!(
            cleaned_path(Path::new("data/mantel.txt"), "_bereinigt"),
            PathBuf::from("data/mantel_bereinigt.txt")
        );
        assert_eq!(
            cleaned_path(Path::new("data/mantel"), "_clean"),
            PathBuf::from("data/mantel_clean.txt")
        );
    }

    #[test]
    fn test_load_writes_cleaned_copy() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("verordnung.txt");
        std::fs::write(&source, "§ 1 Ab-\nfall ist\nzu ver- werten.").unwrap();

        let loader = DocumentLoader::default();
        let text = loader.load(&source).unwrap();
        assert_eq!(text, "§ 1 Abfall ist zu verwerten.");

        let copy = temp_dir.path().join("verordnung_bereinigt.txt");
        assert_eq!(std::fs::read_to_string(copy).unwrap(), text);
    }

    #[test]
    fn test_load_missing_file() {
        let loader = DocumentLoader::default();
        let result = loader.load(Path::new("/definitely/not/here.txt"));
        assert!(matches!(result, Err(DocumentError::Read { .. })));
    }
}
