//! Configuration module for the retrieval pipeline.
//!
//! Settings are layered, later layers winning:
//! - Default values
//! - TOML configuration file (`.lexrag/settings.toml` or `--config`)
//! - Environment variable overrides
//!
//! `lexrag index --document <PATH>` replaces `document.path` for that run only.
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `LEXRAG_` and use double underscores
//! to separate nested levels:
//! - `LEXRAG_CHUNKING__CHUNK_SIZE=1500` sets `chunking.chunk_size`
//! - `LEXRAG_RETRIEVAL__TOP_K=8` sets `retrieval.top_k`
//! - `LEXRAG_LOGGING__DEFAULT=debug` sets `logging.default`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Directory holding the workspace configuration.
pub const CONFIG_DIR: &str = ".lexrag";

/// File name of the workspace configuration inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "settings.toml";

const ENV_PREFIX: &str = "LEXRAG_";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Vector index dimensions and artifact locations
    #[serde(default)]
    pub index: IndexConfig,

    /// Structural chunking parameters
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Source document settings
    #[serde(default)]
    pub document: DocumentConfig,

    /// Embedding model settings
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Answer generation settings
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Retrieval settings
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Persisted vector index layout.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct IndexConfig {
    /// Dimension every stored vector must have
    #[serde(default = "default_embedding_dim")]
    pub embedding_dim: usize,

    /// Binary vector artifact
    #[serde(default = "default_index_path")]
    pub index_path: PathBuf,

    /// Chunk text artifact, parallel to the vectors
    #[serde(default = "default_metadata_path")]
    pub metadata_path: PathBuf,
}

/// Parameters of the structure-aware chunker.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ChunkingConfig {
    /// Maximum characters per chunk (single oversized units are emitted whole)
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Trailing sentences of a closed chunk carried into the next one
    #[serde(default = "default_overlap_sentences")]
    pub overlap_sentences: usize,

    /// Keep text preceding the first boundary marker as its own unit
    #[serde(default = "default_false")]
    pub keep_preamble: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct DocumentConfig {
    /// Source document ingested when no index exists
    #[serde(default = "default_document_path")]
    pub path: PathBuf,

    /// Suffix appended to the file stem for the cleaned copy
    #[serde(default = "default_cleaned_suffix")]
    pub cleaned_suffix: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct EmbeddingConfig {
    /// Model to use for embeddings
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Number of texts handed to the model per call
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Show model download progress on first use
    #[serde(default = "default_true")]
    pub show_download_progress: bool,

    /// Model cache directory (defaults to the user cache dir)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GenerationConfig {
    /// Chat model used for answers
    #[serde(default = "default_generation_model")]
    pub model: String,

    /// Maximum tokens in a generated answer
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Base URL of an OpenAI-compatible API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Environment variable holding the API credential
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct RetrievalConfig {
    /// Number of chunks retrieved per question
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

/// Logging configuration.
///
/// Controls log verbosity globally and per-module.
/// `RUST_LOG` environment variable takes precedence when set.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Default level for all modules: error, warn, info, debug, trace
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-module overrides, e.g. `chunker = "debug"`
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

// Default value functions
fn default_version() -> u32 {
    1
}
fn default_embedding_dim() -> usize {
    768
}
fn default_index_path() -> PathBuf {
    PathBuf::from("vector_store/vectors.idx")
}
fn default_metadata_path() -> PathBuf {
    PathBuf::from("vector_store/metadata.json")
}
fn default_chunk_size() -> usize {
    2000
}
fn default_overlap_sentences() -> usize {
    2
}
fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}
fn default_document_path() -> PathBuf {
    PathBuf::from("./data/mantelverordnung_cleaned.txt")
}
fn default_cleaned_suffix() -> String {
    "_bereinigt".to_string()
}
fn default_embedding_model() -> String {
    "MultilingualE5Base".to_string()
}
fn default_batch_size() -> usize {
    16
}
fn default_generation_model() -> String {
    "gpt-4".to_string()
}
fn default_max_tokens() -> usize {
    500
}
fn default_temperature() -> f64 {
    0.7
}
fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_timeout_secs() -> u64 {
    60
}
fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}
fn default_top_k() -> usize {
    5
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            index: IndexConfig::default(),
            chunking: ChunkingConfig::default(),
            document: DocumentConfig::default(),
            embedding: EmbeddingConfig::default(),
            generation: GenerationConfig::default(),
            retrieval: RetrievalConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            embedding_dim: default_embedding_dim(),
            index_path: default_index_path(),
            metadata_path: default_metadata_path(),
        }
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            overlap_sentences: default_overlap_sentences(),
            keep_preamble: false,
        }
    }
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            path: default_document_path(),
            cleaned_suffix: default_cleaned_suffix(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            batch_size: default_batch_size(),
            show_download_progress: true,
            cache_dir: None,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: default_generation_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            api_key_env: default_api_key_env(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

impl Settings {
    /// Load configuration from all sources.
    ///
    /// An explicit path wins over the workspace lookup.
    pub fn load(explicit: Option<&Path>) -> Result<Self, Box<figment::Error>> {
        let config_path = match explicit {
            Some(path) => path.to_path_buf(),
            None => Self::find_workspace_config()
                .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join(CONFIG_FILE)),
        };
        Self::load_from(config_path)
    }

    /// Load configuration from a specific file, still honouring env overrides
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            // Double underscore separates nesting levels; single underscores
            // stay part of the field name.
            .merge(Env::prefixed(ENV_PREFIX).map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
            .extract()
            .map_err(Box::new)
    }

    /// Find the workspace config by walking up from the current directory
    fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        current
            .ancestors()
            .map(|ancestor| ancestor.join(CONFIG_DIR))
            .find(|dir| dir.is_dir())
            .map(|dir| dir.join(CONFIG_FILE))
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<(), String> {
        if self.index.embedding_dim == 0 {
            return Err("index.embedding_dim must be greater than zero".to_string());
        }
        if self.index.index_path == self.index.metadata_path {
            return Err(format!(
                "index.index_path and index.metadata_path must differ (both are {})",
                self.index.index_path.display()
            ));
        }
        if self.chunking.chunk_size == 0 {
            return Err("chunking.chunk_size must be greater than zero".to_string());
        }
        if self.embedding.batch_size == 0 {
            return Err("embedding.batch_size must be greater than zero".to_string());
        }
        if self.retrieval.top_k == 0 {
            return Err("retrieval.top_k must be greater than zero".to_string());
        }
        Ok(())
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Create a default settings file in the current directory
    pub fn init_config_file(force: bool) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = PathBuf::from(CONFIG_DIR).join(CONFIG_FILE);

        if !force && config_path.exists() {
            return Err("Configuration file already exists. Use --force to overwrite".into());
        }

        Settings::default().save(&config_path)?;
        Ok(config_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.version, 1);
        assert_eq!(settings.index.embedding_dim, 768);
        assert_eq!(settings.chunking.chunk_size, 2000);
        assert_eq!(settings.chunking.overlap_sentences, 2);
        assert_eq!(settings.retrieval.top_k, 5);
        assert_eq!(settings.generation.max_tokens, 500);
        assert_eq!(settings.logging.default, "warn");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_load_from_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("settings.toml");

        let toml_content = r#"
version = 2

[index]
embedding_dim = 384
index_path = "store/a.idx"
metadata_path = "store/a.json"

[chunking]
chunk_size = 1200
overlap_sentences = 1

[generation]
model = "gpt-4o-mini"
temperature = 0.2
"#;

        fs::write(&config_path, toml_content).unwrap();

        let settings = Settings::load_from(&config_path).unwrap();
        assert_eq!(settings.version, 2);
        assert_eq!(settings.index.embedding_dim, 384);
        assert_eq!(settings.index.index_path, PathBuf::from("store/a.idx"));
        assert_eq!(settings.chunking.chunk_size, 1200);
        assert_eq!(settings.chunking.overlap_sentences, 1);
        assert_eq!(settings.generation.model, "gpt-4o-mini");
        assert!((settings.generation.temperature - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("settings.toml");

        fs::write(&config_path, "[retrieval]\ntop_k = 3\n").unwrap();

        let settings = Settings::load_from(&config_path).unwrap();
        assert_eq!(settings.retrieval.top_k, 3);
        assert_eq!(settings.index.embedding_dim, 768);
        assert_eq!(settings.embedding.model, "MultilingualE5Base");
        assert_eq!(settings.document.cleaned_suffix, "_bereinigt");
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Settings::load_from(temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(settings.index, IndexConfig::default());
    }

    #[test]
    fn test_save_settings() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("settings.toml");

        let mut settings = Settings::default();
        settings.chunking.chunk_size = 900;
        settings
            .logging
            .modules
            .insert("chunker".to_string(), "debug".to_string());

        settings.save(&config_path).unwrap();

        let loaded = Settings::load_from(&config_path).unwrap();
        assert_eq!(loaded.chunking.chunk_size, 900);
        assert_eq!(loaded.logging.modules["chunker"], "debug");
    }

    #[test]
    fn test_validation() {
        let mut settings = Settings::default();
        settings.chunking.chunk_size = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.index.metadata_path = settings.index.index_path.clone();
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.retrieval.top_k = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.index.embedding_dim = 0;
        assert!(settings.validate().is_err());
    }
}
