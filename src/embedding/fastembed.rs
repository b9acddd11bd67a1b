//! Local ONNX embedding models via fastembed.

use std::path::PathBuf;

use ::fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use parking_lot::Mutex;

use super::{EmbeddingError, EmbeddingProvider};
use crate::config::EmbeddingConfig;

/// Resolve a configured model name to a fastembed model.
///
/// Matching ignores case and `-`/`_` separators.
pub fn parse_model(name: &str) -> Result<EmbeddingModel, EmbeddingError> {
    let key: String = name
        .chars()
        .filter(|c| !matches!(c, '-' | '_'))
        .collect::<String>()
        .to_ascii_lowercase();

    let model = match key.as_str() {
        "multilinguale5small" => EmbeddingModel::MultilingualE5Small,
        "multilinguale5base" => EmbeddingModel::MultilingualE5Base,
        "multilinguale5large" => EmbeddingModel::MultilingualE5Large,
        "paraphrasemlmpnetbasev2" => EmbeddingModel::ParaphraseMLMpnetBaseV2,
        "paraphrasemlminilml12v2" => EmbeddingModel::ParaphraseMLMiniLML12V2,
        "allminilml6v2" => EmbeddingModel::AllMiniLML6V2,
        "allminilml12v2" => EmbeddingModel::AllMiniLML12V2,
        "bgesmallenv15" => EmbeddingModel::BGESmallENV15,
        "bgebaseenv15" => EmbeddingModel::BGEBaseENV15,
        "bgelargeenv15" => EmbeddingModel::BGELargeENV15,
        _ => return Err(EmbeddingError::UnknownModel(name.to_string())),
    };
    Ok(model)
}

/// Default location for downloaded model files.
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("lexrag").join("models"))
        .unwrap_or_else(|| PathBuf::from(".lexrag").join("models"))
}

/// Embedding provider backed by a local fastembed model.
pub struct FastEmbedProvider {
    /// fastembed needs `&mut` to embed
    model: Mutex<TextEmbedding>,
    model_name: String,
    dimension: usize,
    batch_size: usize,
}

impl FastEmbedProvider {
    /// Load the configured model, downloading it on first use.
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self, EmbeddingError> {
        let model = parse_model(&config.model)?;
        let cache_dir = config.cache_dir.clone().unwrap_or_else(default_cache_dir);

        tracing::info!(
            target: "embedding",
            "loading embedding model {} (cache: {})",
            config.model,
            cache_dir.display()
        );

        let mut text_model = TextEmbedding::try_new(
            InitOptions::new(model)
                .with_cache_dir(cache_dir)
                .with_show_download_progress(config.show_download_progress),
        )
        .map_err(|e| EmbeddingError::ModelInit(e.to_string()))?;

        // Probe the output dimension once.
        let probe = text_model
            .embed(vec!["test"], None)
            .map_err(|e| EmbeddingError::Embedding(e.to_string()))?;
        let dimension = probe
            .first()
            .map(Vec::len)
            .ok_or_else(|| EmbeddingError::ModelInit("model returned no probe embedding".to_string()))?;

        tracing::info!(
            target: "embedding",
            "embedding model ready: {} ({dimension} dimensions)",
            config.model
        );

        Ok(Self {
            model: Mutex::new(text_model),
            model_name: config.model.clone(),
            dimension,
            batch_size: config.batch_size.max(1),
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

impl EmbeddingProvider for FastEmbedProvider {
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.model
            .lock()
            .embed(texts.to_vec(), Some(self.batch_size))
            .map_err(|e| EmbeddingError::Embedding(e.to_string()))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
