//! Question answering over the vector index.
//!
//! One question runs embed -> search -> join context -> generate. Embedding
//! and index failures abort the question; generation failures are logged and
//! replaced by [`FALLBACK_ANSWER`] so an interactive session keeps going.

use serde::Serialize;

use crate::config::Settings;
use crate::embedding::{EmbeddingProvider, embed_one};
use crate::error::RagResult;
use crate::generation::{AnswerGenerator, FALLBACK_ANSWER};
use crate::vector::{SearchHit, VectorIndex};

/// Separator between context chunks handed to the generator.
pub const CONTEXT_SEPARATOR: &str = "\n";

/// Result of answering one question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub question: String,

    /// Retrieved chunk texts, most similar first.
    pub context_chunks: Vec<String>,

    pub text: String,

    /// Set when generation failed and `text` is the fallback message.
    pub fallback: bool,
}

/// Embed `question` and return the `top_k` closest chunks with scores.
pub fn retrieve<E>(
    index: &VectorIndex,
    embedder: &E,
    question: &str,
    top_k: usize,
) -> RagResult<Vec<SearchHit>>
where
    E: EmbeddingProvider + ?Sized,
{
    let query = embed_one(embedder, question)?;
    let hits = index.search_scored(&query, top_k)?;
    tracing::debug!(
        target: "query",
        "retrieved {} chunks (best score {:?})",
        hits.len(),
        hits.first().map(|hit| hit.score)
    );
    Ok(hits)
}

/// Join chunk texts in retrieval order.
pub fn build_context<S: AsRef<str>>(chunks: &[S]) -> String {
    chunks
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

/// Ties retrieval and generation together for one question at a time.
pub struct QueryOrchestrator<E, G> {
    index: VectorIndex,
    embedder: E,
    generator: G,
    top_k: usize,
    max_tokens: usize,
}

impl<E, G> QueryOrchestrator<E, G>
where
    E: EmbeddingProvider,
    G: AnswerGenerator,
{
    pub fn new(index: VectorIndex, embedder: E, generator: G, top_k: usize, max_tokens: usize) -> Self {
        Self {
            index,
            embedder,
            generator,
            top_k,
            max_tokens,
        }
    }

    /// Orchestrator using `retrieval.top_k` and `generation.max_tokens`.
    pub fn from_settings(index: VectorIndex, embedder: E, generator: G, settings: &Settings) -> Self {
        Self::new(
            index,
            embedder,
            generator,
            settings.retrieval.top_k,
            settings.generation.max_tokens,
        )
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Scored context chunks for `question`, without generating.
    pub fn retrieve(&self, question: &str) -> RagResult<Vec<SearchHit>> {
        retrieve(&self.index, &self.embedder, question, self.top_k)
    }

    /// Answer `question` from the indexed context.
    pub fn answer(&self, question: &str) -> RagResult<Answer> {
        let context_chunks: Vec<String> = self
            .retrieve(question)?
            .into_iter()
            .map(|hit| hit.text)
            .collect();
        let context = build_context(&context_chunks);
        tracing::debug!(
            target: "query",
            "context: {} chunks, {} chars",
            context_chunks.len(),
            context.chars().count()
        );

        let (text, fallback) = match self.generator.generate(question, &context, self.max_tokens) {
            Ok(text) => (text, false),
            Err(e) => {
                tracing::error!(target: "query", "answer generation failed: {e}");
                (FALLBACK_ANSWER.to_string(), true)
            }
        };

        Ok(Answer {
            question: question.to_string(),
            context_chunks,
            text,
            fallback,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IndexConfig;
    use crate::embedding::EmbeddingError;
    use crate::error::RagError;
    use crate::generation::GenerationError;
    use std::cell::RefCell;
    use tempfile::TempDir;

    /// Two-dimensional embedding: Boden-ness and Deponie-ness.
    struct KeywordEmbedder;

    impl EmbeddingProvider for KeywordEmbedder {
        fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Ok(texts
                .iter()
                .map(|t| {
                    let lower = t.to_lowercase();
                    vec![
                        lower.matches("boden").count() as f32,
                        lower.matches("deponie").count() as f32,
                    ]
                })
                .collect())
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    struct FailingEmbedder;

    impl EmbeddingProvider for FailingEmbedder {
        fn embed(&self, _texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Err(EmbeddingError::Embedding("model unavailable".to_string()))
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    /// Records the context it was called with and echoes it back.
    #[derive(Default)]
    struct EchoGenerator {
        calls: RefCell<Vec<(String, String, usize)>>,
    }

    impl AnswerGenerator for EchoGenerator {
        fn generate(
            &self,
            question: &str,
            context: &str,
            max_tokens: usize,
        ) -> Result<String, GenerationError> {
            self.calls
                .borrow_mut()
                .push((question.to_string(), context.to_string(), max_tokens));
            Ok(format!("Antwort auf: {question}"))
        }
    }

    struct FailingGenerator;

    impl AnswerGenerator for FailingGenerator {
        fn generate(&self, _: &str, _: &str, _: usize) -> Result<String, GenerationError> {
            Err(GenerationError::Status {
                status: 500,
                body: "internal".to_string(),
            })
        }
    }

    fn sample_index(dir: &std::path::Path) -> VectorIndex {
        let mut index = VectorIndex::new(&IndexConfig {
            embedding_dim: 2,
            index_path: dir.join("vectors.idx"),
            metadata_path: dir.join("metadata.json"),
        })
        .unwrap();
        let texts = [
            "§ 1 Boden Boden Boden",
            "§ 2 Deponie Deponie",
            "§ 3 Boden und Deponie",
        ];
        let vectors = KeywordEmbedder.embed(&texts).unwrap();
        index.add_embeddings(&vectors, &texts).unwrap();
        index
    }

    #[test]
    fn test_context_joined_in_retrieval_order() {
        let temp_dir = TempDir::new().unwrap();
        let generator = EchoGenerator::default();
        let orchestrator =
            QueryOrchestrator::new(sample_index(temp_dir.path()), KeywordEmbedder, &generator, 2, 500);

        let answer = orchestrator.answer("Was gilt für Boden?").unwrap();

        assert_eq!(
            answer.context_chunks,
            vec!["§ 1 Boden Boden Boden", "§ 3 Boden und Deponie"]
        );
        assert_eq!(answer.text, "Antwort auf: Was gilt für Boden?");
        assert!(!answer.fallback);

        let calls = generator.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, "§ 1 Boden Boden Boden\n§ 3 Boden und Deponie");
        assert_eq!(calls[0].2, 500);
    }

    #[test]
    fn test_generation_failure_yields_fallback() {
        let temp_dir = TempDir::new().unwrap();
        let orchestrator =
            QueryOrchestrator::new(sample_index(temp_dir.path()), KeywordEmbedder, FailingGenerator, 5, 500);

        let answer = orchestrator.answer("Deponie?").unwrap();
        assert_eq!(answer.text, FALLBACK_ANSWER);
        assert!(answer.fallback);
        assert_eq!(answer.context_chunks.len(), 3);
    }

    #[test]
    fn test_embedding_failure_propagates() {
        let temp_dir = TempDir::new().unwrap();
        let generator = EchoGenerator::default();
        let orchestrator =
            QueryOrchestrator::new(sample_index(temp_dir.path()), FailingEmbedder, &generator, 5, 500);

        assert!(matches!(
            orchestrator.answer("Boden?"),
            Err(RagError::Embedding(_))
        ));
        assert!(generator.calls.borrow().is_empty());
    }

    #[test]
    fn test_empty_index_gives_empty_context() {
        let temp_dir = TempDir::new().unwrap();
        let index = VectorIndex::new(&IndexConfig {
            embedding_dim: 2,
            index_path: temp_dir.path().join("vectors.idx"),
            metadata_path: temp_dir.path().join("metadata.json"),
        })
        .unwrap();
        let generator = EchoGenerator::default();
        let orchestrator = QueryOrchestrator::new(index, KeywordEmbedder, &generator, 5, 100);

        let answer = orchestrator.answer("Boden?").unwrap();
        assert!(answer.context_chunks.is_empty());
        assert_eq!(generator.calls.borrow()[0].1, "");
    }

    #[test]
    fn test_build_context() {
        assert_eq!(build_context(&["a", "b", "c"]), "a\nb\nc");
        assert_eq!(build_context::<&str>(&[]), "");
    }
}
