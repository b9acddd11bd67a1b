//! Text embedding behind a narrow provider trait.
//!
//! The pipeline only needs "texts in, vectors out, same order". Local
//! models live in [`fastembed`](self::fastembed); tests plug in
//! deterministic fakes.

pub mod fastembed;

pub use self::fastembed::{FastEmbedProvider, parse_model};

use thiserror::Error;

/// Errors from embedding providers.
#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("Failed to initialize embedding model: {0}")]
    ModelInit(String),

    #[error("Unknown embedding model '{0}'")]
    UnknownModel(String),

    #[error("Failed to generate embedding: {0}")]
    Embedding(String),

    #[error("Provider returned {actual} embeddings for {expected} texts")]
    CountMismatch { expected: usize, actual: usize },
}

/// Maps texts to fixed-dimension vectors.
///
/// Implementations must return exactly one vector per input text, in input
/// order. Calls block until the model has answered.
pub trait EmbeddingProvider {
    /// Embed `texts`, one vector per text in the same order.
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Dimension of every vector this provider returns.
    fn dimension(&self) -> usize;
}

impl<P: EmbeddingProvider + ?Sized> EmbeddingProvider for &P {
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        (**self).embed(texts)
    }

    fn dimension(&self) -> usize {
        (**self).dimension()
    }
}

impl<P: EmbeddingProvider + ?Sized> EmbeddingProvider for Box<P> {
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        (**self).embed(texts)
    }

    fn dimension(&self) -> usize {
        (**self).dimension()
    }
}

/// Embed `texts` in batches of `batch_size`, checking the count of every batch.
///
/// `on_batch` receives the number of texts embedded so far.
pub fn embed_batched<P, F>(
    provider: &P,
    texts: &[&str],
    batch_size: usize,
    mut on_batch: F,
) -> Result<Vec<Vec<f32>>, EmbeddingError>
where
    P: EmbeddingProvider + ?Sized,
    F: FnMut(usize),
{
    let mut vectors = Vec::with_capacity(texts.len());
    for batch in texts.chunks(batch_size.max(1)) {
        vectors.extend(embed_checked(provider, batch)?);
        on_batch(vectors.len());
    }
    Ok(vectors)
}

/// Embed `texts` in one call, rejecting results of the wrong length.
pub fn embed_checked<P>(provider: &P, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError>
where
    P: EmbeddingProvider + ?Sized,
{
    let vectors = provider.embed(texts)?;
    if vectors.len() != texts.len() {
        return Err(EmbeddingError::CountMismatch {
            expected: texts.len(),
            actual: vectors.len(),
        });
    }
    Ok(vectors)
}

/// Embed a single text.
pub fn embed_one<P>(provider: &P, text: &str) -> Result<Vec<f32>, EmbeddingError>
where
    P: EmbeddingProvider + ?Sized,
{
    embed_checked(provider, &[text])?
        .pop()
        .ok_or(EmbeddingError::CountMismatch {
            expected: 1,
            actual: 0,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Embeds a text as `[len, first byte]` and records batch sizes.
    struct Recording {
        batches: RefCell<Vec<usize>>,
    }

    impl EmbeddingProvider for Recording {
        fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            self.batches.borrow_mut().push(texts.len());
            Ok(texts
                .iter()
                .map(|t| vec![t.len() as f32, t.bytes().next().unwrap_or(0) as f32])
                .collect())
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    /// Mirrors providers that swallow failures and return nothing.
    struct Silent;

    impl EmbeddingProvider for Silent {
        fn embed(&self, _texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Ok(Vec::new())
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    #[test]
    fn test_batches_preserve_order() {
        let provider = Recording {
            batches: RefCell::new(Vec::new()),
        };
        let texts = ["a", "bb", "ccc", "dddd", "eeeee"];
        let mut progress = Vec::new();

        let vectors = embed_batched(&provider, &texts, 2, |done| progress.push(done)).unwrap();

        let lengths: Vec<f32> = vectors.iter().map(|v| v[0]).collect();
        assert_eq!(lengths, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(*provider.batches.borrow(), vec![2, 2, 1]);
        assert_eq!(progress, vec![2, 4, 5]);
    }

    #[test]
    fn test_zero_batch_size_treated_as_one() {
        let provider = Recording {
            batches: RefCell::new(Vec::new()),
        };
        embed_batched(&provider, &["x", "y"], 0, |_| {}).unwrap();
        assert_eq!(*provider.batches.borrow(), vec![1, 1]);
    }

    #[test]
    fn test_empty_result_is_count_mismatch() {
        assert!(matches!(
            embed_checked(&Silent, &["frage"]),
            Err(EmbeddingError::CountMismatch {
                expected: 1,
                actual: 0
            })
        ));
        assert!(embed_one(&Silent, "frage").is_err());
    }

    #[test]
    fn test_embed_one_through_box() {
        let provider: Box<dyn EmbeddingProvider> = Box::new(Recording {
            batches: RefCell::new(Vec::new()),
        });
        assert_eq!(embed_one(&provider, "abc").unwrap(), vec![3.0, 97.0]);
        assert_eq!(provider.dimension(), 2);
    }
}
