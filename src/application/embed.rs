use crate::domain::error::EngineError;
use crate::domain::ports::embedding_port::EmbeddingGenerator;
use crate::domain::values::embedding::{validate_vector, Embedding};
use image::RgbImage;
use std::time::Duration;

pub async fn embed_one(
    embedder: &dyn EmbeddingGenerator,
    image: &RgbImage,
    timeout: Duration,
) -> Result<Vec<f32>, EngineError> {
    tokio::time::timeout(timeout, embedder.embed(image))
        .await
        .map_err(|_| EngineError::Embedding(format!("embedding timed out after {timeout:?}")))?
}

/// Batched call; the timeout scales with the batch length.
pub async fn embed_many(
    embedder: &dyn EmbeddingGenerator,
    images: &[RgbImage],
    timeout: Duration,
) -> Result<Vec<Vec<f32>>, EngineError> {
    let budget = timeout.saturating_mul(images.len().max(1) as u32);
    let vectors = tokio::time::timeout(budget, embedder.embed_batch(images))
        .await
        .map_err(|_| EngineError::Embedding(format!("batch embedding timed out after {budget:?}")))??;
    if vectors.len() != images.len() {
        return Err(EngineError::Embedding(format!(
            "generator returned {} vectors for {} images",
            vectors.len(),
            images.len()
        )));
    }
    Ok(vectors)
}

/// Wraps a generator's output. A malformed vector is the generator's fault,
/// so it is reported as an embedding error rather than a caller mistake.
pub fn generated_embedding(vector: Vec<f32>) -> Result<Embedding, EngineError> {
    validate_vector(&vector).map_err(|fault| {
        EngineError::Embedding(format!("generator returned an invalid vector: {fault}"))
    })?;
    Embedding::new(vector)
}
