use crate::domain::error::EngineError;
use image::RgbImage;

/// Turns a normalized RGB image into a feature vector.
///
/// Built once at startup and shared behind an `Arc`.
#[async_trait::async_trait]
pub trait EmbeddingGenerator: Send + Sync {
    async fn embed(&self, image: &RgbImage) -> Result<Vec<f32>, EngineError>;

    /// Output order matches input order. The default embeds one image at a time.
    async fn embed_batch(&self, images: &[RgbImage]) -> Result<Vec<Vec<f32>>, EngineError> {
        let mut out = Vec::with_capacity(images.len());
        for image in images {
            out.push(self.embed(image).await?);
        }
        Ok(out)
    }

    fn model_name(&self) -> &str;

    fn dimension(&self) -> usize;
}
