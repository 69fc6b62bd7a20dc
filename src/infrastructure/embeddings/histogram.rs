use crate::domain::error::EngineError;
use crate::domain::ports::embedding_port::EmbeddingGenerator;
use crate::domain::values::embedding::EMBEDDING_DIM;
use image::RgbImage;

const LEVELS_PER_CHANNEL: usize = 8;
const SHIFT: u32 = 5; // 256 / 8 levels

/// Deterministic local generator: an 8x8x8 RGB colour histogram, L2-normalized.
///
/// Needs no model download, so it backs offline runs and tests. It captures
/// colour distribution only, not shape.
pub struct HistogramEmbedder;

impl HistogramEmbedder {
    fn histogram(image: &RgbImage) -> Result<Vec<f32>, EngineError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(EngineError::Embedding("image has no pixels".into()));
        }
        let mut bins = vec![0u64; EMBEDDING_DIM];
        for pixel in image.pixels() {
            let [r, g, b] = pixel.0;
            let bin = ((r >> SHIFT) as usize) * LEVELS_PER_CHANNEL * LEVELS_PER_CHANNEL
                + ((g >> SHIFT) as usize) * LEVELS_PER_CHANNEL
                + (b >> SHIFT) as usize;
            bins[bin] += 1;
        }
        let norm = bins.iter().map(|&c| (c as f64) * (c as f64)).sum::<f64>().sqrt();
        Ok(bins.into_iter().map(|c| (c as f64 / norm) as f32).collect())
    }
}

#[async_trait::async_trait]
impl EmbeddingGenerator for HistogramEmbedder {
    async fn embed(&self, image: &RgbImage) -> Result<Vec<f32>, EngineError> {
        Self::histogram(image)
    }

    fn model_name(&self) -> &str {
        "rgb-histogram-8x8x8"
    }

    fn dimension(&self) -> usize {
        EMBEDDING_DIM
    }
}
