use crate::application::embed::{embed_one, generated_embedding};
use crate::application::imaging::decode_rgb;
use crate::application::rank::Ranker;
use crate::config::EngineSettings;
use crate::domain::entities::search_hit::SearchHit;
use crate::domain::error::EngineError;
use crate::domain::ports::embedding_port::EmbeddingGenerator;
use crate::domain::values::search_params::SearchParams;
use log::debug;
use std::sync::Arc;

pub struct SearchUseCase {
    embedder: Arc<dyn EmbeddingGenerator>,
    ranker: Ranker,
    settings: EngineSettings,
}

impl SearchUseCase {
    pub fn new(embedder: Arc<dyn EmbeddingGenerator>, ranker: Ranker, settings: EngineSettings) -> Self {
        Self {
            embedder,
            ranker,
            settings,
        }
    }

    /// Uploaded image in, ranked products out. Nothing touches the store
    /// until the image and parameters have been validated and embedded.
    pub async fn search_image(
        &self,
        bytes: &[u8],
        params: &SearchParams,
    ) -> Result<Vec<SearchHit>, EngineError> {
        if bytes.len() > self.settings.max_image_bytes {
            return Err(EngineError::InvalidImage(format!(
                "image is {} bytes, maximum is {}",
                bytes.len(),
                self.settings.max_image_bytes
            )));
        }
        let image = decode_rgb(bytes)?;
        params.validate()?;

        let vector = embed_one(self.embedder.as_ref(), &image, self.settings.embed_timeout).await?;
        let embedding = generated_embedding(vector)?;
        let hits = self.ranker.rank(embedding.as_slice(), params)?;
        debug!(
            "query {}x{} matched {} products",
            image.width(),
            image.height(),
            hits.len()
        );
        Ok(hits)
    }

    pub fn search_vector(&self, vector: &[f32], params: &SearchParams) -> Result<Vec<SearchHit>, EngineError> {
        self.ranker.rank(vector, params)
    }
}
