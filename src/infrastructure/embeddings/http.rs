use crate::domain::error::EngineError;
use crate::domain::ports::embedding_port::EmbeddingGenerator;
use crate::domain::values::embedding::EMBEDDING_DIM;
use image::{DynamicImage, ImageFormat, RgbImage};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Deserialize;
use std::io::Cursor;
use std::time::Duration;

/// Remote generator: POSTs a PNG to an embedding service that answers with
/// `{"embedding": [..]}`.
pub struct HttpEmbedder {
    client: Client,
    endpoint: String,
    model: String,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

impl HttpEmbedder {
    pub fn new(endpoint: String, model: Option<String>, timeout: Duration) -> Result<Self, EngineError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EngineError::Embedding(format!("HTTP client error: {e}")))?;
        Ok(Self {
            client,
            endpoint,
            model: model.unwrap_or_else(|| "clip-ViT-B-16".to_string()),
        })
    }

    fn encode_png(image: &RgbImage) -> Result<Vec<u8>, EngineError> {
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(image.clone())
            .write_to(&mut buf, ImageFormat::Png)
            .map_err(|e| EngineError::Embedding(format!("PNG encode failed: {e}")))?;
        Ok(buf.into_inner())
    }
}

#[async_trait::async_trait]
impl EmbeddingGenerator for HttpEmbedder {
    async fn embed(&self, image: &RgbImage) -> Result<Vec<f32>, EngineError> {
        let body = Self::encode_png(image)?;
        let resp = self
            .client
            .post(&self.endpoint)
            .query(&[("model", self.model.as_str())])
            .header(CONTENT_TYPE, "image/png")
            .body(body)
            .send()
            .await
            .map_err(|e| EngineError::Embedding(format!("Embedding service error: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(EngineError::Embedding(format!("Embedding service {status}: {body}")));
        }

        let result: EmbedResponse = resp
            .json()
            .await
            .map_err(|e| EngineError::Embedding(format!("Parse error: {e}")))?;
        Ok(result.embedding)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        EMBEDDING_DIM
    }
}
