use crate::domain::error::EngineError;
use crate::domain::ports::embedding_port::EmbeddingGenerator;
use crate::domain::ports::vector_store::VectorStore;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
pub struct CatalogStats {
    pub total_products: usize,
    pub model_name: String,
    pub embedding_dimensions: usize,
}

pub struct StatsUseCase {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn EmbeddingGenerator>,
}

impl StatsUseCase {
    pub fn new(store: Arc<dyn VectorStore>, embedder: Arc<dyn EmbeddingGenerator>) -> Self {
        Self { store, embedder }
    }

    pub fn stats(&self) -> Result<CatalogStats, EngineError> {
        Ok(CatalogStats {
            total_products: self.store.count()?,
            model_name: self.embedder.model_name().to_string(),
            embedding_dimensions: self.embedder.dimension(),
        })
    }
}
