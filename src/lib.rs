pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

use crate::application::ingest::{IngestOptions, IngestUseCase};
use crate::application::rank::Ranker;
use crate::application::search::SearchUseCase;
use crate::application::stats::{CatalogStats, StatsUseCase};
use crate::config::{Config, EmbedderKind, EngineSettings};
use crate::domain::entities::ingest_item::{IngestItem, IngestStats};
use crate::domain::entities::product::VectorRecord;
use crate::domain::entities::search_hit::SearchHit;
use crate::domain::error::EngineError;
use crate::domain::ports::embedding_port::EmbeddingGenerator;
use crate::domain::ports::vector_store::VectorStore;
use crate::domain::values::search_params::SearchParams;
use crate::infrastructure::embeddings::histogram::HistogramEmbedder;
use crate::infrastructure::embeddings::http::HttpEmbedder;
use crate::infrastructure::sqlite::vector_store::SqliteVectorStore;
use log::{info, warn};
use std::sync::Arc;

pub struct Zabatda {
    store: Arc<dyn VectorStore>,
    search_uc: SearchUseCase,
    ingest_uc: IngestUseCase,
    stats_uc: StatsUseCase,
}

impl Zabatda {
    /// Open the SQLite store and build the configured embedding generator.
    pub fn open(config: &Config) -> Result<Self, EngineError> {
        let store: Arc<dyn VectorStore> = Arc::new(SqliteVectorStore::open(&config.store)?);

        let embedder: Arc<dyn EmbeddingGenerator> = match config.embedder.kind {
            EmbedderKind::Histogram => Arc::new(HistogramEmbedder),
            EmbedderKind::Http => {
                let endpoint = config.embedder.endpoint.clone().ok_or_else(|| {
                    EngineError::Embedding("HTTP embedder needs an endpoint URL".into())
                })?;
                Arc::new(HttpEmbedder::new(
                    endpoint,
                    config.embedder.model.clone(),
                    config.embedder.timeout,
                )?)
            }
        };
        info!(
            "opened {} with embedder {}",
            config.store.path,
            embedder.model_name()
        );

        Ok(Self::with_components(store, embedder, config.settings()))
    }

    pub fn with_components(
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn EmbeddingGenerator>,
        settings: EngineSettings,
    ) -> Self {
        if embedder.dimension() != domain::values::embedding::EMBEDDING_DIM {
            warn!(
                "embedder {} reports {} dimensions; its vectors will be rejected",
                embedder.model_name(),
                embedder.dimension()
            );
        }
        Self {
            search_uc: SearchUseCase::new(embedder.clone(), Ranker::new(store.clone()), settings),
            ingest_uc: IngestUseCase::new(store.clone(), embedder.clone(), settings),
            stats_uc: StatsUseCase::new(store.clone(), embedder),
            store,
        }
    }

    pub async fn search_image(
        &self,
        bytes: &[u8],
        params: &SearchParams,
    ) -> Result<Vec<SearchHit>, EngineError> {
        self.search_uc.search_image(bytes, params).await
    }

    pub fn search_vector(&self, vector: &[f32], params: &SearchParams) -> Result<Vec<SearchHit>, EngineError> {
        self.search_uc.search_vector(vector, params)
    }

    pub async fn ingest(
        &self,
        items: Vec<IngestItem>,
        options: &IngestOptions,
    ) -> Result<IngestStats, EngineError> {
        self.ingest_uc.execute(items, options).await
    }

    pub fn upsert(&self, record: &VectorRecord) -> Result<(), EngineError> {
        self.store.upsert(record)
    }

    pub fn get_product(&self, id: &str) -> Result<VectorRecord, EngineError> {
        self.store.get(id)
    }

    pub fn count(&self) -> Result<usize, EngineError> {
        self.store.count()
    }

    pub fn clear(&self) -> Result<usize, EngineError> {
        self.store.clear()
    }

    pub fn stats(&self) -> Result<CatalogStats, EngineError> {
        self.stats_uc.stats()
    }
}
