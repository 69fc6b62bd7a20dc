use crate::application::embed::{embed_many, embed_one, generated_embedding};
use crate::application::imaging::load_rgb;
use crate::config::{EngineSettings, DEFAULT_BATCH_SIZE};
use crate::domain::entities::ingest_item::{IngestItem, IngestStats};
use crate::domain::entities::product::VectorRecord;
use crate::domain::error::EngineError;
use crate::domain::ports::embedding_port::EmbeddingGenerator;
use crate::domain::ports::vector_store::VectorStore;
use crate::domain::values::embedding::Embedding;
use image::RgbImage;
use log::{info, warn};
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
pub struct IngestOptions {
    /// Run every step except the store mutation.
    pub dry_run: bool,
    /// Wipe the store before ingesting.
    pub clear_first: bool,
    /// Images per embedding call; 0 or 1 embeds one at a time.
    pub batch_size: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            clear_first: false,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

pub struct IngestUseCase {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn EmbeddingGenerator>,
    settings: EngineSettings,
}

impl IngestUseCase {
    pub fn new(
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn EmbeddingGenerator>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            store,
            embedder,
            settings,
        }
    }

    /// Every item is attempted. Missing or undecodable sources are skipped;
    /// embedding and storage errors are counted as failures. Only a failing
    /// `clear_first` aborts the batch, before anything was written.
    pub async fn execute(
        &self,
        items: Vec<IngestItem>,
        options: &IngestOptions,
    ) -> Result<IngestStats, EngineError> {
        if options.clear_first {
            if options.dry_run {
                match self.store.count() {
                    Ok(n) => info!("[dry run] would clear {n} existing products"),
                    Err(e) => warn!("[dry run] would clear the store (count unavailable: {e})"),
                }
            } else {
                let removed = self.store.clear()?;
                info!("cleared {removed} existing products");
            }
        }

        let total = items.len();
        let chunk_size = options.batch_size.max(1);
        info!(
            "ingesting {total} products (batch size {chunk_size}, dry run: {})",
            options.dry_run
        );

        let mut stats = IngestStats::default();
        for chunk in items.chunks(chunk_size) {
            let mut loaded: Vec<&IngestItem> = Vec::with_capacity(chunk.len());
            let mut images: Vec<RgbImage> = Vec::with_capacity(chunk.len());
            for item in chunk {
                match load_rgb(&item.source) {
                    Ok(image) => {
                        loaded.push(item);
                        images.push(image);
                    }
                    Err(e) => {
                        warn!("skipping {}: {e}", item.id);
                        stats.skipped += 1;
                    }
                }
            }
            if images.is_empty() {
                continue;
            }

            let vectors = self.embed_chunk(&images, chunk_size > 1).await;
            for (item, vector) in loaded.into_iter().zip(vectors) {
                let outcome = vector
                    .and_then(generated_embedding)
                    .and_then(|embedding| self.store_item(item, embedding, options.dry_run));
                match outcome {
                    Ok(()) => {
                        stats.inserted += 1;
                        info!("[{}/{total}] {}: {}", stats.total(), item.id, item.metadata.name);
                    }
                    Err(e) => {
                        stats.failed += 1;
                        warn!("[{}/{total}] {} failed: {e}", stats.total(), item.id);
                    }
                }
            }
        }

        info!(
            "ingest finished: {} inserted, {} skipped, {} failed",
            stats.inserted, stats.skipped, stats.failed
        );
        Ok(stats)
    }

    /// One result per image, in input order. A failed batch call is retried
    /// item by item so one bad image does not fail its neighbours.
    async fn embed_chunk(&self, images: &[RgbImage], batched: bool) -> Vec<Result<Vec<f32>, EngineError>> {
        let timeout = self.settings.embed_timeout;
        if batched && images.len() > 1 {
            match embed_many(self.embedder.as_ref(), images, timeout).await {
                Ok(vectors) => return vectors.into_iter().map(Ok).collect(),
                Err(e) => warn!("batch of {} failed ({e}), retrying one at a time", images.len()),
            }
        }

        let mut out = Vec::with_capacity(images.len());
        for image in images {
            out.push(embed_one(self.embedder.as_ref(), image, timeout).await);
        }
        out
    }

    fn store_item(&self, item: &IngestItem, embedding: Embedding, dry_run: bool) -> Result<(), EngineError> {
        if dry_run {
            return Ok(());
        }
        let record = VectorRecord::new(item.id.clone(), item.metadata.clone(), embedding);
        self.store.upsert(&record)
    }
}
