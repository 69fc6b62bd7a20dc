mod common;

use common::{metadata, png_bytes, record, setup, unit, write_png};
use image::RgbImage;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use zabatda::application::ingest::IngestOptions;
use zabatda::config::EngineSettings;
use zabatda::domain::entities::ingest_item::{ImageSource, IngestItem, IngestStats};
use zabatda::domain::entities::product::{StoredVector, VectorRecord};
use zabatda::domain::error::EngineError;
use zabatda::domain::ports::embedding_port::EmbeddingGenerator;
use zabatda::domain::ports::vector_store::VectorStore;
use zabatda::domain::values::embedding::EMBEDDING_DIM;
use zabatda::infrastructure::embeddings::histogram::HistogramEmbedder;
use zabatda::infrastructure::memory::vector_store::MemoryVectorStore;
use zabatda::Zabatda;

const RED: [u8; 3] = [250, 10, 10];
const GREEN: [u8; 3] = [10, 250, 10];
const BLUE: [u8; 3] = [10, 10, 250];

fn item(id: &str, source: ImageSource) -> IngestItem {
    IngestItem {
        id: id.to_string(),
        metadata: metadata(id),
        source,
    }
}

fn bytes_item(id: &str, color: [u8; 3]) -> IngestItem {
    item(id, ImageSource::Bytes(png_bytes(color)))
}

/// Fails every image whose first pixel is mostly blue.
struct BlueHatingEmbedder {
    batch_calls: AtomicUsize,
}

impl BlueHatingEmbedder {
    fn new() -> Self {
        Self {
            batch_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl EmbeddingGenerator for BlueHatingEmbedder {
    async fn embed(&self, image: &RgbImage) -> Result<Vec<f32>, EngineError> {
        let [r, g, b] = image.get_pixel(0, 0).0;
        if b > r && b > g {
            return Err(EngineError::Embedding("model rejected blue".into()));
        }
        HistogramEmbedder.embed(image).await
    }

    async fn embed_batch(&self, images: &[RgbImage]) -> Result<Vec<Vec<f32>>, EngineError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        let mut out = Vec::new();
        for image in images {
            out.push(self.embed(image).await?);
        }
        Ok(out)
    }

    fn model_name(&self) -> &str {
        "blue-hating"
    }

    fn dimension(&self) -> usize {
        EMBEDDING_DIM
    }
}

struct ShortVectorEmbedder;

#[async_trait::async_trait]
impl EmbeddingGenerator for ShortVectorEmbedder {
    async fn embed(&self, _image: &RgbImage) -> Result<Vec<f32>, EngineError> {
        Ok(vec![0.5; EMBEDDING_DIM - 1])
    }

    fn model_name(&self) -> &str {
        "short"
    }

    fn dimension(&self) -> usize {
        EMBEDDING_DIM - 1
    }
}

struct SlowEmbedder;

#[async_trait::async_trait]
impl EmbeddingGenerator for SlowEmbedder {
    async fn embed(&self, image: &RgbImage) -> Result<Vec<f32>, EngineError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        HistogramEmbedder.embed(image).await
    }

    fn model_name(&self) -> &str {
        "slow"
    }

    fn dimension(&self) -> usize {
        EMBEDDING_DIM
    }
}

/// Refuses to store one id.
struct RejectingStore {
    inner: MemoryVectorStore,
    reject: &'static str,
    fail_count: bool,
}

impl VectorStore for RejectingStore {
    fn upsert(&self, record: &VectorRecord) -> Result<(), EngineError> {
        if record.id == self.reject {
            return Err(EngineError::Storage("disk full".into()));
        }
        self.inner.upsert(record)
    }

    fn get(&self, id: &str) -> Result<VectorRecord, EngineError> {
        self.inner.get(id)
    }

    fn count(&self) -> Result<usize, EngineError> {
        if self.fail_count {
            return Err(EngineError::Storage("database is locked".into()));
        }
        self.inner.count()
    }

    fn clear(&self) -> Result<usize, EngineError> {
        self.inner.clear()
    }

    fn scan(&self, visit: &mut dyn FnMut(StoredVector<'_>)) -> Result<(), EngineError> {
        self.inner.scan(visit)
    }
}

fn with_embedder(embedder: Arc<dyn EmbeddingGenerator>) -> Zabatda {
    Zabatda::with_components(Arc::new(MemoryVectorStore::new()), embedder, EngineSettings::default())
}

#[tokio::test]
async fn test_missing_source_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    write_png(&dir.path().join("one.png"), RED);
    write_png(&dir.path().join("three.png"), GREEN);

    let items = vec![
        item("p1", ImageSource::Path(dir.path().join("one.png"))),
        item("p2", ImageSource::Path(dir.path().join("two.png"))),
        item("p3", ImageSource::Path(dir.path().join("three.png"))),
    ];

    let app = setup();
    let stats = app.ingest(items, &IngestOptions::default()).await.unwrap();
    assert_eq!(
        stats,
        IngestStats {
            inserted: 2,
            skipped: 1,
            failed: 0
        }
    );
    assert!(stats.is_success());
    assert_eq!(app.count().unwrap(), 2);
    assert!(matches!(app.get_product("p2"), Err(EngineError::NotFound(_))));
}

#[tokio::test]
async fn test_undecodable_source_is_skipped() {
    let app = setup();
    let items = vec![
        bytes_item("p1", RED),
        item("junk", ImageSource::Bytes(b"definitely not a png".to_vec())),
        item("empty", ImageSource::Bytes(Vec::new())),
    ];
    let stats = app.ingest(items, &IngestOptions::default()).await.unwrap();
    assert_eq!(stats.inserted, 1);
    assert_eq!(stats.skipped, 2);
    assert_eq!(stats.failed, 0);
}

#[tokio::test]
async fn test_embedding_failure_counted_and_batch_continues() {
    let embedder = Arc::new(BlueHatingEmbedder::new());
    let app = with_embedder(embedder.clone());
    let items = vec![
        bytes_item("red", RED),
        bytes_item("blue", BLUE),
        bytes_item("green", GREEN),
    ];

    let stats = app.ingest(items, &IngestOptions::default()).await.unwrap();
    assert_eq!(stats.inserted, 2);
    assert_eq!(stats.failed, 1);
    assert!(!stats.is_success());
    assert_eq!(embedder.batch_calls.load(Ordering::SeqCst), 1);
    assert!(app.get_product("red").is_ok());
    assert!(app.get_product("green").is_ok());
    assert!(app.get_product("blue").is_err());
}

#[tokio::test]
async fn test_sequential_mode_never_batches() {
    let embedder = Arc::new(BlueHatingEmbedder::new());
    let app = with_embedder(embedder.clone());
    let items = vec![bytes_item("red", RED), bytes_item("green", GREEN)];

    let options = IngestOptions {
        batch_size: 1,
        ..IngestOptions::default()
    };
    let stats = app.ingest(items, &options).await.unwrap();
    assert_eq!(stats.inserted, 2);
    assert_eq!(embedder.batch_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_batched_and_sequential_store_same_vectors() {
    let items = || vec![bytes_item("a", RED), bytes_item("b", GREEN), bytes_item("c", BLUE)];

    let batched = setup();
    batched
        .ingest(items(), &IngestOptions { batch_size: 2, ..IngestOptions::default() })
        .await
        .unwrap();
    let sequential = setup();
    sequential
        .ingest(items(), &IngestOptions { batch_size: 1, ..IngestOptions::default() })
        .await
        .unwrap();

    for id in ["a", "b", "c"] {
        assert_eq!(batched.get_product(id).unwrap(), sequential.get_product(id).unwrap());
    }
}

#[tokio::test]
async fn test_invalid_generated_vector_is_a_failure() {
    let app = with_embedder(Arc::new(ShortVectorEmbedder));
    let stats = app
        .ingest(vec![bytes_item("p1", RED)], &IngestOptions::default())
        .await
        .unwrap();
    assert_eq!(stats.failed, 1);
    assert_eq!(app.count().unwrap(), 0);
}

#[tokio::test]
async fn test_embedding_timeout_is_a_failure() {
    let settings = EngineSettings {
        embed_timeout: Duration::from_millis(50),
        ..EngineSettings::default()
    };
    let app = Zabatda::with_components(Arc::new(MemoryVectorStore::new()), Arc::new(SlowEmbedder), settings);
    let stats = app
        .ingest(vec![bytes_item("p1", RED)], &IngestOptions::default())
        .await
        .unwrap();
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.inserted, 0);
}

#[tokio::test]
async fn test_storage_failure_counted_per_item() {
    let store = Arc::new(RejectingStore {
        inner: MemoryVectorStore::new(),
        reject: "p2",
        fail_count: false,
    });
    let app = Zabatda::with_components(store, Arc::new(HistogramEmbedder), EngineSettings::default());
    let items = vec![bytes_item("p1", RED), bytes_item("p2", GREEN), bytes_item("p3", BLUE)];

    let stats = app.ingest(items, &IngestOptions::default()).await.unwrap();
    assert_eq!(
        stats,
        IngestStats {
            inserted: 2,
            skipped: 0,
            failed: 1
        }
    );
    assert_eq!(app.count().unwrap(), 2);
}

#[tokio::test]
async fn test_dry_run_leaves_store_untouched() {
    let app = setup();
    app.upsert(&record("existing", unit(0))).unwrap();

    let options = IngestOptions {
        dry_run: true,
        clear_first: true,
        ..IngestOptions::default()
    };
    let stats = app
        .ingest(vec![bytes_item("p1", RED), bytes_item("p2", GREEN)], &options)
        .await
        .unwrap();
    assert_eq!(stats.inserted, 2);
    assert_eq!(app.count().unwrap(), 1);
    assert!(app.get_product("existing").is_ok());
}

#[tokio::test]
async fn test_dry_run_survives_failing_count() {
    let store = Arc::new(RejectingStore {
        inner: MemoryVectorStore::new(),
        reject: "",
        fail_count: true,
    });
    store.inner.upsert(&record("existing", unit(0))).unwrap();
    let app = Zabatda::with_components(store.clone(), Arc::new(HistogramEmbedder), EngineSettings::default());

    let options = IngestOptions {
        dry_run: true,
        clear_first: true,
        ..IngestOptions::default()
    };
    let stats = app.ingest(vec![bytes_item("p1", RED)], &options).await.unwrap();
    assert_eq!(stats.inserted, 1);
    assert!(store.inner.get("existing").is_ok());
    assert!(store.inner.get("p1").is_err());
}

#[tokio::test]
async fn test_clear_first_rebuilds() {
    let app = setup();
    app.upsert(&record("stale", unit(0))).unwrap();

    let options = IngestOptions {
        clear_first: true,
        ..IngestOptions::default()
    };
    let stats = app.ingest(vec![bytes_item("fresh", RED)], &options).await.unwrap();
    assert_eq!(stats.inserted, 1);
    assert_eq!(app.count().unwrap(), 1);
    assert!(app.get_product("stale").is_err());
}

#[tokio::test]
async fn test_reingest_updates_in_place() {
    let app = setup();
    app.ingest(vec![bytes_item("p1", RED)], &IngestOptions::default())
        .await
        .unwrap();
    let before = app.get_product("p1").unwrap();

    let mut changed = bytes_item("p1", GREEN);
    changed.metadata.price = 1;
    app.ingest(vec![changed], &IngestOptions::default()).await.unwrap();

    let after = app.get_product("p1").unwrap();
    assert_eq!(app.count().unwrap(), 1);
    assert_eq!(after.metadata.price, 1);
    assert_ne!(after.embedding, before.embedding);
}

#[tokio::test]
async fn test_catalog_file_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let images = dir.path().join("images");
    std::fs::create_dir(&images).unwrap();
    write_png(&images.join("red.png"), RED);
    write_png(&images.join("green.png"), GREEN);

    let catalog: PathBuf = dir.path().join("catalog.json");
    std::fs::write(
        &catalog,
        serde_json::json!([
            {"id": "r", "name": "Red", "brand": "A", "price": 10, "category": "shoes",
             "product_url": "https://example.com/r", "image_filename": "red.png"},
            {"id": "g", "name": "Green", "brand": "B", "price": 20, "category": "shoes",
             "product_url": "https://example.com/g", "image_filename": "green.png"},
            {"id": "x", "name": "Missing", "brand": "C", "price": 30, "category": "shoes",
             "product_url": "https://example.com/x", "image_filename": "gone.png"}
        ])
        .to_string(),
    )
    .unwrap();

    let items = zabatda::infrastructure::catalog::load_catalog(&catalog, &images, "/static/product_images").unwrap();
    assert_eq!(zabatda::infrastructure::catalog::missing_images(&items), vec!["x".to_string()]);

    let app = setup();
    let stats = app.ingest(items, &IngestOptions::default()).await.unwrap();
    assert_eq!(stats.inserted, 2);
    assert_eq!(stats.skipped, 1);
    assert_eq!(
        app.get_product("g").unwrap().metadata.image_url,
        "/static/product_images/green.png"
    );
}
