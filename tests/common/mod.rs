//! Shared test helpers.
#![allow(dead_code)]

use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use zabatda::config::EngineSettings;
use zabatda::domain::entities::product::{ProductMetadata, VectorRecord};
use zabatda::domain::values::embedding::{Embedding, EMBEDDING_DIM};
use zabatda::infrastructure::embeddings::histogram::HistogramEmbedder;
use zabatda::infrastructure::memory::vector_store::MemoryVectorStore;
use zabatda::infrastructure::sqlite::vector_store::SqliteVectorStore;
use zabatda::Zabatda;

pub fn setup() -> Zabatda {
    let store = SqliteVectorStore::from_connection(rusqlite::Connection::open_in_memory().unwrap()).unwrap();
    Zabatda::with_components(Arc::new(store), Arc::new(HistogramEmbedder), EngineSettings::default())
}

pub fn setup_memory() -> Zabatda {
    Zabatda::with_components(
        Arc::new(MemoryVectorStore::new()),
        Arc::new(HistogramEmbedder),
        EngineSettings::default(),
    )
}

/// Unit vector along `axis`.
pub fn unit(axis: usize) -> Vec<f32> {
    let mut v = vec![0.0; EMBEDDING_DIM];
    v[axis] = 1.0;
    v
}

pub fn metadata(name: &str) -> ProductMetadata {
    ProductMetadata {
        name: name.to_string(),
        brand: "Nike".to_string(),
        price: 120_000,
        category: "shoes".to_string(),
        product_url: format!("https://example.com/{name}"),
        image_url: format!("/static/product_images/{name}.png"),
    }
}

pub fn record(id: &str, vector: Vec<f32>) -> VectorRecord {
    VectorRecord::new(id, metadata(id), Embedding::new(vector).unwrap())
}

pub fn solid(color: [u8; 3]) -> RgbImage {
    RgbImage::from_pixel(8, 8, Rgb(color))
}

pub fn png_bytes(color: [u8; 3]) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(solid(color))
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

pub fn write_png(path: &Path, color: [u8; 3]) {
    solid(color).save(path).unwrap();
}
