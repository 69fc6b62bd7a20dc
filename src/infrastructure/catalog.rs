//! Catalog metadata file: a JSON array of products, each naming its image
//! file inside an images directory.

use crate::domain::entities::ingest_item::{ImageSource, IngestItem};
use crate::domain::entities::product::ProductMetadata;
use crate::domain::error::EngineError;
use serde::Deserialize;
use std::path::Path;

const REQUIRED_FIELDS: [&str; 7] = [
    "id",
    "name",
    "brand",
    "price",
    "category",
    "product_url",
    "image_filename",
];

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    id: String,
    name: String,
    brand: String,
    price: u64,
    category: String,
    product_url: String,
    image_filename: String,
}

pub fn load_catalog(
    catalog_path: &Path,
    images_dir: &Path,
    image_url_prefix: &str,
) -> Result<Vec<IngestItem>, EngineError> {
    let raw = std::fs::read_to_string(catalog_path).map_err(|e| {
        EngineError::Catalog(format!("Cannot read {}: {e}", catalog_path.display()))
    })?;
    if !images_dir.is_dir() {
        return Err(EngineError::Catalog(format!(
            "Images directory not found: {}",
            images_dir.display()
        )));
    }
    parse_catalog(&raw, images_dir, image_url_prefix)
}

pub fn parse_catalog(
    raw: &str,
    images_dir: &Path,
    image_url_prefix: &str,
) -> Result<Vec<IngestItem>, EngineError> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| EngineError::Catalog(format!("Invalid JSON: {e}")))?;
    let entries = value
        .as_array()
        .ok_or_else(|| EngineError::Catalog("Catalog must be a JSON array".into()))?;

    let prefix = image_url_prefix.trim_end_matches('/');
    let mut items = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        let missing: Vec<&str> = REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|field| entry.get(field).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(EngineError::Catalog(format!(
                "Product at index {i} is missing required fields: {}",
                missing.join(", ")
            )));
        }
        let entry: CatalogEntry = serde_json::from_value(entry.clone())
            .map_err(|e| EngineError::Catalog(format!("Product at index {i}: {e}")))?;

        items.push(IngestItem {
            metadata: ProductMetadata {
                name: entry.name,
                brand: entry.brand,
                price: entry.price,
                category: entry.category,
                product_url: entry.product_url,
                image_url: format!("{prefix}/{}", entry.image_filename),
            },
            source: ImageSource::Path(images_dir.join(&entry.image_filename)),
            id: entry.id,
        });
    }
    Ok(items)
}

/// Ids of items whose image file does not exist.
pub fn missing_images(items: &[IngestItem]) -> Vec<String> {
    items
        .iter()
        .filter(|item| match &item.source {
            ImageSource::Path(path) => !path.is_file(),
            ImageSource::Bytes(_) => false,
        })
        .map(|item| item.id.clone())
        .collect()
}
