use crate::domain::error::EngineError;
use crate::domain::values::embedding::Embedding;
use serde::{Deserialize, Serialize};

/// Catalog fields carried alongside a stored vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductMetadata {
    pub name: String,
    pub brand: String,
    /// Minor currency unit.
    pub price: u64,
    pub category: String,
    pub product_url: String,
    pub image_url: String,
}

impl ProductMetadata {
    /// Price as a signed 64-bit column value. Every store applies the same
    /// ceiling so a record accepted by one backend is accepted by all.
    pub fn storable_price(&self, id: &str) -> Result<i64, EngineError> {
        i64::try_from(self.price).map_err(|_| {
            EngineError::Storage(format!("Product '{id}' price {} exceeds {}", self.price, i64::MAX))
        })
    }
}

/// One catalog item: id, metadata and its feature vector.
///
/// Records are only ever written whole; there is no field-level update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub metadata: ProductMetadata,
    pub embedding: Embedding,
}

impl VectorRecord {
    pub fn new(id: impl Into<String>, metadata: ProductMetadata, embedding: Embedding) -> Self {
        Self {
            id: id.into(),
            metadata,
            embedding,
        }
    }
}

/// Borrowed view of a stored record, handed out while a store scan holds its snapshot.
#[derive(Debug, Clone, Copy)]
pub struct StoredVector<'a> {
    pub id: &'a str,
    pub metadata: &'a ProductMetadata,
    pub vector: &'a [f32],
}
