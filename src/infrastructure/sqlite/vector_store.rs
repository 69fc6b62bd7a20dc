use crate::config::StoreConfig;
use crate::domain::entities::product::{ProductMetadata, StoredVector, VectorRecord};
use crate::domain::error::EngineError;
use crate::domain::ports::vector_store::VectorStore;
use crate::domain::values::embedding::{validate_vector, Embedding, EMBEDDING_DIM};
use crate::infrastructure::sqlite::migrations::run_migrations;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Mutex, MutexGuard};

const SELECT_COLS: &str = "id, name, brand, price, category, product_url, image_url, embedding";

/// Vectors and metadata in a single `products` table.
///
/// The connection sits behind a mutex, so writes are serialized. A scan
/// copies committed rows out in one statement and releases the lock before
/// the caller scores them.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
}

/// Columns as read from SQLite, before validation.
struct RawRow {
    id: String,
    name: String,
    brand: String,
    price: i64,
    category: String,
    product_url: String,
    image_url: String,
    blob: Vec<u8>,
}

impl RawRow {
    fn read(row: &rusqlite::Row) -> Result<Self, rusqlite::Error> {
        Ok(RawRow {
            id: row.get(0)?,
            name: row.get(1)?,
            brand: row.get(2)?,
            price: row.get(3)?,
            category: row.get(4)?,
            product_url: row.get(5)?,
            image_url: row.get(6)?,
            blob: row.get(7)?,
        })
    }

    fn into_parts(self) -> Result<(String, ProductMetadata, Vec<f32>), EngineError> {
        let price = u64::try_from(self.price).map_err(|_| {
            EngineError::Storage(format!("Product '{}' has negative price {}", self.id, self.price))
        })?;
        let vector = SqliteVectorStore::deserialize_vector(&self.blob).map_err(|reason| {
            EngineError::Storage(format!("Product '{}' has a corrupt embedding: {reason}", self.id))
        })?;
        let metadata = ProductMetadata {
            name: self.name,
            brand: self.brand,
            price,
            category: self.category,
            product_url: self.product_url,
            image_url: self.image_url,
        };
        Ok((self.id, metadata, vector))
    }
}

impl SqliteVectorStore {
    pub fn open(config: &StoreConfig) -> Result<Self, EngineError> {
        let conn = Connection::open(&config.path)?;
        if config.path != ":memory:" {
            conn.pragma_update(None, "journal_mode", "WAL")?;
        }
        Self::from_connection(conn)
    }

    pub fn from_connection(conn: Connection) -> Result<Self, EngineError> {
        run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, EngineError> {
        self.conn
            .lock()
            .map_err(|e| EngineError::Storage(e.to_string()))
    }

    fn serialize_vector(v: &[f32]) -> Vec<u8> {
        v.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    fn deserialize_vector(bytes: &[u8]) -> Result<Vec<f32>, String> {
        if bytes.len() != EMBEDDING_DIM * 4 {
            return Err(format!(
                "expected {} bytes, found {}",
                EMBEDDING_DIM * 4,
                bytes.len()
            ));
        }
        let vector: Vec<f32> = bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();
        validate_vector(&vector).map_err(|fault| fault.to_string())?;
        Ok(vector)
    }
}

impl VectorStore for SqliteVectorStore {
    fn upsert(&self, record: &VectorRecord) -> Result<(), EngineError> {
        validate_vector(record.embedding.as_slice())?;
        let price = record.metadata.storable_price(&record.id)?;
        let blob = Self::serialize_vector(record.embedding.as_slice());
        let m = &record.metadata;

        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO products (id, name, brand, price, category, product_url, image_url, embedding)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                brand = excluded.brand,
                price = excluded.price,
                category = excluded.category,
                product_url = excluded.product_url,
                image_url = excluded.image_url,
                embedding = excluded.embedding",
            params![
                record.id,
                m.name,
                m.brand,
                price,
                m.category,
                m.product_url,
                m.image_url,
                blob
            ],
        )
        .map_err(|e| EngineError::Storage(format!("Failed to upsert product '{}': {e}", record.id)))?;
        debug!("upserted product {}", record.id);
        Ok(())
    }

    fn get(&self, id: &str) -> Result<VectorRecord, EngineError> {
        let conn = self.lock()?;
        let raw = conn
            .query_row(
                &format!("SELECT {SELECT_COLS} FROM products WHERE id = ?1"),
                params![id],
                RawRow::read,
            )
            .optional()?
            .ok_or_else(|| EngineError::NotFound(id.to_string()))?;
        drop(conn);

        let (id, metadata, vector) = raw.into_parts()?;
        Ok(VectorRecord::new(id, metadata, Embedding::new(vector)?))
    }

    fn count(&self) -> Result<usize, EngineError> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM products", [], |r| r.get(0))?;
        Ok(count as usize)
    }

    fn clear(&self) -> Result<usize, EngineError> {
        let conn = self.lock()?;
        let removed = conn
            .execute("DELETE FROM products", [])
            .map_err(|e| EngineError::Storage(format!("Failed to delete products: {e}")))?;
        Ok(removed)
    }

    fn scan(&self, visit: &mut dyn FnMut(StoredVector<'_>)) -> Result<(), EngineError> {
        // Snapshot under the lock, then decode and score without it.
        let raws = {
            let conn = self.lock()?;
            let mut stmt = conn.prepare(&format!("SELECT {SELECT_COLS} FROM products ORDER BY id"))?;
            let raws = stmt
                .query_map([], RawRow::read)?
                .collect::<Result<Vec<_>, _>>()?;
            raws
        };
        for raw in raws {
            let (id, metadata, vector) = raw.into_parts()?;
            visit(StoredVector {
                id: &id,
                metadata: &metadata,
                vector: &vector,
            });
        }
        Ok(())
    }
}
