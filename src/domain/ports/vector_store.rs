use crate::domain::entities::product::{StoredVector, VectorRecord};
use crate::domain::error::EngineError;

pub trait VectorStore: Send + Sync {
    /// Insert or fully replace the record keyed by `record.id`.
    fn upsert(&self, record: &VectorRecord) -> Result<(), EngineError>;
    fn get(&self, id: &str) -> Result<VectorRecord, EngineError>;
    fn count(&self) -> Result<usize, EngineError>;
    /// Remove every record, returning how many were removed.
    fn clear(&self) -> Result<usize, EngineError>;
    /// Visit every stored record once, in ascending id order, against a
    /// single consistent snapshot.
    fn scan(&self, visit: &mut dyn FnMut(StoredVector<'_>)) -> Result<(), EngineError>;
}
