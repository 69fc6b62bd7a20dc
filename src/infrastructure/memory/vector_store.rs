use crate::domain::entities::product::{StoredVector, VectorRecord};
use crate::domain::error::EngineError;
use crate::domain::ports::vector_store::VectorStore;
use crate::domain::values::embedding::validate_vector;
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Process-local store keyed by id.
///
/// Readers share the lock for the length of a scan; a writer swaps a whole
/// record under the exclusive lock.
#[derive(Default)]
pub struct MemoryVectorStore {
    records: RwLock<BTreeMap<String, VectorRecord>>,
}

impl MemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<String, VectorRecord>>, EngineError> {
        self.records
            .read()
            .map_err(|e| EngineError::Storage(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<String, VectorRecord>>, EngineError> {
        self.records
            .write()
            .map_err(|e| EngineError::Storage(e.to_string()))
    }
}

impl VectorStore for MemoryVectorStore {
    fn upsert(&self, record: &VectorRecord) -> Result<(), EngineError> {
        validate_vector(record.embedding.as_slice())?;
        record.metadata.storable_price(&record.id)?;
        let replacement = record.clone();
        self.write()?.insert(replacement.id.clone(), replacement);
        Ok(())
    }

    fn get(&self, id: &str) -> Result<VectorRecord, EngineError> {
        self.read()?
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::NotFound(id.to_string()))
    }

    fn count(&self) -> Result<usize, EngineError> {
        Ok(self.read()?.len())
    }

    fn clear(&self) -> Result<usize, EngineError> {
        let mut records = self.write()?;
        let removed = records.len();
        records.clear();
        Ok(removed)
    }

    fn scan(&self, visit: &mut dyn FnMut(StoredVector<'_>)) -> Result<(), EngineError> {
        let records = self.read()?;
        for record in records.values() {
            visit(StoredVector {
                id: &record.id,
                metadata: &record.metadata,
                vector: record.embedding.as_slice(),
            });
        }
        Ok(())
    }
}
