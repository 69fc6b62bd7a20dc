use crate::domain::entities::product::ProductMetadata;
use serde::Serialize;
use std::path::PathBuf;

/// Where an ingestion item's source image comes from.
#[derive(Debug, Clone)]
pub enum ImageSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

#[derive(Debug, Clone)]
pub struct IngestItem {
    pub id: String,
    pub metadata: ProductMetadata,
    pub source: ImageSource,
}

/// Per-batch outcome counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    pub inserted: usize,
    /// Source image missing or undecodable.
    pub skipped: usize,
    /// Embedding or storage failure.
    pub failed: usize,
}

impl IngestStats {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    pub fn total(&self) -> usize {
        self.inserted + self.skipped + self.failed
    }
}
