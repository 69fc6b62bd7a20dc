use crate::domain::entities::product::ProductMetadata;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    #[serde(flatten)]
    pub metadata: ProductMetadata,
    pub similarity: f64,
}
