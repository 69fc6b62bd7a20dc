use crate::domain::error::EngineError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: usize = 5;
pub const MAX_LIMIT: usize = 50;
pub const DEFAULT_MIN_SIMILARITY: f64 = 0.0;

/// Per-query ranking parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    pub limit: usize,
    pub min_similarity: f64,
    /// Restrict ranking to records of this category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl SearchParams {
    pub fn new(limit: usize, min_similarity: f64) -> Result<Self, EngineError> {
        let params = SearchParams {
            limit,
            min_similarity,
            category: None,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Fields are public, so the ranker re-checks before every scan.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.limit < 1 || self.limit > MAX_LIMIT {
            return Err(EngineError::invalid_parameter(
                "limit",
                format!("must be between 1 and {MAX_LIMIT}, got {}", self.limit),
            ));
        }
        if !(0.0..=1.0).contains(&self.min_similarity) {
            return Err(EngineError::invalid_parameter(
                "min_similarity",
                format!("must be between 0.0 and 1.0, got {}", self.min_similarity),
            ));
        }
        Ok(())
    }
}

impl Default for SearchParams {
    fn default() -> Self {
        SearchParams {
            limit: DEFAULT_LIMIT,
            min_similarity: DEFAULT_MIN_SIMILARITY,
            category: None,
        }
    }
}
