use crate::domain::entities::product::StoredVector;
use crate::domain::entities::search_hit::SearchHit;
use crate::domain::error::EngineError;
use crate::domain::ports::vector_store::VectorStore;
use crate::domain::values::embedding::validate_vector;
use crate::domain::values::search_params::SearchParams;
use crate::domain::values::similarity::cosine_similarity;
use std::sync::Arc;

/// Exact top-K cosine ranking over a full store scan.
pub struct Ranker {
    store: Arc<dyn VectorStore>,
}

impl Ranker {
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self { store }
    }

    /// Hits are ordered by similarity descending, ties broken by ascending id.
    pub fn rank(&self, query: &[f32], params: &SearchParams) -> Result<Vec<SearchHit>, EngineError> {
        validate_vector(query)?;
        params.validate()?;

        let mut hits: Vec<SearchHit> = Vec::new();
        self.store.scan(&mut |stored: StoredVector<'_>| {
            if let Some(category) = &params.category {
                if stored.metadata.category != *category {
                    return;
                }
            }
            let similarity = cosine_similarity(query, stored.vector);
            if similarity >= params.min_similarity {
                hits.push(SearchHit {
                    id: stored.id.to_string(),
                    metadata: stored.metadata.clone(),
                    similarity,
                });
            }
        })?;

        hits.sort_by(|a, b| {
            b.similarity
                .total_cmp(&a.similarity)
                .then_with(|| a.id.cmp(&b.id))
        });
        hits.truncate(params.limit);
        Ok(hits)
    }
}
