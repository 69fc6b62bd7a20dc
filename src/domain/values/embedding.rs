use crate::domain::error::{EngineError, VectorFault};
use serde::{Deserialize, Serialize};

/// Dimensionality shared by every stored and query vector.
pub const EMBEDDING_DIM: usize = 512;

/// Checks the two invariants every vector must satisfy before it is stored
/// or compared: exact dimensionality and finite elements.
pub fn validate_vector(values: &[f32]) -> Result<(), VectorFault> {
    if values.len() != EMBEDDING_DIM {
        return Err(VectorFault::WrongDimension {
            expected: EMBEDDING_DIM,
            actual: values.len(),
        });
    }
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(VectorFault::NonFinite { index }),
        None => Ok(()),
    }
}

/// A validated 512-dimensional feature vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f32>", into = "Vec<f32>")]
pub struct Embedding(Vec<f32>);

impl Embedding {
    pub fn new(values: Vec<f32>) -> Result<Self, EngineError> {
        validate_vector(&values)?;
        Ok(Embedding(values))
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }
}

impl TryFrom<Vec<f32>> for Embedding {
    type Error = EngineError;

    fn try_from(values: Vec<f32>) -> Result<Self, Self::Error> {
        Embedding::new(values)
    }
}

impl From<Embedding> for Vec<f32> {
    fn from(e: Embedding) -> Self {
        e.0
    }
}

impl AsRef<[f32]> for Embedding {
    fn as_ref(&self) -> &[f32] {
        &self.0
    }
}
