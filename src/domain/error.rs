use std::fmt;
use thiserror::Error;

/// What exactly is wrong with a rejected vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VectorFault {
    WrongDimension { expected: usize, actual: usize },
    NonFinite { index: usize },
}

impl fmt::Display for VectorFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VectorFault::WrongDimension { expected, actual } => {
                write!(f, "expected {expected} dimensions, got {actual}")
            }
            VectorFault::NonFinite { index } => {
                write!(f, "element {index} is NaN or infinite")
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid vector: {0}")]
    InvalidVector(VectorFault),

    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Catalog error: {0}")]
    Catalog(String),
}

impl EngineError {
    pub fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        EngineError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// Caller mistakes, detected before any external call or mutation.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidVector(_)
                | EngineError::InvalidParameter { .. }
                | EngineError::InvalidImage(_)
        )
    }
}

impl From<rusqlite::Error> for EngineError {
    fn from(e: rusqlite::Error) -> Self {
        EngineError::Storage(e.to_string())
    }
}

impl From<VectorFault> for EngineError {
    fn from(fault: VectorFault) -> Self {
        EngineError::InvalidVector(fault)
    }
}
