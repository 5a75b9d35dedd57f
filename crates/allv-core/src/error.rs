use crate::validation::FieldErrors;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AllvError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AllvError {
    pub fn user_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "User",
            id: id.into(),
        }
    }

    pub fn post_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "Post",
            id: id.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AllvError>;
