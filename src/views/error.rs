//! Error taxonomy of the view layer
//!
//! Malformed JSON fields never show up here: the rehydrator treats them as
//! absent.

use crate::graph::ReadError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewError {
    /// A slug, id or structural child does not exist
    #[error("{0}")]
    NotFound(String),

    /// A request parameter is missing or invalid; raised before any read
    #[error("{0}")]
    BadRequest(String),

    /// An expected intermediate structural node is missing
    #[error("{0}")]
    Integrity(String),

    /// The underlying graph read failed
    #[error("Graph read failed: {0}")]
    Read(#[from] ReadError),
}

impl ViewError {
    pub fn not_found(what: impl std::fmt::Display, key: impl std::fmt::Display) -> Self {
        ViewError::NotFound(format!("{} '{}' not found", what, key))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ViewError::BadRequest(message.into())
    }

    /// Short machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            ViewError::NotFound(_) => "not_found",
            ViewError::BadRequest(_) => "bad_request",
            ViewError::Integrity(_) => "integrity_violation",
            ViewError::Read(_) => "internal",
        }
    }
}

pub type ViewResult<T> = Result<T, ViewError>;
