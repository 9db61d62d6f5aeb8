//! Error types for the clustering pipeline.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors surfaced by a clustering request.
#[derive(Debug, Error)]
pub enum TopicError {
    #[error("No data provided")]
    NoData,

    #[error("Need at least 2 valid emails")]
    InsufficientEmails,

    #[error("Too many emails: {count} (max {max})")]
    TooManyEmails { count: usize, max: usize },

    #[error("Request body too large (max {limit} bytes)")]
    PayloadTooLarge { limit: usize },

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Clustering failed: {0}")]
    Clustering(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TopicError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NoData | Self::InsufficientEmails | Self::TooManyEmails { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Embedding(_) | Self::Clustering(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoData => "NO_DATA",
            Self::InsufficientEmails => "INSUFFICIENT_EMAILS",
            Self::TooManyEmails { .. } => "TOO_MANY_EMAILS",
            Self::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            Self::Embedding(_) => "EMBEDDING_FAILED",
            Self::Clustering(_) => "CLUSTERING_FAILED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

pub type TopicResult<T> = std::result::Result<T, TopicError>;
