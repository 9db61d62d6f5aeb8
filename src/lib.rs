//! Email Topics Service - Library Entry Point
//!
//! Groups a batch of emails into labeled topics: text cleaning, sentence
//! embeddings, PCA, HDBSCAN, c-TF-IDF labels, fuzzy label merging.

pub mod clients;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod traits;

// Re-export commonly used types
pub use clients::{HashingEmbeddingClient, LocalEmbeddingClient, LocalModelConfig};
pub use config::{Config, EmbeddingBackend};
pub use error::{TopicError, TopicResult};
pub use handlers::{create_app, AppState};
pub use models::{EmailInput, TopicGroup};
pub use services::TopicOrchestrator;
pub use traits::{BatchEmbeddingRequest, BatchEmbeddingResponse, EmbeddingClient};
