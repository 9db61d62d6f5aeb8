//! Embedding clients module.

pub mod hashing;
pub mod local;

pub use hashing::HashingEmbeddingClient;
pub use local::{LocalEmbeddingClient, LocalModelConfig};
