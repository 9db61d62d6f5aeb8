//! Core traits for embedding clients.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Batch embedding request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEmbeddingRequest {
    /// The texts to embed.
    pub texts: Vec<String>,
}

/// Batch embedding response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEmbeddingResponse {
    /// The embeddings for each input text, in input order.
    pub embeddings: Vec<Vec<f32>>,
    /// The dimension of the embeddings.
    pub dimension: u32,
    /// The model used.
    pub model: String,
}

/// Trait for embedding clients that can generate embeddings.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Generate embeddings for multiple texts.
    async fn embed_batch(&self, request: BatchEmbeddingRequest) -> Result<BatchEmbeddingResponse>;

    /// Output dimension of the embeddings.
    fn dimension(&self) -> u32;

    /// Get the provider name.
    fn provider_name(&self) -> &str;

    /// Get the model this client runs.
    fn model_name(&self) -> &str;
}
