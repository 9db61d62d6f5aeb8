//! Hashed term-frequency embedding client.
//!
//! Produces deterministic dense vectors by hashing terms into fixed-dimension
//! buckets. Not as semantically rich as the ONNX model, but needs no model
//! files, so it backs tests and installs without a downloaded model.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;

use crate::services::VectorOps;
use crate::traits::{BatchEmbeddingRequest, BatchEmbeddingResponse, EmbeddingClient};

const MODEL_NAME: &str = "hashed-tf";

/// Embedding client that hashes terms into a fixed number of buckets.
pub struct HashingEmbeddingClient {
    dimension: usize,
}

impl HashingEmbeddingClient {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    /// FNV-1a bucket for a term.
    fn bucket(&self, term: &str) -> usize {
        let mut h: u64 = 0xcbf29ce484222325;
        for b in term.as_bytes() {
            h ^= *b as u64;
            h = h.wrapping_mul(0x100000001b3);
        }
        (h % self.dimension as u64) as usize
    }

    /// Embed one text. Empty input yields the zero vector.
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let tokens: Vec<String> = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|s| s.len() >= 2)
            .map(|s| s.to_lowercase())
            .collect();

        let mut vector = vec![0.0f32; self.dimension];
        if tokens.is_empty() {
            return vector;
        }

        let mut tf: HashMap<&str, f32> = HashMap::new();
        for token in &tokens {
            *tf.entry(token.as_str()).or_default() += 1.0;
        }

        let total = tokens.len() as f32;
        for (term, count) in tf {
            // Longer terms carry more signal than short function words.
            let idf = 1.0 + (term.len() as f32).ln();
            vector[self.bucket(term)] += count / total * idf;
        }

        VectorOps::normalize_inplace(&mut vector);
        vector
    }
}

#[async_trait]
impl EmbeddingClient for HashingEmbeddingClient {
    async fn embed_batch(&self, request: BatchEmbeddingRequest) -> Result<BatchEmbeddingResponse> {
        let embeddings = request.texts.iter().map(|t| self.embed_text(t)).collect();
        Ok(BatchEmbeddingResponse {
            embeddings,
            dimension: self.dimension as u32,
            model: MODEL_NAME.to_string(),
        })
    }

    fn dimension(&self) -> u32 {
        self.dimension as u32
    }

    fn provider_name(&self) -> &str {
        "hashing"
    }

    fn model_name(&self) -> &str {
        MODEL_NAME
    }
}
