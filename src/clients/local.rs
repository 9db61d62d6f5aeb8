//! Local embedding model client using ONNX Runtime.
//!
//! Runs a sentence-transformer (all-MiniLM-L6-v2 by default) entirely
//! on-device. Token embeddings are mean-pooled over the attention mask and
//! L2-normalised, matching the sentence-transformers pipeline.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::services::VectorOps;
use crate::traits::{BatchEmbeddingRequest, BatchEmbeddingResponse, EmbeddingClient};

/// Configuration for the local embedding model.
#[derive(Debug, Clone)]
pub struct LocalModelConfig {
    /// Path to the ONNX model file.
    pub model_path: String,
    /// Path to the tokenizer.json file.
    pub tokenizer_path: String,
    /// Output embedding dimension.
    pub dimension: u32,
    /// Maximum sequence length.
    pub max_length: usize,
    /// Model name for identification.
    pub model_name: String,
}

impl Default for LocalModelConfig {
    fn default() -> Self {
        Self {
            model_path: "./models/all-MiniLM-L6-v2.onnx".to_string(),
            tokenizer_path: "./models/tokenizer.json".to_string(),
            dimension: 384,
            max_length: 256,
            model_name: "all-MiniLM-L6-v2".to_string(),
        }
    }
}

/// Local embedding client using ONNX Runtime for inference.
pub struct LocalEmbeddingClient {
    model: Arc<OnnxModel>,
    config: LocalModelConfig,
}

/// Session and tokenizer, shared with the blocking inference task.
struct OnnxModel {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    max_length: usize,
}

impl LocalEmbeddingClient {
    /// Create a new local embedding client.
    ///
    /// # Arguments
    /// * `config` - Configuration for the model
    pub fn new(config: LocalModelConfig) -> Result<Self> {
        info!("Initializing local embedding model: {}", config.model_name);

        if !Path::new(&config.model_path).exists() {
            return Err(anyhow!(
                "Model file not found: {}. Please download the model first.",
                config.model_path
            ));
        }

        if !Path::new(&config.tokenizer_path).exists() {
            return Err(anyhow!(
                "Tokenizer file not found: {}. Please download the tokenizer first.",
                config.tokenizer_path
            ));
        }

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(4)?
            .commit_from_file(&config.model_path)?;

        info!("✓ ONNX session created for {}", config.model_name);

        let tokenizer = Tokenizer::from_file(&config.tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer: {}", e))?;

        info!("✓ Tokenizer loaded");

        Ok(Self {
            model: Arc::new(OnnxModel {
                session: Mutex::new(session),
                tokenizer,
                max_length: config.max_length,
            }),
            config,
        })
    }

    /// Create with default configuration (all-MiniLM-L6-v2).
    pub fn with_defaults() -> Result<Self> {
        Self::new(LocalModelConfig::default())
    }
}

impl OnnxModel {
    /// Tokenize and encode text for the model.
    fn encode_text(&self, text: &str) -> Result<(Vec<i64>, Vec<i64>)> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow!("Tokenization failed: {}", e))?;

        let max_len = self.max_length;
        let input_ids: Vec<i64> = encoding
            .get_ids()
            .iter()
            .take(max_len)
            .map(|&id| id as i64)
            .collect();
        let attention_mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .take(max_len)
            .map(|&m| m as i64)
            .collect();

        Ok((input_ids, attention_mask))
    }

    /// Run inference on a single text.
    fn run_inference(&self, text: &str) -> Result<Vec<f32>> {
        let (input_ids, attention_mask) = self.encode_text(text)?;
        let seq_len = input_ids.len();
        let mask: Vec<f32> = attention_mask.iter().map(|&m| m as f32).collect();

        let input_ids_tensor = Tensor::from_array(([1usize, seq_len], input_ids.into_boxed_slice()))?;
        let attention_mask_tensor =
            Tensor::from_array(([1usize, seq_len], attention_mask.into_boxed_slice()))?;
        let token_type_ids = vec![0i64; seq_len];
        let token_type_ids_tensor =
            Tensor::from_array(([1usize, seq_len], token_type_ids.into_boxed_slice()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| anyhow!("Failed to lock session: {}", e))?;
        let outputs = session.run(ort::inputs![
            input_ids_tensor,
            attention_mask_tensor,
            token_type_ids_tensor,
        ])?;

        let output = outputs
            .iter()
            .next()
            .ok_or_else(|| anyhow!("No output tensor found"))?
            .1;

        let (shape, data) = output.try_extract_tensor::<f32>()?;

        // [batch, seq_len, hidden] needs pooling; [batch, hidden] is already pooled.
        let embedding = match shape.len() {
            3 => {
                let seq_len = shape[1] as usize;
                let hidden_size = shape[2] as usize;
                mean_pool(data, &mask, seq_len, hidden_size)
            }
            2 => data.to_vec(),
            _ => return Err(anyhow!("Unexpected output tensor shape: {:?}", shape)),
        };

        Ok(VectorOps::normalize(&embedding))
    }
}

/// Mean of token vectors weighted by the attention mask.
fn mean_pool(data: &[f32], mask: &[f32], seq_len: usize, hidden_size: usize) -> Vec<f32> {
    let mut pooled = vec![0.0f32; hidden_size];
    let mut weight = 0.0f32;
    for j in 0..seq_len {
        let m = mask.get(j).copied().unwrap_or(1.0);
        if m == 0.0 {
            continue;
        }
        weight += m;
        let row = &data[j * hidden_size..(j + 1) * hidden_size];
        for (p, v) in pooled.iter_mut().zip(row) {
            *p += v * m;
        }
    }
    if weight > 0.0 {
        pooled.iter_mut().for_each(|x| *x /= weight);
    }
    pooled
}

#[async_trait]
impl EmbeddingClient for LocalEmbeddingClient {
    async fn embed_batch(&self, request: BatchEmbeddingRequest) -> Result<BatchEmbeddingResponse> {
        debug!("Running local inference for {} texts", request.texts.len());

        let model = Arc::clone(&self.model);
        let texts = request.texts;
        let embeddings = tokio::task::spawn_blocking(move || {
            texts
                .iter()
                .map(|text| model.run_inference(text))
                .collect::<Result<Vec<_>>>()
        })
        .await
        .map_err(|e| anyhow!("Embedding task failed: {}", e))??;

        Ok(BatchEmbeddingResponse {
            embeddings,
            dimension: self.config.dimension,
            model: self.config.model_name.clone(),
        })
    }

    fn dimension(&self) -> u32 {
        self.config.dimension
    }

    fn provider_name(&self) -> &str {
        "local"
    }

    fn model_name(&self) -> &str {
        &self.config.model_name
    }
}
