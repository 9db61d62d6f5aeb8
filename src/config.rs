//! Configuration module for the topic clustering service.

use std::path::Path;

use crate::clients::LocalModelConfig;

/// Which embedding backend the orchestrator should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingBackend {
    /// ONNX sentence transformer loaded from disk.
    Local,
    /// Hashed term-frequency vectors, no model files needed.
    Hashing,
}

impl EmbeddingBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" | "onnx" => Some(Self::Local),
            "hashing" | "hash" | "tfidf" => Some(Self::Hashing),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Hashing => "hashing",
        }
    }
}

/// Main service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub host: String,
    pub embedding_backend: EmbeddingBackend,
    // Local model
    pub model_name: String,
    pub model_path: String,
    pub tokenizer_path: String,
    pub model_dimension: u32,
    pub max_sequence_length: usize,
    // Hashing fallback
    pub hashing_dimension: usize,
    // Pipeline tuning
    pub reduced_dimensions: usize,
    pub merge_threshold: f64,
    pub max_emails: usize,
    pub label_noise: bool,
    // HTTP
    pub max_body_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5001,
            host: "0.0.0.0".to_string(),
            embedding_backend: EmbeddingBackend::Local,
            model_name: "all-MiniLM-L6-v2".to_string(),
            model_path: "./models/all-MiniLM-L6-v2.onnx".to_string(),
            tokenizer_path: "./models/tokenizer.json".to_string(),
            model_dimension: 384,
            max_sequence_length: 256,
            hashing_dimension: 384,
            reduced_dimensions: 5,
            merge_threshold: 0.85,
            max_emails: 5000,
            label_noise: false,
            // Room for MAX_EMAILS records of a few kilobytes each.
            max_body_bytes: 32 * 1024 * 1024,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: env_parse("PORT").unwrap_or(defaults.port),
            host: std::env::var("HOST").unwrap_or(defaults.host),
            embedding_backend: std::env::var("EMBEDDING_BACKEND")
                .ok()
                .and_then(|v| EmbeddingBackend::parse(&v))
                .unwrap_or(defaults.embedding_backend),
            model_name: std::env::var("MODEL_NAME").unwrap_or(defaults.model_name),
            model_path: std::env::var("MODEL_PATH").unwrap_or(defaults.model_path),
            tokenizer_path: std::env::var("TOKENIZER_PATH").unwrap_or(defaults.tokenizer_path),
            model_dimension: env_parse("MODEL_DIMENSION").unwrap_or(defaults.model_dimension),
            max_sequence_length: env_parse("MAX_SEQUENCE_LENGTH")
                .unwrap_or(defaults.max_sequence_length),
            hashing_dimension: env_parse("HASHING_DIMENSION")
                .filter(|d: &usize| *d > 0)
                .unwrap_or(defaults.hashing_dimension),
            reduced_dimensions: env_parse("REDUCED_DIMENSIONS")
                .filter(|d: &usize| *d > 0)
                .unwrap_or(defaults.reduced_dimensions),
            merge_threshold: env_parse("MERGE_THRESHOLD")
                .filter(|t: &f64| (0.0..=1.0).contains(t))
                .unwrap_or(defaults.merge_threshold),
            max_emails: env_parse("MAX_EMAILS")
                .filter(|m: &usize| *m >= 2)
                .unwrap_or(defaults.max_emails),
            label_noise: env_parse("LABEL_NOISE").unwrap_or(defaults.label_noise),
            max_body_bytes: env_parse("MAX_BODY_BYTES")
                .filter(|b: &usize| *b > 0)
                .unwrap_or(defaults.max_body_bytes),
        }
    }

    /// Configuration for tests and offline use: hashing embedder, default tuning.
    pub fn hashing() -> Self {
        Self {
            embedding_backend: EmbeddingBackend::Hashing,
            ..Self::default()
        }
    }

    /// Check that the ONNX model and tokenizer files exist.
    pub fn validate_model_files(&self) -> Result<(), String> {
        if !Path::new(&self.model_path).exists() {
            return Err(format!("Model file not found: {}", self.model_path));
        }
        if !Path::new(&self.tokenizer_path).exists() {
            return Err(format!("Tokenizer file not found: {}", self.tokenizer_path));
        }
        Ok(())
    }

    /// Build the local client config from the service config.
    pub fn to_local_model_config(&self) -> LocalModelConfig {
        LocalModelConfig {
            model_path: self.model_path.clone(),
            tokenizer_path: self.tokenizer_path.clone(),
            dimension: self.model_dimension,
            max_length: self.max_sequence_length,
            model_name: self.model_name.clone(),
        }
    }
}
