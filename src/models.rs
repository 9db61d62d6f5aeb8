//! API models for request/response types.
//!
//! Defines the JSON request/response structures for the topic clustering API.

use serde::{Deserialize, Serialize};

/// An email as posted by the caller. Every field is optional on the wire;
/// records without both a subject and a snippet are skipped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmailInput {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
    /// Gmail message id.
    #[serde(default)]
    pub email_id: Option<String>,
    /// Alternative id field used by some callers.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

impl EmailInput {
    /// Read one record of the request array. Records that are not objects
    /// of the expected shape become empty inputs and fail validation.
    pub fn from_json(value: serde_json::Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }

    /// Keep the record only if it has both a subject and a snippet.
    pub fn into_valid(self) -> Option<ValidEmail> {
        let subject = self.subject.as_deref().map(str::trim).unwrap_or_default();
        let snippet = self.snippet.as_deref().map(str::trim).unwrap_or_default();
        if subject.is_empty() || snippet.is_empty() {
            return None;
        }

        let id = self
            .email_id
            .as_deref()
            .or(self.id.as_deref())
            .map(str::trim)
            .unwrap_or_default();
        let non_empty = |v: Option<String>| {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        };

        Some(ValidEmail {
            id: id.to_string(),
            subject: subject.to_string(),
            snippet: snippet.to_string(),
            from: non_empty(self.from),
            date: non_empty(self.date),
        })
    }
}

/// An email that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidEmail {
    pub id: String,
    pub subject: String,
    pub snippet: String,
    pub from: Option<String>,
    pub date: Option<String>,
}

impl ValidEmail {
    /// Document text fed to the topic model.
    pub fn text(&self) -> String {
        format!("{} {}", self.subject, self.snippet)
    }

    pub fn summary(&self) -> EmailSummary {
        EmailSummary {
            id: self.id.clone(),
            subject: self.subject.clone(),
            snippet: self.snippet.clone(),
            from: self.from.clone(),
            date: self.date.clone(),
        }
    }
}

/// An email returned inside a topic group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailSummary {
    pub id: String,
    pub subject: String,
    pub snippet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// One labeled cluster of emails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicGroup {
    /// Human-readable label.
    pub topic: String,
    /// Member emails.
    pub emails: Vec<EmailSummary>,
    /// Number of member emails.
    pub count: usize,
    /// Share of all valid emails, in percent.
    pub percentage: f64,
    /// Top topic words for the cluster.
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service name.
    pub service: String,
    /// Service version.
    pub version: String,
    /// Active embedding backend ("local" or "hashing").
    pub embedding_backend: String,
    /// Embedding model name.
    pub model: String,
    /// Embedding dimension.
    pub dimension: u32,
    /// Available endpoints.
    pub endpoints: Vec<String>,
}

/// Error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
    /// Error code (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}
