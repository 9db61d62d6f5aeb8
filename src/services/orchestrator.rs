//! Topic clustering orchestrator.
//!
//! Owns the embedding client and runs the request pipeline:
//! validate → clean → embed → reduce → cluster → label → merge → rank.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::clients::{HashingEmbeddingClient, LocalEmbeddingClient};
use crate::config::{Config, EmbeddingBackend};
use crate::error::{TopicError, TopicResult};
use crate::models::{EmailInput, TopicGroup, ValidEmail};
use crate::services::clustering::{cluster_points, distinct_clusters, ClusterParams};
use crate::services::labeling::{class_top_words, label_cluster, reported_keywords, TOP_WORDS};
use crate::services::merge::{merge_similar, rank, TopicDraft};
use crate::services::reduction::reduce_dimensions;
use crate::services::text::{clean_document, sender_domain};
use crate::traits::{BatchEmbeddingRequest, EmbeddingClient};

/// The main orchestrator that turns a batch of emails into topic groups.
pub struct TopicOrchestrator {
    client: Arc<dyn EmbeddingClient>,
    config: Config,
}

impl TopicOrchestrator {
    /// Create an orchestrator with the configured embedding backend.
    ///
    /// A missing or broken local model falls back to the hashing embedder.
    pub fn new(config: &Config) -> Self {
        let client: Arc<dyn EmbeddingClient> = match config.embedding_backend {
            EmbeddingBackend::Local => {
                let local = config
                    .validate_model_files()
                    .map_err(anyhow::Error::msg)
                    .and_then(|_| LocalEmbeddingClient::new(config.to_local_model_config()));
                match local {
                    Ok(client) => {
                        info!(
                            "✓ Local embedding model initialized: {} ({}D)",
                            config.model_name, config.model_dimension
                        );
                        Arc::new(client)
                    }
                    Err(e) => {
                        warn!("Local embedding model unavailable, using hashing embedder: {}", e);
                        Arc::new(HashingEmbeddingClient::new(config.hashing_dimension))
                    }
                }
            }
            EmbeddingBackend::Hashing => {
                Arc::new(HashingEmbeddingClient::new(config.hashing_dimension))
            }
        };

        Self::with_client(client, config.clone())
    }

    /// Create an orchestrator around an existing client.
    pub fn with_client(client: Arc<dyn EmbeddingClient>, config: Config) -> Self {
        Self { client, config }
    }

    /// Name of the active embedding backend.
    pub fn backend(&self) -> &str {
        self.client.provider_name()
    }

    /// Get the model name.
    pub fn model_name(&self) -> &str {
        self.client.model_name()
    }

    /// Get the embedding dimension.
    pub fn dimension(&self) -> u32 {
        self.client.dimension()
    }

    /// Filter the batch down to usable emails.
    pub fn validate(&self, emails: Vec<EmailInput>) -> TopicResult<Vec<ValidEmail>> {
        if emails.is_empty() {
            return Err(TopicError::NoData);
        }
        if emails.len() > self.config.max_emails {
            return Err(TopicError::TooManyEmails {
                count: emails.len(),
                max: self.config.max_emails,
            });
        }

        let valid: Vec<ValidEmail> = emails.into_iter().filter_map(EmailInput::into_valid).collect();
        if valid.len() < 2 {
            return Err(TopicError::InsufficientEmails);
        }
        Ok(valid)
    }

    /// Cluster a batch of emails into labeled, ranked topic groups.
    pub async fn cluster_emails(&self, emails: Vec<EmailInput>) -> TopicResult<Vec<TopicGroup>> {
        let received = emails.len();
        let valid = self.validate(emails)?;
        info!("Valid emails to cluster: {} of {}", valid.len(), received);

        let documents: Vec<String> = valid
            .iter()
            .map(|e| clean_document(&e.text(), &e.subject))
            .collect();

        let response = self
            .client
            .embed_batch(BatchEmbeddingRequest {
                texts: documents.clone(),
            })
            .await
            .map_err(|e| TopicError::Embedding(e.to_string()))?;

        if response.embeddings.len() != documents.len() {
            return Err(TopicError::Embedding(format!(
                "expected {} embeddings, got {}",
                documents.len(),
                response.embeddings.len()
            )));
        }

        let params = ClusterParams::for_batch(valid.len(), self.config.reduced_dimensions);
        debug!(?params, model = %response.model, "Embedded documents");

        let config = self.config.clone();
        let embeddings = response.embeddings;
        let groups = tokio::task::spawn_blocking(move || {
            build_topics(&valid, &documents, embeddings, &params, &config)
        })
        .await
        .map_err(|e| TopicError::Internal(format!("clustering task failed: {}", e)))??;

        info!("Produced {} topic groups", groups.len());
        Ok(groups)
    }
}

/// CPU-bound part of the pipeline: reduce, cluster, label, merge, rank.
fn build_topics(
    emails: &[ValidEmail],
    documents: &[String],
    embeddings: Vec<Vec<f32>>,
    params: &ClusterParams,
    config: &Config,
) -> TopicResult<Vec<TopicGroup>> {
    let reduced = reduce_dimensions(&embeddings, params.n_components)?;
    let labels = cluster_points(reduced, params)?;
    info!(
        "HDBSCAN found {} clusters (min_cluster_size={}, min_samples={})",
        distinct_clusters(&labels),
        params.min_cluster_size,
        params.min_samples
    );

    Ok(assemble_topics(emails, documents, &labels, config))
}

/// Label each cluster, drop all-junk ones, merge similar labels and rank.
///
/// `labels` holds one cluster id per email, with
/// [`NOISE`](crate::services::clustering::NOISE) for outliers.
fn assemble_topics(
    emails: &[ValidEmail],
    documents: &[String],
    labels: &[i32],
    config: &Config,
) -> Vec<TopicGroup> {
    let mut clusters: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
    for (idx, &label) in labels.iter().enumerate() {
        clusters.entry(label).or_default().push(idx);
    }

    let class_documents: Vec<Vec<&str>> = clusters
        .values()
        .map(|members| members.iter().map(|&i| documents[i].as_str()).collect())
        .collect();
    let top_words = class_top_words(&class_documents, TOP_WORDS);

    let mut drafts = Vec::with_capacity(clusters.len());
    for ((&cluster_id, members), weighted) in clusters.iter().zip(top_words) {
        let words: Vec<String> = weighted.into_iter().map(|(word, _)| word).collect();
        let domains: Vec<Option<String>> = members
            .iter()
            .map(|&i| emails[i].from.as_deref().and_then(sender_domain))
            .collect();

        match label_cluster(cluster_id, &words, &domains, config.label_noise) {
            Some(label) => {
                debug!(cluster_id, %label, size = members.len(), "Labeled cluster");
                drafts.push(TopicDraft {
                    label,
                    keywords: reported_keywords(&words),
                    members: members.clone(),
                });
            }
            None => {
                debug!(cluster_id, ?words, "Discarding cluster with only junk labels");
            }
        }
    }

    let merged = merge_similar(drafts, config.merge_threshold);
    rank(merged, emails)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(id: &str, subject: &str, snippet: &str) -> EmailInput {
        EmailInput {
            email_id: Some(id.to_string()),
            subject: Some(subject.to_string()),
            snippet: Some(snippet.to_string()),
            ..Default::default()
        }
    }

    fn orchestrator() -> TopicOrchestrator {
        TopicOrchestrator::new(&Config::hashing())
    }

    #[test]
    fn test_validate_rejects_empty_batch() {
        let err = orchestrator().validate(vec![]).unwrap_err();
        assert!(matches!(err, TopicError::NoData));
    }

    #[test]
    fn test_validate_needs_two_valid_emails() {
        let emails = vec![
            email("1", "Invoice", "Your invoice is ready"),
            email("2", "", "no subject"),
        ];
        let err = orchestrator().validate(emails).unwrap_err();
        assert!(matches!(err, TopicError::InsufficientEmails));
    }

    #[test]
    fn test_validate_caps_batch_size() {
        let config = Config {
            max_emails: 2,
            ..Config::hashing()
        };
        let orchestrator = TopicOrchestrator::new(&config);
        let emails = (0..3).map(|i| email(&i.to_string(), "s", "t")).collect();
        let err = orchestrator.validate(emails).unwrap_err();
        assert!(matches!(err, TopicError::TooManyEmails { count: 3, max: 2 }));
    }

    #[test]
    fn test_hashing_backend_is_selected() {
        let orchestrator = orchestrator();
        assert_eq!(orchestrator.backend(), "hashing");
        assert_eq!(orchestrator.dimension(), 384);
    }

    #[test]
    fn test_missing_local_model_falls_back_to_hashing() {
        let config = Config {
            model_path: "/nonexistent/model.onnx".to_string(),
            ..Config::default()
        };
        assert_eq!(TopicOrchestrator::new(&config).backend(), "hashing");
    }

    #[tokio::test]
    async fn test_cluster_emails_groups_every_valid_email_once() {
        let names = ["alpha", "bravo", "charlie", "delta", "echo", "foxtrot"];
        let mut emails = Vec::new();
        for (i, name) in names.iter().enumerate() {
            emails.push(email(
                &format!("inv{i}"),
                "Invoice payment due",
                &format!("Your invoice payment for the {name} billing statement is due"),
            ));
            emails.push(email(
                &format!("fb{i}"),
                "Football match tickets",
                &format!("Football league match tickets for the {name} stadium game"),
            ));
        }
        emails.push(email("bad", "", "ignored"));

        let groups = orchestrator().cluster_emails(emails).await.unwrap();
        assert!(!groups.is_empty());

        let total: usize = groups.iter().map(|g| g.count).sum();
        assert!(total <= 12);
        for pair in groups.windows(2) {
            assert!(pair[0].count >= pair[1].count);
        }

        let mut ids: Vec<&str> = groups
            .iter()
            .flat_map(|g| g.emails.iter().map(|e| e.id.as_str()))
            .collect();
        let before = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), before, "an email appeared in two groups");
        assert!(!ids.contains(&"bad"));
    }

    #[test]
    fn test_build_topics_labels_and_merges() {
        let emails = valid_emails(4);
        let docs = documents(&["invoice payment", "invoice payment", "flight hotel", "flight hotel"]);
        let embeddings = vec![
            vec![1.0, 0.0],
            vec![1.0, 0.01],
            vec![-1.0, 5.0],
            vec![-1.0, 5.01],
        ];
        let params = ClusterParams {
            min_cluster_size: 2,
            min_samples: 1,
            n_components: 0,
        };
        let groups = build_topics(&emails, &docs, embeddings, &params, &Config::hashing()).unwrap();

        let total: usize = groups.iter().map(|g| g.count).sum();
        assert_eq!(total, 4);
        let sum: f64 = groups.iter().map(|g| g.percentage).sum();
        assert!((sum - 100.0).abs() < 0.5);
    }

    fn valid_emails(n: usize) -> Vec<ValidEmail> {
        (0..n)
            .map(|i| ValidEmail {
                id: i.to_string(),
                subject: "s".to_string(),
                snippet: "t".to_string(),
                from: None,
                date: None,
            })
            .collect()
    }

    fn documents(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_all_junk_cluster_is_dropped_with_its_emails() {
        let emails = valid_emails(4);
        let docs = documents(&["invoice payment", "invoice payment", "hello dear", "hello dear"]);
        let groups = assemble_topics(&emails, &docs, &[0, 0, 1, 1], &Config::hashing());

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].topic, "Finance & Billing");
        assert_eq!(groups[0].count, 2);
        assert_eq!(groups[0].percentage, 50.0);
        let total: usize = groups.iter().map(|g| g.count).sum();
        assert!(total < emails.len());
        assert!(groups[0].emails.iter().all(|e| e.id == "0" || e.id == "1"));
    }

    #[test]
    fn test_noise_labeling_follows_config() {
        use crate::services::clustering::NOISE;

        let emails = valid_emails(4);
        let docs = documents(&["invoice payment", "invoice payment", "flight hotel", "flight hotel"]);
        let labels = [0, 0, NOISE, NOISE];

        let groups = assemble_topics(&emails, &docs, &labels, &Config::hashing());
        let topics: Vec<&str> = groups.iter().map(|g| g.topic.as_str()).collect();
        assert_eq!(topics, vec!["Finance & Billing", "Miscellaneous"]);

        let config = Config {
            label_noise: true,
            ..Config::hashing()
        };
        let groups = assemble_topics(&emails, &docs, &labels, &config);
        let topics: Vec<&str> = groups.iter().map(|g| g.topic.as_str()).collect();
        assert_eq!(topics, vec!["Finance & Billing", "Travel"]);
    }

    #[tokio::test]
    async fn test_identical_emails_form_one_topic() {
        for n in [7, 40] {
            let emails = (0..n)
                .map(|i| email(&i.to_string(), "Invoice due", "Your invoice is due"))
                .collect();
            let groups = orchestrator().cluster_emails(emails).await.unwrap();

            assert_eq!(groups.len(), 1, "identical emails split: {:?}", groups);
            assert_eq!(groups[0].topic, "Finance & Billing");
            assert_eq!(groups[0].count, n);
            assert_eq!(groups[0].percentage, 100.0);
        }
    }
}
