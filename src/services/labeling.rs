//! Topic labeling: class-based TF-IDF topic words and label derivation.
//!
//! Each cluster (noise included) is treated as one large document. Words
//! are weighted by how frequent they are inside the cluster relative to how
//! common they are across all clusters:
//!
//! `w(t, c) = tf(t, c) / |c| * ln(1 + A / f(t))`
//!
//! where `A` is the average number of words per cluster and `f(t)` the
//! frequency of `t` over every cluster.

use std::collections::{BTreeSet, HashMap};

use crate::services::clustering::NOISE;
use crate::services::dictionary::{is_junk, label_for_domain, label_for_keyword};

/// How many top words are considered for dictionary lookup.
pub const TOP_WORDS: usize = 10;

/// How many keywords are reported with a topic.
pub const REPORTED_KEYWORDS: usize = 5;

/// Label used for HDBSCAN noise unless noise labeling is enabled.
pub const NOISE_LABEL: &str = "Miscellaneous";

/// Top c-TF-IDF words per class, highest weight first.
///
/// `classes[i]` holds the cleaned documents of class `i`. Only words found
/// in at least two documents are used unless that leaves no vocabulary.
pub fn class_top_words(classes: &[Vec<&str>], top_n: usize) -> Vec<Vec<(String, f64)>> {
    let tokenized: Vec<Vec<Vec<&str>>> = classes
        .iter()
        .map(|docs| docs.iter().map(|d| d.split_whitespace().collect()).collect())
        .collect();

    let mut document_frequency: HashMap<&str, usize> = HashMap::new();
    for docs in &tokenized {
        for tokens in docs {
            let unique: BTreeSet<&str> = tokens.iter().copied().collect();
            for term in unique {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }
    }

    let mut vocabulary: BTreeSet<&str> = document_frequency
        .iter()
        .filter(|(_, &df)| df >= 2)
        .map(|(&t, _)| t)
        .collect();
    if vocabulary.is_empty() {
        vocabulary = document_frequency.keys().copied().collect();
    }

    let class_counts: Vec<HashMap<&str, usize>> = tokenized
        .iter()
        .map(|docs| {
            let mut counts = HashMap::new();
            for term in docs.iter().flatten().filter(|t| vocabulary.contains(*t)) {
                *counts.entry(*term).or_insert(0) += 1;
            }
            counts
        })
        .collect();

    let mut total_frequency: HashMap<&str, usize> = HashMap::new();
    for counts in &class_counts {
        for (&term, &count) in counts {
            *total_frequency.entry(term).or_insert(0) += count;
        }
    }

    let total_words: usize = total_frequency.values().sum();
    let average_words = if classes.is_empty() {
        0.0
    } else {
        total_words as f64 / classes.len() as f64
    };

    class_counts
        .iter()
        .map(|counts| {
            let class_size: usize = counts.values().sum();
            if class_size == 0 {
                return Vec::new();
            }
            let mut weights: Vec<(String, f64)> = counts
                .iter()
                .map(|(&term, &count)| {
                    let tf = count as f64 / class_size as f64;
                    let idf = (1.0 + average_words / total_frequency[term] as f64).ln();
                    (term.to_string(), tf * idf)
                })
                .filter(|(_, w)| *w > 0.0)
                .collect();
            weights.sort_by(|a, b| {
                b.1.partial_cmp(&a.1)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.0.cmp(&b.0))
            });
            weights.truncate(top_n);
            weights
        })
        .collect()
}

/// Derive a label for one cluster.
///
/// Returns `None` when every candidate is junk, meaning the cluster should
/// be dropped.
pub fn label_cluster(
    cluster_id: i32,
    top_words: &[String],
    sender_domains: &[Option<String>],
    label_noise: bool,
) -> Option<String> {
    if cluster_id == NOISE && !label_noise {
        return Some(NOISE_LABEL.to_string());
    }

    if let Some(label) = dominant_domain_label(sender_domains) {
        return Some(label.to_string());
    }

    if let Some(label) = top_words
        .iter()
        .take(TOP_WORDS)
        .find_map(|w| label_for_keyword(w))
    {
        return Some(label.to_string());
    }

    if top_words.is_empty() {
        return Some(format!("Topic {}", cluster_id));
    }

    top_words
        .iter()
        .find(|w| !is_junk(w))
        .map(|w| title_case(w))
}

/// Keywords reported with a topic: the top non-junk words.
pub fn reported_keywords(top_words: &[String]) -> Vec<String> {
    top_words
        .iter()
        .filter(|w| !is_junk(w))
        .take(REPORTED_KEYWORDS)
        .cloned()
        .collect()
}

/// Dictionary label shared by at least half of the cluster's senders.
fn dominant_domain_label(sender_domains: &[Option<String>]) -> Option<&'static str> {
    if sender_domains.is_empty() {
        return None;
    }

    let mut counts: HashMap<&'static str, usize> = HashMap::new();
    for label in sender_domains
        .iter()
        .flatten()
        .filter_map(|d| label_for_domain(d))
    {
        *counts.entry(label).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
        .filter(|(_, count)| count * 2 >= sender_domains.len())
        .map(|(label, _)| label)
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
