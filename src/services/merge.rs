//! Merging near-duplicate topic labels and ranking the final groups.

use std::collections::HashMap;

use crate::models::{TopicGroup, ValidEmail};
use crate::services::labeling::REPORTED_KEYWORDS;

/// A labeled cluster before merging: member indices into the valid emails.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicDraft {
    pub label: String,
    pub keywords: Vec<String>,
    pub members: Vec<usize>,
}

impl TopicDraft {
    fn absorb(&mut self, other: TopicDraft) {
        self.members.extend(other.members);
        for keyword in other.keywords {
            if !self.keywords.contains(&keyword) {
                self.keywords.push(keyword);
            }
        }
        self.keywords.truncate(REPORTED_KEYWORDS);
    }
}

/// Whether two labels name the same topic.
///
/// Labels match on normalised Levenshtein similarity, or when one label's
/// words are a leading run of the other's ("GitHub" / "GitHub Actions").
pub fn labels_similar(a: &str, b: &str, threshold: f64) -> bool {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a == b {
        return true;
    }
    if strsim::normalized_levenshtein(&a, &b) >= threshold {
        return true;
    }

    let a_words: Vec<&str> = a.split_whitespace().collect();
    let b_words: Vec<&str> = b.split_whitespace().collect();
    let (short, long) = if a_words.len() <= b_words.len() {
        (a_words, b_words)
    } else {
        (b_words, a_words)
    };
    !short.is_empty() && long.starts_with(&short)
}

/// Merge drafts whose labels are equal or similar. The larger draft's label wins.
pub fn merge_similar(drafts: Vec<TopicDraft>, threshold: f64) -> Vec<TopicDraft> {
    // Exact (case-insensitive) matches first.
    let mut by_label: HashMap<String, usize> = HashMap::new();
    let mut exact: Vec<TopicDraft> = Vec::new();
    for draft in drafts {
        let key = draft.label.trim().to_lowercase();
        match by_label.get(&key) {
            Some(&idx) => {
                if draft.members.len() > exact[idx].members.len() {
                    exact[idx].label = draft.label.clone();
                }
                exact[idx].absorb(draft);
            }
            None => {
                by_label.insert(key, exact.len());
                exact.push(draft);
            }
        }
    }

    sort_drafts(&mut exact);

    let mut merged: Vec<TopicDraft> = Vec::new();
    for draft in exact {
        let similar = merged
            .iter()
            .position(|kept| labels_similar(&kept.label, &draft.label, threshold));
        match similar {
            Some(idx) => merged[idx].absorb(draft),
            None => merged.push(draft),
        }
    }

    sort_drafts(&mut merged);
    for draft in &mut merged {
        draft.members.sort_unstable();
    }
    merged
}

/// Turn merged drafts into response groups with counts and percentages.
pub fn rank(drafts: Vec<TopicDraft>, emails: &[ValidEmail]) -> Vec<TopicGroup> {
    let total = emails.len();
    let mut groups: Vec<TopicGroup> = drafts
        .into_iter()
        .map(|draft| {
            let count = draft.members.len();
            TopicGroup {
                topic: draft.label,
                emails: draft
                    .members
                    .iter()
                    .filter_map(|&i| emails.get(i))
                    .map(ValidEmail::summary)
                    .collect(),
                count,
                percentage: percentage(count, total),
                keywords: draft.keywords,
            }
        })
        .collect();

    groups.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.topic.cmp(&b.topic)));
    groups
}

/// `count / total` in percent, one decimal place.
pub fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 / total as f64 * 1000.0).round() / 10.0
}

fn sort_drafts(drafts: &mut [TopicDraft]) {
    drafts.sort_by(|a, b| {
        b.members
            .len()
            .cmp(&a.members.len())
            .then_with(|| a.label.cmp(&b.label))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(label: &str, members: &[usize], keywords: &[&str]) -> TopicDraft {
        TopicDraft {
            label: label.to_string(),
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            members: members.to_vec(),
        }
    }

    fn email(id: &str) -> ValidEmail {
        ValidEmail {
            id: id.to_string(),
            subject: format!("subject {id}"),
            snippet: format!("snippet {id}"),
            from: None,
            date: None,
        }
    }

    #[test]
    fn test_labels_similar() {
        assert!(labels_similar("Invoice", "invoice", 0.85));
        assert!(labels_similar("Invoices", "Invoice", 0.85));
        assert!(labels_similar("GitHub", "GitHub Actions", 0.85));
        assert!(!labels_similar("Travel", "Finance & Billing", 0.85));
        assert!(!labels_similar("Git", "GitHub", 0.85));
    }

    #[test]
    fn test_exact_labels_merge_case_insensitively() {
        let merged = merge_similar(
            vec![
                draft("travel", &[0], &["flight"]),
                draft("Travel", &[1, 2], &["hotel"]),
            ],
            0.85,
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].label, "Travel");
        assert_eq!(merged[0].members, vec![0, 1, 2]);
        assert_eq!(merged[0].keywords, vec!["flight", "hotel"]);
    }

    #[test]
    fn test_fuzzy_merge_keeps_larger_label() {
        let merged = merge_similar(
            vec![
                draft("Invoices", &[5], &[]),
                draft("Invoice", &[0, 1, 2], &[]),
                draft("Football", &[3, 4], &[]),
            ],
            0.85,
        );
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].label, "Invoice");
        assert_eq!(merged[0].members, vec![0, 1, 2, 5]);
        assert_eq!(merged[1].label, "Football");
    }

    #[test]
    fn test_keywords_are_capped() {
        let merged = merge_similar(
            vec![
                draft("Travel", &[0, 1], &["a1", "a2", "a3", "a4"]),
                draft("travel", &[2], &["b1", "b2", "a1"]),
            ],
            0.85,
        );
        assert_eq!(merged[0].keywords.len(), REPORTED_KEYWORDS);
        assert_eq!(merged[0].keywords, vec!["a1", "a2", "a3", "a4", "b1"]);
    }

    #[test]
    fn test_rank_orders_and_computes_percentages() {
        let emails: Vec<ValidEmail> = (0..4).map(|i| email(&i.to_string())).collect();
        let groups = rank(
            vec![draft("Beta", &[0], &[]), draft("Alpha", &[1, 2], &[]), draft("Aardvark", &[3], &[])],
            &emails,
        );
        let topics: Vec<&str> = groups.iter().map(|g| g.topic.as_str()).collect();
        assert_eq!(topics, vec!["Alpha", "Aardvark", "Beta"]);
        assert_eq!(groups[0].count, 2);
        assert_eq!(groups[0].percentage, 50.0);
        assert_eq!(groups[0].emails[1].id, "2");
        assert_eq!(groups[1].percentage, 25.0);
    }

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(percentage(1, 3), 33.3);
        assert_eq!(percentage(2, 3), 66.7);
        assert_eq!(percentage(0, 0), 0.0);
    }
}
