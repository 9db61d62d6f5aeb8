//! Email text cleaning and the stopword corpus.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:https?\S+|www\.\S+)").expect("valid url regex"));

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}").expect("valid email regex")
});

static NON_LETTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z ]+").expect("valid letter regex"));

/// NLTK English stopword list.
const ENGLISH_STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your", "yours",
    "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers", "herself",
    "it", "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
    "who", "whom", "this", "that", "these", "those", "am", "is", "are", "was", "were", "be",
    "been", "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an",
    "the", "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by",
    "for", "with", "about", "against", "between", "into", "through", "during", "before",
    "after", "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over",
    "under", "again", "further", "then", "once", "here", "there", "when", "where", "why",
    "how", "all", "any", "both", "each", "few", "more", "most", "other", "some", "such", "no",
    "nor", "not", "only", "own", "same", "so", "than", "too", "very", "s", "t", "can", "will",
    "just", "don", "should", "now", "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren",
    "couldn", "didn", "doesn", "hadn", "hasn", "haven", "isn", "ma", "mightn", "mustn",
    "needn", "shan", "shouldn", "wasn", "weren", "won", "wouldn",
];

/// Boilerplate that shows up in nearly every marketing or notification email.
const EMAIL_STOPWORDS: &[&str] = &[
    "unsubscribe", "click", "view", "browser", "reply", "email", "emails", "mail", "http",
    "https", "www", "com", "html", "nbsp", "amp", "please", "thanks", "thank", "regards",
    "hello", "dear", "team", "inbox", "online", "link", "here", "also", "would", "could",
    "get", "got", "one", "may", "via", "sent",
];

static STOPWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    ENGLISH_STOPWORDS
        .iter()
        .chain(EMAIL_STOPWORDS.iter())
        .copied()
        .collect()
});

/// Whether a lowercase word is in the stopword corpus.
pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(word)
}

/// Strip URLs and addresses, keep ASCII letters, lowercase.
fn letters_only(text: &str) -> String {
    let text = URL_RE.replace_all(text, " ");
    let text = EMAIL_RE.replace_all(&text, " ");
    NON_LETTER_RE.replace_all(&text, " ").to_lowercase()
}

/// Clean an email's text for topic modeling.
///
/// Words that are stopwords or two characters or shorter are dropped.
pub fn clean_text(text: &str) -> String {
    letters_only(text)
        .split_whitespace()
        .filter(|w| w.len() > 2 && !is_stopword(w))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Clean `text`, falling back to the letters of `subject` when nothing survives.
pub fn clean_document(text: &str, subject: &str) -> String {
    let cleaned = clean_text(text);
    if !cleaned.is_empty() {
        return cleaned;
    }
    letters_only(subject)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lowercase domain of a `From` header such as `"GitHub <noreply@github.com>"`.
pub fn sender_domain(from: &str) -> Option<String> {
    let address = match (from.rfind('<'), from.rfind('>')) {
        (Some(start), Some(end)) if start < end => &from[start + 1..end],
        _ => from,
    };
    let domain = address.trim().rsplit_once('@')?.1.trim().to_lowercase();
    if domain.is_empty() || !domain.contains('.') {
        return None;
    }
    Some(domain)
}
