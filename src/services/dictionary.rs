//! Static sender-domain and keyword dictionaries used to name clusters,
//! plus the list of labels too vague to show.

/// Well-known sender domains and the label their mail should carry.
const DOMAIN_LABELS: &[(&str, &str)] = &[
    ("github.com", "GitHub"),
    ("gitlab.com", "GitLab"),
    ("atlassian.net", "Jira & Confluence"),
    ("slack.com", "Slack"),
    ("linkedin.com", "LinkedIn"),
    ("facebookmail.com", "Facebook"),
    ("instagram.com", "Instagram"),
    ("twitter.com", "Twitter / X"),
    ("x.com", "Twitter / X"),
    ("youtube.com", "YouTube"),
    ("medium.com", "Medium"),
    ("substack.com", "Newsletters"),
    ("amazon.com", "Amazon"),
    ("amazon.in", "Amazon"),
    ("flipkart.com", "Flipkart"),
    ("ebay.com", "eBay"),
    ("paypal.com", "PayPal"),
    ("stripe.com", "Stripe"),
    ("uber.com", "Uber"),
    ("swiggy.in", "Food Delivery"),
    ("zomato.com", "Food Delivery"),
    ("doordash.com", "Food Delivery"),
    ("netflix.com", "Netflix"),
    ("spotify.com", "Spotify"),
    ("google.com", "Google"),
    ("accounts.google.com", "Account Security"),
    ("coursera.org", "Online Learning"),
    ("udemy.com", "Online Learning"),
    ("edx.org", "Online Learning"),
    ("zoom.us", "Meetings"),
    ("calendly.com", "Meetings"),
];

/// Category labels and the topic words that indicate them.
const KEYWORD_LABELS: &[(&str, &[&str])] = &[
    (
        "Finance & Billing",
        &[
            "invoice", "receipt", "payment", "billing", "bill", "refund", "transaction",
            "statement", "bank", "credit", "debit", "card", "upi", "wallet", "tax",
        ],
    ),
    (
        "Orders & Shipping",
        &[
            "order", "orders", "shipped", "shipping", "delivery", "delivered", "package",
            "tracking", "courier", "dispatch", "return",
        ],
    ),
    (
        "Jobs & Careers",
        &[
            "job", "jobs", "hiring", "interview", "resume", "application", "career",
            "recruiter", "internship", "position", "opening", "candidate",
        ],
    ),
    (
        "Account Security",
        &[
            "password", "security", "verify", "verification", "otp", "login", "signin",
            "sign", "alert", "suspicious", "authentication", "code",
        ],
    ),
    (
        "Travel",
        &[
            "flight", "booking", "hotel", "trip", "travel", "itinerary", "airline", "boarding",
            "reservation", "train", "ticket",
        ],
    ),
    (
        "Meetings & Calendar",
        &["meeting", "invitation", "calendar", "event", "webinar", "schedule", "rsvp", "invite"],
    ),
    (
        "Promotions & Offers",
        &[
            "sale", "offer", "offers", "discount", "deal", "deals", "coupon", "promo", "cashback",
            "off", "free", "save", "exclusive",
        ],
    ),
    (
        "Newsletters",
        &["newsletter", "digest", "weekly", "daily", "roundup", "edition", "issue"],
    ),
    (
        "Education",
        &[
            "course", "courses", "class", "lecture", "assignment", "exam", "semester", "student",
            "university", "college", "learning", "certificate",
        ],
    ),
    (
        "Social",
        &["friend", "follow", "followers", "connection", "liked", "commented", "mentioned", "tagged"],
    ),
    (
        "Subscriptions",
        &["subscription", "renewal", "renew", "plan", "trial", "membership", "premium"],
    ),
    (
        "Development",
        &[
            "pull", "merge", "commit", "repository", "repo", "build", "deploy", "deployment",
            "bug", "release", "pipeline",
        ],
    ),
];

/// Labels that carry no information on their own.
const JUNK_LABELS: &[&str] = &[
    "this", "your", "me", "to", "a", "you", "it", "the", "com", "www", "http", "https", "hello",
    "hi", "dear", "get", "new", "now", "just", "our", "here", "email", "mail", "inbox", "update",
    "updates", "info", "today", "re", "fwd", "noreply", "reply",
];

/// Dictionary label for a sender domain, matching subdomains too.
pub fn label_for_domain(domain: &str) -> Option<&'static str> {
    let domain = domain.trim().to_ascii_lowercase();
    // Longest suffix first so "accounts.google.com" beats "google.com".
    DOMAIN_LABELS
        .iter()
        .filter(|(known, _)| {
            domain == *known
                || domain
                    .strip_suffix(known)
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
        .max_by_key(|(known, _)| known.len())
        .map(|(_, label)| *label)
}

/// Dictionary category for a topic word.
pub fn label_for_keyword(word: &str) -> Option<&'static str> {
    let word = word.trim().to_ascii_lowercase();
    KEYWORD_LABELS
        .iter()
        .find(|(_, words)| words.contains(&word.as_str()))
        .map(|(label, _)| *label)
}

/// True for labels too short or too generic to describe a topic.
pub fn is_junk(label: &str) -> bool {
    let label = label.trim().to_lowercase();
    label.chars().count() < 3 || JUNK_LABELS.contains(&label.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_lookup_matches_subdomains() {
        assert_eq!(label_for_domain("github.com"), Some("GitHub"));
        assert_eq!(label_for_domain("Notifications.GitHub.com"), Some("GitHub"));
        assert_eq!(label_for_domain("accounts.google.com"), Some("Account Security"));
        assert_eq!(label_for_domain("mygithub.com"), None);
        assert_eq!(label_for_domain("example.org"), None);
    }

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(label_for_keyword("Invoice"), Some("Finance & Billing"));
        assert_eq!(label_for_keyword("interview"), Some("Jobs & Careers"));
        assert_eq!(label_for_keyword("banana"), None);
    }

    #[test]
    fn test_junk_labels() {
        assert!(is_junk("The"));
        assert!(is_junk("ok"));
        assert!(is_junk(" your "));
        assert!(!is_junk("Invoice"));
        assert!(!is_junk("Finance & Billing"));
    }
}
