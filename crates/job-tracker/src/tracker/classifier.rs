//! Keyword rules that turn an email into a status signal.

use super::domain::ApplicationStatus;

/// One row of the rule table: any keyword hit yields `status`.
#[derive(Debug, Clone, Copy)]
pub struct StatusRule {
    pub status: ApplicationStatus,
    pub keywords: &'static [&'static str],
}

impl StatusRule {
    fn matches(&self, haystack: &str) -> bool {
        self.keywords.iter().any(|keyword| haystack.contains(keyword))
    }
}

/// Evaluated in order; the first matching rule wins.
pub const STATUS_RULES: [StatusRule; 4] = [
    StatusRule {
        status: ApplicationStatus::Interview,
        keywords: &["interview", "schedule", "meeting"],
    },
    StatusRule {
        status: ApplicationStatus::Offer,
        keywords: &["offer", "congratulations"],
    },
    StatusRule {
        status: ApplicationStatus::Screening,
        keywords: &["screening", "phone call", "phone screen"],
    },
    StatusRule {
        status: ApplicationStatus::Rejected,
        keywords: &["reject", "unfortunately", "not moving forward"],
    },
];

/// Classify an email by subject and body, returning `None` when no rule fires.
pub fn classify(subject: &str, body: &str) -> Option<ApplicationStatus> {
    let haystack = format!("{body} {subject}").to_lowercase();
    STATUS_RULES
        .iter()
        .find(|rule| rule.matches(&haystack))
        .map(|rule| rule.status)
}
