use serde::Serialize;
use tracing::info;

/// Structured moderation events, logged as single JSON lines so downstream
/// log tooling can aggregate on `event_type`.
#[derive(Debug, Serialize)]
#[serde(tag = "event_type")]
pub enum BusinessEvent {
    CommentSubmitted {
        comment_id: i64,
        blog_post_id: i64,
        parent_id: Option<i64>,
        email_redacted: String,
    },
    CommentApproved {
        comment_id: i64,
        blog_post_id: i64,
    },
    CommentDeleted {
        comment_id: i64,
        removed_count: u64,
    },
}

/// Commenter emails never reach the logs in full.
pub fn redact_email(email: &str) -> String {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return "***".to_string();
    }
    let mut parts = trimmed.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");
    if local.is_empty() || domain.is_empty() {
        return "***".to_string();
    }
    let first_char = local.chars().next().unwrap_or('*');
    format!("{first_char}***@{domain}")
}

impl BusinessEvent {
    pub fn log(&self) {
        let event_json = serde_json::to_string(self).unwrap_or_else(|_| format!("{:?}", self));
        info!(
            target: "business_events",
            event = %event_json,
            "Business event occurred"
        );
    }
}
