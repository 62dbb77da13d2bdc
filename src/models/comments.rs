use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Comment model mapped to blog.comment.
///
/// `id`, `blog_post_id`, `parent_id` and `created_at` are immutable after
/// insert; `is_approved` only ever transitions false -> true.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: i64,
    pub blog_post_id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub email: String,
    pub content: String,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Top-level comments hang directly off a blog post.
    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }
}
