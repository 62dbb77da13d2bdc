use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct SubmitCommentRequest {
    pub name: String,
    pub email: String,
    pub content: String,
    pub parent_id: Option<i64>,
}

/// Public shape of a comment. The commenter email stays server-side.
#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: i64,
    pub blog_post_id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub content: String,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct SubmitCommentResponse {
    pub message: String,
    pub comment: CommentResponse,
}

#[derive(Debug, Serialize)]
pub struct ApproveCommentResponse {
    pub message: String,
    pub comment: CommentResponse,
}

#[derive(Debug, Serialize)]
pub struct DeleteCommentResponse {
    pub message: String,
}

/// Two-level rendering input for the public post page: approved top-level
/// comments plus their approved direct replies, keyed by parent id.
#[derive(Debug, Serialize)]
pub struct CommentThreadResponse {
    pub top_level: Vec<CommentResponse>,
    pub replies_by_parent: HashMap<i64, Vec<CommentResponse>>,
}
