use std::collections::HashMap;

use sqlx::PgPool;

use crate::{
    dto::comments::CommentThreadResponse,
    error::AppError,
    models::comments::Comment,
    repositories::comments as comment_repo,
    usecases::comments::{map_comment_response, validate_positive_id},
};

pub struct ThreadService;

impl ThreadService {
    /// Rendering input for the public post page. Same rows as
    /// `CommentService::list_for_post`, with display policy applied.
    pub async fn thread_for_post(
        pool: &PgPool,
        blog_post_id: i64,
    ) -> Result<CommentThreadResponse, AppError> {
        validate_positive_id(blog_post_id, "blog_post_id")?;
        let rows = comment_repo::list_by_post(pool, blog_post_id).await?;
        let thread = assemble(rows);
        Ok(CommentThreadResponse {
            top_level: thread
                .top_level
                .into_iter()
                .map(map_comment_response)
                .collect(),
            replies_by_parent: thread
                .replies_by_parent
                .into_iter()
                .map(|(parent_id, replies)| {
                    (
                        parent_id,
                        replies.into_iter().map(map_comment_response).collect(),
                    )
                })
                .collect(),
        })
    }
}

#[derive(Debug)]
pub struct CommentThread {
    pub top_level: Vec<Comment>,
    pub replies_by_parent: HashMap<i64, Vec<Comment>>,
}

/// Groups a flat comment list into the two-level display structure.
///
/// Unapproved comments are dropped first, whatever their nesting level.
/// Replies are grouped under their literal `parent_id`; a reply whose parent
/// is itself a reply ends up under a key the page never walks, so it stays
/// hidden. The display caps nesting at one level on purpose.
pub fn assemble(comments: Vec<Comment>) -> CommentThread {
    let (top_level, replies): (Vec<Comment>, Vec<Comment>) = comments
        .into_iter()
        .filter(|comment| comment.is_approved)
        .partition(Comment::is_top_level);

    let mut replies_by_parent: HashMap<i64, Vec<Comment>> = top_level
        .iter()
        .map(|comment| (comment.id, Vec::new()))
        .collect();
    for reply in replies {
        if let Some(parent_id) = reply.parent_id {
            replies_by_parent.entry(parent_id).or_default().push(reply);
        }
    }

    CommentThread {
        top_level,
        replies_by_parent,
    }
}
