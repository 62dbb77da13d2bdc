use std::collections::{HashMap, HashSet};

use sqlx::PgPool;

use crate::{
    dto::comments::{
        ApproveCommentResponse, CommentResponse, DeleteCommentResponse, SubmitCommentRequest,
        SubmitCommentResponse,
    },
    error::AppError,
    models::comments::Comment,
    repositories::comments as comment_repo,
    repositories::comments::CreateCommentParams,
    telemetry::{BusinessEvent, redact_email},
};

pub struct CommentService;

const MIN_NAME_LENGTH: usize = 2;
const MAX_NAME_LENGTH: usize = 100;
const MIN_CONTENT_LENGTH: usize = 5;
const MAX_CONTENT_LENGTH: usize = 5000;

impl CommentService {
    /// Persists a visitor comment. Every submission lands unapproved and
    /// stays invisible to readers until a moderator approves it.
    pub async fn submit(
        pool: &PgPool,
        blog_post_id: i64,
        req: SubmitCommentRequest,
    ) -> Result<SubmitCommentResponse, AppError> {
        validate_positive_id(blog_post_id, "blog_post_id")?;
        let name = normalize_name(&req.name)?;
        let email = normalize_email(&req.email)?;
        let content = normalize_content(&req.content)?;

        if let Some(parent_id) = req.parent_id {
            validate_positive_id(parent_id, "parent_id")?;
            let parent = comment_repo::find_by_id(pool, parent_id).await?;
            if parent.is_none() {
                return Err(AppError::ValidationError(
                    "Parent comment not found".to_string(),
                ));
            }
            // Whether the parent belongs to the same post is deliberately not
            // checked; the form never offers a cross-post reply.
        }

        let row = comment_repo::create_comment(
            pool,
            CreateCommentParams {
                blog_post_id,
                parent_id: req.parent_id,
                name,
                email: email.clone(),
                content,
            },
        )
        .await?;

        BusinessEvent::CommentSubmitted {
            comment_id: row.id,
            blog_post_id,
            parent_id: row.parent_id,
            email_redacted: redact_email(&email),
        }
        .log();

        Ok(SubmitCommentResponse {
            message: "Comment submitted and awaiting approval".to_string(),
            comment: map_comment_response(row),
        })
    }

    /// Full comment list for a post, pending rows included. Approval
    /// filtering is a display concern (see `threads::assemble`); moderation
    /// callers need the pending rows too.
    pub async fn list_for_post(
        pool: &PgPool,
        blog_post_id: i64,
    ) -> Result<Vec<CommentResponse>, AppError> {
        validate_positive_id(blog_post_id, "blog_post_id")?;
        let rows = comment_repo::list_by_post(pool, blog_post_id).await?;
        Ok(rows.into_iter().map(map_comment_response).collect())
    }

    pub async fn approve(pool: &PgPool, id: i64) -> Result<ApproveCommentResponse, AppError> {
        let row = comment_repo::set_approved(pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

        BusinessEvent::CommentApproved {
            comment_id: row.id,
            blog_post_id: row.blog_post_id,
        }
        .log();

        Ok(ApproveCommentResponse {
            message: "Comment approved".to_string(),
            comment: map_comment_response(row),
        })
    }

    /// Deletes a comment together with every transitive reply, so no reply
    /// ever outlives its parent. Deleting an id that is already gone is a
    /// successful no-op; moderation UIs race and double-click.
    pub async fn remove(pool: &PgPool, id: i64) -> Result<DeleteCommentResponse, AppError> {
        let mut children_of: HashMap<i64, Vec<i64>> = HashMap::new();
        let mut pending = vec![id];
        let mut visited = HashSet::new();
        while let Some(current) = pending.pop() {
            // parent links are immutable so cycles cannot form through the
            // API, but corrupt data must not hang the traversal
            if !visited.insert(current) {
                continue;
            }
            let children = comment_repo::list_children(pool, current).await?;
            let child_ids: Vec<i64> = children.into_iter().map(|child| child.id).collect();
            pending.extend(child_ids.iter().copied());
            children_of.insert(current, child_ids);
        }

        let mut removed = 0u64;
        for target in plan_deletion(id, &children_of) {
            removed += comment_repo::delete_comment(pool, target).await?;
        }

        if removed > 0 {
            BusinessEvent::CommentDeleted {
                comment_id: id,
                removed_count: removed,
            }
            .log();
        }

        Ok(DeleteCommentResponse {
            message: "Comment deleted".to_string(),
        })
    }
}

fn normalize_name(name: &str) -> Result<String, AppError> {
    let trimmed = name.trim();
    let len = trimmed.chars().count();
    if len < MIN_NAME_LENGTH {
        return Err(AppError::ValidationError(format!(
            "Name must be at least {MIN_NAME_LENGTH} characters"
        )));
    }
    if len > MAX_NAME_LENGTH {
        return Err(AppError::ValidationError(format!(
            "Name exceeds {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}

fn normalize_email(email: &str) -> Result<String, AppError> {
    let trimmed = email.trim();
    if !is_valid_email(trimmed) {
        return Err(AppError::ValidationError(
            "Email address is not valid".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

fn normalize_content(content: &str) -> Result<String, AppError> {
    let trimmed = content.trim();
    let len = trimmed.chars().count();
    if len < MIN_CONTENT_LENGTH {
        return Err(AppError::ValidationError(format!(
            "Comment must be at least {MIN_CONTENT_LENGTH} characters"
        )));
    }
    if len > MAX_CONTENT_LENGTH {
        return Err(AppError::ValidationError(format!(
            "Comment exceeds {MAX_CONTENT_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Children-first deletion order for the subtree rooted at `root`.
///
/// Every comment sorts after all of its transitive replies, so walking the
/// plan keeps the self-referencing FK satisfied at every step. A root with
/// no recorded children plans to just itself, which is how deleting an
/// already-removed id stays a no-op.
fn plan_deletion(root: i64, children_of: &HashMap<i64, Vec<i64>>) -> Vec<i64> {
    let mut pending = vec![root];
    let mut visited = HashSet::new();
    let mut order = Vec::new();
    while let Some(current) = pending.pop() {
        if !visited.insert(current) {
            continue;
        }
        order.push(current);
        if let Some(children) = children_of.get(&current) {
            pending.extend(children.iter().copied());
        }
    }
    order.reverse();
    order
}

pub(crate) fn validate_positive_id(value: i64, field: &str) -> Result<(), AppError> {
    if value <= 0 {
        return Err(AppError::ValidationError(format!(
            "{field} must be a positive integer"
        )));
    }
    Ok(())
}

fn is_valid_email(email: &str) -> bool {
    if email.is_empty() || email.contains(' ') {
        return false;
    }
    let mut parts = email.split('@');
    let local = match parts.next() {
        Some(value) => value,
        None => return false,
    };
    let domain = match parts.next() {
        Some(value) => value,
        None => return false,
    };
    if parts.next().is_some() {
        return false;
    }
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    if domain.starts_with('.') || domain.ends_with('.') {
        return false;
    }
    domain.contains('.')
}

pub(crate) fn map_comment_response(row: Comment) -> CommentResponse {
    CommentResponse {
        id: row.id,
        blog_post_id: row.blog_post_id,
        parent_id: row.parent_id,
        name: row.name,
        content: row.content,
        is_approved: row.is_approved,
        created_at: row.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_validation_error<T: std::fmt::Debug>(result: Result<T, AppError>, expected: &str) {
        match result {
            Err(AppError::ValidationError(message)) => {
                assert!(
                    message.contains(expected),
                    "expected validation error containing '{expected}', got '{message}'"
                );
            }
            Err(other) => panic!("expected validation error, got {other:?}"),
            Ok(value) => panic!("expected error, got {value:?}"),
        }
    }

    #[test]
    fn rejects_single_character_name() {
        let result = normalize_name(" a ");
        assert_validation_error(result, "at least 2 characters");
    }

    #[test]
    fn accepts_two_character_name() {
        let result = normalize_name("Jo").expect("valid");
        assert_eq!(result, "Jo");
    }

    #[test]
    fn rejects_name_over_limit() {
        let name = "a".repeat(MAX_NAME_LENGTH + 1);
        let result = normalize_name(&name);
        assert_validation_error(result, "exceeds");
    }

    #[test]
    fn rejects_four_character_content() {
        let result = normalize_content("abcd");
        assert_validation_error(result, "at least 5 characters");
    }

    #[test]
    fn accepts_five_character_content() {
        let result = normalize_content("abcde").expect("valid");
        assert_eq!(result, "abcde");
    }

    #[test]
    fn trims_content_before_length_check() {
        let result = normalize_content("  abcd  ");
        assert_validation_error(result, "at least 5 characters");
    }

    #[test]
    fn rejects_content_over_limit() {
        let content = "a".repeat(MAX_CONTENT_LENGTH + 1);
        let result = normalize_content(&content);
        assert_validation_error(result, "exceeds");
    }

    #[test]
    fn rejects_malformed_email() {
        let result = normalize_email("not-an-email");
        assert_validation_error(result, "not valid");
    }

    #[test]
    fn accepts_plain_email() {
        let result = normalize_email(" a@b.com ").expect("valid");
        assert_eq!(result, "a@b.com");
    }

    #[test]
    fn rejects_email_with_two_at_signs() {
        assert!(!is_valid_email("a@b@c.com"));
    }

    #[test]
    fn rejects_email_with_dotless_domain() {
        assert!(!is_valid_email("a@localhost"));
    }

    #[test]
    fn rejects_email_with_trailing_dot_domain() {
        assert!(!is_valid_email("a@b.com."));
    }

    #[test]
    fn rejects_non_positive_post_id() {
        let result = validate_positive_id(0, "blog_post_id");
        assert_validation_error(result, "blog_post_id");
    }

    #[test]
    fn accepts_positive_parent_id() {
        assert!(validate_positive_id(7, "parent_id").is_ok());
    }

    fn index_of(plan: &[i64], id: i64) -> usize {
        plan.iter()
            .position(|&value| value == id)
            .unwrap_or_else(|| panic!("expected {id} in plan {plan:?}"))
    }

    #[test]
    fn deletion_plan_puts_replies_before_their_parents() {
        let children_of = HashMap::from([
            (1, vec![2, 3]),
            (2, vec![4]),
            (3, Vec::new()),
            (4, Vec::new()),
        ]);
        let plan = plan_deletion(1, &children_of);
        assert_eq!(plan.len(), 4);
        assert!(index_of(&plan, 4) < index_of(&plan, 2));
        assert!(index_of(&plan, 2) < index_of(&plan, 1));
        assert!(index_of(&plan, 3) < index_of(&plan, 1));
        assert_eq!(plan.last(), Some(&1));
    }

    #[test]
    fn deletion_plan_covers_multi_level_reply_chains() {
        let children_of = HashMap::from([(1, vec![2]), (2, vec![3]), (3, Vec::new())]);
        assert_eq!(plan_deletion(1, &children_of), vec![3, 2, 1]);
    }

    #[test]
    fn deletion_plan_for_unknown_id_is_just_that_id() {
        let plan = plan_deletion(42, &HashMap::new());
        assert_eq!(plan, vec![42]);
    }

    #[test]
    fn deletion_plan_terminates_on_cyclic_parent_links() {
        let children_of = HashMap::from([(1, vec![2]), (2, vec![1])]);
        let plan = plan_deletion(1, &children_of);
        assert_eq!(plan, vec![2, 1]);
    }

    #[test]
    fn response_mapping_drops_email() {
        let row = Comment {
            id: 1,
            blog_post_id: 10,
            parent_id: None,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            content: "Great write-up".to_string(),
            is_approved: false,
            created_at: chrono::Utc::now(),
        };
        let response = map_comment_response(row);
        let json = serde_json::to_value(&response).expect("serializable");
        assert!(json.get("email").is_none());
        assert_eq!(json["name"], "Ada");
        assert_eq!(json["is_approved"], false);
    }
}
