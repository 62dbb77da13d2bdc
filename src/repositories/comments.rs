use sqlx::PgPool;

use crate::{error::AppError, models::comments::Comment};

#[derive(Debug)]
pub(crate) struct CreateCommentParams {
    pub blog_post_id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub email: String,
    pub content: String,
}

/// All comments for a post, pending and approved alike, newest first.
pub async fn list_by_post(pool: &PgPool, blog_post_id: i64) -> Result<Vec<Comment>, AppError> {
    let rows = crate::log_query_fetch_all!(
        "comments.list_by_post",
        sqlx::query_as::<_, Comment>(
            r#"
            SELECT
                id,
                blog_post_id,
                parent_id,
                name,
                email,
                content,
                is_approved,
                created_at
            FROM blog.comment
            WHERE blog_post_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(blog_post_id)
        .fetch_all(pool)
    )?;

    Ok(rows)
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Comment>, AppError> {
    let row = crate::log_query_fetch_optional!(
        "comments.find_by_id",
        sqlx::query_as::<_, Comment>(
            r#"
            SELECT
                id,
                blog_post_id,
                parent_id,
                name,
                email,
                content,
                is_approved,
                created_at
            FROM blog.comment
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
    )?;

    Ok(row)
}

// Every insert stores an unapproved row; the statement pins `is_approved`
// so approval can only ever happen through `set_approved`.
const INSERT_COMMENT_SQL: &str = r#"
    INSERT INTO blog.comment (
        blog_post_id,
        parent_id,
        name,
        email,
        content,
        is_approved
    )
    VALUES ($1, $2, $3, $4, $5, FALSE)
    RETURNING
        id,
        blog_post_id,
        parent_id,
        name,
        email,
        content,
        is_approved,
        created_at
"#;

/// Inserts a new comment; `created_at` takes its column default (now()).
/// The stored row comes back with the generated id.
pub(crate) async fn create_comment(
    pool: &PgPool,
    params: CreateCommentParams,
) -> Result<Comment, AppError> {
    let row = crate::log_query_fetch_one!(
        "comments.create_comment",
        sqlx::query_as::<_, Comment>(INSERT_COMMENT_SQL)
            .bind(params.blog_post_id)
            .bind(params.parent_id)
            .bind(params.name)
            .bind(params.email)
            .bind(params.content)
            .fetch_one(pool)
    )?;

    Ok(row)
}

/// Flips `is_approved` to true. Returns None when no such row exists; the
/// caller decides whether that is an error.
pub async fn set_approved(pool: &PgPool, id: i64) -> Result<Option<Comment>, AppError> {
    let row = crate::log_query_fetch_optional!(
        "comments.set_approved",
        sqlx::query_as::<_, Comment>(
            r#"
            UPDATE blog.comment
            SET is_approved = TRUE
            WHERE id = $1
            RETURNING
                id,
                blog_post_id,
                parent_id,
                name,
                email,
                content,
                is_approved,
                created_at
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
    )?;

    Ok(row)
}

/// Deletes exactly this row. Cascading over replies is the usecase's job.
pub async fn delete_comment(pool: &PgPool, id: i64) -> Result<u64, AppError> {
    let result = crate::log_query_execute!(
        "comments.delete_comment",
        sqlx::query(
            r#"
            DELETE FROM blog.comment
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
    )?;

    Ok(result.rows_affected())
}

/// Direct replies to the given comment, used by the cascade-delete traversal.
pub async fn list_children(pool: &PgPool, parent_id: i64) -> Result<Vec<Comment>, AppError> {
    let rows = crate::log_query_fetch_all!(
        "comments.list_children",
        sqlx::query_as::<_, Comment>(
            r#"
            SELECT
                id,
                blog_post_id,
                parent_id,
                name,
                email,
                content,
                is_approved,
                created_at
            FROM blog.comment
            WHERE parent_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(parent_id)
        .fetch_all(pool)
    )?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_stores_new_comments_unapproved() {
        assert!(INSERT_COMMENT_SQL.contains("is_approved"));
        assert!(INSERT_COMMENT_SQL.contains("FALSE"));
        // five caller-supplied values; approval is not one of them
        assert!(INSERT_COMMENT_SQL.contains("$5"));
        assert!(!INSERT_COMMENT_SQL.contains("$6"));
    }
}
