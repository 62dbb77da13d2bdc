use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    app::state::AppState,
    dto::comments::{
        ApproveCommentResponse, CommentResponse, CommentThreadResponse, DeleteCommentResponse,
        SubmitCommentRequest, SubmitCommentResponse,
    },
    error::AppError,
    usecases::{comments::CommentService, threads::ThreadService},
};

/// Raw list, pending rows included. The admin panel consumes this as-is;
/// the public page uses the thread endpoint instead.
pub async fn list_post_comments_handle(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> Result<Json<Vec<CommentResponse>>, AppError> {
    let response = CommentService::list_for_post(&state.db, post_id).await?;
    Ok(Json(response))
}

pub async fn get_post_thread_handle(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> Result<Json<CommentThreadResponse>, AppError> {
    let response = ThreadService::thread_for_post(&state.db, post_id).await?;
    Ok(Json(response))
}

pub async fn submit_comment_handle(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Json(req): Json<SubmitCommentRequest>,
) -> Result<(StatusCode, Json<SubmitCommentResponse>), AppError> {
    let response = CommentService::submit(&state.db, post_id, req).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn approve_comment_handle(
    State(state): State<AppState>,
    Path(comment_id): Path<i64>,
) -> Result<Json<ApproveCommentResponse>, AppError> {
    let response = CommentService::approve(&state.db, comment_id).await?;
    Ok(Json(response))
}

/// Always 200: deleting an id that is already gone is a no-op, so a
/// double-click or a racing moderator never sees an error.
pub async fn delete_comment_handle(
    State(state): State<AppState>,
    Path(comment_id): Path<i64>,
) -> Result<Json<DeleteCommentResponse>, AppError> {
    let response = CommentService::remove(&state.db, comment_id).await?;
    Ok(Json(response))
}
