use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::auth::jwt::AuthUser;
use crate::comments::dto::CommentRequest;
use crate::comments::repo::Comment;
use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/articles/:id/comments", get(list_comments))
        .route("/articles/:id/comments", post(create_comment))
}

#[instrument(skip(state))]
pub async fn list_comments(
    State(state): State<AppState>,
    Path(article_id): Path<Uuid>,
) -> Result<Json<Vec<Comment>>, AppError> {
    let comments = state.comments.list_by_article(article_id).await?;
    Ok(Json(comments))
}

#[instrument(skip(state, payload))]
pub async fn create_comment(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(article_id): Path<Uuid>,
    Json(payload): Json<CommentRequest>,
) -> Result<(StatusCode, Json<Comment>), AppError> {
    payload.validate()?;
    let comment = state.comments.create(&payload, article_id, user_id).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}
