use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::articles::dto::{ArticleDetails, ArticleRequest};
use crate::articles::repo::Article;
use crate::auth::jwt::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/articles", get(list_articles))
        .route("/articles/:id", get(get_article))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/articles", post(create_article))
        .route("/articles/:id", put(update_article))
        .route("/articles/:id", delete(delete_article))
        .route("/articles/:id/like", post(like_article))
        .route("/articles/:id/like", delete(unlike_article))
}

#[instrument(skip(state))]
pub async fn list_articles(
    State(state): State<AppState>,
) -> Result<Json<Vec<Article>>, AppError> {
    let articles = state.articles.list().await?;
    Ok(Json(articles))
}

#[instrument(skip(state))]
pub async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ArticleDetails>, AppError> {
    let article = state.articles.get(id).await?;
    let comments = state.comments.list_by_article(id).await?;
    Ok(Json(ArticleDetails { article, comments }))
}

#[instrument(skip(state, payload))]
pub async fn create_article(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<ArticleRequest>,
) -> Result<(StatusCode, Json<Article>), AppError> {
    payload.validate()?;
    let article = state.articles.create(&payload, user_id).await?;
    Ok((StatusCode::CREATED, Json(article)))
}

#[instrument(skip(state, payload))]
pub async fn update_article(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ArticleRequest>,
) -> Result<StatusCode, AppError> {
    payload.validate()?;
    state.articles.update(id, &payload).await?;
    Ok(StatusCode::OK)
}

#[instrument(skip(state))]
pub async fn delete_article(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.articles.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn like_article(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.articles.like(id, user_id).await?;
    Ok(StatusCode::OK)
}

#[instrument(skip(state))]
pub async fn unlike_article(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.articles.unlike(id, user_id).await?;
    Ok(StatusCode::OK)
}
