use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use tracing::instrument;

use crate::auth::dto::{AuthResponse, LoginRequest, RegisterRequest, TokenResponse};
use crate::error::AppError;
use crate::state::AppState;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    payload.email = payload.email.trim().to_lowercase();
    payload.validate()?;

    let resp = state.auth.register(&payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    payload.email = payload.email.trim().to_lowercase();
    payload.validate()?;

    let token = state.auth.login(&payload).await?;
    Ok(Json(TokenResponse { token }))
}
