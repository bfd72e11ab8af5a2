use std::sync::Arc;

use anyhow::Context;
use axum::extract::FromRef;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::articles::repo::PgArticleRepository;
use crate::articles::services::ArticleService;
use crate::auth::jwt::JwtKeys;
use crate::auth::repo::PgCredentialStore;
use crate::auth::services::AuthService;
use crate::comments::repo::PgCommentRepository;
use crate::comments::services::CommentService;
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub keys: JwtKeys,
    pub auth: Arc<AuthService>,
    pub articles: Arc<ArticleService>,
    pub comments: Arc<CommentService>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;
        Ok(Self::from_pool(db, config))
    }

    pub fn from_pool(db: PgPool, config: Arc<AppConfig>) -> Self {
        let keys = JwtKeys::new(&config.jwt);
        let auth = Arc::new(AuthService::new(
            Arc::new(PgCredentialStore::new(db.clone())),
            keys.clone(),
        ));
        let articles = Arc::new(ArticleService::new(Arc::new(PgArticleRepository::new(
            db.clone(),
        ))));
        let comments = Arc::new(CommentService::new(Arc::new(PgCommentRepository::new(
            db.clone(),
        ))));
        Self {
            db,
            config,
            keys,
            auth,
            articles,
            comments,
        }
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.keys.clone()
    }
}
