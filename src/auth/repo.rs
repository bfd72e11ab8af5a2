use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AppError;

/// User record in the database. Never leaves the service as-is; responses
/// carry [`crate::auth::dto::PublicUser`], which has no password hash.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Shape the auth orchestrator builds for insertion; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Persistence seam for user credentials.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Inserts a new user. Unique-constraint violations surface as
    /// [`AppError::DuplicateEmail`] / [`AppError::DuplicateUsername`].
    async fn insert(&self, user: &NewUser) -> Result<User, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
}

pub struct PgCredentialStore {
    db: PgPool,
}

impl PgCredentialStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn map_user_insert_err(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if matches!(db_err.kind(), sqlx::error::ErrorKind::UniqueViolation) {
            match db_err.constraint() {
                Some("users_email_key") => return AppError::DuplicateEmail,
                Some("users_username_key") => return AppError::DuplicateUsername,
                _ => {}
            }
        }
    }
    AppError::Internal(e.into())
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn insert(&self, user: &NewUser) -> Result<User, AppError> {
        let row = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, username, email, password_hash, role, created_at, updated_at
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.role)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.db)
        .await
        .map_err(map_user_insert_err)?;
        Ok(row)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, role, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }
}
