use async_trait::async_trait;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AppError;

/// Comment record, always tied to one article and one author.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub article_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub article_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Persistence seam for comments.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// A foreign-key violation (missing article) surfaces as `NotFound`.
    async fn insert(&self, comment: &NewComment) -> Result<Comment, AppError>;

    async fn list_by_article(&self, article_id: Uuid) -> Result<Vec<Comment>, AppError>;
}

pub struct PgCommentRepository {
    db: PgPool,
}

impl PgCommentRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn map_comment_insert_err(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if matches!(db_err.kind(), sqlx::error::ErrorKind::ForeignKeyViolation) {
            return AppError::NotFound("article");
        }
    }
    AppError::Internal(e.into())
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn insert(&self, comment: &NewComment) -> Result<Comment, AppError> {
        let row = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (article_id, user_id, content, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, article_id, user_id, content, created_at, updated_at
            "#,
        )
        .bind(comment.article_id)
        .bind(comment.user_id)
        .bind(&comment.content)
        .bind(comment.created_at)
        .bind(comment.updated_at)
        .fetch_one(&self.db)
        .await
        .map_err(map_comment_insert_err)?;
        Ok(row)
    }

    async fn list_by_article(&self, article_id: Uuid) -> Result<Vec<Comment>, AppError> {
        let rows = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, article_id, user_id, content, created_at, updated_at
            FROM comments
            WHERE article_id = $1
            "#,
        )
        .bind(article_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}
