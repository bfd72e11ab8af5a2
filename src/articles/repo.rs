use async_trait::async_trait;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AppError;

/// Article record with its aggregated like count.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Article {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub like_count: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    pub content: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct ArticlePatch {
    pub title: String,
    pub content: String,
    pub updated_at: OffsetDateTime,
}

/// Persistence seam for articles and likes.
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Article>, AppError>;

    async fn get(&self, id: Uuid) -> Result<Article, AppError>;

    async fn insert(&self, article: &NewArticle, owner_id: Uuid) -> Result<Article, AppError>;

    /// `NotFound` when no row was affected.
    async fn update(&self, id: Uuid, patch: &ArticlePatch) -> Result<(), AppError>;

    /// `NotFound` when no row was affected. Foreign keys carry no cascade,
    /// so deleting an article that still has comments or likes fails.
    async fn delete(&self, id: Uuid) -> Result<(), AppError>;

    /// Single INSERT; the unique index on `(article_id, user_id)` makes the
    /// existence check and insert one atomic step. A second like for the
    /// same pair is `AlreadyLiked`, even under concurrent attempts.
    async fn like(
        &self,
        article_id: Uuid,
        user_id: Uuid,
        at: OffsetDateTime,
    ) -> Result<(), AppError>;

    /// Idempotent; unliking a like that does not exist is a no-op.
    async fn unlike(&self, article_id: Uuid, user_id: Uuid) -> Result<(), AppError>;
}

pub struct PgArticleRepository {
    db: PgPool,
}

impl PgArticleRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn map_like_insert_err(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        match db_err.kind() {
            sqlx::error::ErrorKind::UniqueViolation => return AppError::AlreadyLiked,
            sqlx::error::ErrorKind::ForeignKeyViolation => return AppError::NotFound("article"),
            _ => {}
        }
    }
    AppError::Internal(e.into())
}

fn map_article_delete_err(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if matches!(db_err.kind(), sqlx::error::ErrorKind::ForeignKeyViolation) {
            return AppError::Conflict("article still has comments or likes");
        }
    }
    AppError::Internal(e.into())
}

#[async_trait]
impl ArticleRepository for PgArticleRepository {
    async fn list(&self) -> Result<Vec<Article>, AppError> {
        let rows = sqlx::query_as::<_, Article>(
            r#"
            SELECT a.id, a.user_id, a.title, a.content,
                   COUNT(l.id) AS like_count,
                   a.created_at, a.updated_at
            FROM articles a
            LEFT JOIN likes l ON l.article_id = a.id
            GROUP BY a.id
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn get(&self, id: Uuid) -> Result<Article, AppError> {
        let row = sqlx::query_as::<_, Article>(
            r#"
            SELECT a.id, a.user_id, a.title, a.content,
                   COUNT(l.id) AS like_count,
                   a.created_at, a.updated_at
            FROM articles a
            LEFT JOIN likes l ON l.article_id = a.id
            WHERE a.id = $1
            GROUP BY a.id
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        row.ok_or(AppError::NotFound("article"))
    }

    async fn insert(&self, article: &NewArticle, owner_id: Uuid) -> Result<Article, AppError> {
        let row = sqlx::query_as::<_, Article>(
            r#"
            INSERT INTO articles (user_id, title, content, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, title, content, 0::BIGINT AS like_count,
                      created_at, updated_at
            "#,
        )
        .bind(owner_id)
        .bind(&article.title)
        .bind(&article.content)
        .bind(article.created_at)
        .bind(article.updated_at)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn update(&self, id: Uuid, patch: &ArticlePatch) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE articles
            SET title = $1, content = $2, updated_at = $3
            WHERE id = $4
            "#,
        )
        .bind(&patch.title)
        .bind(&patch.content)
        .bind(patch.updated_at)
        .bind(id)
        .execute(&self.db)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("article"));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(map_article_delete_err)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("article"));
        }
        Ok(())
    }

    async fn like(
        &self,
        article_id: Uuid,
        user_id: Uuid,
        at: OffsetDateTime,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO likes (article_id, user_id, created_at, updated_at)
            VALUES ($1, $2, $3, $3)
            "#,
        )
        .bind(article_id)
        .bind(user_id)
        .bind(at)
        .execute(&self.db)
        .await
        .map_err(map_like_insert_err)?;
        Ok(())
    }

    async fn unlike(&self, article_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM likes WHERE article_id = $1 AND user_id = $2")
            .bind(article_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use std::error::Error;
    use std::fmt;

    use sqlx::error::{DatabaseError, ErrorKind};

    use super::*;

    #[derive(Debug)]
    struct StubUniqueViolation;

    impl fmt::Display for StubUniqueViolation {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("duplicate key value violates unique constraint")
        }
    }

    impl Error for StubUniqueViolation {}

    impl DatabaseError for StubUniqueViolation {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::UniqueViolation
        }

        fn as_error(&self) -> &(dyn Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn Error + Send + Sync + 'static> {
            self
        }
    }

    #[derive(Debug)]
    struct StubFkViolation;

    impl fmt::Display for StubFkViolation {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("violates foreign key constraint")
        }
    }

    impl Error for StubFkViolation {}

    impl DatabaseError for StubFkViolation {
        fn message(&self) -> &str {
            "violates foreign key constraint"
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::ForeignKeyViolation
        }

        fn as_error(&self) -> &(dyn Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn Error + Send + Sync + 'static> {
            self
        }
    }

    #[test]
    fn like_unique_violation_translates_to_already_liked() {
        let err = map_like_insert_err(sqlx::Error::Database(Box::new(StubUniqueViolation)));
        assert!(matches!(err, AppError::AlreadyLiked));
    }

    #[test]
    fn like_fk_violation_translates_to_not_found() {
        let err = map_like_insert_err(sqlx::Error::Database(Box::new(StubFkViolation)));
        assert!(matches!(err, AppError::NotFound("article")));
    }

    #[test]
    fn delete_fk_violation_translates_to_conflict() {
        let err = map_article_delete_err(sqlx::Error::Database(Box::new(StubFkViolation)));
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn other_database_errors_stay_internal() {
        let err = map_like_insert_err(sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::Internal(_)));
    }
}
