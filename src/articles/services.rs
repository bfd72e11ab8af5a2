use std::sync::Arc;

use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::articles::dto::ArticleRequest;
use crate::articles::repo::{Article, ArticlePatch, ArticleRepository, NewArticle};
use crate::error::{with_store_timeout, AppError};

/// Ownership binding, timestamping and error translation for articles and
/// likes; persistence stays behind [`ArticleRepository`].
pub struct ArticleService {
    repo: Arc<dyn ArticleRepository>,
}

impl ArticleService {
    pub fn new(repo: Arc<dyn ArticleRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<Article>, AppError> {
        with_store_timeout(self.repo.list()).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Article, AppError> {
        with_store_timeout(self.repo.get(id)).await
    }

    pub async fn create(&self, req: &ArticleRequest, owner_id: Uuid) -> Result<Article, AppError> {
        let now = OffsetDateTime::now_utc();
        let new_article = NewArticle {
            title: req.title.clone(),
            content: req.content.clone(),
            created_at: now,
            updated_at: now,
        };
        let article = with_store_timeout(self.repo.insert(&new_article, owner_id)).await?;
        info!(article_id = %article.id, owner_id = %owner_id, "article created");
        Ok(article)
    }

    // TODO: update and delete do not verify that the caller owns the
    // article; any authenticated user can mutate any article.
    pub async fn update(&self, id: Uuid, req: &ArticleRequest) -> Result<(), AppError> {
        let patch = ArticlePatch {
            title: req.title.clone(),
            content: req.content.clone(),
            updated_at: OffsetDateTime::now_utc(),
        };
        with_store_timeout(self.repo.update(id, &patch)).await?;
        info!(article_id = %id, "article updated");
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        with_store_timeout(self.repo.delete(id)).await?;
        info!(article_id = %id, "article deleted");
        Ok(())
    }

    pub async fn like(&self, article_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        let now = OffsetDateTime::now_utc();
        with_store_timeout(self.repo.like(article_id, user_id, now)).await?;
        info!(article_id = %article_id, user_id = %user_id, "article liked");
        Ok(())
    }

    pub async fn unlike(&self, article_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        with_store_timeout(self.repo.unlike(article_id, user_id)).await?;
        info!(article_id = %article_id, user_id = %user_id, "article unliked");
        Ok(())
    }
}
