use std::sync::Arc;

use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::comments::dto::CommentRequest;
use crate::comments::repo::{Comment, CommentRepository, NewComment};
use crate::error::{with_store_timeout, AppError};

pub struct CommentService {
    repo: Arc<dyn CommentRepository>,
}

impl CommentService {
    pub fn new(repo: Arc<dyn CommentRepository>) -> Self {
        Self { repo }
    }

    /// Binds the comment to its article and authenticated author and stamps
    /// both timestamps.
    pub async fn create(
        &self,
        req: &CommentRequest,
        article_id: Uuid,
        user_id: Uuid,
    ) -> Result<Comment, AppError> {
        let now = OffsetDateTime::now_utc();
        let new_comment = NewComment {
            article_id,
            user_id,
            content: req.content.clone(),
            created_at: now,
            updated_at: now,
        };
        let comment = with_store_timeout(self.repo.insert(&new_comment)).await?;
        info!(comment_id = %comment.id, article_id = %article_id, "comment created");
        Ok(comment)
    }

    pub async fn list_by_article(&self, article_id: Uuid) -> Result<Vec<Comment>, AppError> {
        with_store_timeout(self.repo.list_by_article(article_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comments::repo::memory::MemoryCommentRepository;

    fn make_service() -> CommentService {
        CommentService::new(Arc::new(MemoryCommentRepository::default()))
    }

    fn comment_req(content: &str) -> CommentRequest {
        CommentRequest {
            content: content.into(),
        }
    }

    #[tokio::test]
    async fn create_binds_article_and_author() {
        let service = make_service();
        let article_id = Uuid::new_v4();
        let author = Uuid::new_v4();

        let comment = service
            .create(&comment_req("what a great article"), article_id, author)
            .await
            .expect("create");
        assert_eq!(comment.article_id, article_id);
        assert_eq!(comment.user_id, author);
        assert_eq!(comment.created_at, comment.updated_at);
    }

    #[tokio::test]
    async fn listing_filters_by_article() {
        let service = make_service();
        let article_a = Uuid::new_v4();
        let article_b = Uuid::new_v4();
        let author = Uuid::new_v4();

        service
            .create(&comment_req("first comment here"), article_a, author)
            .await
            .expect("create a1");
        service
            .create(&comment_req("second comment here"), article_a, author)
            .await
            .expect("create a2");
        service
            .create(&comment_req("unrelated comment"), article_b, author)
            .await
            .expect("create b1");

        let for_a = service.list_by_article(article_a).await.expect("list");
        assert_eq!(for_a.len(), 2);
        assert!(for_a.iter().all(|c| c.article_id == article_a));
    }
}
