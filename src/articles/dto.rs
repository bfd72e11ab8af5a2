use serde::{Deserialize, Serialize};

use crate::articles::repo::Article;
use crate::comments::repo::Comment;
use crate::error::AppError;

/// Request body for creating or updating an article.
#[derive(Debug, Deserialize)]
pub struct ArticleRequest {
    pub title: String,
    pub content: String,
}

impl ArticleRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.title.len() < 3 || self.title.len() > 40 {
            return Err(AppError::Validation(
                "title must be between 3 and 40 characters".into(),
            ));
        }
        if self.content.len() < 10 || self.content.len() > 1000 {
            return Err(AppError::Validation(
                "content must be between 10 and 1000 characters".into(),
            ));
        }
        Ok(())
    }
}

/// Article plus its comment thread, returned by the detail endpoint.
#[derive(Debug, Serialize)]
pub struct ArticleDetails {
    #[serde(flatten)]
    pub article: Article,
    pub comments: Vec<Comment>,
}
