use serde::Deserialize;

use crate::error::AppError;

/// Request body for creating a comment.
#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub content: String,
}

impl CommentRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.content.len() < 10 || self.content.len() > 1000 {
            return Err(AppError::Validation(
                "content must be between 10 and 1000 characters".into(),
            ));
        }
        Ok(())
    }
}
