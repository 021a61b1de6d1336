use thiserror::Error;
use uuid::Uuid;

pub const POST_NOT_FOUND: &str = "La publicación especificada no existe";
pub const COMMENT_NOT_FOUND: &str = "El comentario especificado no existe";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] anyhow::Error),

    /// The comment is gone but its id may still sit in the post's refs.
    #[error("comment {comment_id} was deleted but could not be unlinked from post {post_id}")]
    DanglingReference {
        post_id: Uuid,
        comment_id: Uuid,
        cause: anyhow::Error,
    },
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}
