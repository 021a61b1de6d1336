use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::app::error::{ServiceError, COMMENT_NOT_FOUND, POST_NOT_FOUND};
use crate::app::relations::{attach_comment, detach_comment};
use crate::app::validation::required_text;
use crate::domain::comment::{
    Comment, CommentSummary, CommentWithPost, NewComment, AUTHOR_MAX_CHARS, CONTENT_MAX_CHARS,
};
use crate::domain::post::PostTitle;
use crate::infra::store::DocumentStore;

#[derive(Clone)]
pub struct CommentService {
    store: Arc<dyn DocumentStore>,
    ref_sync_retries: u32,
}

impl CommentService {
    pub fn new(store: Arc<dyn DocumentStore>, ref_sync_retries: u32) -> Self {
        Self {
            store,
            ref_sync_retries,
        }
    }

    pub async fn add_comment(
        &self,
        post_id: Uuid,
        author: Option<String>,
        content: Option<String>,
    ) -> Result<CommentWithPost, ServiceError> {
        let author = required_text(author, "usuario", AUTHOR_MAX_CHARS)?;
        let content = required_text(content, "contenidoComentario", CONTENT_MAX_CHARS)?;

        let post = self
            .store
            .find_post(post_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(POST_NOT_FOUND))?;

        let comment = self
            .store
            .insert_comment(NewComment {
                parent_post_id: post.id,
                author,
                content,
            })
            .await?;

        if let Err(err) =
            attach_comment(self.store.as_ref(), post.id, comment.id, self.ref_sync_retries).await
        {
            tracing::error!(error = ?err, post_id = %post.id, comment_id = %comment.id, "failed to link comment, rolling back");
            if let Err(rollback_err) = self.store.delete_comment(comment.id).await {
                tracing::error!(error = ?rollback_err, comment_id = %comment.id, "failed to roll back unlinked comment");
            }
            return Err(ServiceError::Store(err.context("failed to link comment to post")));
        }

        tracing::info!(post_id = %post.id, comment_id = %comment.id, "comment added");
        Ok(CommentWithPost {
            post: PostTitle::from(&post),
            comment,
        })
    }

    pub async fn edit_comment(
        &self,
        id: Uuid,
        content: Option<String>,
    ) -> Result<Comment, ServiceError> {
        let content = required_text(content, "contenidoComentario", CONTENT_MAX_CHARS)?;

        let comment = self
            .store
            .update_comment_content(id, content)
            .await?
            .ok_or_else(|| ServiceError::not_found(COMMENT_NOT_FOUND))?;

        tracing::info!(comment_id = %comment.id, "comment edited");
        Ok(comment)
    }

    pub async fn delete_comment(&self, id: Uuid) -> Result<Comment, ServiceError> {
        let comment = self
            .store
            .delete_comment(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(COMMENT_NOT_FOUND))?;

        detach_comment(
            self.store.as_ref(),
            comment.parent_post_id,
            comment.id,
            self.ref_sync_retries,
        )
        .await
        .map_err(|cause| {
            tracing::error!(error = ?cause, post_id = %comment.parent_post_id, comment_id = %comment.id, "comment deleted but ref left on post");
            ServiceError::DanglingReference {
                post_id: comment.parent_post_id,
                comment_id: comment.id,
                cause,
            }
        })?;

        tracing::info!(post_id = %comment.parent_post_id, comment_id = %comment.id, "comment deleted");
        Ok(comment)
    }

    /// Projected comments of a post, in the order they were added.
    pub async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentSummary>, ServiceError> {
        let post = self
            .store
            .find_post(post_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(POST_NOT_FOUND))?;

        let mut by_id: HashMap<Uuid, Comment> = self
            .store
            .find_comments(&post.comment_refs)
            .await?
            .into_iter()
            .map(|comment| (comment.id, comment))
            .collect();

        Ok(post
            .comment_refs
            .iter()
            .filter_map(|id| by_id.remove(id))
            .map(|comment| CommentSummary::from(&comment))
            .collect())
    }
}
