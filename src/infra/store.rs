use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::comment::{Comment, NewComment};
use crate::domain::post::{NewPost, Post, PostFilter};

/// Document primitives over the post and comment collections.
///
/// Every call is a single round-trip against one collection. Keeping a post's
/// `comment_refs` in step with the comment collection is the caller's job
/// (see `app::relations`); backends only offer the two set-like primitives.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn ping(&self) -> Result<()>;

    async fn insert_post(&self, post: NewPost) -> Result<Post>;

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>>;

    /// Posts matching `filter`, oldest first.
    async fn list_posts(&self, filter: &PostFilter) -> Result<Vec<Post>>;

    async fn update_post(&self, id: Uuid, title: String, description: String)
        -> Result<Option<Post>>;

    async fn delete_post(&self, id: Uuid) -> Result<Option<Post>>;

    async fn insert_comment(&self, comment: NewComment) -> Result<Comment>;

    async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>>;

    /// Comments with the given ids, in no particular order. Unknown ids are skipped.
    async fn find_comments(&self, ids: &[Uuid]) -> Result<Vec<Comment>>;

    async fn update_comment_content(&self, id: Uuid, content: String) -> Result<Option<Comment>>;

    async fn delete_comment(&self, id: Uuid) -> Result<Option<Comment>>;

    /// Removes every comment whose parent is `post_id`, returning how many went.
    async fn delete_comments_for_post(&self, post_id: Uuid) -> Result<u64>;

    /// Appends `comment_id` to the post's refs unless already present.
    /// Returns `false` when nothing changed (already linked or post gone).
    async fn push_comment_ref(&self, post_id: Uuid, comment_id: Uuid) -> Result<bool>;

    /// Removes `comment_id` from the post's refs.
    /// Returns `false` when nothing changed.
    async fn pull_comment_ref(&self, post_id: Uuid, comment_id: Uuid) -> Result<bool>;
}
