use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::comment::{Comment, NewComment};
use crate::domain::post::{NewPost, Post, PostFilter};
use crate::infra::store::DocumentStore;

/// In-process store for tests and `STORE_BACKEND=memory` runs.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

#[derive(Default)]
struct Collections {
    // insertion order doubles as the default listing order
    posts: Vec<Post>,
    comments: HashMap<Uuid, Comment>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn comment_count(&self) -> usize {
        self.inner.read().await.comments.len()
    }
}

impl Collections {
    fn post_mut(&mut self, id: Uuid) -> Option<&mut Post> {
        self.posts.iter_mut().find(|post| post.id == id)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn insert_post(&self, post: NewPost) -> Result<Post> {
        let now = OffsetDateTime::now_utc();
        let post = Post {
            id: Uuid::new_v4(),
            title: post.title,
            description: post.description,
            course: post.course,
            published_at: post.published_at.unwrap_or(now),
            created_at: now,
            updated_at: now,
            comment_refs: Vec::new(),
        };
        self.inner.write().await.posts.push(post.clone());
        Ok(post)
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>> {
        let inner = self.inner.read().await;
        Ok(inner.posts.iter().find(|post| post.id == id).cloned())
    }

    async fn list_posts(&self, filter: &PostFilter) -> Result<Vec<Post>> {
        let inner = self.inner.read().await;
        Ok(inner
            .posts
            .iter()
            .filter(|post| filter.matches(post))
            .cloned()
            .collect())
    }

    async fn update_post(
        &self,
        id: Uuid,
        title: String,
        description: String,
    ) -> Result<Option<Post>> {
        let mut inner = self.inner.write().await;
        let Some(post) = inner.post_mut(id) else {
            return Ok(None);
        };
        post.title = title;
        post.description = description;
        post.updated_at = OffsetDateTime::now_utc();
        Ok(Some(post.clone()))
    }

    async fn delete_post(&self, id: Uuid) -> Result<Option<Post>> {
        let mut inner = self.inner.write().await;
        let position = inner.posts.iter().position(|post| post.id == id);
        Ok(position.map(|index| inner.posts.remove(index)))
    }

    async fn insert_comment(&self, comment: NewComment) -> Result<Comment> {
        let now = OffsetDateTime::now_utc();
        let comment = Comment {
            id: Uuid::new_v4(),
            author: comment.author,
            content: comment.content,
            parent_post_id: comment.parent_post_id,
            posted_at: now,
            created_at: now,
            updated_at: now,
        };
        self.inner
            .write()
            .await
            .comments
            .insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>> {
        Ok(self.inner.read().await.comments.get(&id).cloned())
    }

    async fn find_comments(&self, ids: &[Uuid]) -> Result<Vec<Comment>> {
        let inner = self.inner.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| inner.comments.get(id).cloned())
            .collect())
    }

    async fn update_comment_content(&self, id: Uuid, content: String) -> Result<Option<Comment>> {
        let mut inner = self.inner.write().await;
        let Some(comment) = inner.comments.get_mut(&id) else {
            return Ok(None);
        };
        comment.content = content;
        comment.updated_at = OffsetDateTime::now_utc();
        Ok(Some(comment.clone()))
    }

    async fn delete_comment(&self, id: Uuid) -> Result<Option<Comment>> {
        Ok(self.inner.write().await.comments.remove(&id))
    }

    async fn delete_comments_for_post(&self, post_id: Uuid) -> Result<u64> {
        let mut inner = self.inner.write().await;
        let before = inner.comments.len();
        inner
            .comments
            .retain(|_, comment| comment.parent_post_id != post_id);
        Ok((before - inner.comments.len()) as u64)
    }

    async fn push_comment_ref(&self, post_id: Uuid, comment_id: Uuid) -> Result<bool> {
        let mut inner = self.inner.write().await;
        let Some(post) = inner.post_mut(post_id) else {
            return Ok(false);
        };
        let changed = post.link_comment(comment_id);
        if changed {
            post.updated_at = OffsetDateTime::now_utc();
        }
        Ok(changed)
    }

    async fn pull_comment_ref(&self, post_id: Uuid, comment_id: Uuid) -> Result<bool> {
        let mut inner = self.inner.write().await;
        let Some(post) = inner.post_mut(post_id) else {
            return Ok(false);
        };
        let changed = post.unlink_comment(comment_id);
        if changed {
            post.updated_at = OffsetDateTime::now_utc();
        }
        Ok(changed)
    }
}
