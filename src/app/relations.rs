//! Keeps a post's `comment_refs` in step with the comment collection.
//!
//! Every comment insert is followed by exactly one [`attach_comment`], every
//! comment delete by exactly one [`detach_comment`]. Nothing else writes the
//! reference list. The list semantics themselves live on
//! [`Post::link_comment`](crate::domain::post::Post::link_comment) and
//! [`Post::unlink_comment`](crate::domain::post::Post::unlink_comment).

use anyhow::{anyhow, Result};
use std::time::Duration;
use uuid::Uuid;

use crate::infra::store::DocumentStore;

const RETRY_BACKOFF_MS: u64 = 50;

/// Links a freshly inserted comment to its parent post.
///
/// A `false` from the store means the ref was already there, which is the
/// outcome a retry after a lost acknowledgement should see.
pub async fn attach_comment(
    store: &dyn DocumentStore,
    post_id: Uuid,
    comment_id: Uuid,
    retries: u32,
) -> Result<()> {
    let appended = with_retries("attach", post_id, comment_id, retries, || {
        store.push_comment_ref(post_id, comment_id)
    })
    .await?;

    if !appended {
        // Either a retry already landed, or the post vanished underneath us.
        if store.find_post(post_id).await?.is_none() {
            return Err(anyhow!("post {} no longer exists", post_id));
        }
        tracing::debug!(post_id = %post_id, comment_id = %comment_id, "comment ref already present");
    }
    Ok(())
}

/// Unlinks a deleted comment from its parent post.
pub async fn detach_comment(
    store: &dyn DocumentStore,
    post_id: Uuid,
    comment_id: Uuid,
    retries: u32,
) -> Result<()> {
    with_retries("detach", post_id, comment_id, retries, || {
        store.pull_comment_ref(post_id, comment_id)
    })
    .await
    .map(|removed| {
        if !removed {
            tracing::warn!(post_id = %post_id, comment_id = %comment_id, "comment ref was not on post");
        }
    })
}

async fn with_retries<F, Fut>(
    action: &'static str,
    post_id: Uuid,
    comment_id: Uuid,
    retries: u32,
    mut op: F,
) -> Result<bool>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<bool>>,
{
    let mut attempt: u32 = 0;
    loop {
        match op().await {
            Ok(changed) => return Ok(changed),
            Err(err) if attempt < retries => {
                attempt += 1;
                tracing::warn!(
                    error = ?err,
                    action,
                    attempt,
                    post_id = %post_id,
                    comment_id = %comment_id,
                    "comment ref update failed, retrying"
                );
                tokio::time::sleep(Duration::from_millis(RETRY_BACKOFF_MS * u64::from(attempt)))
                    .await;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::post::{Course, NewPost};
    use crate::infra::memory::MemoryStore;

    async fn seeded() -> (MemoryStore, Uuid) {
        let store = MemoryStore::new();
        let post = store
            .insert_post(NewPost {
                title: "Título".into(),
                description: "Descripción".into(),
                course: Course::TallerIii,
                published_at: None,
            })
            .await
            .unwrap();
        (store, post.id)
    }

    #[tokio::test]
    async fn attach_twice_links_once() {
        let (store, post_id) = seeded().await;
        let comment_id = Uuid::new_v4();

        attach_comment(&store, post_id, comment_id, 0).await.unwrap();
        attach_comment(&store, post_id, comment_id, 0).await.unwrap();

        let post = store.find_post(post_id).await.unwrap().unwrap();
        assert_eq!(post.comment_refs, vec![comment_id]);
    }

    #[tokio::test]
    async fn attach_to_missing_post_fails() {
        let store = MemoryStore::new();

        let result = attach_comment(&store, Uuid::new_v4(), Uuid::new_v4(), 0).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn detach_unknown_ref_is_not_an_error() {
        let (store, post_id) = seeded().await;

        detach_comment(&store, post_id, Uuid::new_v4(), 0).await.unwrap();
    }
}
