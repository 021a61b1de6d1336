use anyhow::{anyhow, Result};
use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::domain::comment::{Comment, NewComment};
use crate::domain::post::{Course, NewPost, Post, PostFilter};
use crate::infra::store::DocumentStore;

const POST_COLUMNS: &str =
    "id, title, description, course, published_at, created_at, updated_at, comment_refs";
const COMMENT_COLUMNS: &str =
    "id, author, content, parent_post_id, posted_at, created_at, updated_at";

#[derive(Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        let database_url = config
            .database_url
            .as_deref()
            .ok_or_else(|| anyhow!("missing required env var: DATABASE_URL"))?;
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(config.db_connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.db_idle_timeout_seconds))
            .max_lifetime(Duration::from_secs(config.db_max_lifetime_seconds))
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn post_from_row(row: &PgRow) -> Result<Post> {
    let course: String = row.try_get("course")?;
    let course =
        Course::from_db(&course).ok_or_else(|| anyhow!("unknown course: {}", course))?;

    Ok(Post {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        course,
        published_at: row.try_get("published_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        comment_refs: row.try_get("comment_refs")?,
    })
}

fn comment_from_row(row: &PgRow) -> Result<Comment> {
    Ok(Comment {
        id: row.try_get("id")?,
        author: row.try_get("author")?,
        content: row.try_get("content")?,
        parent_post_id: row.try_get("parent_post_id")?,
        posted_at: row.try_get("posted_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Escapes LIKE metacharacters so user input only ever matches literally.
fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

#[async_trait]
impl DocumentStore for Db {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn insert_post(&self, post: NewPost) -> Result<Post> {
        let row = sqlx::query(&format!(
            "INSERT INTO posts (title, description, course, published_at) \
             VALUES ($1, $2, $3, COALESCE($4, now())) \
             RETURNING {POST_COLUMNS}"
        ))
        .bind(post.title)
        .bind(post.description)
        .bind(post.course.as_db())
        .bind(post.published_at)
        .fetch_one(&self.pool)
        .await?;

        post_from_row(&row)
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>> {
        let row = sqlx::query(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(post_from_row).transpose()
    }

    async fn list_posts(&self, filter: &PostFilter) -> Result<Vec<Post>> {
        let rows = match filter {
            PostFilter::All => {
                sqlx::query(&format!(
                    "SELECT {POST_COLUMNS} FROM posts ORDER BY created_at ASC, id ASC"
                ))
                .fetch_all(&self.pool)
                .await?
            }
            PostFilter::Course(course) => {
                sqlx::query(&format!(
                    "SELECT {POST_COLUMNS} FROM posts \
                     WHERE course = $1 \
                     ORDER BY created_at ASC, id ASC"
                ))
                .bind(course)
                .fetch_all(&self.pool)
                .await?
            }
            PostFilter::TitleContains(needle) => {
                sqlx::query(&format!(
                    "SELECT {POST_COLUMNS} FROM posts \
                     WHERE title ILIKE $1 ESCAPE '\\' \
                     ORDER BY created_at ASC, id ASC"
                ))
                .bind(like_pattern(needle))
                .fetch_all(&self.pool)
                .await?
            }
            PostFilter::PublishedBetween { start, end } => {
                sqlx::query(&format!(
                    "SELECT {POST_COLUMNS} FROM posts \
                     WHERE published_at >= $1 AND published_at <= $2 \
                     ORDER BY created_at ASC, id ASC"
                ))
                .bind(start)
                .bind(end)
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.iter().map(post_from_row).collect()
    }

    async fn update_post(
        &self,
        id: Uuid,
        title: String,
        description: String,
    ) -> Result<Option<Post>> {
        let row = sqlx::query(&format!(
            "UPDATE posts SET title = $2, description = $3, updated_at = now() \
             WHERE id = $1 \
             RETURNING {POST_COLUMNS}"
        ))
        .bind(id)
        .bind(title)
        .bind(description)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(post_from_row).transpose()
    }

    async fn delete_post(&self, id: Uuid) -> Result<Option<Post>> {
        let row = sqlx::query(&format!(
            "DELETE FROM posts WHERE id = $1 RETURNING {POST_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(post_from_row).transpose()
    }

    async fn insert_comment(&self, comment: NewComment) -> Result<Comment> {
        let row = sqlx::query(&format!(
            "INSERT INTO comments (author, content, parent_post_id) \
             VALUES ($1, $2, $3) \
             RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(comment.author)
        .bind(comment.content)
        .bind(comment.parent_post_id)
        .fetch_one(&self.pool)
        .await?;

        comment_from_row(&row)
    }

    async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>> {
        let row = sqlx::query(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(comment_from_row).transpose()
    }

    async fn find_comments(&self, ids: &[Uuid]) -> Result<Vec<Comment>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(comment_from_row).collect()
    }

    async fn update_comment_content(&self, id: Uuid, content: String) -> Result<Option<Comment>> {
        let row = sqlx::query(&format!(
            "UPDATE comments SET content = $2, updated_at = now() \
             WHERE id = $1 \
             RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(comment_from_row).transpose()
    }

    async fn delete_comment(&self, id: Uuid) -> Result<Option<Comment>> {
        let row = sqlx::query(&format!(
            "DELETE FROM comments WHERE id = $1 RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(comment_from_row).transpose()
    }

    async fn delete_comments_for_post(&self, post_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM comments WHERE parent_post_id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn push_comment_ref(&self, post_id: Uuid, comment_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE posts \
             SET comment_refs = array_append(comment_refs, $2), updated_at = now() \
             WHERE id = $1 AND NOT ($2 = ANY(comment_refs))",
        )
        .bind(post_id)
        .bind(comment_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn pull_comment_ref(&self, post_id: Uuid, comment_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE posts \
             SET comment_refs = array_remove(comment_refs, $2), updated_at = now() \
             WHERE id = $1 AND $2 = ANY(comment_refs)",
        )
        .bind(post_id)
        .bind(comment_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
