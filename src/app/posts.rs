use std::collections::HashMap;
use std::sync::Arc;
use time::macros::format_description;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::app::error::{ServiceError, POST_NOT_FOUND};
use crate::app::validation::required_text;
use crate::domain::comment::CommentSummary;
use crate::domain::post::{
    Course, NewPost, Post, PostFilter, PostView, DESCRIPTION_MAX_CHARS, TITLE_MAX_CHARS,
};
use crate::infra::store::DocumentStore;

#[derive(Debug, Default, Clone)]
pub struct CreatePostInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub course: Option<String>,
    pub published_at: Option<OffsetDateTime>,
}

#[derive(Clone)]
pub struct PostService {
    store: Arc<dyn DocumentStore>,
}

impl PostService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn create_post(&self, input: CreatePostInput) -> Result<Post, ServiceError> {
        let title = required_text(input.title, "title", TITLE_MAX_CHARS)?;
        let description = required_text(input.description, "description", DESCRIPTION_MAX_CHARS)?;
        let course = input
            .course
            .filter(|course| !course.trim().is_empty())
            .ok_or_else(|| ServiceError::validation("El campo 'course' es obligatorio"))?;
        let course = Course::from_db(&course).ok_or_else(|| {
            let allowed: Vec<&str> = Course::ALL.iter().map(Course::as_db).collect();
            ServiceError::validation(format!(
                "El campo 'course' debe ser uno de: {}",
                allowed.join(", ")
            ))
        })?;

        let post = self
            .store
            .insert_post(NewPost {
                title,
                description,
                course,
                published_at: input.published_at,
            })
            .await?;

        tracing::info!(post_id = %post.id, course = post.course.as_db(), "post created");
        Ok(post)
    }

    pub async fn list_posts(&self, include_comments: bool) -> Result<Vec<PostView>, ServiceError> {
        let posts = self.store.list_posts(&PostFilter::All).await?;
        if include_comments {
            self.with_comments(posts).await
        } else {
            Ok(posts
                .into_iter()
                .map(|post| PostView {
                    post,
                    comments: None,
                })
                .collect())
        }
    }

    pub async fn get_post(&self, id: Uuid) -> Result<PostView, ServiceError> {
        let post = self
            .store
            .find_post(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(POST_NOT_FOUND))?;

        let mut views = self.with_comments(vec![post]).await?;
        views
            .pop()
            .ok_or_else(|| ServiceError::not_found(POST_NOT_FOUND))
    }

    pub async fn filter_by_course(&self, course: Option<&str>) -> Result<Vec<Post>, ServiceError> {
        let course = non_blank(course)
            .ok_or_else(|| ServiceError::validation("El parámetro 'curso' es obligatorio"))?;
        Ok(self
            .store
            .list_posts(&PostFilter::Course(course.to_string()))
            .await?)
    }

    pub async fn filter_by_title(&self, title: Option<&str>) -> Result<Vec<Post>, ServiceError> {
        let title = non_blank(title)
            .ok_or_else(|| ServiceError::validation("El parámetro 'titulo' es obligatorio"))?;
        Ok(self
            .store
            .list_posts(&PostFilter::TitleContains(title.to_string()))
            .await?)
    }

    /// Posts published between the start of `start` and the end of `end`, both `YYYY-MM-DD`.
    pub async fn filter_by_date_range(
        &self,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Vec<Post>, ServiceError> {
        let (Some(start), Some(end)) = (non_blank(start), non_blank(end)) else {
            return Err(ServiceError::validation(
                "Los parámetros 'fechaInicio' y 'fechaFin' son obligatorios",
            ));
        };
        let filter = day_range(start, end)?;
        Ok(self.store.list_posts(&filter).await?)
    }

    pub async fn update_post(
        &self,
        id: Uuid,
        title: Option<String>,
        description: Option<String>,
    ) -> Result<Post, ServiceError> {
        let title = required_text(title, "title", TITLE_MAX_CHARS)?;
        let description = required_text(description, "description", DESCRIPTION_MAX_CHARS)?;

        let post = self
            .store
            .update_post(id, title, description)
            .await?
            .ok_or_else(|| ServiceError::not_found(POST_NOT_FOUND))?;

        tracing::info!(post_id = %post.id, "post updated");
        Ok(post)
    }

    /// Deletes the post and every comment under it.
    pub async fn delete_post(&self, id: Uuid) -> Result<Post, ServiceError> {
        let post = self
            .store
            .delete_post(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(POST_NOT_FOUND))?;

        let removed = self.store.delete_comments_for_post(id).await?;
        tracing::info!(post_id = %id, comments_removed = removed, "post deleted");
        Ok(post)
    }

    async fn with_comments(&self, posts: Vec<Post>) -> Result<Vec<PostView>, ServiceError> {
        let ids: Vec<Uuid> = posts
            .iter()
            .flat_map(|post| post.comment_refs.iter().copied())
            .collect();
        let comments: HashMap<Uuid, CommentSummary> = self
            .store
            .find_comments(&ids)
            .await?
            .iter()
            .map(|comment| (comment.id, CommentSummary::from(comment)))
            .collect();

        Ok(posts
            .into_iter()
            .map(|post| {
                let summaries = resolve_refs(&post, &comments);
                PostView {
                    post,
                    comments: Some(summaries),
                }
            })
            .collect())
    }
}

/// Summaries in `comment_refs` order. Refs with no comment behind them are skipped.
fn resolve_refs(
    post: &Post,
    comments: &HashMap<Uuid, CommentSummary>,
) -> Vec<CommentSummary> {
    post.comment_refs
        .iter()
        .filter_map(|id| {
            let summary = comments.get(id).cloned();
            if summary.is_none() {
                tracing::warn!(post_id = %post.id, comment_id = %id, "dangling comment ref");
            }
            summary
        })
        .collect()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Widens two calendar days to `[start 00:00:00.000, end 23:59:59.999]` in UTC.
pub fn day_range(start: &str, end: &str) -> Result<PostFilter, ServiceError> {
    let parse = |value: &str, field: &str| {
        Date::parse(value, format_description!("[year]-[month]-[day]")).map_err(|_| {
            ServiceError::validation(format!(
                "El parámetro '{}' debe tener el formato YYYY-MM-DD",
                field
            ))
        })
    };
    let start = parse(start, "fechaInicio")?;
    let end = parse(end, "fechaFin")?;
    let end = end
        .with_hms_milli(23, 59, 59, 999)
        .map_err(|err| ServiceError::Store(err.into()))?;

    Ok(PostFilter::PublishedBetween {
        start: start.midnight().assume_utc(),
        end: end.assume_utc(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn bounds(filter: PostFilter) -> (OffsetDateTime, OffsetDateTime) {
        match filter {
            PostFilter::PublishedBetween { start, end } => (start, end),
            other => panic!("unexpected filter {:?}", other),
        }
    }

    #[test]
    fn single_day_covers_whole_day() {
        let (start, end) = bounds(day_range("2025-05-01", "2025-05-01").unwrap());
        assert_eq!(start, datetime!(2025-05-01 00:00:00 UTC));
        assert_eq!(end, datetime!(2025-05-01 23:59:59.999 UTC));
        assert!(datetime!(2025-05-01 23:59:00 UTC) <= end);
        assert!(datetime!(2025-05-02 00:00:01 UTC) > end);
    }

    #[test]
    fn rejects_unparsable_day() {
        let err = day_range("2025-13-01", "2025-05-01").unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        let err = day_range("2025-05-01", "yesterday").unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }
}
