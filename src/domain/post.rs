use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::comment::CommentSummary;

pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 500;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub course: Course,
    #[serde(with = "time::serde::rfc3339")]
    pub published_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    /// Comment ids in creation order. Only the relationship maintainer writes this.
    pub comment_refs: Vec<Uuid>,
}

impl Post {
    /// Appends `comment_id` unless it is already linked. Returns whether the refs changed.
    pub fn link_comment(&mut self, comment_id: Uuid) -> bool {
        if self.comment_refs.contains(&comment_id) {
            return false;
        }
        self.comment_refs.push(comment_id);
        true
    }

    /// Drops every occurrence of `comment_id`. Returns whether the refs changed.
    pub fn unlink_comment(&mut self, comment_id: Uuid) -> bool {
        let before = self.comment_refs.len();
        self.comment_refs.retain(|existing| *existing != comment_id);
        self.comment_refs.len() != before
    }
}

/// Input for a new post, already validated by the service layer.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub description: String,
    pub course: Course,
    pub published_at: Option<OffsetDateTime>,
}

/// Post with its comments joined in as projections.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    #[serde(flatten)]
    pub post: Post,
    #[serde(rename = "comentarios", skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<CommentSummary>>,
}

/// The slice of a post attached to a freshly created comment.
#[derive(Debug, Clone, Serialize)]
pub struct PostTitle {
    pub id: Uuid,
    pub title: String,
}

impl From<&Post> for PostTitle {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Course {
    #[serde(rename = "Practica-Supervisada")]
    PracticaSupervisada,
    #[serde(rename = "Tecnologia III")]
    TecnologiaIii,
    #[serde(rename = "Taller III")]
    TallerIii,
}

impl Course {
    pub const ALL: [Course; 3] = [Self::PracticaSupervisada, Self::TecnologiaIii, Self::TallerIii];

    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "Practica-Supervisada" => Some(Self::PracticaSupervisada),
            "Tecnologia III" => Some(Self::TecnologiaIii),
            "Taller III" => Some(Self::TallerIii),
            _ => None,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Self::PracticaSupervisada => "Practica-Supervisada",
            Self::TecnologiaIii => "Tecnologia III",
            Self::TallerIii => "Taller III",
        }
    }
}

/// Read-side selection over the post collection.
#[derive(Debug, Clone)]
pub enum PostFilter {
    All,
    /// Exact match on the stored course name.
    Course(String),
    /// Case-insensitive substring of the title.
    TitleContains(String),
    /// Inclusive bounds on `published_at`.
    PublishedBetween {
        start: OffsetDateTime,
        end: OffsetDateTime,
    },
}

impl PostFilter {
    pub fn matches(&self, post: &Post) -> bool {
        match self {
            Self::All => true,
            Self::Course(course) => post.course.as_db() == course,
            Self::TitleContains(needle) => post
                .title
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            Self::PublishedBetween { start, end } => {
                post.published_at >= *start && post.published_at <= *end
            }
        }
    }
}
