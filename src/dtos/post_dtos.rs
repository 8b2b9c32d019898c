use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::post::{CategoryRef, Post, PostAuthor, PostWithRelations};

/// One entry of a creatable multi-select (tags, symptoms, citations...).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectOption {
    #[serde(default)]
    pub label: String,
    pub value: String,
}

impl SelectOption {
    pub fn new(value: &str) -> Self {
        Self {
            label: value.to_string(),
            value: value.to_string(),
        }
    }
}

/// Payload sent by the post editor, for both create and update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostFormIn {
    // Ignored; the id comes from the path on update.
    #[serde(skip_serializing)]
    pub id: Option<IgnoredAny>,
    // Ignored; the editor echoes the category list back in any shape.
    #[serde(skip_serializing)]
    pub categories: Option<IgnoredAny>,

    // Core
    pub title: String,
    pub slug: String,
    pub content: String,
    pub image_url: String,
    pub image_alt: Option<String>,
    pub category_id: String,
    pub tags: Option<Vec<SelectOption>>,
    pub status: String,

    // SEO
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub canonical_url: Option<String>,
    pub primary_keyword: Option<String>,
    pub og_image: Option<String>,
    pub no_index: Option<bool>,

    // Author & dates
    pub author: Option<String>,
    pub author_credentials: Option<String>,
    pub author_profile_url: Option<String>,
    pub author_experience_yrs: Option<i64>,
    pub date_published: Option<DateTime<Utc>>,
    pub date_modified: Option<DateTime<Utc>>,
    pub reading_time: Option<i64>,

    // Medical review
    pub reviewed_by: Option<String>,
    pub reviewer_credentials: Option<String>,
    pub medical_review_date: Option<DateTime<Utc>>,

    // Medical entity graph
    pub main_entity: Option<String>,
    pub medical_specialty: Option<String>,
    pub medical_conditions: Option<Vec<SelectOption>>,
    pub symptoms: Option<Vec<SelectOption>>,
    pub treatments: Option<Vec<SelectOption>>,
    pub medications: Option<Vec<SelectOption>>,

    // Freshness
    pub last_medical_update: Option<DateTime<Utc>>,
    pub content_version: Option<String>,

    // Intent & trust
    pub intent: Option<String>,
    pub editorial_policy_url: Option<String>,
    pub medical_board_url: Option<String>,
    pub has_disclaimer: Option<bool>,
    pub risk_level: Option<String>,

    // Publisher
    pub publisher_name: Option<String>,
    pub publisher_url: Option<String>,
    pub publisher_logo_url: Option<String>,

    // Citations & audience
    pub citations: Option<Vec<SelectOption>>,
    pub target_audience: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedPosts<T> {
    pub posts: Vec<T>,
    pub total_pages: i64,
    pub current_page: i64,
}

/// Admin listing row: the post with display fallbacks applied, its relations,
/// and the signed-in admin's saved posts.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostOut {
    #[serde(flatten)]
    pub post: Post,
    pub category: Option<CategoryRef>,
    pub user: Option<PostAuthor>,
    pub saved_posts: Vec<String>,
}

impl PostOut {
    pub fn new(row: PostWithRelations, saved_posts: &[String]) -> Self {
        Self {
            post: with_display_fallbacks(row.post),
            category: row.category,
            user: row.user,
            saved_posts: saved_posts.to_vec(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PublicAuthor {
    pub name: Option<String>,
}

/// Public view of a post; the author is reduced to a display name.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicPostOut {
    #[serde(flatten)]
    pub post: Post,
    pub category: Option<CategoryRef>,
    pub user: Option<PublicAuthor>,
}

impl From<PostWithRelations> for PublicPostOut {
    fn from(row: PostWithRelations) -> Self {
        Self {
            post: with_display_fallbacks(row.post),
            category: row.category,
            user: row.user.map(|u| PublicAuthor { name: u.name }),
        }
    }
}

/// Post with its category, as returned by the "my posts" admin list.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostWithCategoryOut {
    #[serde(flatten)]
    pub post: Post,
    pub category: Option<CategoryRef>,
}

impl From<PostWithRelations> for PostWithCategoryOut {
    fn from(row: PostWithRelations) -> Self {
        Self {
            post: row.post,
            category: row.category,
        }
    }
}

/// Open-graph image falls back to the hero image, publication dates fall
/// back to the row timestamps.
pub fn with_display_fallbacks(mut post: Post) -> Post {
    if post.og_image.as_deref().is_none_or(str::is_empty) && !post.image_url.is_empty() {
        post.og_image = Some(post.image_url.clone());
    }
    post.date_published = post.date_published.or(Some(post.created_at));
    post.date_modified = post.date_modified.or(Some(post.updated_at));
    post
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdatedPostOut {
    pub id: Uuid,
    pub slug: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ViewOut {
    pub ok: bool,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TagOut {
    pub name: String,
}
