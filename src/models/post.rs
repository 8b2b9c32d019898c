use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            other => Err(format!("unknown post status '{}'", other)),
        }
    }
}

/// A row of the `posts` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    // Core
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub image_url: String,
    pub image_alt: Option<String>,
    pub views: i32,
    pub tags: Vec<String>,
    pub status: PostStatus,
    pub category_id: Option<Uuid>,

    // SEO
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub canonical_url: Option<String>,
    pub primary_keyword: Option<String>,
    pub og_image: Option<String>,
    pub no_index: bool,

    // Author & dates
    pub author: Option<String>,
    pub author_credentials: Option<String>,
    pub author_profile_url: Option<String>,
    pub author_experience_yrs: Option<i32>,
    pub date_published: Option<DateTime<Utc>>,
    pub date_modified: Option<DateTime<Utc>>,
    pub reading_time: Option<i32>,

    // Medical review
    pub reviewed_by: Option<String>,
    pub reviewer_credentials: Option<String>,
    pub medical_review_date: Option<DateTime<Utc>>,

    // Medical entity graph
    pub main_entity: Option<String>,
    pub medical_specialty: Option<String>,
    pub medical_conditions: Vec<String>,
    pub symptoms: Vec<String>,
    pub treatments: Vec<String>,
    pub medications: Vec<String>,

    // Freshness
    pub last_medical_update: Option<DateTime<Utc>>,
    pub content_version: Option<String>,

    // Intent & trust
    pub intent: Option<String>,
    pub editorial_policy_url: Option<String>,
    pub medical_board_url: Option<String>,
    pub has_disclaimer: bool,
    pub risk_level: Option<String>,

    // Publisher
    pub publisher_name: Option<String>,
    pub publisher_url: Option<String>,
    pub publisher_logo_url: Option<String>,

    // Citations & audience
    pub citations: Vec<String>,
    pub target_audience: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fully defaulted insert payload produced by the normalizer.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    pub user_id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub image_url: String,
    pub image_alt: Option<String>,
    pub tags: Vec<String>,
    pub status: PostStatus,
    pub category_id: Option<Uuid>,

    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub canonical_url: Option<String>,
    pub primary_keyword: Option<String>,
    pub og_image: Option<String>,
    pub no_index: bool,

    pub author: Option<String>,
    pub author_credentials: Option<String>,
    pub author_profile_url: Option<String>,
    pub author_experience_yrs: Option<i32>,
    pub date_published: Option<DateTime<Utc>>,
    pub date_modified: Option<DateTime<Utc>>,
    pub reading_time: Option<i32>,

    pub reviewed_by: Option<String>,
    pub reviewer_credentials: Option<String>,
    pub medical_review_date: Option<DateTime<Utc>>,

    pub main_entity: Option<String>,
    pub medical_specialty: Option<String>,
    pub medical_conditions: Vec<String>,
    pub symptoms: Vec<String>,
    pub treatments: Vec<String>,
    pub medications: Vec<String>,

    pub last_medical_update: Option<DateTime<Utc>>,
    pub content_version: Option<String>,

    pub intent: Option<String>,
    pub editorial_policy_url: Option<String>,
    pub medical_board_url: Option<String>,
    pub has_disclaimer: bool,
    pub risk_level: Option<String>,

    pub publisher_name: Option<String>,
    pub publisher_url: Option<String>,
    pub publisher_logo_url: Option<String>,

    pub citations: Vec<String>,
    pub target_audience: Option<String>,
}

/// Update payload. Required fields and lists are always written;
/// `None` in an optional field keeps the stored value.
#[derive(Debug, Clone, PartialEq)]
pub struct PostPatch {
    pub user_id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub image_url: String,
    pub tags: Vec<String>,
    pub status: PostStatus,
    pub category_id: Option<Uuid>,
    pub has_disclaimer: bool,

    pub medical_conditions: Vec<String>,
    pub symptoms: Vec<String>,
    pub treatments: Vec<String>,
    pub medications: Vec<String>,
    pub citations: Vec<String>,

    pub image_alt: Option<String>,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub canonical_url: Option<String>,
    pub primary_keyword: Option<String>,
    pub og_image: Option<String>,
    pub no_index: Option<bool>,

    pub author: Option<String>,
    pub author_credentials: Option<String>,
    pub author_profile_url: Option<String>,
    pub author_experience_yrs: Option<i32>,
    pub date_published: Option<DateTime<Utc>>,
    pub date_modified: Option<DateTime<Utc>>,
    pub reading_time: Option<i32>,

    pub reviewed_by: Option<String>,
    pub reviewer_credentials: Option<String>,
    pub medical_review_date: Option<DateTime<Utc>>,

    pub main_entity: Option<String>,
    pub medical_specialty: Option<String>,

    pub last_medical_update: Option<DateTime<Utc>>,
    pub content_version: Option<String>,

    pub intent: Option<String>,
    pub editorial_policy_url: Option<String>,
    pub medical_board_url: Option<String>,
    pub risk_level: Option<String>,

    pub publisher_name: Option<String>,
    pub publisher_url: Option<String>,
    pub publisher_logo_url: Option<String>,

    pub target_audience: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: Uuid,
    pub name: String,
}

/// Author columns joined from `users`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostAuthor {
    pub id: Uuid,
    pub name: Option<String>,
    pub image: Option<String>,
    pub saved_posts: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct PostWithRelations {
    pub post: Post,
    pub category: Option<CategoryRef>,
    pub user: Option<PostAuthor>,
}

/// Listing filters shared by the admin and public pages.
#[derive(Debug, Clone, PartialEq)]
pub enum PostFilter {
    All,
    Category(Uuid),
    Tag(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostQuery {
    pub filter: PostFilter,
    pub published_only: bool,
    pub skip: i64,
    pub take: i64,
}

/// Minimal projection used to pre-render public pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub image_url: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SitemapPost {
    pub slug: String,
    pub updated_at: DateTime<Utc>,
}
