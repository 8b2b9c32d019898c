pub mod category_repository;
pub mod post_repository;
pub mod user_repository;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use deadpool_postgres::Pool;
use log::info;
use thiserror::Error;
use tokio_postgres::error::SqlState;
use uuid::Uuid;

use crate::models::category::Category;
use crate::models::post::{
    NewPost, Post, PostPatch, PostQuery, PostSummary, PostWithRelations, SitemapPost,
};
use crate::models::user::{NewUser, User};

const INIT_SQL: &str = include_str!("../../migrations/0001_init.sql");

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),
    #[error("query error: {0}")]
    Query(#[from] tokio_postgres::Error),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    InvalidReference(String),
    #[error("unexpected row: {0}")]
    Decode(String),
}

/// Maps a unique violation to `Conflict`, everything else to `Query`.
pub(crate) fn unique_violation(err: tokio_postgres::Error, msg: &str) -> RepoError {
    if err.code() == Some(&SqlState::UNIQUE_VIOLATION) {
        RepoError::Conflict(msg.to_string())
    } else {
        RepoError::Query(err)
    }
}

/// Like `unique_violation`, but a dangling foreign key becomes
/// `InvalidReference(missing)`.
pub(crate) fn write_violation(err: tokio_postgres::Error, taken: &str, missing: &str) -> RepoError {
    if err.code() == Some(&SqlState::FOREIGN_KEY_VIOLATION) {
        RepoError::InvalidReference(missing.to_string())
    } else {
        unique_violation(err, taken)
    }
}

/// `%query%` with LIKE wildcards escaped.
pub(crate) fn contains_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for ch in query.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

pub async fn run_migrations(pool: &Pool) -> Result<(), RepoError> {
    let client = pool.get().await?;
    client.batch_execute(INIT_SQL).await?;
    info!("database schema is up to date");
    Ok(())
}

/// Result of an update: the stored row and the slug it had before.
#[derive(Debug, Clone)]
pub struct UpdatedPost {
    pub post: Post,
    pub previous_slug: String,
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(&self, post: NewPost) -> Result<Post, RepoError>;
    async fn update(&self, id: Uuid, patch: PostPatch) -> Result<Option<UpdatedPost>, RepoError>;
    async fn delete(&self, id: Uuid) -> Result<Option<Post>, RepoError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError>;
    async fn find_published_by_slug(&self, slug: &str)
    -> Result<Option<PostWithRelations>, RepoError>;
    /// One page of posts plus the total matching the filter.
    async fn list(&self, query: &PostQuery) -> Result<(Vec<PostWithRelations>, i64), RepoError>;
    async fn list_by_user(
        &self,
        user_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<PostWithRelations>, RepoError>;
    async fn increment_views(&self, id: Uuid) -> Result<Option<i32>, RepoError>;
    async fn published_summaries(&self, limit: i64) -> Result<Vec<PostSummary>, RepoError>;
    async fn published_tag_lists(&self) -> Result<Vec<Vec<String>>, RepoError>;
    async fn search_published(&self, query: &str, take: i64)
    -> Result<Vec<PostSummary>, RepoError>;
    async fn sitemap_entries(&self) -> Result<Vec<SitemapPost>, RepoError>;
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Category>, RepoError>;
    async fn create(&self, name: &str) -> Result<Category, RepoError>;
    async fn update(&self, id: Uuid, name: &str) -> Result<Option<Category>, RepoError>;
    async fn delete(&self, id: Uuid) -> Result<bool, RepoError>;
    async fn search(&self, query: &str, take: i64) -> Result<Vec<Category>, RepoError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn upsert(&self, user: NewUser) -> Result<User, RepoError>;
    async fn saved_posts(&self, id: Uuid) -> Result<Vec<String>, RepoError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(contains_pattern("flu"), "%flu%");
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }
}
