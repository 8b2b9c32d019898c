// In-memory repositories for handler tests.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CategoryRepository, PostRepository, RepoError, UpdatedPost, UserRepository};
use crate::models::category::Category;
use crate::models::post::{
    CategoryRef, NewPost, Post, PostAuthor, PostFilter, PostPatch, PostQuery, PostStatus,
    PostSummary, PostWithRelations, SitemapPost,
};
use crate::models::user::{NewUser, User};

#[derive(Default)]
pub struct MemoryStore {
    posts: RwLock<Vec<Post>>,
    categories: RwLock<Vec<Category>>,
    users: RwLock<Vec<User>>,
    tick: AtomicI64,
}

impl MemoryStore {
    /// Strictly increasing timestamps so ordering by update time is stable.
    fn now(&self) -> DateTime<Utc> {
        Utc::now() + Duration::milliseconds(self.tick.fetch_add(1, Ordering::SeqCst))
    }

    pub async fn save_post_for(&self, user_id: Uuid, post_id: Uuid) {
        let mut users = self.users.write().await;
        if let Some(user) = users.iter_mut().find(|u| u.id == user_id) {
            user.saved_posts.push(post_id.to_string());
        }
    }

    async fn check_category(&self, id: Option<Uuid>) -> Result<(), RepoError> {
        match id {
            Some(id) if !self.categories.read().await.iter().any(|c| c.id == id) => {
                Err(RepoError::InvalidReference("Category not found".into()))
            }
            _ => Ok(()),
        }
    }

    async fn with_relations(&self, post: Post) -> PostWithRelations {
        let categories = self.categories.read().await;
        let users = self.users.read().await;
        let category = post.category_id.and_then(|cid| {
            categories
                .iter()
                .find(|c| c.id == cid)
                .map(|c| CategoryRef { id: c.id, name: c.name.clone() })
        });
        let user = users.iter().find(|u| u.id == post.user_id).map(|u| PostAuthor {
            id: u.id,
            name: u.name.clone(),
            image: u.image.clone(),
            saved_posts: u.saved_posts.clone(),
        });
        PostWithRelations { post, category, user }
    }
}

fn matches(post: &Post, query: &PostQuery) -> bool {
    if query.published_only && post.status != PostStatus::Published {
        return false;
    }
    match &query.filter {
        PostFilter::All => true,
        PostFilter::Category(id) => post.category_id == Some(*id),
        PostFilter::Tag(tag) => post.tags.iter().any(|t| t == tag),
    }
}

fn summary(post: &Post) -> PostSummary {
    PostSummary {
        id: post.id,
        title: post.title.clone(),
        slug: post.slug.clone(),
        image_url: post.image_url.clone(),
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn create(&self, new: NewPost) -> Result<Post, RepoError> {
        self.check_category(new.category_id).await?;
        let mut posts = self.posts.write().await;
        if posts.iter().any(|p| p.slug == new.slug) {
            return Err(RepoError::Conflict("A post with this slug already exists".into()));
        }
        let now = self.now();
        let post = Post {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            title: new.title,
            slug: new.slug,
            content: new.content,
            image_url: new.image_url,
            image_alt: new.image_alt,
            views: 0,
            tags: new.tags,
            status: new.status,
            category_id: new.category_id,
            seo_title: new.seo_title,
            seo_description: new.seo_description,
            canonical_url: new.canonical_url,
            primary_keyword: new.primary_keyword,
            og_image: new.og_image,
            no_index: new.no_index,
            author: new.author,
            author_credentials: new.author_credentials,
            author_profile_url: new.author_profile_url,
            author_experience_yrs: new.author_experience_yrs,
            date_published: new.date_published,
            date_modified: new.date_modified,
            reading_time: new.reading_time,
            reviewed_by: new.reviewed_by,
            reviewer_credentials: new.reviewer_credentials,
            medical_review_date: new.medical_review_date,
            main_entity: new.main_entity,
            medical_specialty: new.medical_specialty,
            medical_conditions: new.medical_conditions,
            symptoms: new.symptoms,
            treatments: new.treatments,
            medications: new.medications,
            last_medical_update: new.last_medical_update,
            content_version: new.content_version,
            intent: new.intent,
            editorial_policy_url: new.editorial_policy_url,
            medical_board_url: new.medical_board_url,
            has_disclaimer: new.has_disclaimer,
            risk_level: new.risk_level,
            publisher_name: new.publisher_name,
            publisher_url: new.publisher_url,
            publisher_logo_url: new.publisher_logo_url,
            citations: new.citations,
            target_audience: new.target_audience,
            created_at: now,
            updated_at: now,
        };
        posts.push(post.clone());
        Ok(post)
    }

    async fn update(&self, id: Uuid, patch: PostPatch) -> Result<Option<UpdatedPost>, RepoError> {
        self.check_category(patch.category_id).await?;
        let mut posts = self.posts.write().await;
        if posts.iter().any(|p| p.id != id && p.slug == patch.slug) {
            return Err(RepoError::Conflict("A post with this slug already exists".into()));
        }
        let now = self.now();
        let Some(post) = posts.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        let previous_slug = post.slug.clone();

        post.user_id = patch.user_id;
        post.title = patch.title;
        post.slug = patch.slug;
        post.content = patch.content;
        post.image_url = patch.image_url;
        post.tags = patch.tags;
        post.status = patch.status;
        post.category_id = patch.category_id;
        post.has_disclaimer = patch.has_disclaimer;
        post.medical_conditions = patch.medical_conditions;
        post.symptoms = patch.symptoms;
        post.treatments = patch.treatments;
        post.medications = patch.medications;
        post.citations = patch.citations;

        macro_rules! keep_unless_set {
            ($($field:ident),* $(,)?) => {
                $( if patch.$field.is_some() { post.$field = patch.$field; } )*
            };
        }
        keep_unless_set!(
            image_alt, seo_title, seo_description, canonical_url, primary_keyword, og_image,
            author, author_credentials, author_profile_url, author_experience_yrs,
            date_published, date_modified, reading_time, reviewed_by, reviewer_credentials,
            medical_review_date, main_entity, medical_specialty, last_medical_update,
            content_version, intent, editorial_policy_url, medical_board_url, risk_level,
            publisher_name, publisher_url, publisher_logo_url, target_audience,
        );
        if let Some(no_index) = patch.no_index {
            post.no_index = no_index;
        }
        post.updated_at = now;

        Ok(Some(UpdatedPost {
            post: post.clone(),
            previous_slug,
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let mut posts = self.posts.write().await;
        Ok(posts
            .iter()
            .position(|p| p.id == id)
            .map(|idx| posts.remove(idx)))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.posts.read().await.iter().find(|p| p.id == id).cloned())
    }

    async fn find_published_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<PostWithRelations>, RepoError> {
        let found = self
            .posts
            .read()
            .await
            .iter()
            .find(|p| p.slug == slug && p.status == PostStatus::Published)
            .cloned();
        match found {
            Some(post) => Ok(Some(self.with_relations(post).await)),
            None => Ok(None),
        }
    }

    async fn list(&self, query: &PostQuery) -> Result<(Vec<PostWithRelations>, i64), RepoError> {
        let mut selected: Vec<Post> = self
            .posts
            .read()
            .await
            .iter()
            .filter(|p| matches(p, query))
            .cloned()
            .collect();
        selected.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        let total = selected.len() as i64;

        let mut page = Vec::new();
        for post in selected
            .into_iter()
            .skip(query.skip as usize)
            .take(query.take as usize)
        {
            page.push(self.with_relations(post).await);
        }
        Ok((page, total))
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<PostWithRelations>, RepoError> {
        let mut mine: Vec<Post> = self
            .posts
            .read()
            .await
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        mine.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        if let Some(limit) = limit {
            mine.truncate(limit as usize);
        }
        let mut out = Vec::new();
        for post in mine {
            out.push(self.with_relations(post).await);
        }
        Ok(out)
    }

    async fn increment_views(&self, id: Uuid) -> Result<Option<i32>, RepoError> {
        let mut posts = self.posts.write().await;
        Ok(posts.iter_mut().find(|p| p.id == id).map(|p| {
            p.views += 1;
            p.views
        }))
    }

    async fn published_summaries(&self, limit: i64) -> Result<Vec<PostSummary>, RepoError> {
        let mut published: Vec<Post> = self
            .posts
            .read()
            .await
            .iter()
            .filter(|p| p.status == PostStatus::Published)
            .cloned()
            .collect();
        published.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(published.iter().take(limit as usize).map(summary).collect())
    }

    async fn published_tag_lists(&self) -> Result<Vec<Vec<String>>, RepoError> {
        Ok(self
            .posts
            .read()
            .await
            .iter()
            .filter(|p| p.status == PostStatus::Published)
            .map(|p| p.tags.clone())
            .collect())
    }

    async fn search_published(&self, query: &str, take: i64) -> Result<Vec<PostSummary>, RepoError> {
        let needle = query.to_lowercase();
        let mut hits: Vec<Post> = self
            .posts
            .read()
            .await
            .iter()
            .filter(|p| p.status == PostStatus::Published)
            .filter(|p| {
                p.title.to_lowercase().contains(&needle)
                    || p.content.to_lowercase().contains(&needle)
                    || p.tags.iter().any(|t| t == query)
            })
            .cloned()
            .collect();
        hits.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(hits.iter().take(take as usize).map(summary).collect())
    }

    async fn sitemap_entries(&self) -> Result<Vec<SitemapPost>, RepoError> {
        Ok(self
            .posts
            .read()
            .await
            .iter()
            .filter(|p| p.status == PostStatus::Published)
            .map(|p| SitemapPost {
                slug: p.slug.clone(),
                updated_at: p.updated_at,
            })
            .collect())
    }
}

#[async_trait]
impl CategoryRepository for MemoryStore {
    async fn list(&self) -> Result<Vec<Category>, RepoError> {
        let mut all = self.categories.read().await.clone();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn create(&self, name: &str) -> Result<Category, RepoError> {
        let mut categories = self.categories.write().await;
        if categories.iter().any(|c| c.name == name) {
            return Err(RepoError::Conflict("A category with this name already exists".into()));
        }
        let now = self.now();
        let category = Category {
            id: Uuid::new_v4(),
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };
        categories.push(category.clone());
        Ok(category)
    }

    async fn update(&self, id: Uuid, name: &str) -> Result<Option<Category>, RepoError> {
        let mut categories = self.categories.write().await;
        if categories.iter().any(|c| c.id != id && c.name == name) {
            return Err(RepoError::Conflict("A category with this name already exists".into()));
        }
        let now = self.now();
        Ok(categories.iter_mut().find(|c| c.id == id).map(|c| {
            c.name = name.to_string();
            c.updated_at = now;
            c.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        let mut categories = self.categories.write().await;
        let before = categories.len();
        categories.retain(|c| c.id != id);
        let removed = categories.len() != before;
        if removed {
            for post in self.posts.write().await.iter_mut() {
                if post.category_id == Some(id) {
                    post.category_id = None;
                }
            }
        }
        Ok(removed)
    }

    async fn search(&self, query: &str, take: i64) -> Result<Vec<Category>, RepoError> {
        let needle = query.to_lowercase();
        let mut hits: Vec<Category> = self
            .categories
            .read()
            .await
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        hits.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        hits.truncate(take as usize);
        Ok(hits)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn upsert(&self, new: NewUser) -> Result<User, RepoError> {
        let mut users = self.users.write().await;
        if let Some(user) = users.iter_mut().find(|u| u.id == new.id) {
            user.email = new.email;
            if new.name.is_some() {
                user.name = new.name;
            }
            if new.image.is_some() {
                user.image = new.image;
            }
            return Ok(user.clone());
        }
        let user = User {
            id: new.id,
            email: new.email,
            name: new.name,
            image: new.image,
            saved_posts: Vec::new(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn saved_posts(&self, id: Uuid) -> Result<Vec<String>, RepoError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.id == id)
            .map(|u| u.saved_posts.clone())
            .unwrap_or_default())
    }
}
