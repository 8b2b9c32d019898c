// src/repositories/post_repository.rs - Postgres-backed post storage

use async_trait::async_trait;
use deadpool_postgres::Pool;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;
use uuid::Uuid;

use super::{PostRepository, RepoError, UpdatedPost, contains_pattern, write_violation};
use crate::models::post::{
    CategoryRef, NewPost, Post, PostAuthor, PostFilter, PostPatch, PostQuery, PostSummary,
    PostWithRelations, SitemapPost,
};

const SLUG_TAKEN: &str = "A post with this slug already exists";
const CATEGORY_MISSING: &str = "Category not found";

const SELECT_WITH_RELATIONS: &str = r#"
    SELECT p.*,
           c.id   AS category_ref_id,
           c.name AS category_name,
           u.id   AS author_id,
           u.name AS author_name,
           u.image AS author_image,
           u.saved_posts AS author_saved_posts
    FROM posts p
    LEFT JOIN categories c ON c.id = p.category_id
    LEFT JOIN users u ON u.id = p.user_id
"#;

const INSERT_POST: &str = r#"
    INSERT INTO posts (
        id, user_id, title, slug, content, image_url, image_alt, tags, status, category_id,
        seo_title, seo_description, canonical_url, primary_keyword, og_image, no_index,
        author, author_credentials, author_profile_url, author_experience_yrs,
        date_published, date_modified, reading_time,
        reviewed_by, reviewer_credentials, medical_review_date,
        main_entity, medical_specialty, medical_conditions, symptoms, treatments, medications,
        last_medical_update, content_version,
        intent, editorial_policy_url, medical_board_url, has_disclaimer, risk_level,
        publisher_name, publisher_url, publisher_logo_url,
        citations, target_audience
    ) VALUES (
        $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
        $11, $12, $13, $14, $15, $16,
        $17, $18, $19, $20,
        $21, $22, $23,
        $24, $25, $26,
        $27, $28, $29, $30, $31, $32,
        $33, $34,
        $35, $36, $37, $38, $39,
        $40, $41, $42,
        $43, $44
    )
    RETURNING *
"#;

// Optional columns keep their stored value when the parameter is NULL.
const UPDATE_POST: &str = r#"
    WITH prev AS (SELECT slug FROM posts WHERE id = $1)
    UPDATE posts p SET
        user_id = $2,
        title = $3,
        slug = $4,
        content = $5,
        image_url = $6,
        tags = $7,
        status = $8,
        category_id = $9,
        has_disclaimer = $10,
        medical_conditions = $11,
        symptoms = $12,
        treatments = $13,
        medications = $14,
        citations = $15,
        image_alt = COALESCE($16, p.image_alt),
        seo_title = COALESCE($17, p.seo_title),
        seo_description = COALESCE($18, p.seo_description),
        canonical_url = COALESCE($19, p.canonical_url),
        primary_keyword = COALESCE($20, p.primary_keyword),
        og_image = COALESCE($21, p.og_image),
        no_index = COALESCE($22, p.no_index),
        author = COALESCE($23, p.author),
        author_credentials = COALESCE($24, p.author_credentials),
        author_profile_url = COALESCE($25, p.author_profile_url),
        author_experience_yrs = COALESCE($26, p.author_experience_yrs),
        date_published = COALESCE($27, p.date_published),
        date_modified = COALESCE($28, p.date_modified),
        reading_time = COALESCE($29, p.reading_time),
        reviewed_by = COALESCE($30, p.reviewed_by),
        reviewer_credentials = COALESCE($31, p.reviewer_credentials),
        medical_review_date = COALESCE($32, p.medical_review_date),
        main_entity = COALESCE($33, p.main_entity),
        medical_specialty = COALESCE($34, p.medical_specialty),
        last_medical_update = COALESCE($35, p.last_medical_update),
        content_version = COALESCE($36, p.content_version),
        intent = COALESCE($37, p.intent),
        editorial_policy_url = COALESCE($38, p.editorial_policy_url),
        medical_board_url = COALESCE($39, p.medical_board_url),
        risk_level = COALESCE($40, p.risk_level),
        publisher_name = COALESCE($41, p.publisher_name),
        publisher_url = COALESCE($42, p.publisher_url),
        publisher_logo_url = COALESCE($43, p.publisher_logo_url),
        target_audience = COALESCE($44, p.target_audience),
        updated_at = now()
    FROM prev
    WHERE p.id = $1
    RETURNING p.*, prev.slug AS previous_slug
"#;

pub struct PgPostRepository {
    pool: Pool,
}

impl PgPostRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

fn post_from_row(row: &Row) -> Result<Post, RepoError> {
    let status: String = row.try_get("status")?;
    Ok(Post {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        title: row.try_get("title")?,
        slug: row.try_get("slug")?,
        content: row.try_get("content")?,
        image_url: row.try_get("image_url")?,
        image_alt: row.try_get("image_alt")?,
        views: row.try_get("views")?,
        tags: row.try_get("tags")?,
        status: status.parse().map_err(RepoError::Decode)?,
        category_id: row.try_get("category_id")?,

        seo_title: row.try_get("seo_title")?,
        seo_description: row.try_get("seo_description")?,
        canonical_url: row.try_get("canonical_url")?,
        primary_keyword: row.try_get("primary_keyword")?,
        og_image: row.try_get("og_image")?,
        no_index: row.try_get("no_index")?,

        author: row.try_get("author")?,
        author_credentials: row.try_get("author_credentials")?,
        author_profile_url: row.try_get("author_profile_url")?,
        author_experience_yrs: row.try_get("author_experience_yrs")?,
        date_published: row.try_get("date_published")?,
        date_modified: row.try_get("date_modified")?,
        reading_time: row.try_get("reading_time")?,

        reviewed_by: row.try_get("reviewed_by")?,
        reviewer_credentials: row.try_get("reviewer_credentials")?,
        medical_review_date: row.try_get("medical_review_date")?,

        main_entity: row.try_get("main_entity")?,
        medical_specialty: row.try_get("medical_specialty")?,
        medical_conditions: row.try_get("medical_conditions")?,
        symptoms: row.try_get("symptoms")?,
        treatments: row.try_get("treatments")?,
        medications: row.try_get("medications")?,

        last_medical_update: row.try_get("last_medical_update")?,
        content_version: row.try_get("content_version")?,

        intent: row.try_get("intent")?,
        editorial_policy_url: row.try_get("editorial_policy_url")?,
        medical_board_url: row.try_get("medical_board_url")?,
        has_disclaimer: row.try_get("has_disclaimer")?,
        risk_level: row.try_get("risk_level")?,

        publisher_name: row.try_get("publisher_name")?,
        publisher_url: row.try_get("publisher_url")?,
        publisher_logo_url: row.try_get("publisher_logo_url")?,

        citations: row.try_get("citations")?,
        target_audience: row.try_get("target_audience")?,

        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn relations_from_row(row: &Row) -> Result<PostWithRelations, RepoError> {
    let category = match (
        row.try_get::<_, Option<Uuid>>("category_ref_id")?,
        row.try_get::<_, Option<String>>("category_name")?,
    ) {
        (Some(id), Some(name)) => Some(CategoryRef { id, name }),
        _ => None,
    };

    let user = match row.try_get::<_, Option<Uuid>>("author_id")? {
        Some(id) => Some(PostAuthor {
            id,
            name: row.try_get("author_name")?,
            image: row.try_get("author_image")?,
            saved_posts: row
                .try_get::<_, Option<Vec<String>>>("author_saved_posts")?
                .unwrap_or_default(),
        }),
        None => None,
    };

    Ok(PostWithRelations {
        post: post_from_row(row)?,
        category,
        user,
    })
}

fn summary_from_row(row: &Row) -> Result<PostSummary, RepoError> {
    Ok(PostSummary {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        slug: row.try_get("slug")?,
        image_url: row.try_get("image_url")?,
    })
}

/// WHERE clause and its parameters for a listing query.
fn filter_clause(query: &PostQuery) -> (String, Vec<&(dyn ToSql + Sync)>) {
    let mut clauses: Vec<String> = Vec::new();
    let mut params: Vec<&(dyn ToSql + Sync)> = Vec::new();

    if query.published_only {
        clauses.push("p.status = 'published'".to_string());
    }
    match &query.filter {
        PostFilter::All => {}
        PostFilter::Category(id) => {
            params.push(id);
            clauses.push(format!("p.category_id = ${}", params.len()));
        }
        PostFilter::Tag(tag) => {
            params.push(tag);
            clauses.push(format!("${} = ANY(p.tags)", params.len()));
        }
    }

    if clauses.is_empty() {
        (String::new(), params)
    } else {
        (format!("WHERE {}", clauses.join(" AND ")), params)
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn create(&self, post: NewPost) -> Result<Post, RepoError> {
        let client = self.pool.get().await?;
        let id = Uuid::new_v4();
        let status = post.status.as_str();

        let row = client
            .query_one(
                INSERT_POST,
                &[
                    &id,
                    &post.user_id,
                    &post.title,
                    &post.slug,
                    &post.content,
                    &post.image_url,
                    &post.image_alt,
                    &post.tags,
                    &status,
                    &post.category_id,
                    &post.seo_title,
                    &post.seo_description,
                    &post.canonical_url,
                    &post.primary_keyword,
                    &post.og_image,
                    &post.no_index,
                    &post.author,
                    &post.author_credentials,
                    &post.author_profile_url,
                    &post.author_experience_yrs,
                    &post.date_published,
                    &post.date_modified,
                    &post.reading_time,
                    &post.reviewed_by,
                    &post.reviewer_credentials,
                    &post.medical_review_date,
                    &post.main_entity,
                    &post.medical_specialty,
                    &post.medical_conditions,
                    &post.symptoms,
                    &post.treatments,
                    &post.medications,
                    &post.last_medical_update,
                    &post.content_version,
                    &post.intent,
                    &post.editorial_policy_url,
                    &post.medical_board_url,
                    &post.has_disclaimer,
                    &post.risk_level,
                    &post.publisher_name,
                    &post.publisher_url,
                    &post.publisher_logo_url,
                    &post.citations,
                    &post.target_audience,
                ],
            )
            .await
            .map_err(|e| write_violation(e, SLUG_TAKEN, CATEGORY_MISSING))?;

        post_from_row(&row)
    }

    async fn update(&self, id: Uuid, patch: PostPatch) -> Result<Option<UpdatedPost>, RepoError> {
        let client = self.pool.get().await?;
        let status = patch.status.as_str();

        let row = client
            .query_opt(
                UPDATE_POST,
                &[
                    &id,
                    &patch.user_id,
                    &patch.title,
                    &patch.slug,
                    &patch.content,
                    &patch.image_url,
                    &patch.tags,
                    &status,
                    &patch.category_id,
                    &patch.has_disclaimer,
                    &patch.medical_conditions,
                    &patch.symptoms,
                    &patch.treatments,
                    &patch.medications,
                    &patch.citations,
                    &patch.image_alt,
                    &patch.seo_title,
                    &patch.seo_description,
                    &patch.canonical_url,
                    &patch.primary_keyword,
                    &patch.og_image,
                    &patch.no_index,
                    &patch.author,
                    &patch.author_credentials,
                    &patch.author_profile_url,
                    &patch.author_experience_yrs,
                    &patch.date_published,
                    &patch.date_modified,
                    &patch.reading_time,
                    &patch.reviewed_by,
                    &patch.reviewer_credentials,
                    &patch.medical_review_date,
                    &patch.main_entity,
                    &patch.medical_specialty,
                    &patch.last_medical_update,
                    &patch.content_version,
                    &patch.intent,
                    &patch.editorial_policy_url,
                    &patch.medical_board_url,
                    &patch.risk_level,
                    &patch.publisher_name,
                    &patch.publisher_url,
                    &patch.publisher_logo_url,
                    &patch.target_audience,
                ],
            )
            .await
            .map_err(|e| write_violation(e, SLUG_TAKEN, CATEGORY_MISSING))?;

        match row {
            Some(row) => Ok(Some(UpdatedPost {
                post: post_from_row(&row)?,
                previous_slug: row.try_get("previous_slug")?,
            })),
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt("DELETE FROM posts WHERE id = $1 RETURNING *", &[&id])
            .await?;
        row.as_ref().map(post_from_row).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt("SELECT * FROM posts WHERE id = $1", &[&id])
            .await?;
        row.as_ref().map(post_from_row).transpose()
    }

    async fn find_published_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<PostWithRelations>, RepoError> {
        let client = self.pool.get().await?;
        let sql = format!(
            "{} WHERE p.slug = $1 AND p.status = 'published'",
            SELECT_WITH_RELATIONS
        );
        let row = client.query_opt(sql.as_str(), &[&slug]).await?;
        row.as_ref().map(relations_from_row).transpose()
    }

    async fn list(&self, query: &PostQuery) -> Result<(Vec<PostWithRelations>, i64), RepoError> {
        let mut client = self.pool.get().await?;
        let (where_sql, filter_params) = filter_clause(query);

        let list_sql = format!(
            "{} {} ORDER BY p.updated_at DESC OFFSET ${} LIMIT ${}",
            SELECT_WITH_RELATIONS,
            where_sql,
            filter_params.len() + 1,
            filter_params.len() + 2
        );
        let count_sql = format!("SELECT COUNT(*) FROM posts p {}", where_sql);

        let mut list_params = filter_params.clone();
        list_params.push(&query.skip);
        list_params.push(&query.take);

        // Page and count come from the same snapshot.
        let tx = client.transaction().await?;
        let rows = tx.query(list_sql.as_str(), &list_params).await?;
        let total: i64 = tx.query_one(count_sql.as_str(), &filter_params).await?.try_get(0)?;
        tx.commit().await?;

        let posts = rows
            .iter()
            .map(relations_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((posts, total))
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<PostWithRelations>, RepoError> {
        let client = self.pool.get().await?;
        // LIMIT NULL means no limit.
        let sql = format!(
            "{} WHERE p.user_id = $1 ORDER BY p.updated_at DESC LIMIT $2",
            SELECT_WITH_RELATIONS
        );
        let rows = client.query(sql.as_str(), &[&user_id, &limit]).await?;
        rows.iter().map(relations_from_row).collect()
    }

    async fn increment_views(&self, id: Uuid) -> Result<Option<i32>, RepoError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "UPDATE posts SET views = views + 1 WHERE id = $1 RETURNING views",
                &[&id],
            )
            .await?;
        Ok(row.map(|r| r.try_get(0)).transpose()?)
    }

    async fn published_summaries(&self, limit: i64) -> Result<Vec<PostSummary>, RepoError> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                "SELECT id, title, slug, image_url FROM posts \
                 WHERE status = 'published' ORDER BY created_at DESC LIMIT $1",
                &[&limit],
            )
            .await?;
        rows.iter().map(summary_from_row).collect()
    }

    async fn published_tag_lists(&self) -> Result<Vec<Vec<String>>, RepoError> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                "SELECT tags FROM posts WHERE status = 'published' ORDER BY created_at ASC",
                &[],
            )
            .await?;
        Ok(rows
            .iter()
            .map(|r| r.try_get::<_, Vec<String>>(0))
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn search_published(&self, query: &str, take: i64) -> Result<Vec<PostSummary>, RepoError> {
        let client = self.pool.get().await?;
        let pattern = contains_pattern(query);
        let rows = client
            .query(
                "SELECT id, title, slug, image_url FROM posts \
                 WHERE status = 'published' \
                   AND (title ILIKE $1 OR content ILIKE $1 OR $2 = ANY(tags)) \
                 ORDER BY updated_at DESC LIMIT $3",
                &[&pattern, &query, &take],
            )
            .await?;
        rows.iter().map(summary_from_row).collect()
    }

    async fn sitemap_entries(&self) -> Result<Vec<SitemapPost>, RepoError> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                "SELECT slug, updated_at FROM posts WHERE status = 'published' \
                 ORDER BY created_at DESC",
                &[],
            )
            .await?;
        Ok(rows
            .iter()
            .map(|r| {
                Ok::<_, tokio_postgres::Error>(SitemapPost {
                    slug: r.try_get("slug")?,
                    updated_at: r.try_get("updated_at")?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?)
    }
}
