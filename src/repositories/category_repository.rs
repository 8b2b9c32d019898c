// src/repositories/category_repository.rs

use async_trait::async_trait;
use deadpool_postgres::Pool;
use tokio_postgres::Row;
use uuid::Uuid;

use super::{CategoryRepository, RepoError, contains_pattern, unique_violation};
use crate::models::category::Category;

const NAME_TAKEN: &str = "A category with this name already exists";

pub struct PgCategoryRepository {
    pool: Pool,
}

impl PgCategoryRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

fn category_from_row(row: &Row) -> Result<Category, RepoError> {
    Ok(Category {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn list(&self) -> Result<Vec<Category>, RepoError> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                "SELECT id, name, created_at, updated_at FROM categories ORDER BY name ASC",
                &[],
            )
            .await?;
        rows.iter().map(category_from_row).collect()
    }

    async fn create(&self, name: &str) -> Result<Category, RepoError> {
        let client = self.pool.get().await?;
        let row = client
            .query_one(
                "INSERT INTO categories (id, name) VALUES ($1, $2) \
                 RETURNING id, name, created_at, updated_at",
                &[&Uuid::new_v4(), &name],
            )
            .await
            .map_err(|e| unique_violation(e, NAME_TAKEN))?;
        category_from_row(&row)
    }

    async fn update(&self, id: Uuid, name: &str) -> Result<Option<Category>, RepoError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "UPDATE categories SET name = $2, updated_at = now() WHERE id = $1 \
                 RETURNING id, name, created_at, updated_at",
                &[&id, &name],
            )
            .await
            .map_err(|e| unique_violation(e, NAME_TAKEN))?;
        row.as_ref().map(category_from_row).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        let client = self.pool.get().await?;
        // posts.category_id is ON DELETE SET NULL
        let affected = client
            .execute("DELETE FROM categories WHERE id = $1", &[&id])
            .await?;
        Ok(affected == 1)
    }

    async fn search(&self, query: &str, take: i64) -> Result<Vec<Category>, RepoError> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                "SELECT id, name, created_at, updated_at FROM categories \
                 WHERE name ILIKE $1 ORDER BY updated_at DESC LIMIT $2",
                &[&contains_pattern(query), &take],
            )
            .await?;
        rows.iter().map(category_from_row).collect()
    }
}
