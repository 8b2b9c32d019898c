// src/repositories/user_repository.rs

use async_trait::async_trait;
use deadpool_postgres::Pool;
use uuid::Uuid;

use super::{RepoError, UserRepository, unique_violation};
use crate::models::user::{NewUser, User};

pub struct PgUserRepository {
    pool: Pool,
}

impl PgUserRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn upsert(&self, user: NewUser) -> Result<User, RepoError> {
        let client = self.pool.get().await?;
        let row = client
            .query_one(
                "INSERT INTO users (id, email, name, image) VALUES ($1, $2, $3, $4) \
                 ON CONFLICT (id) DO UPDATE SET \
                     email = EXCLUDED.email, \
                     name = COALESCE(EXCLUDED.name, users.name), \
                     image = COALESCE(EXCLUDED.image, users.image), \
                     updated_at = now() \
                 RETURNING id, email, name, image, saved_posts",
                &[&user.id, &user.email, &user.name, &user.image],
            )
            .await
            .map_err(|e| unique_violation(e, "Email is linked to another account"))?;

        Ok(User {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            name: row.try_get("name")?,
            image: row.try_get("image")?,
            saved_posts: row.try_get("saved_posts")?,
        })
    }

    async fn saved_posts(&self, id: Uuid) -> Result<Vec<String>, RepoError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt("SELECT saved_posts FROM users WHERE id = $1", &[&id])
            .await?;
        match row {
            Some(row) => Ok(row.try_get("saved_posts")?),
            None => Ok(Vec::new()),
        }
    }
}
