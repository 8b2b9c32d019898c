use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use deadpool_postgres::{Config, Pool, PoolConfig, Runtime};
use tokio_postgres::NoTls;

pub const DEFAULT_SITE_URL: &str = "https://nextblog-blogging.vercel.app";
const DEFAULT_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";
const DEFAULT_CACHE_TTL_SECS: u64 = 3600;
const DEFAULT_CACHE_MAX_ENTRIES: u64 = 10_000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub admin_email: String,
    pub auth_url: String,
    pub auth_anon_key: String,
    pub jwt_secret: String,
    pub site_url: String,
    pub page_cache_ttl: Duration,
    pub page_cache_max_entries: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let port = match env::var("PORT") {
            Ok(p) => p.trim().parse().context("PORT must be a port number")?,
            Err(_) => 8080,
        };
        let page_cache_ttl = match env::var("PAGE_CACHE_TTL_SECS") {
            Ok(s) => s.trim().parse().context("PAGE_CACHE_TTL_SECS must be a number of seconds")?,
            Err(_) => DEFAULT_CACHE_TTL_SECS,
        };
        let page_cache_max_entries = match env::var("PAGE_CACHE_MAX_ENTRIES") {
            Ok(s) => s.trim().parse().context("PAGE_CACHE_MAX_ENTRIES must be a number")?,
            Err(_) => DEFAULT_CACHE_MAX_ENTRIES,
        };
        let origins = env::var("ALLOWED_ORIGINS").unwrap_or_else(|_| DEFAULT_ORIGINS.into());

        Ok(Self {
            port,
            allowed_origins: split_origins(&origins),
            admin_email: env::var("ADMIN_EMAIL").context("ADMIN_EMAIL not set")?,
            auth_url: env::var("AUTH_URL").context("AUTH_URL not set")?,
            auth_anon_key: env::var("AUTH_ANON_KEY").unwrap_or_default(),
            jwt_secret: env::var("AUTH_JWT_SECRET").context("AUTH_JWT_SECRET not set")?,
            site_url: env::var("SITE_URL")
                .map(|s| s.trim().trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_SITE_URL.to_string()),
            page_cache_ttl: Duration::from_secs(page_cache_ttl),
            page_cache_max_entries,
        })
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn get_pg_pool() -> Result<Pool> {
    let mut cfg = Config::new();
    cfg.host = Some(env::var("PG_HOST").context("PG_HOST not set")?);
    cfg.user = Some(env::var("PG_USER").context("PG_USER not set")?);
    cfg.password = env::var("PG_PASS").ok();
    cfg.dbname = Some(env::var("PG_DB").context("PG_DB not set")?);
    cfg.port = match env::var("PG_PORT") {
        Ok(p) => Some(p.trim().parse().context("PG_PORT must be a port number")?),
        Err(_) => Some(5432),
    };

    let pool = cfg.pool.get_or_insert_with(PoolConfig::default);
    pool.max_size = 16;

    cfg.create_pool(Some(Runtime::Tokio1), NoTls)
        .context("failed to create postgres pool")
}
