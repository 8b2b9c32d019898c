// src/main.rs
mod config;
mod dtos;
mod error;
mod handlers;
mod middleware;
mod models;
mod repositories;
mod services;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware::Logger, web};
use log::{error, info};
use reqwest::Client;

use crate::config::AppConfig;
use crate::repositories::category_repository::PgCategoryRepository;
use crate::repositories::post_repository::PgPostRepository;
use crate::repositories::user_repository::PgUserRepository;
use crate::repositories::{CategoryRepository, PostRepository, UserRepository, run_migrations};
use crate::services::auth_services::AuthService;
use crate::services::page_cache::PageCache;

fn mask_key(k: &str) -> String {
    if k.len() <= 8 {
        "[REDACTED]".to_string()
    } else {
        format!("{}***{}", &k[..4], &k[k.len() - 4..])
    }
}

pub struct AppState {
    pub posts: Arc<dyn PostRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub users: Arc<dyn UserRepository>,
    pub page_cache: Arc<PageCache>,
    pub auth: AuthService,
    pub config: AppConfig,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    info!("Auth URL: {}", config.auth_url);
    info!("Auth anon key: {}", mask_key(&config.auth_anon_key));
    info!("JWT secret: {}", mask_key(&config.jwt_secret));
    info!("Admin account: {}", config.admin_email);
    info!("Site URL: {}", config.site_url);

    let pg_pool = match config::get_pg_pool() {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to create PG pool: {:#}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run_migrations(&pg_pool).await {
        error!("Failed to apply database schema: {}", e);
        std::process::exit(1);
    }

    let http_client = match Client::builder().user_agent("healthblog-be/0.1").build() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to build http client: {}", e);
            std::process::exit(1);
        }
    };

    let auth = AuthService::new(http_client, &config.auth_url, &config.auth_anon_key);
    let bind_address = format!("0.0.0.0:{}", config.port);
    let allowed_origins = config.allowed_origins.clone();

    let state = web::Data::new(AppState {
        posts: Arc::new(PgPostRepository::new(pg_pool.clone())),
        categories: Arc::new(PgCategoryRepository::new(pg_pool.clone())),
        users: Arc::new(PgUserRepository::new(pg_pool)),
        page_cache: Arc::new(PageCache::new(
            config.page_cache_ttl,
            config.page_cache_max_entries,
        )),
        auth,
        config,
    });

    info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec!["authorization", "content-type", "accept", "x-requested-with"])
            .supports_credentials()
            .max_age(3600);

        for origin in &allowed_origins {
            cors = cors.allowed_origin(origin);
        }

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(handlers::configure)
    })
    .bind(&bind_address)?
    .run()
    .await
}
