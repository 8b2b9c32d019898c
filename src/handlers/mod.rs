pub mod admin_post_handlers;
pub mod auth_handlers;
pub mod category_handlers;
pub mod post_handlers;
pub mod search_handlers;
pub mod seo_handlers;

use std::future::Future;

use actix_web::web;
use log::debug;
use serde::Serialize;
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::services::page_cache::PageCache;

/// Registers every route. Shared by `main` and the handler tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(format!("Invalid request body: {}", err)).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(format!("Invalid query string: {}", err)).into()
    }))
    .service(
        web::scope("/auth")
            .service(auth_handlers::sign_up)
            .service(auth_handlers::sign_in)
            .service(auth_handlers::session),
    )
    .service(
        web::scope("/api")
            .service(post_handlers::list_published)
            .service(post_handlers::public_posts_for_ssg)
            .service(post_handlers::post_by_slug)
            .service(post_handlers::update_post_views)
            .service(category_handlers::all_categories)
            .service(category_handlers::published_by_category)
            .service(post_handlers::all_tags)
            .service(post_handlers::published_by_tag)
            .service(search_handlers::search),
    )
    .service(
        web::scope("/admin")
            .service(admin_post_handlers::get_posts)
            .service(admin_post_handlers::get_all_posts)
            .service(admin_post_handlers::get_posts_by_user)
            .service(admin_post_handlers::get_posts_by_category)
            .service(admin_post_handlers::get_posts_by_tag)
            .service(admin_post_handlers::get_unique_post)
            .service(admin_post_handlers::create_post)
            .service(admin_post_handlers::update_post)
            .service(admin_post_handlers::remove_post)
            .service(category_handlers::get_categories)
            .service(category_handlers::create_category)
            .service(category_handlers::update_category)
            .service(category_handlers::delete_category),
    )
    .service(seo_handlers::robots)
    .service(seo_handlers::sitemap);
}

/// Returns the cached page for `key`, or runs `load` and caches its output.
pub(crate) async fn cached_page<T, F>(cache: &PageCache, key: String, load: F) -> AppResult<Value>
where
    T: Serialize,
    F: Future<Output = AppResult<T>>,
{
    if let Some(page) = cache.get(&key).await {
        debug!("page cache hit: {}", key);
        return Ok(page);
    }
    let page = serde_json::to_value(load.await?)
        .map_err(|e| AppError::Internal(format!("serialize {}: {}", key, e)))?;
    cache.put(key, page.clone()).await;
    Ok(page)
}
