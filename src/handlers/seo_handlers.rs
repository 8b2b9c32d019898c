// src/handlers/seo_handlers.rs - robots.txt and sitemap.xml

use actix_web::{HttpResponse, get, web};
use chrono::Utc;
use serde_json::Value;

use crate::AppState;
use crate::dtos::category_dtos::CategoryOut;
use crate::error::{AppError, AppResult};
use crate::handlers::cached_page;
use crate::services::blog_services::unique_tags;
use crate::services::page_cache::SITEMAP_KEY;
use crate::services::seo_services::{robots_txt, sitemap_xml};

/// GET /robots.txt
#[get("/robots.txt")]
pub async fn robots(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(mime::TEXT_PLAIN_UTF_8)
        .body(robots_txt(&state.config.site_url))
}

async fn build_sitemap(state: &AppState) -> AppResult<String> {
    let posts = state.posts.sitemap_entries().await?;
    let categories: Vec<CategoryOut> = state
        .categories
        .list()
        .await?
        .into_iter()
        .map(|c| CategoryOut { id: c.id, name: c.name })
        .collect();
    let tags = unique_tags(state.posts.published_tag_lists().await?);
    Ok(sitemap_xml(&state.config.site_url, &posts, &categories, &tags, Utc::now()))
}

/// GET /sitemap.xml
#[get("/sitemap.xml")]
pub async fn sitemap(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let page = cached_page(&state.page_cache, SITEMAP_KEY.to_string(), build_sitemap(&state)).await?;
    let Value::String(xml) = page else {
        return Err(AppError::Internal("cached sitemap is not text".into()));
    };
    Ok(HttpResponse::Ok().content_type(mime::TEXT_XML).body(xml))
}
