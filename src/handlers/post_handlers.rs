// src/handlers/post_handlers.rs - public blog pages, no auth required

use actix_web::{HttpResponse, get, post, web};
use uuid::Uuid;

use crate::AppState;
use crate::dtos::ApiResponse;
use crate::dtos::post_dtos::{LimitQuery, PageQuery, PaginatedPosts, PublicPostOut, ViewOut};
use crate::error::{AppError, AppResult};
use crate::handlers::cached_page;
use crate::models::post::{PostFilter, PostQuery};
use crate::services::blog_services::{page_of, unique_tags};
use crate::services::page_cache::{TAG_INDEX_KEY, home_key, post_key, tag_key};
use crate::services::pagination::{PAGE_SIZE, parse_page, skip_for};

const DEFAULT_STATIC_LIMIT: i64 = 100;

/// One page of published posts for a public listing.
pub(crate) async fn published_page(
    state: &AppState,
    filter: PostFilter,
    page: i64,
) -> AppResult<PaginatedPosts<PublicPostOut>> {
    let query = PostQuery {
        filter,
        published_only: true,
        skip: skip_for(page),
        take: PAGE_SIZE,
    };
    let (rows, total) = state.posts.list(&query).await?;
    let posts = rows.into_iter().map(PublicPostOut::from).collect();
    Ok(page_of(posts, total, page))
}

/// GET /api/posts?page=
#[get("/posts")]
pub async fn list_published(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = parse_page(query.page.as_deref());
    let data = cached_page(
        &state.page_cache,
        home_key(page),
        published_page(&state, PostFilter::All, page),
    )
    .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Posts retrieved successfully", data)))
}

/// GET /api/posts/static?limit=
#[get("/posts/static")]
pub async fn public_posts_for_ssg(
    state: web::Data<AppState>,
    query: web::Query<LimitQuery>,
) -> AppResult<HttpResponse> {
    let limit = query.limit.unwrap_or(DEFAULT_STATIC_LIMIT).clamp(1, DEFAULT_STATIC_LIMIT);
    let posts = state.posts.published_summaries(limit).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Posts retrieved successfully", posts)))
}

/// GET /api/posts/slug/{slug}
#[get("/posts/slug/{slug}")]
pub async fn post_by_slug(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();
    let load = async {
        state
            .posts
            .find_published_by_slug(&slug)
            .await?
            .map(PublicPostOut::from)
            .ok_or_else(|| AppError::NotFound("Post not found".into()))
    };
    let data = cached_page(&state.page_cache, post_key(&slug), load).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Post retrieved successfully", data)))
}

/// POST /api/posts/{id}/view
#[post("/posts/{id}/view")]
pub async fn update_post_views(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    match state.posts.increment_views(path.into_inner()).await? {
        Some(_) => Ok(HttpResponse::Ok().json(ViewOut { ok: true })),
        None => Err(AppError::NotFound("Post not found".into())),
    }
}

/// GET /api/tags
#[get("/tags")]
pub async fn all_tags(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let load = async { Ok::<_, AppError>(unique_tags(state.posts.published_tag_lists().await?)) };
    let data = cached_page(&state.page_cache, TAG_INDEX_KEY.to_string(), load).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Tags retrieved successfully", data)))
}

/// GET /api/tags/{name}/posts?page=
#[get("/tags/{name}/posts")]
pub async fn published_by_tag(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let tag = path.into_inner();
    let page = parse_page(query.page.as_deref());
    let data = cached_page(
        &state.page_cache,
        tag_key(&tag, page),
        published_page(&state, PostFilter::Tag(tag), page),
    )
    .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Posts retrieved successfully", data)))
}
