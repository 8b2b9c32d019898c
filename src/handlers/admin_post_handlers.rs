// src/handlers/admin_post_handlers.rs - editor endpoints, admin only

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::Utc;
use log::{info, warn};
use uuid::Uuid;

use crate::AppState;
use crate::dtos::ApiResponse;
use crate::dtos::post_dtos::{
    PageQuery, PaginatedPosts, PostFormIn, PostOut, PostWithCategoryOut, UpdatedPostOut,
};
use crate::error::{AppError, AppResult};
use crate::middleware::auth_extractor::{AdminUser, AuthenticatedUser};
use crate::models::post::{PostFilter, PostQuery};
use crate::models::user::NewUser;
use crate::services::blog_services::page_of;
use crate::services::page_cache::paths_for_post_change;
use crate::services::pagination::{PAGE_SIZE, parse_page, skip_for};
use crate::services::post_normalizer::{normalize_for_create, normalize_for_update, prepare, validate};

const RECENT_POSTS: i64 = 10;

async fn admin_page(
    state: &AppState,
    admin: &AuthenticatedUser,
    filter: PostFilter,
    page: i64,
) -> AppResult<PaginatedPosts<PostOut>> {
    let query = PostQuery {
        filter,
        published_only: false,
        skip: skip_for(page),
        take: PAGE_SIZE,
    };
    let (rows, total) = state.posts.list(&query).await?;
    let saved = state.users.saved_posts(admin.user_id).await?;
    let posts = rows.into_iter().map(|row| PostOut::new(row, &saved)).collect();
    Ok(page_of(posts, total, page))
}

/// Validated, slug-filled form or a 400 listing every problem.
fn checked_form(form: PostFormIn) -> AppResult<PostFormIn> {
    let form = prepare(form);
    validate(&form).map_err(|problems| {
        warn!("rejected post form: {:?}", problems);
        AppError::Validation(problems.join("; "))
    })?;
    Ok(form)
}

/// Keeps the local users table in step with the session claims.
async fn sync_author(state: &AppState, admin: &AuthenticatedUser) -> AppResult<()> {
    state
        .users
        .upsert(NewUser {
            id: admin.user_id,
            email: admin.email.clone().unwrap_or_default(),
            name: admin.name.clone(),
            image: admin.image.clone(),
        })
        .await?;
    Ok(())
}

/// GET /admin/posts?page=
#[get("/posts")]
pub async fn get_posts(
    state: web::Data<AppState>,
    AdminUser(admin): AdminUser,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = parse_page(query.page.as_deref());
    let data = admin_page(&state, &admin, PostFilter::All, page).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Posts retrieved successfully", data)))
}

/// GET /admin/posts/mine
#[get("/posts/mine")]
pub async fn get_all_posts(
    state: web::Data<AppState>,
    AdminUser(admin): AdminUser,
) -> AppResult<HttpResponse> {
    let rows = state.posts.list_by_user(admin.user_id, None).await?;
    let data: Vec<PostWithCategoryOut> = rows.into_iter().map(PostWithCategoryOut::from).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::success("Posts retrieved successfully", data)))
}

/// GET /admin/posts/recent
#[get("/posts/recent")]
pub async fn get_posts_by_user(
    state: web::Data<AppState>,
    AdminUser(admin): AdminUser,
) -> AppResult<HttpResponse> {
    let rows = state.posts.list_by_user(admin.user_id, Some(RECENT_POSTS)).await?;
    let data: Vec<PostWithCategoryOut> = rows.into_iter().map(PostWithCategoryOut::from).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::success("Posts retrieved successfully", data)))
}

/// GET /admin/posts/category/{id}?page=
#[get("/posts/category/{id}")]
pub async fn get_posts_by_category(
    state: web::Data<AppState>,
    AdminUser(admin): AdminUser,
    path: web::Path<Uuid>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = parse_page(query.page.as_deref());
    let data = admin_page(&state, &admin, PostFilter::Category(path.into_inner()), page).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Posts retrieved successfully", data)))
}

/// GET /admin/posts/tag/{name}?page=
#[get("/posts/tag/{name}")]
pub async fn get_posts_by_tag(
    state: web::Data<AppState>,
    AdminUser(admin): AdminUser,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = parse_page(query.page.as_deref());
    let data = admin_page(&state, &admin, PostFilter::Tag(path.into_inner()), page).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Posts retrieved successfully", data)))
}

/// GET /admin/posts/{id}
#[get("/posts/{id}")]
pub async fn get_unique_post(
    state: web::Data<AppState>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .find_by_id(path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".into()))?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Post retrieved successfully", post)))
}

/// POST /admin/posts
#[post("/posts")]
pub async fn create_post(
    state: web::Data<AppState>,
    AdminUser(admin): AdminUser,
    body: web::Json<PostFormIn>,
) -> AppResult<HttpResponse> {
    let form = checked_form(body.into_inner())?;
    sync_author(&state, &admin).await?;

    let new_post = normalize_for_create(form, admin.user_id, &state.config.site_url, Utc::now());
    let post = state.posts.create(new_post).await?;
    info!("admin {} created post {} ({})", admin.user_id, post.id, post.slug);

    state
        .page_cache
        .revalidate_paths(&paths_for_post_change(&[&post.slug]))
        .await;
    Ok(HttpResponse::Created().json(ApiResponse::success("Post created successfully", post)))
}

/// PUT /admin/posts/{id}
#[put("/posts/{id}")]
pub async fn update_post(
    state: web::Data<AppState>,
    AdminUser(admin): AdminUser,
    path: web::Path<Uuid>,
    body: web::Json<PostFormIn>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let form = checked_form(body.into_inner())?;
    sync_author(&state, &admin).await?;

    let patch = normalize_for_update(form, admin.user_id);
    let updated = state
        .posts
        .update(id, patch)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".into()))?;
    info!("admin {} updated post {}", admin.user_id, id);

    state
        .page_cache
        .revalidate_paths(&paths_for_post_change(&[&updated.post.slug, &updated.previous_slug]))
        .await;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Post updated successfully",
        UpdatedPostOut {
            id: updated.post.id,
            slug: updated.post.slug,
        },
    )))
}

/// DELETE /admin/posts/{id}
#[delete("/posts/{id}")]
pub async fn remove_post(
    state: web::Data<AppState>,
    AdminUser(admin): AdminUser,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let post = state
        .posts
        .delete(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".into()))?;
    info!("admin {} deleted post {}", admin.user_id, id);

    state
        .page_cache
        .revalidate_paths(&paths_for_post_change(&[&post.slug]))
        .await;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Post deleted successfully", post)))
}
