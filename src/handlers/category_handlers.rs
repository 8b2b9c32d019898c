// src/handlers/category_handlers.rs - public category pages and admin CRUD

use actix_web::{HttpResponse, delete, get, post, put, web};
use log::info;
use uuid::Uuid;

use crate::AppState;
use crate::dtos::ApiResponse;
use crate::dtos::category_dtos::{CategoryIn, CategoryOut};
use crate::dtos::post_dtos::PageQuery;
use crate::error::{AppError, AppResult};
use crate::handlers::cached_page;
use crate::handlers::post_handlers::published_page;
use crate::middleware::auth_extractor::AdminUser;
use crate::models::category::{Category, clean_category_name};
use crate::models::post::PostFilter;
use crate::services::page_cache::{CATEGORY_INDEX_KEY, category_key, paths_for_category_change};
use crate::services::pagination::parse_page;

fn to_out(c: Category) -> CategoryOut {
    CategoryOut { id: c.id, name: c.name }
}

async fn category_list(state: &AppState) -> AppResult<Vec<CategoryOut>> {
    Ok(state.categories.list().await?.into_iter().map(to_out).collect())
}

/// GET /api/categories
#[get("/categories")]
pub async fn all_categories(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let data = cached_page(&state.page_cache, CATEGORY_INDEX_KEY.to_string(), category_list(&state)).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Categories retrieved successfully", data)))
}

/// GET /api/categories/{id}/posts?page=
#[get("/categories/{id}/posts")]
pub async fn published_by_category(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let page = parse_page(query.page.as_deref());
    let data = cached_page(
        &state.page_cache,
        category_key(&id.to_string(), page),
        published_page(&state, PostFilter::Category(id), page),
    )
    .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Posts retrieved successfully", data)))
}

/// GET /admin/categories
#[get("/categories")]
pub async fn get_categories(state: web::Data<AppState>, _admin: AdminUser) -> AppResult<HttpResponse> {
    let data = category_list(&state).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Categories retrieved successfully", data)))
}

/// POST /admin/categories
#[post("/categories")]
pub async fn create_category(
    state: web::Data<AppState>,
    admin: AdminUser,
    body: web::Json<CategoryIn>,
) -> AppResult<HttpResponse> {
    let name = clean_category_name(&body.name).map_err(AppError::Validation)?;
    let category = state.categories.create(&name).await?;
    info!("admin {} created category {}", admin.0.user_id, category.id);

    state.page_cache.revalidate_paths(&paths_for_category_change()).await;
    Ok(HttpResponse::Created().json(ApiResponse::success("Category created", to_out(category))))
}

/// PUT /admin/categories/{id}
#[put("/categories/{id}")]
pub async fn update_category(
    state: web::Data<AppState>,
    admin: AdminUser,
    path: web::Path<Uuid>,
    body: web::Json<CategoryIn>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let name = clean_category_name(&body.name).map_err(AppError::Validation)?;
    let category = state
        .categories
        .update(id, &name)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".into()))?;
    info!("admin {} renamed category {}", admin.0.user_id, id);

    state.page_cache.revalidate_paths(&paths_for_category_change()).await;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Category updated", to_out(category))))
}

/// DELETE /admin/categories/{id}
#[delete("/categories/{id}")]
pub async fn delete_category(
    state: web::Data<AppState>,
    admin: AdminUser,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    if !state.categories.delete(id).await? {
        return Err(AppError::NotFound("Category not found".into()));
    }
    info!("admin {} deleted category {}", admin.0.user_id, id);

    state.page_cache.revalidate_paths(&paths_for_category_change()).await;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Category deleted", id)))
}
