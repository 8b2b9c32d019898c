use actix_web::{HttpResponse, get, web};

use crate::AppState;
use crate::dtos::search_dtos::SearchQuery;
use crate::services::search_services::search_content;

/// GET /api/search?q=
#[get("/search")]
pub async fn search(state: web::Data<AppState>, query: web::Query<SearchQuery>) -> HttpResponse {
    let results = search_content(state.posts.as_ref(), state.categories.as_ref(), &query.q).await;
    HttpResponse::Ok().json(results)
}
