// src/services/search_services.rs

use log::error;

use crate::dtos::search_dtos::{SearchResponse, SearchResult};
use crate::repositories::{CategoryRepository, PostRepository};

pub const MIN_QUERY_LEN: usize = 2;
pub const MAX_RESULTS_PER_KIND: i64 = 10;

/// Published posts then categories matching `query`. Failures are logged and
/// produce an empty result set.
pub async fn search_content(
    posts: &dyn PostRepository,
    categories: &dyn CategoryRepository,
    query: &str,
) -> SearchResponse {
    let query = query.trim();
    if query.chars().count() < MIN_QUERY_LEN {
        return SearchResponse::default();
    }

    let found = futures::try_join!(
        posts.search_published(query, MAX_RESULTS_PER_KIND),
        categories.search(query, MAX_RESULTS_PER_KIND),
    );

    let (post_hits, category_hits) = match found {
        Ok(hits) => hits,
        Err(e) => {
            error!("search for '{}' failed: {}", query, e);
            return SearchResponse::default();
        }
    };

    let mut results: Vec<SearchResult> = post_hits
        .into_iter()
        .map(|p| SearchResult::Post {
            id: p.id,
            title: p.title,
            url: format!("/blog/posts/{}", p.slug),
            image_url: p.image_url,
        })
        .collect();
    results.extend(category_hits.into_iter().map(|c| SearchResult::Category {
        url: format!("/blog/category/{}", c.id),
        id: c.id,
        name: c.name,
    }));

    SearchResponse { results }
}
