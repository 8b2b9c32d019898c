// src/services/blog_services.rs

use std::collections::HashSet;

use crate::dtos::post_dtos::{PaginatedPosts, TagOut};
use crate::services::pagination::total_pages;

/// Distinct tags in first-seen order.
pub fn unique_tags(tag_lists: Vec<Vec<String>>) -> Vec<TagOut> {
    let mut seen = HashSet::new();
    tag_lists
        .into_iter()
        .flatten()
        .filter(|t| seen.insert(t.clone()))
        .map(|name| TagOut { name })
        .collect()
}

pub fn page_of<T>(posts: Vec<T>, total: i64, page: i64) -> PaginatedPosts<T> {
    PaginatedPosts {
        posts,
        total_pages: total_pages(total),
        current_page: page,
    }
}
