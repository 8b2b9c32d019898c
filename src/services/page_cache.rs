// src/services/page_cache.rs
//
// In-process cache of rendered public pages, keyed by page path
// (`/?page=2`, `/blog/posts/{slug}`, `/blog/tag/{name}?page=1`...).

use std::time::Duration;

use log::debug;
use moka::future::Cache;
use serde_json::Value;

pub struct PageCache {
    pages: Cache<String, Value>,
}

impl PageCache {
    /// Pages expire after `ttl`; at most `max_pages` are kept.
    pub fn new(ttl: Duration, max_pages: u64) -> Self {
        Self {
            pages: Cache::builder().max_capacity(max_pages).time_to_live(ttl).build(),
        }
    }

    pub async fn get(&self, key: &str) -> Option<Value> {
        self.pages.get(key).await
    }

    pub async fn put(&self, key: impl Into<String>, body: Value) {
        self.pages.insert(key.into(), body).await;
    }

    /// `/blog/tag/*` drops everything under `/blog/tag/`; a plain path drops
    /// the page itself and every `?query` variant of it.
    pub async fn revalidate_path(&self, path: &str) -> usize {
        let stale: Vec<String> = match path.strip_suffix('*') {
            Some(prefix) => self
                .pages
                .iter()
                .filter(|(key, _)| key.starts_with(prefix))
                .map(|(key, _)| key.to_string())
                .collect(),
            None => {
                let with_query = format!("{}?", path);
                self.pages
                    .iter()
                    .filter(|(key, _)| key.as_str() == path || key.starts_with(&with_query))
                    .map(|(key, _)| key.to_string())
                    .collect()
            }
        };
        for key in &stale {
            self.pages.invalidate(key.as_str()).await;
        }
        debug!("revalidated {} ({} cached pages dropped)", path, stale.len());
        stale.len()
    }

    pub async fn revalidate_paths(&self, paths: &[String]) {
        for path in paths {
            self.revalidate_path(path).await;
        }
    }

    #[cfg(test)]
    pub async fn len(&self) -> u64 {
        self.pages.run_pending_tasks().await;
        self.pages.entry_count()
    }
}

pub fn home_key(page: i64) -> String {
    format!("/?page={}", page)
}

pub fn post_key(slug: &str) -> String {
    format!("/blog/posts/{}", slug)
}

pub fn category_key(id: &str, page: i64) -> String {
    format!("/blog/category/{}?page={}", id, page)
}

pub fn tag_key(name: &str, page: i64) -> String {
    format!("/blog/tag/{}?page={}", name, page)
}

pub const CATEGORY_INDEX_KEY: &str = "/blog/category/";
pub const TAG_INDEX_KEY: &str = "/blog/tag/";
pub const SITEMAP_KEY: &str = "/sitemap.xml";

/// Pages that show post data and go stale when a post changes.
pub fn paths_for_post_change(slugs: &[&str]) -> Vec<String> {
    let mut paths: Vec<String> = slugs.iter().map(|s| post_key(s)).collect();
    paths.extend(
        ["/blog", "/", "/blog/category/*", "/blog/tag/*", SITEMAP_KEY]
            .iter()
            .map(|p| p.to_string()),
    );
    paths
}

/// Category names are embedded in listings and post pages too.
pub fn paths_for_category_change() -> Vec<String> {
    ["/", "/blog", "/blog/posts/*", "/blog/category/*", "/blog/tag/*", SITEMAP_KEY]
        .iter()
        .map(|p| p.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cache() -> PageCache {
        PageCache::new(Duration::from_secs(3600), 1_000)
    }

    #[actix_web::test]
    async fn stores_and_returns_pages() {
        let cache = cache();
        cache.put(home_key(1), json!({"posts": []})).await;
        assert_eq!(cache.get("/?page=1").await, Some(json!({"posts": []})));
        assert_eq!(cache.get("/?page=2").await, None);
    }

    #[actix_web::test]
    async fn expired_pages_are_misses() {
        let cache = PageCache::new(Duration::from_millis(50), 1_000);
        cache.put(post_key("a"), json!(1)).await;
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(cache.get("/blog/posts/a").await, None);
    }

    #[actix_web::test]
    async fn size_is_bounded() {
        let cache = PageCache::new(Duration::from_secs(3600), 50);
        for n in 0..2_000 {
            cache.put(tag_key(&format!("junk{}", n), n), json!(n)).await;
        }
        assert!(cache.len().await <= 50);
    }

    #[actix_web::test]
    async fn exact_path_drops_query_variants_only() {
        let cache = cache();
        cache.put(home_key(1), json!(1)).await;
        cache.put(home_key(2), json!(2)).await;
        cache.put(post_key("flu"), json!(3)).await;

        assert_eq!(cache.revalidate_path("/").await, 2);
        assert_eq!(cache.get(&home_key(1)).await, None);
        assert_eq!(cache.get(&home_key(2)).await, None);
        assert!(cache.get("/blog/posts/flu").await.is_some());
    }

    #[actix_web::test]
    async fn wildcard_drops_prefix() {
        let cache = cache();
        cache.put(tag_key("sleep", 1), json!(1)).await;
        cache.put(tag_key("sleep", 2), json!(1)).await;
        cache.put(TAG_INDEX_KEY, json!(1)).await;
        cache.put(category_key("c1", 1), json!(1)).await;

        assert_eq!(cache.revalidate_path("/blog/tag/*").await, 3);
        assert!(cache.get(TAG_INDEX_KEY).await.is_none());
        assert!(cache.get(&category_key("c1", 1)).await.is_some());
    }

    #[actix_web::test]
    async fn post_change_clears_dependent_pages() {
        let cache = cache();
        cache.put(post_key("old-slug"), json!(1)).await;
        cache.put(post_key("other"), json!(1)).await;
        cache.put(home_key(1), json!(1)).await;
        cache.put(CATEGORY_INDEX_KEY, json!(1)).await;
        cache.put(SITEMAP_KEY, json!(1)).await;

        cache.revalidate_paths(&paths_for_post_change(&["old-slug"])).await;
        assert!(cache.get(&post_key("old-slug")).await.is_none());
        assert!(cache.get(&home_key(1)).await.is_none());
        assert!(cache.get(CATEGORY_INDEX_KEY).await.is_none());
        assert!(cache.get(SITEMAP_KEY).await.is_none());
        assert!(cache.get(&post_key("other")).await.is_some());
    }

    #[actix_web::test]
    async fn category_change_clears_pages_showing_category_names() {
        let cache = cache();
        cache.put(home_key(1), json!(1)).await;
        cache.put(post_key("flu"), json!(1)).await;
        cache.put(category_key("c1", 1), json!(1)).await;
        cache.put(tag_key("sleep", 1), json!(1)).await;

        cache.revalidate_paths(&paths_for_category_change()).await;
        assert_eq!(cache.len().await, 0);
    }
}
