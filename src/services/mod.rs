pub mod auth_services;
pub mod blog_services;
pub mod page_cache;
pub mod pagination;
pub mod post_normalizer;
pub mod search_services;
pub mod seo_services;
