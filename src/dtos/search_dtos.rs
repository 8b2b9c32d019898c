use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SearchResult {
    #[serde(rename_all = "camelCase")]
    Post {
        id: Uuid,
        title: String,
        url: String,
        image_url: String,
    },
    Category {
        id: Uuid,
        name: String,
        url: String,
    },
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
}
