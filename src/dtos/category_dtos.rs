use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize, Serialize)]
pub struct CategoryIn {
    pub name: String,
}

/// `{id, name}` projection used by public pages and the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryOut {
    pub id: Uuid,
    pub name: String,
}
