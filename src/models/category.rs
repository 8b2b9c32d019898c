use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const MIN_NAME_LEN: usize = 2;
const MAX_NAME_LEN: usize = 60;

/// Trims the name and checks its length.
pub fn clean_category_name(raw: &str) -> Result<String, String> {
    let name = raw.trim();
    let len = name.chars().count();
    if len < MIN_NAME_LEN {
        return Err(format!(
            "Category name must be at least {} characters",
            MIN_NAME_LEN
        ));
    }
    if len > MAX_NAME_LEN {
        return Err(format!(
            "Category name must be at most {} characters",
            MAX_NAME_LEN
        ));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_trimmed() {
        assert_eq!(clean_category_name("  Cardiology ").unwrap(), "Cardiology");
    }

    #[test]
    fn name_length_is_bounded() {
        assert!(clean_category_name(" a ").is_err());
        assert!(clean_category_name(&"x".repeat(61)).is_err());
        assert!(clean_category_name(&"x".repeat(60)).is_ok());
    }
}
