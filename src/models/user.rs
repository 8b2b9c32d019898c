use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Local mirror of the auth provider's user row.
/// Passwords never live here, the provider handles them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub saved_posts: Vec<String>,
}

/// Upsert payload built from session claims.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
}

/// Claims carried by the provider's session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// subject / user id
    pub sub: String,
    pub aud: Option<String>,
    pub exp: u64,
    pub iat: Option<u64>,
    pub role: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Option<UserMetadata>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserMetadata {
    pub name: Option<String>,
    #[serde(alias = "avatar_url", alias = "picture")]
    pub image: Option<String>,
}
