// src/services/auth_services.rs
//
// Sign-up and sign-in are delegated to the hosted auth provider; this service
// only forwards credentials and verifies the session tokens it issues.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use log::{info, warn};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::dtos::auth_dtos::{SessionOut, SignInIn, SignUpIn};
use crate::models::user::JwtClaims;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{0}")]
    Provider(String),
    #[error("email already registered")]
    AlreadyRegistered,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid token")]
    InvalidToken,
    #[error("parse uuid error")]
    UuidError(#[from] uuid::Error),
}

#[derive(Clone)]
pub struct AuthService {
    pub client: reqwest::Client,
    pub auth_url: String,
    pub anon_key: String,
}

/// Signed-in user, taken from a verified session token.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub name: Option<String>,
    pub image: Option<String>,
}

impl AuthService {
    pub fn new(client: reqwest::Client, auth_url: &str, anon_key: &str) -> Self {
        Self {
            client,
            auth_url: auth_url.trim().trim_end_matches('/').to_string(),
            anon_key: anon_key.trim().to_string(),
        }
    }

    pub async fn sign_up(&self, input: &SignUpIn) -> Result<Uuid, AuthError> {
        #[derive(Serialize)]
        struct Body<'a> {
            email: &'a str,
            password: &'a str,
            data: Metadata<'a>,
        }

        #[derive(Serialize)]
        struct Metadata<'a> {
            name: Option<&'a str>,
        }

        let body = Body {
            email: input.email.trim(),
            password: &input.password,
            data: Metadata {
                name: input.name.as_deref().map(str::trim).filter(|n| !n.is_empty()),
            },
        };

        let url = format!("{}/auth/v1/signup", self.auth_url);
        let resp = self
            .client
            .post(&url)
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();

        if !status.is_success() {
            let msg = provider_message(&text).unwrap_or_else(|| format!("sign-up failed: {}", status));
            warn!("sign-up rejected by provider: {} {}", status, msg);
            if msg.to_lowercase().contains("already registered") {
                return Err(AuthError::AlreadyRegistered);
            }
            return Err(AuthError::Provider(msg));
        }

        let json_val: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| AuthError::Provider(format!("invalid json: {}", e)))?;

        let user_id = json_val
            .get("user")
            .and_then(|u| u.get("id"))
            .or_else(|| json_val.get("id"))
            .and_then(|v| v.as_str())
            .ok_or_else(|| AuthError::Provider("sign-up returned no user id".to_string()))?;

        let user_id = Uuid::parse_str(user_id)?;
        info!("registered user {}", user_id);
        Ok(user_id)
    }

    pub async fn sign_in(&self, input: &SignInIn) -> Result<(SessionOut, Uuid, Option<String>), AuthError> {
        #[derive(Serialize)]
        struct Body<'a> {
            email: &'a str,
            password: &'a str,
        }

        #[derive(Deserialize)]
        struct TokenResp {
            access_token: String,
            refresh_token: Option<String>,
            expires_in: Option<i64>,
            token_type: Option<String>,
            user: Option<UserInfo>,
        }

        #[derive(Deserialize)]
        struct UserInfo {
            id: String,
            email: Option<String>,
        }

        let body = Body {
            email: input.email.trim(),
            password: &input.password,
        };

        let url = format!("{}/auth/v1/token?grant_type=password", self.auth_url);
        let resp = self
            .client
            .post(&url)
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let txt = resp.text().await.unwrap_or_default();

        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            return Err(AuthError::InvalidCredentials);
        }
        if status != StatusCode::OK {
            return Err(AuthError::Provider(format!("sign-in failed: {}", status)));
        }

        let tr: TokenResp = serde_json::from_str(&txt)
            .map_err(|e| AuthError::Provider(format!("invalid json in sign-in response: {}", e)))?;

        let user = tr
            .user
            .ok_or_else(|| AuthError::Provider("no user info in sign-in response".to_string()))?;
        let user_id = Uuid::parse_str(&user.id)?;

        let session = SessionOut {
            access_token: tr.access_token,
            refresh_token: tr.refresh_token,
            expires_in: tr.expires_in,
            token_type: tr.token_type,
        };

        Ok((session, user_id, user.email))
    }
}

fn provider_message(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    json.get("msg")
        .or_else(|| json.get("message"))
        .or_else(|| json.get("error_description"))
        .and_then(|m| m.as_str())
        .map(str::to_string)
}

const TOKEN_AUDIENCE: &str = "authenticated";

/// Verifies an HS256 session token; `exp` is mandatory and `aud` must be
/// `authenticated`.
pub fn verify_token(token: &str, secret: &str) -> Result<SessionUser, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[TOKEN_AUDIENCE]);

    let data = decode::<JwtClaims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map_err(|_| AuthError::InvalidToken)?;
    let claims = data.claims;
    let metadata = claims.user_metadata.unwrap_or_default();

    Ok(SessionUser {
        user_id: Uuid::parse_str(&claims.sub)?,
        email: claims.email,
        name: metadata.name,
        image: metadata.image,
    })
}

pub fn is_admin_email(email: Option<&str>, admin_email: &str) -> bool {
    match email {
        Some(email) => {
            let admin = admin_email.trim();
            !admin.is_empty() && email.trim().eq_ignore_ascii_case(admin)
        }
        None => false,
    }
}
