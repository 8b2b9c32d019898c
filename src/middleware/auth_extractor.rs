// src/middleware/auth_extractor.rs - bearer-token extractors
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use log::{debug, warn};
use uuid::Uuid;

use crate::AppState;
use crate::error::AppError;
use crate::services::auth_services::{is_admin_email, verify_token};

/// Caller with a verified session token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub name: Option<String>,
    pub image: Option<String>,
}

/// Authenticated caller whose email is the configured admin account.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthenticatedUser);

fn bearer_token(req: &HttpRequest) -> Result<&str, AppError> {
    let header = req
        .headers()
        .get("Authorization")
        .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid header format".into()))?;

    let token = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or_else(|| AppError::Unauthorized("Invalid auth header format".into()))?;
    if token.is_empty() {
        return Err(AppError::Unauthorized("Missing token".into()));
    }
    Ok(token)
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::Internal("application state missing".into()))?;
    let token = bearer_token(req)?;

    match verify_token(token, &state.config.jwt_secret) {
        Ok(session) => {
            debug!("authenticated user {}", session.user_id);
            Ok(AuthenticatedUser {
                user_id: session.user_id,
                email: session.email,
                name: session.name,
                image: session.image,
            })
        }
        Err(e) => {
            warn!("rejected session token: {}", e);
            Err(AppError::Unauthorized("Invalid token".into()))
        }
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<AuthenticatedUser, AppError>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

impl FromRequest for AdminUser {
    type Error = AppError;
    type Future = Ready<Result<AdminUser, AppError>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = authenticate(req).and_then(|user| {
            let admin_email = req
                .app_data::<web::Data<AppState>>()
                .map(|s| s.config.admin_email.as_str())
                .unwrap_or_default();
            if is_admin_email(user.email.as_deref(), admin_email) {
                Ok(AdminUser(user))
            } else {
                warn!("user {} is not an admin", user.user_id);
                Err(AppError::Forbidden("Admin access required".into()))
            }
        });
        ready(result)
    }
}
