use std::sync::LazyLock;

use actix_web::{HttpResponse, get, post, web};
use log::info;
use regex::Regex;

use crate::AppState;
use crate::dtos::ApiResponse;
use crate::dtos::auth_dtos::{CurrentSessionOut, SignInIn, SignInResponse, SignUpIn, SignUpResponse};
use crate::error::{AppError, AppResult};
use crate::middleware::auth_extractor::AuthenticatedUser;
use crate::services::auth_services::is_admin_email;

const MIN_PASSWORD_LEN: usize = 8;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$").expect("email regex is valid")
});

fn looks_like_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// POST /auth/sign-up
#[post("/sign-up")]
pub async fn sign_up(
    state: web::Data<AppState>,
    body: web::Json<SignUpIn>,
) -> AppResult<HttpResponse> {
    let mut input = body.into_inner();
    input.email = input.email.trim().to_lowercase();

    if !looks_like_email(&input.email) {
        return Err(AppError::Validation("Invalid email format".into()));
    }
    if input.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LEN
        )));
    }

    let user_id = state.auth.sign_up(&input).await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(
        "Account created",
        SignUpResponse {
            user_id,
            message: "Account created successfully. Please sign in to continue.".to_string(),
            next_step: "sign_in".to_string(),
        },
    )))
}

/// POST /auth/sign-in
#[post("/sign-in")]
pub async fn sign_in(
    state: web::Data<AppState>,
    body: web::Json<SignInIn>,
) -> AppResult<HttpResponse> {
    let input = body.into_inner();
    if input.email.trim().is_empty() || input.password.is_empty() {
        return Err(AppError::Validation("Email and password are required".into()));
    }

    let (tokens, user_id, email) = state.auth.sign_in(&input).await?;
    let email = email.unwrap_or_else(|| input.email.trim().to_string());
    let is_admin = is_admin_email(Some(&email), &state.config.admin_email);
    info!("user {} signed in (admin: {})", user_id, is_admin);

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Signed in",
        SignInResponse {
            session: tokens,
            user_id,
            is_admin,
        },
    )))
}

/// GET /auth/session
#[get("/session")]
pub async fn session(state: web::Data<AppState>, user: AuthenticatedUser) -> AppResult<HttpResponse> {
    let is_admin = is_admin_email(user.email.as_deref(), &state.config.admin_email);
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Session is valid",
        CurrentSessionOut {
            user_id: user.user_id,
            email: user.email,
            name: user.name,
            is_admin,
        },
    )))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{App, http::StatusCode, test};
    use serde_json::{Value, json};
    use uuid::Uuid;

    use super::*;
    use crate::handlers::configure;
    use crate::handlers::test_support::{admin_bearer, bearer, test_state};
    use crate::repositories::memory::MemoryStore;
    use crate::services::auth_services::tests::mint_token;

    #[actix_web::test]
    async fn email_shapes() {
        assert!(looks_like_email("dr.sam@clinic.example.org"));
        assert!(!looks_like_email("not-an-email"));
        assert!(!looks_like_email("a@b"));
    }

    #[actix_web::test]
    async fn sign_up_rejects_bad_email_before_calling_provider() {
        let app = test::init_service(
            App::new().app_data(test_state(Arc::new(MemoryStore::default()))).configure(configure),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/auth/sign-up")
            .set_json(json!({"email": "nope", "password": "longenough"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "Invalid email format");
    }

    #[actix_web::test]
    async fn sign_up_rejects_short_password() {
        let app = test::init_service(
            App::new().app_data(test_state(Arc::new(MemoryStore::default()))).configure(configure),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/auth/sign-up")
            .set_json(json!({"email": "new@example.com", "password": "short"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn session_reports_admin_flag() {
        let app = test::init_service(
            App::new().app_data(test_state(Arc::new(MemoryStore::default()))).configure(configure),
        )
        .await;
        let admin_id = Uuid::new_v4();

        let req = test::TestRequest::get()
            .uri("/auth/session")
            .insert_header(admin_bearer(admin_id))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["userId"], admin_id.to_string());
        assert_eq!(body["data"]["isAdmin"], true);
        assert_eq!(body["data"]["name"], "Dr. Sam");

        let req = test::TestRequest::get()
            .uri("/auth/session")
            .insert_header(bearer(Uuid::new_v4(), "reader@example.com"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["isAdmin"], false);
    }

    #[actix_web::test]
    async fn session_requires_a_valid_token() {
        let app = test::init_service(
            App::new().app_data(test_state(Arc::new(MemoryStore::default()))).configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/auth/session").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let forged = mint_token(Uuid::new_v4(), "admin@example.com", "wrong-secret", 3600);
        let req = test::TestRequest::get()
            .uri("/auth/session")
            .insert_header(("Authorization", format!("Bearer {}", forged)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Invalid token");
    }
}
