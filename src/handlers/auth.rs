use actix_web::cookie::{time, Cookie, SameSite};
use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::credentials::TOKEN_TTL_HOURS;
use crate::error::ApiError;
use crate::middleware::{request_token, AUTH_COOKIE};
use crate::models::{LoginRequest, SignupRequest};
use crate::services::AuthService;

/// How the auth cookie is issued.
#[derive(Debug, Clone, Copy, Default)]
pub struct CookiePolicy {
    pub secure: bool,
}

impl CookiePolicy {
    fn session(&self, token: String) -> Cookie<'static> {
        Cookie::build(AUTH_COOKIE, token)
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::hours(TOKEN_TTL_HOURS))
            .finish()
    }
}

pub async fn sign_up(
    service: web::Data<AuthService>,
    policy: web::Data<CookiePolicy>,
    payload: web::Json<SignupRequest>,
) -> Result<HttpResponse, ApiError> {
    let (profile, token) = service.sign_up(&payload).await?;
    Ok(HttpResponse::Created()
        .cookie(policy.session(token))
        .json(json!({ "success": true, "data": profile })))
}

pub async fn login(
    service: web::Data<AuthService>,
    policy: web::Data<CookiePolicy>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let (profile, token) = service.login(&payload).await?;
    Ok(HttpResponse::Ok()
        .cookie(policy.session(token))
        .json(json!({ "success": true, "data": profile })))
}

/// Always succeeds; the cookie is cleared whether or not it held a valid token.
pub async fn logout(service: web::Data<AuthService>, req: HttpRequest) -> HttpResponse {
    service.logout(request_token(&req).as_deref()).await;

    let mut removal = Cookie::build(AUTH_COOKIE, "").path("/").finish();
    removal.make_removal();
    HttpResponse::Ok()
        .cookie(removal)
        .json(json!({ "success": true, "message": "logged out" }))
}
