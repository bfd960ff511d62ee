use actix_web::{web, HttpResponse};

use super::{ok, LimitQuery, SearchQuery};
use crate::credentials::Claims;
use crate::error::ApiError;
use crate::models::UpdateProfileRequest;
use crate::services::UserService;

pub async fn me(
    service: web::Data<UserService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse, ApiError> {
    Ok(ok(service.get_my_profile(&claims.id).await?))
}

pub async fn update_me(
    service: web::Data<UserService>,
    claims: web::ReqData<Claims>,
    payload: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse, ApiError> {
    Ok(ok(service.update_profile(&claims.id, &payload).await?))
}

pub async fn delete_me(
    service: web::Data<UserService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse, ApiError> {
    Ok(ok(service.delete_profile(&claims.id).await?))
}

pub async fn user_info(
    service: web::Data<UserService>,
    user_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    Ok(ok(service.get_user_profile(&user_id).await?))
}

pub async fn query_user(
    service: web::Data<UserService>,
    claims: web::ReqData<Claims>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, ApiError> {
    Ok(ok(service.search_users(&query.query, &claims.id).await?))
}

pub async fn random_users(
    service: web::Data<UserService>,
    query: web::Query<LimitQuery>,
) -> Result<HttpResponse, ApiError> {
    Ok(ok(service.get_random_users(query.clamped()).await?))
}

pub async fn recent_users(
    service: web::Data<UserService>,
    claims: web::ReqData<Claims>,
    query: web::Query<LimitQuery>,
) -> Result<HttpResponse, ApiError> {
    Ok(ok(service
        .get_recently_joined_users(query.clamped(), &claims.id)
        .await?))
}
