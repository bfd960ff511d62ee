use actix_web::{web, HttpResponse};

use super::{created, ok, SearchQuery};
use crate::credentials::Claims;
use crate::error::ApiError;
use crate::models::{ProductPayload, UpdateProductPayload};
use crate::services::ProductService;

fn require_admin(claims: &Claims) -> Result<(), ApiError> {
    if claims.is_admin {
        Ok(())
    } else {
        Err(ApiError::unauthorized("admin access required"))
    }
}

pub async fn create_product(
    service: web::Data<ProductService>,
    claims: web::ReqData<Claims>,
    payload: web::Json<ProductPayload>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&claims)?;
    Ok(created(service.create(&claims.id, payload.into_inner()).await?))
}

pub async fn update_product(
    service: web::Data<ProductService>,
    claims: web::ReqData<Claims>,
    product_id: web::Path<String>,
    payload: web::Json<UpdateProductPayload>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&claims)?;
    Ok(ok(service.update(&product_id, payload.into_inner()).await?))
}

pub async fn delete_product(
    service: web::Data<ProductService>,
    claims: web::ReqData<Claims>,
    product_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&claims)?;
    Ok(ok(service.delete(&product_id).await?))
}

pub async fn get_product(
    service: web::Data<ProductService>,
    product_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    Ok(ok(service.get_by_id(&product_id).await?))
}

pub async fn all_products(service: web::Data<ProductService>) -> Result<HttpResponse, ApiError> {
    Ok(ok(service.get_all().await?))
}

pub async fn latest_products(
    service: web::Data<ProductService>,
) -> Result<HttpResponse, ApiError> {
    Ok(ok(service.get_latest().await?))
}

pub async fn query_products(
    service: web::Data<ProductService>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, ApiError> {
    Ok(ok(service.search(&query.query).await?))
}
