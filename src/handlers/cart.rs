use actix_web::{web, HttpResponse};

use super::{created, ok};
use crate::credentials::Claims;
use crate::error::ApiError;
use crate::models::{AddToCartRequest, UpdateCartRequest};
use crate::services::CartService;

pub async fn add_to_cart(
    service: web::Data<CartService>,
    claims: web::ReqData<Claims>,
    payload: web::Json<AddToCartRequest>,
) -> Result<HttpResponse, ApiError> {
    Ok(created(service.add_to_cart(&claims.id, &payload).await?))
}

pub async fn my_cart(
    service: web::Data<CartService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse, ApiError> {
    Ok(ok(service.get_my_cart(&claims.id).await?))
}

pub async fn delete_my_cart(
    service: web::Data<CartService>,
    claims: web::ReqData<Claims>,
    cart_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    Ok(ok(service.delete_cart(&claims.id, &cart_id).await?))
}

pub async fn all_carts(service: web::Data<CartService>) -> Result<HttpResponse, ApiError> {
    Ok(ok(service.get_all_carts().await?))
}

pub async fn update_cart(
    service: web::Data<CartService>,
    claims: web::ReqData<Claims>,
    cart_id: web::Path<String>,
    payload: web::Json<UpdateCartRequest>,
) -> Result<HttpResponse, ApiError> {
    Ok(ok(service.update_cart(&claims.id, &cart_id, &payload).await?))
}
