use actix_web::{web, HttpResponse};

use super::{created, ok};
use crate::credentials::Claims;
use crate::error::ApiError;
use crate::models::CreateOrderRequest;
use crate::services::OrderService;

pub async fn create_order(
    service: web::Data<OrderService>,
    claims: web::ReqData<Claims>,
    payload: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, ApiError> {
    Ok(created(service.create_order(&claims.id, &payload).await?))
}

pub async fn user_orders(
    service: web::Data<OrderService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse, ApiError> {
    Ok(ok(service.get_user_orders(&claims.id).await?))
}
