//! HTTP handlers. Each one pulls its service out of app data, delegates, and
//! wraps the result in the `{"success": true, "data": ...}` envelope.

pub mod auth;
pub mod cart;
pub mod order;
pub mod product;
pub mod user;

use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};
use serde_json::json;

const DEFAULT_LIST_LIMIT: usize = 2;
const MAX_LIST_LIMIT: usize = 50;

pub(crate) fn ok<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "success": true, "data": data }))
}

pub(crate) fn created<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Created().json(json!({ "success": true, "data": data }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    pub query: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

impl LimitQuery {
    pub fn clamped(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(1, MAX_LIST_LIMIT)
    }
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "success": true, "status": "ok" }))
}
