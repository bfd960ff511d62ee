use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::LineItem;
use crate::error::ApiError;

/// Every new order starts here regardless of what the client asks for.
pub const ORDER_INITIAL_STATUS: &str = "created";

/// A placed order. `amount` is frozen from product prices at creation time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub products: Vec<LineItem>,
    pub amount: i64,
    pub address: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new(user_id: &str, products: Vec<LineItem>, amount: i64, address: &str) -> Self {
        let now = Utc::now();
        Order {
            id: super::new_id(),
            user_id: user_id.to_string(),
            products,
            amount,
            address: address.trim().to_string(),
            status: ORDER_INITIAL_STATUS.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateOrderRequest {
    pub products: Vec<LineItem>,
    pub address: String,
    /// Accepted for compatibility; ignored.
    pub status: Option<String>,
}

impl CreateOrderRequest {
    pub fn validate(&self) -> Result<Vec<LineItem>, ApiError> {
        let address_len = self.address.trim().chars().count();
        if !(4..=20).contains(&address_len) {
            return Err(ApiError::validation(
                "address must be between 4 and 20 characters",
            ));
        }
        if self.products.is_empty() {
            return Err(ApiError::validation("order must contain at least one product"));
        }
        self.products.iter().map(LineItem::validate).collect()
    }
}
