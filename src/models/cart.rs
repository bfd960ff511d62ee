use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::parse_id;
use crate::error::ApiError;

/// Upper bound on the quantity of a single line.
pub const MAX_LINE_QUANTITY: i64 = 10_000;

/// One (product, quantity) pair within a cart or an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(alias = "product_id")]
    pub product_id: String,
    pub quantity: i64,
}

impl LineItem {
    pub fn validate(&self) -> Result<LineItem, ApiError> {
        if self.quantity < 1 {
            return Err(ApiError::validation("quantity must be at least 1"));
        }
        if self.quantity > MAX_LINE_QUANTITY {
            return Err(ApiError::validation(format!(
                "quantity must not exceed {}",
                MAX_LINE_QUANTITY
            )));
        }
        Ok(LineItem {
            product_id: parse_id(&self.product_id, "product")?,
            quantity: self.quantity,
        })
    }
}

/// A user's cart. Each product appears on at most one line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub products: Vec<LineItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    pub fn with_line(user_id: &str, line: LineItem) -> Self {
        let now = Utc::now();
        Cart {
            id: super::new_id(),
            user_id: user_id.to_string(),
            products: vec![line],
            created_at: now,
            updated_at: now,
        }
    }

    pub fn contains(&self, product_id: &str) -> bool {
        self.line(product_id).is_some()
    }

    pub fn line(&self, product_id: &str) -> Option<&LineItem> {
        self.products.iter().find(|l| l.product_id == product_id)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddToCartRequest {
    #[serde(alias = "product_id")]
    pub product_id: String,
    pub quantity: i64,
}

impl AddToCartRequest {
    pub fn validate(&self) -> Result<LineItem, ApiError> {
        LineItem {
            product_id: self.product_id.clone(),
            quantity: self.quantity,
        }
        .validate()
    }
}

/// Replaces the whole line list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateCartRequest {
    pub products: Vec<LineItem>,
}

impl UpdateCartRequest {
    pub fn validate(&self) -> Result<Vec<LineItem>, ApiError> {
        let mut seen = HashSet::new();
        let mut lines = Vec::with_capacity(self.products.len());
        for line in &self.products {
            let line = line.validate()?;
            if !seen.insert(line.product_id.clone()) {
                return Err(ApiError::validation(format!(
                    "product {} appears more than once",
                    line.product_id
                )));
            }
            lines.push(line);
        }
        Ok(lines)
    }
}
