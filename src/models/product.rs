use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::require_non_empty;
use crate::error::ApiError;

/// Catalog item. `price` is in the smallest currency unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub desc: String,
    pub img: String,
    pub categories: BTreeSet<String>,
    pub size: BTreeSet<String>,
    pub color: BTreeSet<String>,
    pub price: i64,
    #[serde(alias = "instock")]
    pub in_stock: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(owner_id: &str, payload: ProductPayload) -> Self {
        let now = Utc::now();
        Product {
            id: super::new_id(),
            user_id: owner_id.to_string(),
            title: payload.title.trim().to_string(),
            desc: payload.desc,
            img: payload.img,
            categories: payload.categories,
            size: payload.size,
            color: payload.color,
            price: payload.price,
            in_stock: payload.in_stock,
            created_at: now,
            updated_at: now,
        }
    }

    /// Text search: case-insensitive substring on title/description, exact
    /// match on price or on any category/size/color member.
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self.desc.to_lowercase().contains(&needle)
            || query.parse::<i64>().map_or(false, |p| p == self.price)
            || self.categories.contains(query)
            || self.size.contains(query)
            || self.color.contains(query)
    }
}

/// Every field is required on create.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    pub title: String,
    pub desc: String,
    pub img: String,
    pub categories: BTreeSet<String>,
    pub size: BTreeSet<String>,
    pub color: BTreeSet<String>,
    pub price: i64,
    #[serde(alias = "instock")]
    pub in_stock: bool,
}

impl ProductPayload {
    pub fn validate(&self) -> Result<(), ApiError> {
        require_non_empty(&self.title, "title")?;
        require_non_empty(&self.desc, "desc")?;
        require_non_empty(&self.img, "img")?;
        if self.price < 0 {
            return Err(ApiError::validation("price must not be negative"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateProductPayload {
    pub title: Option<String>,
    pub desc: Option<String>,
    pub img: Option<String>,
    pub categories: Option<BTreeSet<String>>,
    pub size: Option<BTreeSet<String>>,
    pub color: Option<BTreeSet<String>>,
    pub price: Option<i64>,
    #[serde(alias = "instock")]
    pub in_stock: Option<bool>,
}

impl UpdateProductPayload {
    pub fn validate(&self) -> Result<(), ApiError> {
        if let Some(title) = &self.title {
            require_non_empty(title, "title")?;
        }
        if let Some(desc) = &self.desc {
            require_non_empty(desc, "desc")?;
        }
        if let Some(img) = &self.img {
            require_non_empty(img, "img")?;
        }
        if matches!(self.price, Some(p) if p < 0) {
            return Err(ApiError::validation("price must not be negative"));
        }
        Ok(())
    }

    pub fn apply(self, product: &mut Product) {
        if let Some(title) = self.title {
            product.title = title.trim().to_string();
        }
        if let Some(desc) = self.desc {
            product.desc = desc;
        }
        if let Some(img) = self.img {
            product.img = img;
        }
        if let Some(categories) = self.categories {
            product.categories = categories;
        }
        if let Some(size) = self.size {
            product.size = size;
        }
        if let Some(color) = self.color {
            product.color = color;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(in_stock) = self.in_stock {
            product.in_stock = in_stock;
        }
        product.updated_at = Utc::now();
    }
}
