use std::sync::Arc;

use crate::config::Deadlines;
use crate::db::ProductStore;
use crate::error::ApiError;
use crate::models::{parse_id, Product, ProductPayload, UpdateProductPayload};

use super::within;

/// How many products the "latest" listing returns.
pub const LATEST_PRODUCTS_LIMIT: usize = 4;

pub struct ProductService {
    products: Arc<dyn ProductStore>,
    deadlines: Deadlines,
}

impl ProductService {
    pub fn new(products: Arc<dyn ProductStore>, deadlines: Deadlines) -> Self {
        ProductService {
            products,
            deadlines,
        }
    }

    pub async fn create(&self, owner_id: &str, payload: ProductPayload) -> Result<Product, ApiError> {
        payload.validate()?;
        let product = Product::new(owner_id, payload);

        within(self.deadlines.standard, async {
            self.products.insert(&product).await?;
            log::info!("product {} created by {}", product.id, owner_id);
            Ok(())
        })
        .await?;
        Ok(product)
    }

    /// Merge the present fields into the stored product.
    pub async fn update(
        &self,
        product_id: &str,
        payload: UpdateProductPayload,
    ) -> Result<Product, ApiError> {
        let product_id = parse_id(product_id, "product")?;
        payload.validate()?;

        within(self.deadlines.standard, async {
            let mut product = self.find(&product_id).await?;
            payload.apply(&mut product);
            if !self.products.replace(&product).await? {
                return Err(not_found(&product_id));
            }
            Ok(product)
        })
        .await
    }

    /// Ownership is not checked here; only admins reach this route.
    pub async fn delete(&self, product_id: &str) -> Result<Product, ApiError> {
        let product_id = parse_id(product_id, "product")?;

        within(self.deadlines.standard, async {
            let product = self.find(&product_id).await?;
            if !self.products.delete(&product_id).await? {
                return Err(not_found(&product_id));
            }
            log::info!("product {} deleted", product_id);
            Ok(product)
        })
        .await
    }

    pub async fn get_by_id(&self, product_id: &str) -> Result<Product, ApiError> {
        let product_id = parse_id(product_id, "product")?;
        within(self.deadlines.standard, self.find(&product_id)).await
    }

    pub async fn get_all(&self) -> Result<Vec<Product>, ApiError> {
        within(self.deadlines.standard, async { Ok(self.products.all().await?) }).await
    }

    pub async fn get_latest(&self) -> Result<Vec<Product>, ApiError> {
        within(self.deadlines.standard, async {
            Ok(self.products.latest(LATEST_PRODUCTS_LIMIT).await?)
        })
        .await
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Product>, ApiError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ApiError::validation("query must not be empty"));
        }
        within(self.deadlines.standard, async {
            Ok(self.products.search(query).await?)
        })
        .await
    }

    async fn find(&self, product_id: &str) -> Result<Product, ApiError> {
        self.products
            .find_by_id(product_id)
            .await?
            .ok_or_else(|| not_found(product_id))
    }
}

fn not_found(product_id: &str) -> ApiError {
    ApiError::not_found(format!("product {} not found", product_id))
}
