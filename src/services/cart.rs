use std::sync::Arc;

use crate::config::Deadlines;
use crate::db::{CartStore, ProductStore};
use crate::error::ApiError;
use crate::models::{parse_id, AddToCartRequest, Cart, UpdateCartRequest, MAX_LINE_QUANTITY};

use super::within;

/// How many carts the "all carts" listing returns.
pub const ALL_CARTS_LIMIT: usize = 3;

pub struct CartService {
    carts: Arc<dyn CartStore>,
    products: Arc<dyn ProductStore>,
    deadlines: Deadlines,
}

impl CartService {
    pub fn new(
        carts: Arc<dyn CartStore>,
        products: Arc<dyn ProductStore>,
        deadlines: Deadlines,
    ) -> Self {
        CartService {
            carts,
            products,
            deadlines,
        }
    }

    /// Add a line to the user's cart, creating the cart if needed. Adding a
    /// product that is already in the cart increments its quantity.
    ///
    /// The returned cart is read back from the store after the write.
    pub async fn add_to_cart(
        &self,
        user_id: &str,
        request: &AddToCartRequest,
    ) -> Result<Cart, ApiError> {
        let line = request.validate()?;

        within(self.deadlines.standard, async {
            if self.products.find_by_id(&line.product_id).await?.is_none() {
                return Err(ApiError::not_found(format!(
                    "product {} not found",
                    line.product_id
                )));
            }

            let written = match self.carts.find_by_user(user_id).await? {
                None => {
                    self.carts.insert(&Cart::with_line(user_id, line)).await?;
                    true
                }
                Some(cart) => match cart.line(&line.product_id) {
                    Some(existing) => {
                        let merged = existing
                            .quantity
                            .checked_add(line.quantity)
                            .filter(|q| *q <= MAX_LINE_QUANTITY);
                        if merged.is_none() {
                            return Err(ApiError::validation(format!(
                                "quantity must not exceed {}",
                                MAX_LINE_QUANTITY
                            )));
                        }
                        self.carts
                            .increment_line(&cart.id, &line.product_id, line.quantity)
                            .await?
                    }
                    None => self.carts.push_line(&cart.id, &line).await?,
                },
            };
            if !written {
                return Err(ApiError::not_found("cart not found"));
            }

            self.carts
                .find_by_user(user_id)
                .await?
                .ok_or_else(|| ApiError::not_found("cart not found"))
        })
        .await
    }

    pub async fn get_my_cart(&self, user_id: &str) -> Result<Cart, ApiError> {
        within(self.deadlines.standard, async {
            self.carts
                .find_by_user(user_id)
                .await?
                .ok_or_else(|| ApiError::not_found("cart not found"))
        })
        .await
    }

    pub async fn delete_cart(&self, user_id: &str, cart_id: &str) -> Result<Cart, ApiError> {
        let cart_id = parse_id(cart_id, "cart")?;

        within(self.deadlines.short, async {
            let cart = self
                .carts
                .delete_owned(&cart_id, user_id)
                .await?
                .ok_or_else(|| ApiError::not_found("cart not found for this user"))?;
            log::info!("cart {} deleted by {}", cart.id, user_id);
            Ok(cart)
        })
        .await
    }

    /// Newest carts first, capped at [`ALL_CARTS_LIMIT`].
    pub async fn get_all_carts(&self) -> Result<Vec<Cart>, ApiError> {
        within(self.deadlines.short, async {
            Ok(self.carts.latest(ALL_CARTS_LIMIT).await?)
        })
        .await
    }

    /// Replace the cart's line list wholesale. Only the owner may do this.
    pub async fn update_cart(
        &self,
        user_id: &str,
        cart_id: &str,
        request: &UpdateCartRequest,
    ) -> Result<Cart, ApiError> {
        let cart_id = parse_id(cart_id, "cart")?;
        let lines = request.validate()?;

        within(self.deadlines.standard, async {
            if !self.carts.replace_lines(&cart_id, user_id, &lines).await? {
                return Err(ApiError::not_found("cart not found for this user"));
            }
            self.carts
                .find_owned(&cart_id, user_id)
                .await?
                .ok_or_else(|| ApiError::not_found("cart not found for this user"))
        })
        .await
    }
}
