//! Domain entities and request payloads.

mod cart;
mod order;
mod product;
mod user;

pub use cart::{AddToCartRequest, Cart, LineItem, UpdateCartRequest, MAX_LINE_QUANTITY};
pub use order::{CreateOrderRequest, Order, ORDER_INITIAL_STATUS};
pub use product::{Product, ProductPayload, UpdateProductPayload};
pub use user::{
    Gender, LoginRequest, SessionSnapshot, SignupRequest, UpdateProfileRequest, User, UserProfile,
};

use uuid::Uuid;

use crate::error::ApiError;

/// Fresh identifier for a new document.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Validate a client-supplied identifier. `what` names the entity in the
/// error message.
pub fn parse_id(raw: &str, what: &str) -> Result<String, ApiError> {
    Uuid::parse_str(raw.trim())
        .map(|id| id.to_string())
        .map_err(|_| ApiError::validation(format!("invalid {} id: '{}'", what, raw)))
}

pub(crate) fn require_non_empty(value: &str, field: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        Err(ApiError::validation(format!("{} is required", field)))
    } else {
        Ok(())
    }
}
