//! Business logic. Each service owns handles to the stores (and the cache
//! where it needs one) and runs every persistence round-trip under a
//! deadline.

mod auth;
mod cart;
mod order;
mod product;
mod user;

pub use auth::AuthService;
pub use cart::{CartService, ALL_CARTS_LIMIT};
pub use order::OrderService;
pub use product::{ProductService, LATEST_PRODUCTS_LIMIT};
pub use user::UserService;

use std::future::Future;
use std::time::Duration;

use crate::error::ApiError;

/// Await `work`, giving up after `limit`.
///
/// On expiry the future is dropped, which cancels whatever database or cache
/// call it was suspended on.
pub(crate) async fn within<T, F>(limit: Duration, work: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ApiError>>,
{
    match tokio::time::timeout(limit, work).await {
        Ok(result) => result,
        Err(_) => {
            log::warn!("operation exceeded its {:?} deadline", limit);
            Err(ApiError::Timeout(limit))
        }
    }
}
