//! Persistence gateway.
//!
//! Services talk to storage only through the narrow traits below. Two
//! backends implement them: [`MongoGateway`] for production and
//! [`MemoryStore`] for local runs and tests.

mod memory;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::{MongoGateway, CARTS, ORDERS, PRODUCTS, USERS};

use std::sync::Arc;

use async_trait::async_trait;
use mongodb::bson;
use thiserror::Error;

use crate::models::{Cart, LineItem, Order, Product, User};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Driver(#[from] mongodb::error::Error),

    #[error("document encoding failed: {0}")]
    Encode(#[from] bson::ser::Error),

    #[error("document decoding failed: {0}")]
    Decode(#[from] bson::de::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: &User) -> StoreResult<()>;
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<User>>;
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    /// Overwrite the stored document. Returns false if it no longer exists.
    async fn replace(&self, user: &User) -> StoreResult<bool>;
    /// Delete and return the pre-deletion document.
    async fn delete(&self, id: &str) -> StoreResult<Option<User>>;
    /// Case-insensitive substring on username/email/first/last name, or an
    /// exact gender match, excluding `exclude_id`.
    async fn search(&self, query: &str, exclude_id: &str) -> StoreResult<Vec<User>>;
    async fn sample(&self, size: usize) -> StoreResult<Vec<User>>;
    /// Newest accounts first, excluding `exclude_id`.
    async fn recent(&self, limit: usize, exclude_id: &str) -> StoreResult<Vec<User>>;
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn insert(&self, product: &Product) -> StoreResult<()>;
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Product>>;
    async fn replace(&self, product: &Product) -> StoreResult<bool>;
    async fn delete(&self, id: &str) -> StoreResult<bool>;
    async fn all(&self) -> StoreResult<Vec<Product>>;
    async fn latest(&self, limit: usize) -> StoreResult<Vec<Product>>;
    /// In-stock products matching [`Product::matches_query`].
    async fn search(&self, query: &str) -> StoreResult<Vec<Product>>;
}

#[async_trait]
pub trait CartStore: Send + Sync {
    async fn insert(&self, cart: &Cart) -> StoreResult<()>;
    async fn find_by_user(&self, user_id: &str) -> StoreResult<Option<Cart>>;
    async fn find_owned(&self, cart_id: &str, user_id: &str) -> StoreResult<Option<Cart>>;
    /// Add `quantity` to an existing line. Returns false if no line matched
    /// or the sum would overflow.
    async fn increment_line(&self, cart_id: &str, product_id: &str, quantity: i64)
        -> StoreResult<bool>;
    async fn push_line(&self, cart_id: &str, line: &LineItem) -> StoreResult<bool>;
    async fn replace_lines(&self, cart_id: &str, user_id: &str, lines: &[LineItem])
        -> StoreResult<bool>;
    async fn delete_owned(&self, cart_id: &str, user_id: &str) -> StoreResult<Option<Cart>>;
    /// Newest carts first.
    async fn latest(&self, limit: usize) -> StoreResult<Vec<Cart>>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert(&self, order: &Order) -> StoreResult<()>;
    async fn find_by_user(&self, user_id: &str) -> StoreResult<Vec<Order>>;
}

/// The set of stores handed to the services at startup.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub products: Arc<dyn ProductStore>,
    pub carts: Arc<dyn CartStore>,
    pub orders: Arc<dyn OrderStore>,
}

impl Stores {
    pub fn mongo(gateway: MongoGateway) -> Self {
        let gateway = Arc::new(gateway);
        Stores {
            users: gateway.clone(),
            products: gateway.clone(),
            carts: gateway.clone(),
            orders: gateway,
        }
    }

    pub fn memory() -> Self {
        let store = Arc::new(MemoryStore::default());
        Stores {
            users: store.clone(),
            products: store.clone(),
            carts: store.clone(),
            orders: store,
        }
    }
}
