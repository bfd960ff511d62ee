#![allow(dead_code, unused_macros)]

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use async_trait::async_trait;

use ecom_api::cache::CacheClient;
use ecom_api::config::{Deadlines, RateLimit};
use ecom_api::credentials::{hash_password, TokenSigner};
use ecom_api::db::{MemoryStore, ProductStore, StoreResult, Stores, UserStore};
use ecom_api::middleware::AUTH_COOKIE;
use ecom_api::models::{Gender, Product, SignupRequest, User};
use ecom_api::routes::AppState;

pub const SECRET: &str = "integration-secret";
pub const PASSWORD: &str = "s3cret-pass";

/// Build the app under test and hand back a service ready for `call_service`.
macro_rules! test_app {
    ($state:expr) => {{
        let state = $state;
        actix_web::test::init_service(
            actix_web::App::new()
                .configure(move |cfg| ecom_api::routes::configure(cfg, &state)),
        )
        .await
    }};
}

pub fn generous() -> RateLimit {
    RateLimit {
        per_second: NonZeroU32::new(1_000).unwrap(),
        burst: NonZeroU32::new(1_000).unwrap(),
    }
}

pub fn stores_on(store: Arc<MemoryStore>) -> Stores {
    Stores {
        users: store.clone(),
        products: store.clone(),
        carts: store.clone(),
        orders: store,
    }
}

pub fn state(store: Arc<MemoryStore>) -> AppState {
    AppState::new(
        stores_on(store),
        CacheClient::new(1_000),
        TokenSigner::new(SECRET),
        Deadlines::default(),
        generous(),
    )
}

pub fn signup_body(username: &str) -> serde_json::Value {
    serde_json::json!({
        "username": username,
        "firstName": "Test",
        "lastName": "User",
        "email": format!("{}@example.com", username),
        "password": PASSWORD,
        "gender": "other",
    })
}

/// Insert an administrator directly; signup never grants the flag.
pub async fn seed_admin(store: &MemoryStore, username: &str) -> User {
    let request = SignupRequest {
        username: username.into(),
        first_name: "Shop".into(),
        last_name: "Keeper".into(),
        email: format!("{}@example.com", username),
        password: PASSWORD.into(),
        gender: "other".into(),
        profile_image: None,
    };
    let mut user = User::new(&request, Gender::Other, hash_password(PASSWORD).unwrap());
    user.is_admin = true;
    UserStore::insert(store, &user).await.unwrap();
    user
}

pub fn auth_cookie<B>(resp: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|c| c.name() == AUTH_COOKIE)
        .map(|c| c.into_owned())
}

/// A product store whose calls never complete.
pub struct StalledProducts;

#[async_trait]
impl ProductStore for StalledProducts {
    async fn insert(&self, _product: &Product) -> StoreResult<()> {
        std::future::pending().await
    }

    async fn find_by_id(&self, _id: &str) -> StoreResult<Option<Product>> {
        std::future::pending().await
    }

    async fn replace(&self, _product: &Product) -> StoreResult<bool> {
        std::future::pending().await
    }

    async fn delete(&self, _id: &str) -> StoreResult<bool> {
        std::future::pending().await
    }

    async fn all(&self) -> StoreResult<Vec<Product>> {
        std::future::pending().await
    }

    async fn latest(&self, _limit: usize) -> StoreResult<Vec<Product>> {
        std::future::pending().await
    }

    async fn search(&self, _query: &str) -> StoreResult<Vec<Product>> {
        std::future::pending().await
    }
}

pub fn stalled_state() -> AppState {
    let store = Arc::new(MemoryStore::default());
    let mut stores = stores_on(store);
    stores.products = Arc::new(StalledProducts);
    AppState::new(
        stores,
        CacheClient::new(100),
        TokenSigner::new(SECRET),
        Deadlines {
            standard: Duration::from_millis(50),
            short: Duration::from_millis(50),
        },
        generous(),
    )
}
