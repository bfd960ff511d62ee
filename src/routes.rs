//! Route table and shared application state.

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{web, HttpRequest};

use crate::cache::CacheClient;
use crate::config::{Deadlines, RateLimit};
use crate::credentials::TokenSigner;
use crate::db::Stores;
use crate::error::ApiError;
use crate::handlers::auth::CookiePolicy;
use crate::handlers::{self, auth, cart, order, product, user};
use crate::middleware::{AuthMiddleware, RateLimitMiddleware};
use crate::services::{AuthService, CartService, OrderService, ProductService, UserService};

/// Everything the route table hands to handlers and middleware. Built once
/// and cloned into every worker.
#[derive(Clone)]
pub struct AppState {
    auth: web::Data<AuthService>,
    users: web::Data<UserService>,
    products: web::Data<ProductService>,
    carts: web::Data<CartService>,
    orders: web::Data<OrderService>,
    cookies: web::Data<CookiePolicy>,
    signer: TokenSigner,
    rate_limiter: RateLimitMiddleware,
}

impl AppState {
    pub fn new(
        stores: Stores,
        cache: CacheClient,
        signer: TokenSigner,
        deadlines: Deadlines,
        rate_limit: RateLimit,
    ) -> Self {
        AppState {
            auth: web::Data::new(AuthService::new(
                stores.users.clone(),
                cache.clone(),
                signer.clone(),
                deadlines,
            )),
            users: web::Data::new(UserService::new(stores.users, cache, deadlines)),
            products: web::Data::new(ProductService::new(stores.products.clone(), deadlines)),
            carts: web::Data::new(CartService::new(
                stores.carts,
                stores.products.clone(),
                deadlines,
            )),
            orders: web::Data::new(OrderService::new(stores.orders, stores.products, deadlines)),
            cookies: web::Data::new(CookiePolicy::default()),
            signer,
            rate_limiter: RateLimitMiddleware::new(rate_limit),
        }
    }

    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.cookies = web::Data::new(CookiePolicy { secure });
        self
    }
}

/// Register every route under `/api/v1`.
pub fn configure(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.app_data(state.auth.clone())
        .app_data(state.users.clone())
        .app_data(state.products.clone())
        .app_data(state.carts.clone())
        .app_data(state.orders.clone())
        .app_data(state.cookies.clone())
        .app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .app_data(web::PathConfig::default().error_handler(path_error));

    let authenticated = || AuthMiddleware::new(state.signer.clone());

    cfg.service(
        web::scope("/api/v1")
            .wrap(state.rate_limiter.clone())
            .route("/health", web::get().to(handlers::health))
            .service(
                web::scope("/auth")
                    .route("/signup", web::post().to(auth::sign_up))
                    .route("/login", web::post().to(auth::login))
                    .route("/logout", web::get().to(auth::logout)),
            )
            .service(
                web::scope("/user")
                    .wrap(authenticated())
                    .route("/me", web::get().to(user::me))
                    .route("/update_me", web::put().to(user::update_me))
                    .route("/delete_me", web::delete().to(user::delete_me))
                    .route("/user_info/{userId}", web::get().to(user::user_info))
                    .route("/query_user", web::get().to(user::query_user))
                    .route("/random_users", web::get().to(user::random_users))
                    .route("/recent_users", web::get().to(user::recent_users)),
            )
            .service(
                // Fixed segments before the id capture
                web::scope("/product")
                    .route("/all", web::get().to(product::all_products))
                    .route("/latest", web::get().to(product::latest_products))
                    .route("/query", web::get().to(product::query_products))
                    .route("/{productId}", web::get().to(product::get_product)),
            )
            .service(
                web::scope("/products")
                    .wrap(authenticated())
                    .route("/create-product", web::post().to(product::create_product))
                    .route(
                        "/update-product/{productId}",
                        web::put().to(product::update_product),
                    )
                    .route(
                        "/delete-product/{productId}",
                        web::delete().to(product::delete_product),
                    ),
            )
            .service(
                web::scope("/orders")
                    .wrap(authenticated())
                    .route("/create-order", web::post().to(order::create_order))
                    .route("/user-orders", web::get().to(order::user_orders)),
            )
            .service(
                web::scope("/cart")
                    .wrap(authenticated())
                    .route("/add-to-cart", web::post().to(cart::add_to_cart))
                    .route("/my-cart", web::get().to(cart::my_cart))
                    .route("/delete-my-cart/{cartId}", web::delete().to(cart::delete_my_cart))
                    .route("/all-carts", web::get().to(cart::all_carts))
                    .route("/update-cart/{cartId}", web::put().to(cart::update_cart)),
            ),
    );
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::validation(format!("invalid request body: {}", err)).into()
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::validation(format!("invalid query string: {}", err)).into()
}

fn path_error(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::validation(format!("invalid path: {}", err)).into()
}
