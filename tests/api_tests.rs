#[macro_use]
mod common;

use std::num::NonZeroU32;
use std::sync::Arc;

use actix_web::http::header::AUTHORIZATION;
use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use serde_json::{json, Value};

use ecom_api::cache::CacheClient;
use ecom_api::config::{Deadlines, RateLimit};
use ecom_api::credentials::TokenSigner;
use ecom_api::db::MemoryStore;
use ecom_api::routes::AppState;

use common::{auth_cookie, seed_admin, signup_body, PASSWORD};

/// Log `$username` in and return the auth cookie.
macro_rules! login {
    ($app:expr, $username:expr) => {{
        let req = TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({ "username": $username, "password": PASSWORD }))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        auth_cookie(&resp).expect("login sets the auth cookie")
    }};
}

macro_rules! sign_up {
    ($app:expr, $username:expr) => {{
        let req = TestRequest::post()
            .uri("/api/v1/auth/signup")
            .set_json(signup_body($username))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }};
}

fn shirt() -> Value {
    json!({
        "title": "Shirt",
        "desc": "Plain cotton tee",
        "img": "shirt.png",
        "categories": ["tops"],
        "size": ["M", "L"],
        "color": ["white"],
        "price": 20,
        "inStock": true,
    })
}

#[actix_web::test]
async fn health_is_public() {
    let app = test_app!(common::state(Arc::new(MemoryStore::default())));
    let req = TestRequest::get().uri("/api/v1/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn signup_then_duplicate_is_a_conflict() {
    let app = test_app!(common::state(Arc::new(MemoryStore::default())));

    let req = TestRequest::post()
        .uri("/api/v1/auth/signup")
        .set_json(signup_body("ada"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["username"], "ada");
    assert!(body["data"].get("password").is_none());

    let req = TestRequest::post()
        .uri("/api/v1/auth/signup")
        .set_json(signup_body("ada"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
}

#[actix_web::test]
async fn login_cookie_and_bearer_header_both_authenticate() {
    let app = test_app!(common::state(Arc::new(MemoryStore::default())));
    sign_up!(app, "grace");
    let cookie = login!(app, "grace");
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.path(), Some("/"));

    let req = TestRequest::get()
        .uri("/api/v1/user/me")
        .cookie(cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["username"], "grace");

    let req = TestRequest::get()
        .uri("/api/v1/user/me")
        .insert_header((AUTHORIZATION, format!("Bearer {}", cookie.value())))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn private_routes_need_a_valid_token() {
    let app = test_app!(common::state(Arc::new(MemoryStore::default())));

    let req = TestRequest::get().uri("/api/v1/cart/my-cart").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);

    let forged = TokenSigner::new("some-other-secret")
        .issue("someone", "someone", true)
        .unwrap();
    let req = TestRequest::get()
        .uri("/api/v1/orders/user-orders")
        .insert_header((AUTHORIZATION, format!("Bearer {}", forged)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn wrong_password_is_unauthorized() {
    let app = test_app!(common::state(Arc::new(MemoryStore::default())));
    sign_up!(app, "alan");

    let req = TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "username": "alan", "password": "not-it" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(auth_cookie(&resp).is_none());
}

#[actix_web::test]
async fn product_writes_are_admin_only_and_reads_are_public() {
    let store = Arc::new(MemoryStore::default());
    seed_admin(&store, "admin").await;
    let app = test_app!(common::state(store));
    sign_up!(app, "shopper");

    let shopper = login!(app, "shopper");
    let req = TestRequest::post()
        .uri("/api/v1/products/create-product")
        .cookie(shopper)
        .set_json(shirt())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let admin = login!(app, "admin");
    let req = TestRequest::post()
        .uri("/api/v1/products/create-product")
        .cookie(admin.clone())
        .set_json(shirt())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let product_id = body["data"]["_id"].as_str().unwrap().to_string();

    let req = TestRequest::get()
        .uri(&format!("/api/v1/product/{}", product_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["title"], "Shirt");

    let req = TestRequest::get()
        .uri("/api/v1/product/query?query=shirt")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let req = TestRequest::put()
        .uri(&format!("/api/v1/products/update-product/{}", product_id))
        .cookie(admin.clone())
        .set_json(json!({ "price": 25 }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["price"], 25);
    assert_eq!(body["data"]["title"], "Shirt");

    let req = TestRequest::delete()
        .uri(&format!("/api/v1/products/delete-product/{}", product_id))
        .cookie(admin)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = TestRequest::get()
        .uri(&format!("/api/v1/product/{}", product_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn order_amount_comes_from_catalog_prices() {
    let store = Arc::new(MemoryStore::default());
    seed_admin(&store, "admin").await;
    let app = test_app!(common::state(store));
    sign_up!(app, "buyer");

    let admin = login!(app, "admin");
    let req = TestRequest::post()
        .uri("/api/v1/products/create-product")
        .cookie(admin)
        .set_json(shirt())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let product_id = body["data"]["_id"].as_str().unwrap().to_string();

    let buyer = login!(app, "buyer");
    let req = TestRequest::post()
        .uri("/api/v1/orders/create-order")
        .cookie(buyer.clone())
        .set_json(json!({
            "products": [{ "productId": product_id, "quantity": 2 }],
            "address": "12 Main St",
            "status": "delivered",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["amount"], 40);
    assert_eq!(body["data"]["status"], "created");

    let req = TestRequest::get()
        .uri("/api/v1/orders/user-orders")
        .cookie(buyer)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn adding_the_same_product_twice_merges_quantities() {
    let store = Arc::new(MemoryStore::default());
    seed_admin(&store, "admin").await;
    let app = test_app!(common::state(store));
    sign_up!(app, "carter");

    let admin = login!(app, "admin");
    let req = TestRequest::post()
        .uri("/api/v1/products/create-product")
        .cookie(admin)
        .set_json(shirt())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let product_id = body["data"]["_id"].as_str().unwrap().to_string();

    let user = login!(app, "carter");
    for quantity in [2, 3] {
        let req = TestRequest::post()
            .uri("/api/v1/cart/add-to-cart")
            .cookie(user.clone())
            .set_json(json!({ "productId": product_id, "quantity": quantity }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let req = TestRequest::get()
        .uri("/api/v1/cart/my-cart")
        .cookie(user.clone())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let lines = body["data"]["products"].as_array().unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["quantity"], 5);

    let cart_id = body["data"]["_id"].as_str().unwrap().to_string();
    let req = TestRequest::delete()
        .uri(&format!("/api/v1/cart/delete-my-cart/{}", cart_id))
        .cookie(user.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = TestRequest::get()
        .uri("/api/v1/cart/my-cart")
        .cookie(user)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn cart_quantity_is_capped_per_line() {
    let store = Arc::new(MemoryStore::default());
    seed_admin(&store, "admin").await;
    let app = test_app!(common::state(store));
    sign_up!(app, "hoarder");

    let mut product = shirt();
    let in_stock = product.as_object_mut().unwrap().remove("inStock").unwrap();
    product["instock"] = in_stock;

    let admin = login!(app, "admin");
    let req = TestRequest::post()
        .uri("/api/v1/products/create-product")
        .cookie(admin)
        .set_json(product)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["inStock"], true);
    let product_id = body["data"]["_id"].as_str().unwrap().to_string();

    let user = login!(app, "hoarder");
    let add = |quantity: i64| {
        TestRequest::post()
            .uri("/api/v1/cart/add-to-cart")
            .cookie(user.clone())
            .set_json(json!({ "product_id": product_id, "quantity": quantity }))
            .to_request()
    };

    let resp = test::call_service(&app, add(i64::MAX)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = test::call_service(&app, add(ecom_api::models::MAX_LINE_QUANTITY)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = test::call_service(&app, add(1)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);

    let req = TestRequest::get()
        .uri("/api/v1/cart/my-cart")
        .cookie(user.clone())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        body["data"]["products"][0]["quantity"],
        ecom_api::models::MAX_LINE_QUANTITY
    );
}

#[actix_web::test]
async fn stalled_store_yields_request_timeout() {
    let app = test_app!(common::stalled_state());

    let req = TestRequest::get().uri("/api/v1/product/all").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::REQUEST_TIMEOUT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
}

#[actix_web::test]
async fn malformed_input_is_a_bad_request() {
    let app = test_app!(common::state(Arc::new(MemoryStore::default())));

    let req = TestRequest::post()
        .uri("/api/v1/auth/signup")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);

    let req = TestRequest::get()
        .uri("/api/v1/product/not-a-uuid")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn logout_clears_the_cookie() {
    let app = test_app!(common::state(Arc::new(MemoryStore::default())));
    sign_up!(app, "leaver");
    let cookie = login!(app, "leaver");

    let req = TestRequest::get()
        .uri("/api/v1/auth/logout")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cleared = auth_cookie(&resp).expect("logout resets the cookie");
    assert_eq!(cleared.value(), "");
    assert_eq!(
        cleared.max_age(),
        Some(actix_web::cookie::time::Duration::ZERO)
    );
}

#[actix_web::test]
async fn deleted_profile_is_gone() {
    let app = test_app!(common::state(Arc::new(MemoryStore::default())));
    sign_up!(app, "ghost");
    let cookie = login!(app, "ghost");

    let req = TestRequest::get()
        .uri("/api/v1/user/me")
        .cookie(cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = TestRequest::delete()
        .uri("/api/v1/user/delete_me")
        .cookie(cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = TestRequest::get()
        .uri("/api/v1/user/me")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn bursts_beyond_the_quota_are_rejected() {
    let one = NonZeroU32::new(1).unwrap();
    let state = AppState::new(
        common::stores_on(Arc::new(MemoryStore::default())),
        CacheClient::new(10),
        TokenSigner::new(common::SECRET),
        Deadlines::default(),
        RateLimit {
            per_second: one,
            burst: one,
        },
    );
    let app = test_app!(state);

    let req = TestRequest::get().uri("/api/v1/health").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = TestRequest::get().uri("/api/v1/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
}
