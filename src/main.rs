use std::io;

use actix_web::middleware::Logger;
use actix_web::{App, HttpServer};

use ecom_api::cache::CacheClient;
use ecom_api::config::{Config, StorageBackend};
use ecom_api::credentials::TokenSigner;
use ecom_api::db::{MongoGateway, StoreError, Stores};
use ecom_api::routes::{self, AppState};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("configuration error: {}", e);
            std::process::exit(1);
        }
    };
    log::debug!("loaded {:?}", config);

    let stores = match build_stores(&config).await {
        Ok(stores) => stores,
        Err(e) => {
            log::error!("could not reach the database: {}", e);
            std::process::exit(1);
        }
    };

    let state = AppState::new(
        stores,
        CacheClient::new(config.cache_max_entries),
        TokenSigner::new(config.jwt_secret.clone()),
        config.deadlines,
        config.rate_limit,
    )
    .with_secure_cookies(config.cookie_secure);

    log::info!("listening on {}:{}", config.host, config.port);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .configure(|cfg| routes::configure(cfg, &state))
    })
    .bind((config.host, config.port))?
    .run()
    .await
}

/// `Config` has already insisted on `DATABASE_URL` for the Mongo backend.
async fn build_stores(config: &Config) -> Result<Stores, StoreError> {
    match config.backend {
        StorageBackend::Mongo => {
            let url = config.database_url.as_deref().unwrap_or_default();
            let gateway = MongoGateway::connect(url, &config.database_name).await?;
            Ok(Stores::mongo(gateway))
        }
        StorageBackend::Memory => {
            log::warn!("using the in-memory store; data is lost on restart");
            Ok(Stores::memory())
        }
    }
}
