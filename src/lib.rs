//! Holiday Life tour booking backend
//!
//! Tour pricing, itinerary authoring and inquiry capture behind an axum JSON
//! API. The `tours` module is pure; everything with I/O lives around it.

pub mod cache;
pub mod config;
pub mod contact;
pub mod db;
pub mod error;
pub mod inquiries;
pub mod rates;
pub mod routes;
pub mod tours;
pub mod uploads;
pub mod users;
pub mod validation;

use sqlx::PgPool;
use std::sync::Arc;

use cache::AppCache;
use config::Config;
use rates::RatesClient;
use uploads::ImageUploader;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub cache: AppCache,
    pub rates: RatesClient,
    pub uploader: ImageUploader,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        let http = reqwest::Client::new();
        Self {
            cache: AppCache::new(),
            rates: RatesClient::new(http.clone(), config.rates_api_url.clone()),
            uploader: ImageUploader::new(
                http,
                config.image_upload_url.clone(),
                config.image_upload_key.clone(),
            ),
            config: Arc::new(config),
            db,
        }
    }
}
