//! klq-api library - K-pop lyric quiz backend
//!
//! Exposes the application state, router construction, and the pipeline
//! services for integration testing.

pub mod api;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::http::HeaderValue;
use axum::Router;
use klq_common::{Cache, Config};
use services::{
    DatasetClient, KakasiConverter, ReadingConverter, RecordFetcher, RubyAnnotator, Sampler,
    TranslateClient, Translator,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Shared store behind all three cache namespaces
    pub cache: Arc<Cache>,
    pub fetcher: Arc<RecordFetcher>,
    pub sampler: Arc<Sampler>,
    pub translator: Arc<Translator>,
    pub annotator: Arc<RubyAnnotator>,
}

impl AppState {
    /// Wire up the pipeline with the production reading converter
    pub fn new(config: Config) -> klq_common::Result<Self> {
        Self::with_converter(config, Arc::new(KakasiConverter))
    }

    /// Wire up the pipeline with an injected reading converter (tests)
    pub fn with_converter(
        config: Config,
        converter: Arc<dyn ReadingConverter>,
    ) -> klq_common::Result<Self> {
        let cache = Arc::new(Cache::default());

        let dataset_client =
            DatasetClient::new(config.dataset_base_url.clone(), config.dataset_token.clone())?;
        let fetcher = Arc::new(RecordFetcher::new(dataset_client, cache.clone()));
        let sampler = Arc::new(Sampler::new(
            fetcher.clone(),
            config.year_min,
            config.year_max,
        ));

        let translate_client = match &config.translate_api_key {
            Some(key) => Some(TranslateClient::new(
                config.translate_api_url.clone(),
                key.clone(),
            )?),
            None => None,
        };
        let translator = Arc::new(Translator::new(translate_client, cache.clone()));

        let annotator = Arc::new(RubyAnnotator::new(converter, cache.clone()));

        Ok(Self {
            config: Arc::new(config),
            cache,
            fetcher,
            sampler,
            translator,
            annotator,
        })
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.allowed_origins);

    Router::new()
        .merge(api::health_routes())
        .merge(api::translate_routes())
        .merge(api::quiz_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS from the configured origin allow-list; an empty list means
/// permissive (development default)
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let parsed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(parsed)
        .allow_methods(Any)
        .allow_headers(Any)
}
