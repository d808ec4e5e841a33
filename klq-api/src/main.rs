//! klq-api - K-pop lyric quiz backend
//!
//! Serves lyric trivia: samples a song from the sparse monthly chart
//! dataset, translates the lyric lines, annotates the translation with
//! pronunciation ruby, and hands the quiz frontend one payload.

use anyhow::Result;
use klq_api::{build_router, AppState};
use klq_common::Config;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting KLQ quiz backend (klq-api) v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env();
    info!(
        port = config.port,
        dataset = %config.dataset_base_url,
        translation = config.translate_api_key.is_some(),
        years = format!("{}-{}", config.year_min, config.year_max),
        "Configuration resolved"
    );

    let port = config.port;
    let state = AppState::new(config)?;

    // Eager converter warm-up so the first quiz request doesn't pay the
    // dictionary load; requests that arrive earlier await the same init
    let warm = state.annotator.clone();
    tokio::spawn(async move {
        warm.ensure_ready().await;
        info!("Reading converter ready");
    });

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("klq-api listening on http://0.0.0.0:{}", port);
    info!("Health check: http://127.0.0.1:{}/health", port);

    axum::serve(listener, app).await?;

    Ok(())
}
