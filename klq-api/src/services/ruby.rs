//! Ruby annotation stage
//!
//! Each translated line gets a pronunciation-annotated form from a stateful
//! reading converter. The converter needs one-time preparation before first
//! use; `tokio::sync::OnceCell` makes that idempotent and lets concurrent
//! callers await the same in-flight warm-up instead of starting a second
//! one. Lines are independent, so a sequence is annotated concurrently with
//! order preserved by `join_all`.

use klq_common::Cache;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

/// Seam to the reading conversion engine.
///
/// `prepare` is a blocking one-time dictionary load; `convert` turns one
/// line into its annotated form.
pub trait ReadingConverter: Send + Sync {
    fn prepare(&self);
    fn convert(&self, line: &str) -> String;
}

/// Production converter backed by kakasi's embedded dictionary.
///
/// Lines containing Japanese get a trailing hiragana reading in full-width
/// parentheses; anything else passes through untouched.
pub struct KakasiConverter;

impl ReadingConverter for KakasiConverter {
    fn prepare(&self) {
        // Warm-up conversion pages the dictionary in before the first request
        let _ = kakasi::convert("初期化");
    }

    fn convert(&self, line: &str) -> String {
        if matches!(kakasi::is_japanese(line), kakasi::IsJapanese::False) {
            return line.to_string();
        }
        let reading = kakasi::convert(line).hiragana;
        if reading == line {
            line.to_string()
        } else {
            format!("{}（{}）", line, reading)
        }
    }
}

/// Cached, lazily initialized line annotation
pub struct RubyAnnotator {
    converter: Arc<dyn ReadingConverter>,
    cache: Arc<Cache>,
    init: OnceCell<()>,
}

impl RubyAnnotator {
    pub fn new(converter: Arc<dyn ReadingConverter>, cache: Arc<Cache>) -> Self {
        Self {
            converter,
            cache,
            init: OnceCell::new(),
        }
    }

    /// One-time converter warm-up. Safe to call concurrently and repeatedly;
    /// after the first success it is a no-op. Suitable for an eager
    /// background call at process start.
    pub async fn ensure_ready(&self) {
        self.init
            .get_or_init(|| async {
                debug!("Preparing reading converter");
                let converter = self.converter.clone();
                if let Err(e) = tokio::task::spawn_blocking(move || converter.prepare()).await {
                    warn!(error = %e, "Converter warm-up task failed");
                }
            })
            .await;
    }

    /// Annotate one line. Empty input short-circuits to empty output without
    /// touching the cache or the converter.
    pub async fn annotate_line(&self, line: &str) -> String {
        if line.is_empty() {
            return String::new();
        }

        let key = format!("ruby:{}", line);
        if let Some(cached) = self.cache.get_as::<String>(&key).await {
            return cached;
        }

        self.ensure_ready().await;
        let annotated = self.converter.convert(line);
        self.cache.set_as(&key, &annotated).await;
        annotated
    }

    /// Annotate a sequence of lines concurrently, preserving input order
    pub async fn annotate_lines(&self, lines: &[String]) -> Vec<String> {
        futures::future::join_all(lines.iter().map(|line| self.annotate_line(line))).await
    }
}
