//! Environment-driven configuration
//!
//! All settings are optional: every field has a compiled default, and the
//! translation key in particular may be absent, which switches the
//! translator into pass-through mode instead of failing startup.

use tracing::{info, warn};

/// Default listen port
const DEFAULT_PORT: u16 = 5730;

/// Default content host serving chart records ({path} appended)
const DEFAULT_DATASET_BASE_URL: &str =
    "https://api.github.com/repos/klq-data/kchart-monthly/contents";

/// Default translation endpoint (DeepL-compatible form POST)
const DEFAULT_TRANSLATE_API_URL: &str = "https://api-free.deepl.com/v2/translate";

/// Default chart year range sampled by the random strategies
const DEFAULT_YEAR_MIN: u16 = 2010;
const DEFAULT_YEAR_MAX: u16 = 2024;

/// Service configuration resolved from the environment
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP listen port (`KLQ_PORT`)
    pub port: u16,
    /// Allowed CORS origins (`KLQ_ALLOWED_ORIGINS`, comma-separated);
    /// empty means permissive
    pub allowed_origins: Vec<String>,
    /// Base URL of the content host (`KLQ_DATASET_BASE_URL`)
    pub dataset_base_url: String,
    /// Optional bearer token for the content host (`KLQ_DATASET_TOKEN`)
    pub dataset_token: Option<String>,
    /// Translation endpoint (`KLQ_TRANSLATE_API_URL`)
    pub translate_api_url: String,
    /// Translation API key (`KLQ_TRANSLATE_API_KEY`); absent disables
    /// translation and the batcher echoes source lines
    pub translate_api_key: Option<String>,
    /// Inclusive year range for random sampling (`KLQ_YEAR_MIN`/`KLQ_YEAR_MAX`)
    pub year_min: u16,
    pub year_max: u16,
}

impl Config {
    /// Resolve configuration from environment variables, falling back to
    /// compiled defaults. Never fails; bad numeric values are logged and
    /// replaced by the default.
    pub fn from_env() -> Self {
        let port = parse_env("KLQ_PORT", DEFAULT_PORT);
        let allowed_origins = std::env::var("KLQ_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let dataset_base_url = non_empty_env("KLQ_DATASET_BASE_URL")
            .unwrap_or_else(|| DEFAULT_DATASET_BASE_URL.to_string());
        let dataset_token = non_empty_env("KLQ_DATASET_TOKEN");

        let translate_api_url = non_empty_env("KLQ_TRANSLATE_API_URL")
            .unwrap_or_else(|| DEFAULT_TRANSLATE_API_URL.to_string());
        let translate_api_key = non_empty_env("KLQ_TRANSLATE_API_KEY");

        let year_min = parse_env("KLQ_YEAR_MIN", DEFAULT_YEAR_MIN);
        let year_max = parse_env("KLQ_YEAR_MAX", DEFAULT_YEAR_MAX);
        let (year_min, year_max) = if year_min > year_max {
            warn!(
                year_min,
                year_max, "KLQ_YEAR_MIN > KLQ_YEAR_MAX, using defaults"
            );
            (DEFAULT_YEAR_MIN, DEFAULT_YEAR_MAX)
        } else {
            (year_min, year_max)
        };

        if translate_api_key.is_none() {
            info!("Translation API key not configured, translator runs in pass-through mode");
        }

        Self {
            port,
            allowed_origins,
            dataset_base_url,
            dataset_token,
            translate_api_url,
            translate_api_key,
            year_min,
            year_max,
        }
    }
}

/// Read an environment variable, treating empty/whitespace values as unset
fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a numeric environment variable with a default fallback
fn parse_env<T: std::str::FromStr + Copy>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => match raw.trim().parse() {
            Ok(v) => v,
            Err(_) => {
                warn!(%name, %raw, "Unparseable numeric environment variable, using default");
                default
            }
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_environment() {
        // Relies on the test process not exporting KLQ_* variables
        let config = Config::from_env();
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.translate_api_key.is_none());
        assert!(config.year_min <= config.year_max);
    }
}
