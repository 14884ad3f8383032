//! Generator configuration.
//!
//! Defaults mirror the production deployment; every value can be overridden
//! from the environment (`LEARNWARE_*`) or with the `with_*` setters.

use std::env;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 8192;
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 1000;
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Sampling parameters sent with every model call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub max_output_tokens: u32,
    pub temperature: f64,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    pub model: String,
    pub api_base: String,
    pub params: GenerationParams,
    pub cache_ttl: Duration,
    pub cache_max_entries: usize,
    pub http_timeout: Duration,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            params: GenerationParams::default(),
            cache_ttl: DEFAULT_CACHE_TTL,
            cache_max_entries: DEFAULT_CACHE_MAX_ENTRIES,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }
}

impl GeneratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read overrides from the environment. Unset or unparseable variables keep their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            model: env::var("LEARNWARE_MODEL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.model),
            api_base: env::var("LEARNWARE_API_BASE")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.api_base),
            params: GenerationParams {
                max_output_tokens: env_parse("LEARNWARE_MAX_OUTPUT_TOKENS")
                    .unwrap_or(defaults.params.max_output_tokens),
                temperature: env_parse("LEARNWARE_TEMPERATURE")
                    .unwrap_or(defaults.params.temperature),
            },
            cache_ttl: env_parse("LEARNWARE_CACHE_TTL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.cache_ttl),
            cache_max_entries: env_parse::<usize>("LEARNWARE_CACHE_MAX_ENTRIES")
                .map(|n| n.max(1))
                .unwrap_or(defaults.cache_max_entries),
            http_timeout: env_parse("LEARNWARE_HTTP_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.http_timeout),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_cache_max_entries(mut self, n: usize) -> Self {
        self.cache_max_entries = n.max(1);
        self
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.trim().parse::<T>().ok())
}
