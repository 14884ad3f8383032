//! API credential sources.
//!
//! Credentials are resolved once, at startup, by walking an ordered
//! [`CredentialChain`]: the writable store first, then read-only fallbacks
//! such as environment variables. The outcome is a [`CredentialState`], either
//! a usable key or an explicit "unconfigured" state.

use crate::error::{Error, ErrorContext};
use crate::Result;
use std::env;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, warn};

pub const KEYRING_SERVICE: &str = "learnware-grove";
pub const KEYRING_ACCOUNT: &str = "gemini_api_key";
pub const ENV_VARS: [&str; 3] = [
    "GEMINI_API_KEY",
    "VITE_GEMINI_API_KEY",
    "NEXT_PUBLIC_GEMINI_API_KEY",
];

/// A non-blank API key. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into().trim().to_string();
        if key.is_empty() {
            return Err(Error::validation_with_context(
                "api key must not be blank",
                ErrorContext::new()
                    .with_field_path("credentials.api_key")
                    .with_source("credentials"),
            ));
        }
        Ok(Self(key))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self.0.chars().count();
        let tail: String = self.0.chars().skip(len.saturating_sub(4)).collect();
        write!(f, "ApiKey(****{})", tail)
    }
}

/// Somewhere a key might be found.
pub trait CredentialSource: Send + Sync {
    fn name(&self) -> &str;
    fn fetch(&self) -> Result<Option<ApiKey>>;
}

/// A source that can also be written to.
pub trait CredentialStore: CredentialSource {
    fn store(&self, key: &ApiKey) -> Result<()>;
}

/// OS keyring entry.
pub struct KeyringStore {
    service: String,
    account: String,
}

impl KeyringStore {
    pub fn new(service: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            account: account.into(),
        }
    }

    fn entry(&self) -> Result<keyring::Entry> {
        keyring::Entry::new(&self.service, &self.account).map_err(|e| self.keyring_error(e))
    }

    fn keyring_error(&self, e: keyring::Error) -> Error {
        Error::configuration_with_context(
            format!("keyring unavailable: {}", e),
            ErrorContext::new()
                .with_details(format!("{}/{}", self.service, self.account))
                .with_source("credentials"),
        )
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new(KEYRING_SERVICE, KEYRING_ACCOUNT)
    }
}

impl CredentialSource for KeyringStore {
    fn name(&self) -> &str {
        "keyring"
    }

    fn fetch(&self) -> Result<Option<ApiKey>> {
        match self.entry()?.get_password() {
            Ok(secret) => Ok(ApiKey::new(secret).ok()),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(self.keyring_error(e)),
        }
    }
}

impl CredentialStore for KeyringStore {
    fn store(&self, key: &ApiKey) -> Result<()> {
        self.entry()?
            .set_password(key.expose())
            .map_err(|e| self.keyring_error(e))
    }
}

/// First non-blank value among a list of environment variables.
pub struct EnvSource {
    vars: Vec<String>,
}

impl EnvSource {
    pub fn new<I, S>(vars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            vars: vars.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for EnvSource {
    fn default() -> Self {
        Self::new(ENV_VARS)
    }
}

impl CredentialSource for EnvSource {
    fn name(&self) -> &str {
        "environment"
    }

    fn fetch(&self) -> Result<Option<ApiKey>> {
        Ok(self
            .vars
            .iter()
            .filter_map(|v| env::var(v).ok())
            .find_map(|s| ApiKey::new(s).ok()))
    }
}

/// In-process store, e.g. a settings row already loaded into memory.
#[derive(Default)]
pub struct MemoryStore {
    key: RwLock<Option<ApiKey>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(key: ApiKey) -> Self {
        Self {
            key: RwLock::new(Some(key)),
        }
    }
}

impl CredentialSource for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn fetch(&self) -> Result<Option<ApiKey>> {
        Ok(self.key.read().unwrap_or_else(PoisonError::into_inner).clone())
    }
}

impl CredentialStore for MemoryStore {
    fn store(&self, key: &ApiKey) -> Result<()> {
        *self.key.write().unwrap_or_else(PoisonError::into_inner) = Some(key.clone());
        Ok(())
    }
}

/// Result of credential resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialState {
    Configured { key: ApiKey, source: String },
    Unconfigured,
}

impl CredentialState {
    pub fn key(&self) -> Option<&ApiKey> {
        match self {
            CredentialState::Configured { key, .. } => Some(key),
            CredentialState::Unconfigured => None,
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, CredentialState::Configured { .. })
    }
}

/// Ordered credential lookup: writable store, then fallbacks.
#[derive(Default, Clone)]
pub struct CredentialChain {
    store: Option<Arc<dyn CredentialStore>>,
    fallbacks: Vec<Arc<dyn CredentialSource>>,
}

impl CredentialChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keyring, then the `GEMINI_API_KEY` family of environment variables.
    pub fn standard() -> Self {
        Self::new()
            .with_store(Arc::new(KeyringStore::default()))
            .with_fallback(Arc::new(EnvSource::default()))
    }

    pub fn with_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_fallback(mut self, source: Arc<dyn CredentialSource>) -> Self {
        self.fallbacks.push(source);
        self
    }

    pub fn store(&self) -> Option<&Arc<dyn CredentialStore>> {
        self.store.as_ref()
    }

    /// Walk the chain once. A key found in a fallback is copied into the store.
    ///
    /// A source that errors is logged and skipped.
    pub fn resolve(&self) -> CredentialState {
        self.walk(true)
    }

    /// Same lookup as [`resolve`](Self::resolve) without writing anything back.
    pub fn peek(&self) -> CredentialState {
        self.walk(false)
    }

    fn walk(&self, write_back: bool) -> CredentialState {
        if let Some(ref store) = self.store {
            match store.fetch() {
                Ok(Some(key)) => {
                    debug!(source = store.name(), "api key resolved");
                    return CredentialState::Configured {
                        key,
                        source: store.name().to_string(),
                    };
                }
                Ok(None) => {}
                Err(e) => warn!(source = store.name(), error = %e, "credential store lookup failed"),
            }
        }

        for source in &self.fallbacks {
            match source.fetch() {
                Ok(Some(key)) => {
                    debug!(source = source.name(), "api key resolved");
                    if let Some(store) = self.store.as_ref().filter(|_| write_back) {
                        if let Err(e) = store.store(&key) {
                            warn!(store = store.name(), error = %e, "could not persist api key");
                        }
                    }
                    return CredentialState::Configured {
                        key,
                        source: source.name().to_string(),
                    };
                }
                Ok(None) => {}
                Err(e) => warn!(source = source.name(), error = %e, "credential source lookup failed"),
            }
        }

        warn!("Gemini API key not found in any credential source");
        CredentialState::Unconfigured
    }
}
