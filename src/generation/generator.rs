use arc_swap::ArcSwapOption;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::prompts::build_prompt;
use super::request::{ContentKind, GenerationRequest};
use super::result::{
    CourseContent, ErrorResult, GenerationOutcome, GenerationResult, Quiz, ResearchAssistance,
    StudyMaterial,
};
use crate::cache::{CacheConfig, CacheKey, CacheKeyGenerator, CacheManager, MemoryCache};
use crate::classification::{log_error, AppError};
use crate::config::{GenerationParams, GeneratorConfig};
use crate::credentials::{ApiKey, CredentialChain, CredentialState, CredentialStore};
use crate::drivers::{GeminiDriver, ModelDriver};
use crate::error_code::ErrorCode;
use crate::Result;

const NOT_CONFIGURED: &str = "Gemini service is not initialized. Please set a valid API key.";

/// Generates learning content through a [`ModelDriver`], caching every
/// successful result.
///
/// Each call runs: credential check → prompt → cache lookup → one model call →
/// tolerant parse → cache write. Failures never reach the cache.
///
/// Concurrent identical calls are not coalesced: both may miss and both call
/// the model, and the later write wins.
pub struct ContentGenerator {
    driver: Arc<dyn ModelDriver>,
    cache: Arc<CacheManager>,
    keys: CacheKeyGenerator,
    params: GenerationParams,
    credential: ArcSwapOption<ApiKey>,
    store: Option<Arc<dyn CredentialStore>>,
}

impl ContentGenerator {
    pub fn builder() -> ContentGeneratorBuilder {
        ContentGeneratorBuilder::new()
    }

    pub async fn generate(&self, request: &GenerationRequest) -> GenerationOutcome {
        let Some(api_key) = self.credential.load_full() else {
            let err = AppError::new(ErrorCode::AuthError, NOT_CONFIGURED);
            log_error(&err);
            return Err(err.into());
        };

        let prompt = build_prompt(request);
        let key = self.cache_key_for(request);

        if let Some(hit) = self.cache.get::<GenerationResult>(&key).await {
            if hit.kind() == request.kind {
                return Ok(hit);
            }
            warn!(key = %key, "cached result has the wrong kind, ignoring");
        }

        let started = Instant::now();
        let response = match self
            .driver
            .generate_text(&api_key, &prompt, &self.params)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                let err = model_call_failure(AppError::from(&e));
                log_error(&err);
                return Err(err.into());
            }
        };
        debug!(
            kind = %request.kind,
            provider = self.driver.provider_id(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "model call returned"
        );

        let result = match GenerationResult::from_model_text(request.kind, &response.content) {
            Ok(result) => result,
            Err(invalid) => {
                let err = ErrorResult::from(invalid);
                log_error(&AppError::new(err.kind, err.message.clone()).with_details(json!({
                    "kind": request.kind,
                    "raw_len": response.content.len(),
                })));
                return Err(err);
            }
        };

        self.cache.set(&key, &result).await;
        info!(kind = %request.kind, key = %key, "generated and cached");
        Ok(result)
    }

    pub async fn generate_course_content(
        &self,
        subject_name: &str,
        topic: &str,
    ) -> std::result::Result<CourseContent, ErrorResult> {
        let request = GenerationRequest::new(ContentKind::CourseContent, subject_name).with_topic(topic);
        match self.generate(&request).await? {
            GenerationResult::CourseContent(content) => Ok(content),
            other => Err(kind_mismatch(ContentKind::CourseContent, &other)),
        }
    }

    pub async fn generate_course_description(
        &self,
        subject_name: &str,
        topic: Option<&str>,
    ) -> std::result::Result<String, ErrorResult> {
        let mut request = GenerationRequest::new(ContentKind::CourseDescription, subject_name);
        if let Some(topic) = topic {
            request = request.with_topic(topic);
        }
        match self.generate(&request).await? {
            GenerationResult::CourseDescription(text) => Ok(text),
            other => Err(kind_mismatch(ContentKind::CourseDescription, &other)),
        }
    }

    pub async fn generate_study_material(
        &self,
        subject_name: &str,
        topic: &str,
    ) -> std::result::Result<StudyMaterial, ErrorResult> {
        let request = GenerationRequest::new(ContentKind::StudyMaterial, subject_name).with_topic(topic);
        match self.generate(&request).await? {
            GenerationResult::StudyMaterial(material) => Ok(material),
            other => Err(kind_mismatch(ContentKind::StudyMaterial, &other)),
        }
    }

    pub async fn generate_quiz(
        &self,
        subject_name: &str,
        topic: Option<&str>,
    ) -> std::result::Result<Quiz, ErrorResult> {
        let mut request = GenerationRequest::new(ContentKind::Quiz, subject_name);
        if let Some(topic) = topic {
            request = request.with_topic(topic);
        }
        match self.generate(&request).await? {
            GenerationResult::Quiz(quiz) => Ok(quiz),
            other => Err(kind_mismatch(ContentKind::Quiz, &other)),
        }
    }

    pub async fn research_assistance(
        &self,
        query: &str,
    ) -> std::result::Result<ResearchAssistance, ErrorResult> {
        let request = GenerationRequest::new(ContentKind::ResearchAssistance, query);
        match self.generate(&request).await? {
            GenerationResult::ResearchAssistance(research) => Ok(research),
            other => Err(kind_mismatch(ContentKind::ResearchAssistance, &other)),
        }
    }

    /// Replace the active key. The key is also written to the credential
    /// store when one is wired in; a store failure leaves the old key active.
    pub fn set_api_key(&self, key: &str) -> Result<()> {
        let key = ApiKey::new(key)?;
        if let Some(ref store) = self.store {
            store.store(&key)?;
        }
        self.credential.store(Some(Arc::new(key)));
        info!("api key updated");
        Ok(())
    }

    pub fn api_key(&self) -> Option<ApiKey> {
        self.credential.load_full().map(|k| (*k).clone())
    }

    pub fn is_configured(&self) -> bool {
        self.credential.load().is_some()
    }

    /// Forget the active key. The credential store is left untouched.
    pub fn clear_api_key(&self) {
        self.credential.store(None);
    }

    pub fn cache_key_for(&self, request: &GenerationRequest) -> CacheKey {
        self.keys
            .generate(request.kind.operation(), &request.cache_args())
    }

    pub fn cache(&self) -> &Arc<CacheManager> {
        &self.cache
    }

    pub fn driver(&self) -> &Arc<dyn ModelDriver> {
        &self.driver
    }
}

/// A model call that did not produce text is reported as a provider error.
/// The underlying classification is kept under `details.cause`.
fn model_call_failure(cause: AppError) -> AppError {
    let mut details = json!({ "cause": cause.code });
    if let Some(inner) = cause.details {
        details["details"] = inner;
    }
    AppError::new(ErrorCode::ModelProviderError, cause.message).with_details(details)
}

fn kind_mismatch(expected: ContentKind, got: &GenerationResult) -> ErrorResult {
    ErrorResult {
        kind: ErrorCode::UnknownError,
        message: format!("expected {} result, got {}", expected, got.kind()),
        raw_text: None,
        details: None,
    }
}

/// Assembles a [`ContentGenerator`].
///
/// Anything not supplied is built from the [`GeneratorConfig`]: a Gemini
/// driver and an in-memory cache. Without a key or a credential chain the
/// generator starts unconfigured.
pub struct ContentGeneratorBuilder {
    config: GeneratorConfig,
    driver: Option<Arc<dyn ModelDriver>>,
    cache: Option<Arc<CacheManager>>,
    credentials: Option<CredentialChain>,
    api_key: Option<String>,
}

impl ContentGeneratorBuilder {
    pub fn new() -> Self {
        Self {
            config: GeneratorConfig::default(),
            driver: None,
            cache: None,
            credentials: None,
            api_key: None,
        }
    }

    pub fn config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn driver(mut self, driver: Arc<dyn ModelDriver>) -> Self {
        self.driver = Some(driver);
        self
    }

    /// Share a cache between generators, or inject one driven by a manual clock.
    pub fn cache(mut self, cache: Arc<CacheManager>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Resolve the key from this chain when building.
    pub fn credentials(mut self, chain: CredentialChain) -> Self {
        self.credentials = Some(chain);
        self
    }

    /// Use this key directly. Takes precedence over the chain.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn build(self) -> Result<ContentGenerator> {
        let driver: Arc<dyn ModelDriver> = match self.driver {
            Some(driver) => driver,
            None => Arc::new(GeminiDriver::from_config(&self.config)?),
        };

        let cache = self.cache.unwrap_or_else(|| {
            Arc::new(CacheManager::new(
                CacheConfig::new().with_ttl(self.config.cache_ttl),
                Box::new(MemoryCache::new(self.config.cache_max_entries)),
            ))
        });

        let store = self
            .credentials
            .as_ref()
            .and_then(|chain| chain.store().cloned());

        let key = match self.api_key {
            Some(raw) => Some(ApiKey::new(raw)?),
            None => match self.credentials.as_ref().map(CredentialChain::resolve) {
                Some(CredentialState::Configured { key, source }) => {
                    debug!(source = %source, "generator configured from credential chain");
                    Some(key)
                }
                Some(CredentialState::Unconfigured) | None => None,
            },
        };

        info!(
            provider = driver.provider_id(),
            model = driver.model(),
            configured = key.is_some(),
            cache = cache.backend_name(),
            "content generator ready"
        );

        Ok(ContentGenerator {
            driver,
            cache,
            keys: CacheKeyGenerator::new(),
            params: self.config.params,
            credential: ArcSwapOption::from(key.map(Arc::new)),
            store,
        })
    }
}

impl Default for ContentGeneratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
