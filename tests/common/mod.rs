//! Shared fixtures for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use learnware_grove::cache::{CacheConfig, CacheManager, ManualClock, MemoryCache};
use learnware_grove::drivers::{DriverResponse, ModelDriver};
use learnware_grove::{ApiKey, ContentGenerator, Error, GenerationParams};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TTL: Duration = Duration::from_secs(3600);

/// Model stub that counts invocations and records the prompts it saw.
///
/// Replies are served from a queue; when the queue runs dry the last reply
/// repeats.
pub struct CountingDriver {
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
    replies: Mutex<VecDeque<Reply>>,
    last: Mutex<Option<Reply>>,
}

#[derive(Clone)]
pub enum Reply {
    Text(String),
    Fail(fn() -> Error),
}

impl CountingDriver {
    pub fn replying(text: &str) -> Arc<Self> {
        Self::with_replies(vec![Reply::Text(text.to_string())])
    }

    pub fn failing(make: fn() -> Error) -> Arc<Self> {
        Self::with_replies(vec![Reply::Fail(make)])
    }

    pub fn with_replies(replies: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
            replies: Mutex::new(replies.into()),
            last: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelDriver for CountingDriver {
    fn provider_id(&self) -> &str {
        "stub"
    }

    fn model(&self) -> &str {
        "stub-model"
    }

    async fn generate_text(
        &self,
        _api_key: &ApiKey,
        prompt: &str,
        _params: &GenerationParams,
    ) -> learnware_grove::Result<DriverResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());

        let next = self.replies.lock().unwrap().pop_front();
        let reply = match next {
            Some(reply) => {
                *self.last.lock().unwrap() = Some(reply.clone());
                reply
            }
            None => self
                .last
                .lock()
                .unwrap()
                .clone()
                .expect("CountingDriver has no replies"),
        };
        match reply {
            Reply::Text(text) => Ok(DriverResponse::text(text)),
            Reply::Fail(make) => Err(make()),
        }
    }
}

/// Cache driven by a manual clock, so tests can step past the TTL.
pub fn manual_cache() -> (Arc<CacheManager>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let cache = Arc::new(CacheManager::new(
        CacheConfig::new().with_ttl(TTL),
        Box::new(MemoryCache::with_clock(100, clock.clone())),
    ));
    (cache, clock)
}

pub fn configured_generator(driver: Arc<CountingDriver>, cache: Arc<CacheManager>) -> ContentGenerator {
    ContentGenerator::builder()
        .driver(driver)
        .cache(cache)
        .api_key("test-key")
        .build()
        .expect("generator builds")
}

pub const COURSE_CONTENT_JSON: &str = r#"{
  "overview": "A practical introduction to relational databases and SQL.",
  "learning_objectives": ["Write SELECT queries", "Design normalized tables"],
  "key_topics": [
    { "title": "Relational model", "description": "Tables, rows and keys." },
    { "title": "SQL basics", "description": "SELECT, WHERE, JOIN." }
  ],
  "prerequisites": ["Basic programming"]
}"#;
