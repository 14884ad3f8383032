//! # Response Caching Module
//!
//! Process-local caching of generation results, so that repeating an identical
//! request inside the TTL window does not call the model again.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`CacheManager`] | Typed get/set/has/delete/clear with TTL and statistics |
//! | [`CacheConfig`] | Default TTL and on/off switch |
//! | [`CacheBackend`] | Trait for storage backends |
//! | [`MemoryCache`] | In-memory map with lazy expiry and an entry bound |
//! | [`NullCache`] | No-op backend for disabling caching |
//! | [`CacheKey`] / [`CacheKeyGenerator`] | Deterministic keys from operation + arguments |
//! | [`Clock`] | Time source; [`ManualClock`] lets tests move time forward |
//!
//! ## Expiry
//!
//! Entries carry an absolute expiry (`now + ttl`). Reads that observe
//! `now > expires_at` delete the entry and report a miss. A TTL too large to
//! add to the current instant means the entry never expires. Nothing runs in
//! the background.
//!
//! ## Example
//!
//! ```rust
//! use learnware_grove::cache::{CacheConfig, CacheKeyGenerator, CacheManager, MemoryCache};
//! use std::time::Duration;
//!
//! # tokio_test_block_on(async {
//! let cache = CacheManager::new(
//!     CacheConfig::new().with_ttl(Duration::from_secs(3600)),
//!     Box::new(MemoryCache::new(1000)),
//! );
//! let key = CacheKeyGenerator::new().generate("quiz", &[serde_json::json!("Algebra")]);
//! cache.set(&key, &"cached").await;
//! assert_eq!(cache.get::<String>(&key).await.as_deref(), Some("cached"));
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Runtime::new().unwrap().block_on(f)
//! # }
//! ```

mod backend;
mod clock;
mod key;
mod manager;

pub use backend::{CacheBackend, MemoryCache, NullCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use key::{CacheKey, CacheKeyGenerator};
pub use manager::{CacheConfig, CacheManager, CacheStats};
