//! # learnware-grove
//!
//! AI-assisted study content for Learnware Grove: course outlines,
//! descriptions, study material, quizzes and research overviews generated by
//! a Gemini model, cached per request and merged into a user's course records.
//!
//! ## Overview
//!
//! A caller builds a [`ContentGenerator`] once and passes it to whatever owns
//! the request lifecycle. Each [`generate`](ContentGenerator::generate) call is
//! one linear pass:
//!
//! 1. fail fast with `AUTH_ERROR` when no API key is configured;
//! 2. fill the prompt template for the requested [`ContentKind`];
//! 3. return the cached result if an identical request was answered within the TTL;
//! 4. make exactly one model call (no retry);
//! 5. parse the reply tolerantly (strict JSON, then the outermost `{...}` span);
//! 6. cache and return the typed result.
//!
//! Failures are never thrown at the caller: they come back as an
//! [`ErrorResult`] carrying a normalized [`ErrorCode`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use learnware_grove::{ContentGenerator, CredentialChain, GeneratorConfig};
//!
//! #[tokio::main]
//! async fn main() -> learnware_grove::Result<()> {
//!     let generator = ContentGenerator::builder()
//!         .config(GeneratorConfig::from_env())
//!         .credentials(CredentialChain::standard())
//!         .build()?;
//!
//!     match generator.generate_course_content("Intro to Databases", "SQL Basics").await {
//!         Ok(content) => println!("{}", content.overview),
//!         Err(e) => eprintln!("{}", e),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`generation`] | Requests, prompt templates, tolerant parsing, result types, the generator |
//! | [`cache`] | TTL cache with lazy expiry and deterministic keys |
//! | [`classification`] | Error normalization into [`AppError`] and structured error logging |
//! | [`credentials`] | Ordered API key lookup (keyring, then environment) |
//! | [`drivers`] | Model driver trait and the Gemini implementation |
//! | [`transport`] | HTTP transport used by drivers |
//! | [`persistence`] | Owner-scoped record store boundary and merging of results into courses |
//! | [`config`] | Model, generation and cache settings from the environment |

pub mod cache;
pub mod classification;
pub mod config;
pub mod credentials;
pub mod drivers;
pub mod error_code;
pub mod generation;
pub mod persistence;
pub mod transport;

// Re-export main types for convenience
pub use classification::{log_error, normalize, AppError, FailureShape};
pub use config::{GenerationParams, GeneratorConfig};
pub use credentials::{ApiKey, CredentialChain, CredentialState};
pub use error_code::ErrorCode;
pub use generation::{
    ContentGenerator, ContentGeneratorBuilder, ContentKind, ErrorResult, GenerationOutcome,
    GenerationRequest, GenerationResult,
};
pub use persistence::{CourseMerger, MemoryRecordStore, OwnerId, RecordStore};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
