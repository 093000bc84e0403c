//! # kontext-client
//!
//! Async client library for FLUX.1 Kontext image-editing tasks.
//!
//! The service is itself asynchronous: a submitted task returns an opaque id
//! immediately and must be polled until it reaches a terminal state. This
//! crate drives that lifecycle - upload a source image if needed, submit the
//! task, poll at a fixed interval until completion, failure, timeout or
//! cancellation - and reports every status observation to a progress
//! callback the embedding UI renders directly.
//!
//! ## Design Philosophy
//!
//! kontext-client is designed to be:
//! - **Library-first** - no CLI or UI, purely a Rust crate for embedding
//! - **Typed at the seams** - lifecycle states, errors and wire payloads are
//!   explicit types, never stringly-typed flags
//! - **Honest about failure** - transport, service, protocol and timeout
//!   failures are distinct and nothing is silently coerced into success
//!
//! ## Quick Start
//!
//! ```no_run
//! use kontext_client::{Config, GenerationRequest, KontextClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = KontextClient::new(Config::from_env()?)?;
//!
//!     let request = GenerationRequest::new("starry-night", "add a rising full moon");
//!     let result_url = client
//!         .generate(request, |update| {
//!             println!("{}: {:?}%", update.state, update.progress);
//!         })
//!         .await?;
//!
//!     println!("Edited image at {result_url}");
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Built-in reference painting catalog
pub mod catalog;
/// High-level generation client
pub mod client;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Poll-until-terminal task loop
pub mod poller;
/// HTTP transport and the transport trait
pub mod transport;
/// Core types and lifecycle states
pub mod types;

// Re-export commonly used types
pub use catalog::{PAINTINGS, Painting};
pub use client::{GeneratePhase, KontextClient};
pub use config::{API_KEY_ENV, Config};
pub use error::{Error, IsRetryable, Result};
pub use transport::{GenerationApi, HttpApi};
pub use types::{
    GenerationRequest, GenerationTask, ProgressUpdate, StatusSnapshot, TaskId, TaskState,
    UploadedAsset,
};
