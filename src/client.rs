//! High-level generation client
//!
//! Sequences one logical `generate` invocation: resolve the source reference,
//! submit the task, then poll it to completion, forwarding every progress
//! observation to the caller. Exactly one invocation should be in flight per
//! client instance; the client keeps no shared mutable state and callers
//! (typically a UI disabling its trigger) serialize invocations themselves.

use crate::catalog;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::poller::poll_until_complete;
use crate::transport::{GenerationApi, HttpApi};
use crate::types::{GenerationRequest, ProgressUpdate, UploadedAsset};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use url::Url;

/// File extensions accepted for upload
const ALLOWED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

/// Remote directory catalog images live under, relative to the asset base URL
const CATALOG_IMAGE_PATH: &str = "images/paintings";

/// Phase of one `generate` invocation
///
/// Transitions only move forward: `Idle -> Submitting -> Polling ->
/// {Succeeded | Failed}`, with submission failures jumping straight from
/// `Submitting` to `Failed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GeneratePhase {
    /// No invocation started yet
    Idle,
    /// Submitting the task to the service
    Submitting,
    /// Polling the submitted task until a terminal state
    Polling,
    /// The invocation resolved with a result URL
    Succeeded,
    /// The invocation ended in a terminal failure
    Failed,
}

impl GeneratePhase {
    /// Whether `next` is a legal forward transition from this phase
    pub fn can_advance_to(self, next: GeneratePhase) -> bool {
        use GeneratePhase::*;
        matches!(
            (self, next),
            (Idle, Submitting)
                | (Submitting, Polling)
                | (Submitting, Failed)
                | (Polling, Succeeded)
                | (Polling, Failed)
        )
    }
}

fn advance(phase: &mut GeneratePhase, next: GeneratePhase) {
    debug_assert!(phase.can_advance_to(next));
    tracing::debug!(from = ?phase, to = ?next, "Generation phase transition");
    *phase = next;
}

/// Client for the Kontext image-editing service
///
/// Wraps a [`GenerationApi`] transport with source-reference resolution,
/// upload validation and the poll loop. Construct one per credential via
/// [`KontextClient::new`] and reuse it across invocations.
pub struct KontextClient {
    api: Arc<dyn GenerationApi>,
    config: Config,
    cancel: CancellationToken,
}

impl KontextClient {
    /// Create a client backed by the HTTP transport
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let api = Arc::new(HttpApi::new(&config)?);
        Ok(Self {
            api,
            config,
            cancel: CancellationToken::new(),
        })
    }

    /// Create a client over a custom transport (alternate backends, tests)
    pub fn with_api(api: Arc<dyn GenerationApi>, config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            api,
            config,
            cancel: CancellationToken::new(),
        })
    }

    /// Token that cancels any in-flight poll loop when triggered
    ///
    /// Cancellation is checked before each status query and each interval
    /// sleep; a cancelled invocation returns [`Error::Cancelled`].
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Resolve a source reference to an absolute URL without touching the network
    ///
    /// Absolute `http(s)` URLs pass through unchanged. A catalog painting id
    /// resolves to its filename; that filename (or any other relative
    /// reference) is then joined under `{asset_base_url}/images/paintings/`.
    /// Relative references require `asset_base_url` to be configured.
    pub fn resolve_source_ref(&self, source_ref: &str) -> Result<String> {
        if source_ref.starts_with("http://") || source_ref.starts_with("https://") {
            return Ok(source_ref.to_string());
        }

        let filename = match catalog::find(source_ref) {
            Some(painting) => painting.filename,
            None => source_ref,
        };

        let base = self.config.asset_base_url.as_deref().ok_or_else(|| Error::Config {
            message: format!(
                "source reference {source_ref:?} is not an absolute URL and no asset_base_url is configured"
            ),
            key: Some("asset_base_url".to_string()),
        })?;

        let resolved = format!(
            "{}/{CATALOG_IMAGE_PATH}/{filename}",
            base.trim_end_matches('/')
        );
        Url::parse(&resolved)?;
        Ok(resolved)
    }

    /// Run one full generation: resolve, submit, poll, return the result URL
    ///
    /// Submission failures are terminal and propagate unchanged; nothing is
    /// retried at this layer. The progress callback receives every status
    /// observation the poll loop parses, in receipt order.
    pub async fn generate<F>(&self, request: GenerationRequest, mut on_progress: F) -> Result<String>
    where
        F: FnMut(ProgressUpdate) + Send,
    {
        let mut phase = GeneratePhase::Idle;
        advance(&mut phase, GeneratePhase::Submitting);

        let input_image_url = self.resolve_source_ref(&request.source_ref)?;
        let task_id = match self.api.submit(&input_image_url, &request).await {
            Ok(task_id) => task_id,
            Err(e) => {
                advance(&mut phase, GeneratePhase::Failed);
                return Err(e);
            }
        };

        advance(&mut phase, GeneratePhase::Polling);
        match poll_until_complete(
            self.api.as_ref(),
            &task_id,
            &self.config,
            &self.cancel,
            &mut on_progress,
        )
        .await
        {
            Ok(url) => {
                advance(&mut phase, GeneratePhase::Succeeded);
                Ok(url)
            }
            Err(e) => {
                advance(&mut phase, GeneratePhase::Failed);
                Err(e)
            }
        }
    }

    /// Upload a local source image, returning the hosted asset
    ///
    /// The file is validated before any network call: only JPG, PNG and WEBP
    /// files up to the configured size limit are accepted. The returned asset
    /// is owned by the caller; the client does not retain or re-upload it.
    pub async fn upload_asset(&self, bytes: Vec<u8>, file_name: &str) -> Result<UploadedAsset> {
        self.validate_asset(file_name, bytes.len() as u64)?;

        let url = self.api.upload(bytes, file_name).await?;

        let title = file_name
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .filter(|stem| !stem.is_empty())
            .unwrap_or("Uploaded image")
            .to_string();
        let now = chrono::Utc::now();
        Ok(UploadedAsset {
            id: format!("uploaded-{}-{:08x}", now.timestamp_millis(), rand::random::<u32>()),
            file_name: file_name.to_string(),
            url,
            title,
            uploaded_at: now,
        })
    }

    fn validate_asset(&self, file_name: &str, size: u64) -> Result<()> {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(Error::InvalidAsset(
                "unsupported file format, please upload a JPG, PNG or WEBP image".to_string(),
            ));
        }
        if size > self.config.max_upload_bytes {
            return Err(Error::InvalidAsset(format!(
                "file is too large, the upload limit is {} bytes",
                self.config.max_upload_bytes
            )));
        }
        Ok(())
    }
}
