//! HTTP transport for the Kontext generation service
//!
//! One logical operation per method: multipart file upload, JSON task
//! submission, and read-only status query. Every call attaches the configured
//! bearer credential. Responses arrive in a common envelope
//! (`{code, msg, data}`); a non-success envelope code or HTTP status is
//! surfaced as a service error carrying the server's message when one can be
//! extracted, and bodies that are not valid JSON degrade to a generic message
//! instead of propagating a parse failure.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::{GenerationRequest, StatusSnapshot, TaskId};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

/// Envelope code the service uses to indicate success
const CODE_SUCCESS: i64 = 200;

/// The three remote operations the client depends on
///
/// The poll loop and the orchestrator are written against this trait so task
/// lifecycle logic can be tested with scripted observations instead of live
/// HTTP.
#[async_trait]
pub trait GenerationApi: Send + Sync {
    /// Upload a source image, returning the URL the service hosts it under
    async fn upload(&self, bytes: Vec<u8>, file_name: &str) -> Result<String>;

    /// Submit a generation task for an already-resolved source image URL
    async fn submit(&self, input_image_url: &str, request: &GenerationRequest) -> Result<TaskId>;

    /// Query the current status of a task
    async fn query(&self, task_id: &TaskId) -> Result<StatusSnapshot>;
}

/// JSON body of the submit operation
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitBody<'a> {
    input_image: &'a str,
    prompt: &'a str,
    model: &'a str,
    enable_translation: bool,
    output_format: &'a str,
}

/// `reqwest`-backed implementation of [`GenerationApi`]
pub struct HttpApi {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    upload_url: String,
    upload_path: String,
}

impl HttpApi {
    /// Build a transport from the client configuration
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            upload_url: config.upload_url.clone(),
            upload_path: config.upload_path.clone(),
        })
    }

    /// Read a response body and parse the common `{code, msg, data}` envelope
    ///
    /// Non-2xx statuses become [`Error::Service`] with the server's message
    /// when the body is parseable, else a generic HTTP-status message. A 2xx
    /// body that is not valid JSON is a protocol failure.
    async fn parse_envelope(response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        let body = response.text().await?;

        let value: Value = match serde_json::from_str(&body) {
            Ok(value) => value,
            Err(_) if !status.is_success() => {
                return Err(Error::Service(format!("HTTP {status}")));
            }
            Err(_) => {
                return Err(Error::Protocol(
                    "response body was not valid JSON".to_string(),
                ));
            }
        };

        if !status.is_success() {
            let message = server_message(&value).unwrap_or_else(|| format!("HTTP {status}"));
            return Err(Error::Service(message));
        }

        Ok(value)
    }
}

/// Extract the server's human-readable message from an envelope, if any
fn server_message(value: &Value) -> Option<String> {
    ["msg", "error", "message"]
        .iter()
        .filter_map(|key| value.get(key))
        .filter_map(Value::as_str)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Extract the hosted file URL from an upload response
///
/// The upload service's schema has drifted over time, so the URL is looked up
/// under several fields in fixed priority order. Changing this order risks
/// silently breaking uploads against older deployments.
fn extract_file_url(value: &Value) -> Option<String> {
    const CANDIDATES: [&[&str]; 5] = [
        &["data", "downloadUrl"],
        &["data", "fileUrl"],
        &["data", "url"],
        &["fileUrl"],
        &["url"],
    ];

    CANDIDATES.iter().find_map(|path| {
        path.iter()
            .try_fold(value, |v, key| v.get(key))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

#[async_trait]
impl GenerationApi for HttpApi {
    async fn upload(&self, bytes: Vec<u8>, file_name: &str) -> Result<String> {
        let remote_name = format!("{}-{}", chrono::Utc::now().timestamp_millis(), file_name);
        tracing::debug!(file_name, remote_name = %remote_name, size = bytes.len(), "Uploading source image");

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string()),
            )
            .text("uploadPath", self.upload_path.clone())
            .text("fileName", remote_name);

        let response = self
            .client
            .post(&self.upload_url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        let value = Self::parse_envelope(response).await?;

        let success = value.get("success").and_then(Value::as_bool).unwrap_or(false);
        let code = value.get("code").and_then(Value::as_i64);
        if !success || code != Some(CODE_SUCCESS) {
            let message =
                server_message(&value).unwrap_or_else(|| "upload rejected by service".to_string());
            return Err(Error::Service(format!("upload failed: {message}")));
        }

        let url = extract_file_url(&value).ok_or_else(|| {
            Error::Protocol("upload succeeded but no file URL was found in the response".to_string())
        })?;
        tracing::info!(url = %url, "Source image uploaded");
        Ok(url)
    }

    async fn submit(&self, input_image_url: &str, request: &GenerationRequest) -> Result<TaskId> {
        let body = SubmitBody {
            input_image: input_image_url,
            prompt: &request.prompt,
            model: &request.model,
            enable_translation: request.enable_translation,
            output_format: &request.output_format,
        };

        tracing::debug!(model = %request.model, "Submitting generation task");
        let response = self
            .client
            .post(format!("{}/generate", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let value = Self::parse_envelope(response).await?;

        if value.get("code").and_then(Value::as_i64) != Some(CODE_SUCCESS) {
            let message = server_message(&value).unwrap_or_else(|| "unknown error".to_string());
            return Err(Error::Service(format!("generation failed: {message}")));
        }

        let task_id = value
            .get("data")
            .and_then(|data| data.get("taskId"))
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::Protocol("submit response is missing data.taskId".to_string()))?;

        tracing::info!(task_id, "Generation task submitted");
        Ok(TaskId::new(task_id))
    }

    async fn query(&self, task_id: &TaskId) -> Result<StatusSnapshot> {
        let response = self
            .client
            .get(format!("{}/record-info", self.base_url))
            .query(&[("taskId", task_id.as_str())])
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let value = Self::parse_envelope(response).await?;

        if value.get("code").and_then(Value::as_i64) != Some(CODE_SUCCESS) {
            let message = server_message(&value).unwrap_or_else(|| "unknown error".to_string());
            return Err(Error::Service(format!("status query failed: {message}")));
        }

        let data = value
            .get("data")
            .filter(|data| data.is_object())
            .ok_or_else(|| Error::Protocol("status response is missing data".to_string()))?;

        let snapshot = StatusSnapshot {
            success_flag: data.get("successFlag").and_then(Value::as_i64),
            result_image_url: data
                .get("response")
                .and_then(|r| r.get("resultImageUrl"))
                .and_then(Value::as_str)
                .map(str::to_string),
            error_message: data
                .get("errorMessage")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            progress: data
                .get("progress")
                .and_then(Value::as_f64)
                .map(|p| p.clamp(0.0, 100.0).round() as u8),
        };
        tracing::debug!(task_id = %task_id, flag = ?snapshot.success_flag, "Polled task status");
        Ok(snapshot)
    }
}
