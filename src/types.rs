//! Core types for kontext-client

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque identifier for a generation task, assigned by the remote service
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    /// Create a new TaskId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for TaskId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a generation task
///
/// The only states a task may occupy. Transitions are monotonic along
/// `Pending -> Processing -> {Completed | Failed}`; nothing resumes from a
/// terminal state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    /// Accepted by the service but not yet picked up
    Pending,
    /// Actively being generated
    Processing,
    /// Finished successfully with a result image
    Completed,
    /// Finished unsuccessfully
    Failed,
}

impl TaskState {
    /// Map the service's raw completion flag to a lifecycle state
    ///
    /// The flag is the service's numeric success indicator: `1` means the task
    /// completed, `0` means it is still being processed, `3` means it failed.
    /// Any other value, including an absent flag, maps to [`TaskState::Pending`].
    pub fn from_success_flag(flag: Option<i64>) -> Self {
        match flag {
            Some(1) => TaskState::Completed,
            Some(0) => TaskState::Processing,
            Some(3) => TaskState::Failed,
            _ => TaskState::Pending,
        }
    }

    /// Returns true if no further state transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Completed | TaskState::Failed)
    }
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TaskState::Pending => "pending",
            TaskState::Processing => "processing",
            TaskState::Completed => "completed",
            TaskState::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// One status observation as reported by the service for an in-flight task
///
/// This is the parsed form of the nested status payload returned by the
/// status-query operation, before any lifecycle mapping is applied.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusSnapshot {
    /// Raw completion flag (see [`TaskState::from_success_flag`])
    pub success_flag: Option<i64>,
    /// Result image URL, present once generation has completed
    pub result_image_url: Option<String>,
    /// Server-supplied error message, present on failures
    pub error_message: Option<String>,
    /// Generation progress in percent (0-100) when the service reports one
    pub progress: Option<u8>,
}

/// Progress report delivered to the caller's progress callback
///
/// The embedding UI renders this directly: a lifecycle state, a percentage to
/// drive a progress bar, and an optional human-readable message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProgressUpdate {
    /// Lifecycle state at the time of the observation
    pub state: TaskState,
    /// Progress percentage (0-100), filled with a stage-appropriate default
    /// when the service omits one
    pub progress: Option<u8>,
    /// Optional message, carrying the server's error text on failures
    pub message: Option<String>,
}

/// A remote image-generation job tracked through its lifecycle
///
/// Created when a submit call succeeds and mutated only by the poll loop as
/// new status observations arrive. [`GenerationTask::observe`] is the single
/// transition function: it keeps the state monotonic and produces the
/// [`ProgressUpdate`] owed to the caller for that observation.
#[derive(Clone, Debug)]
pub struct GenerationTask {
    /// Service-assigned task identifier
    pub id: TaskId,
    /// Current lifecycle state
    pub state: TaskState,
    /// Last reported progress percentage, if any
    pub progress: Option<u8>,
    /// Result image URL once completed
    pub result_url: Option<String>,
    /// Failure reason once failed
    pub error: Option<String>,
}

impl GenerationTask {
    /// Create a freshly submitted task in the pending state
    pub fn new(id: TaskId) -> Self {
        Self {
            id,
            state: TaskState::Pending,
            progress: None,
            result_url: None,
            error: None,
        }
    }

    /// Apply one status observation and produce the progress report for it
    ///
    /// The task state only moves forward: an observation that maps to an
    /// earlier state than the current one (a service hiccup) updates the
    /// reported progress but not the state. The returned update reflects the
    /// task's state after the transition. Must not be called once the task
    /// has reached a terminal state.
    pub fn observe(&mut self, snapshot: &StatusSnapshot) -> ProgressUpdate {
        debug_assert!(!self.state.is_terminal());

        let observed = TaskState::from_success_flag(snapshot.success_flag);
        if observed > self.state {
            self.state = observed;
        }
        if snapshot.progress.is_some() {
            self.progress = snapshot.progress;
        }

        match self.state {
            TaskState::Pending => ProgressUpdate {
                state: TaskState::Pending,
                progress: Some(self.progress.unwrap_or(10)),
                message: Some("Task submitted, waiting to be processed".to_string()),
            },
            TaskState::Processing => ProgressUpdate {
                state: TaskState::Processing,
                progress: Some(self.progress.unwrap_or(50)),
                message: Some("Generation in progress".to_string()),
            },
            TaskState::Completed => {
                self.result_url = snapshot
                    .result_image_url
                    .as_deref()
                    .filter(|u| !u.is_empty())
                    .map(str::to_string);
                ProgressUpdate {
                    state: TaskState::Completed,
                    progress: Some(100),
                    message: Some("Generation complete".to_string()),
                }
            }
            TaskState::Failed => {
                self.error = snapshot.error_message.clone();
                ProgressUpdate {
                    state: TaskState::Failed,
                    progress: self.progress,
                    message: snapshot.error_message.clone(),
                }
            }
        }
    }
}

/// Default model identifier used when a request does not name one
pub const DEFAULT_MODEL: &str = "flux-kontext-pro";

/// Default output format used when a request does not name one
pub const DEFAULT_OUTPUT_FORMAT: &str = "jpeg";

/// An immutable image-editing request
///
/// Supplied by the caller and never mutated by the client. The source
/// reference may be an absolute URL, a catalog painting id, or a catalog
/// filename; non-absolute references are resolved against the configured
/// asset base URL before submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Source image reference (absolute URL, catalog id, or catalog filename)
    pub source_ref: String,
    /// Free-text editing instruction
    pub prompt: String,
    /// Model identifier (default: "flux-kontext-pro")
    pub model: String,
    /// Output image format (default: "jpeg")
    pub output_format: String,
    /// Whether the service should translate non-English prompts
    pub enable_translation: bool,
}

impl GenerationRequest {
    /// Create a request with the default model, output format and translation setting
    pub fn new(source_ref: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            source_ref: source_ref.into(),
            prompt: prompt.into(),
            model: DEFAULT_MODEL.to_string(),
            output_format: DEFAULT_OUTPUT_FORMAT.to_string(),
            enable_translation: true,
        }
    }

    /// Override the model identifier
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the output format
    pub fn with_output_format(mut self, format: impl Into<String>) -> Self {
        self.output_format = format.into();
        self
    }

    /// Enable or disable prompt translation
    pub fn with_translation(mut self, enable: bool) -> Self {
        self.enable_translation = enable;
        self
    }
}

/// A source image uploaded by the caller and now hosted by the service
///
/// Owned by the caller for the remainder of the session; the client never
/// re-uploads or retains it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedAsset {
    /// Locally generated identifier for the upload
    pub id: String,
    /// Original file name supplied by the caller
    pub file_name: String,
    /// Remote URL where the service hosts the asset
    pub url: String,
    /// Display title derived from the file name
    pub title: String,
    /// When the upload completed
    pub uploaded_at: DateTime<Utc>,
}
