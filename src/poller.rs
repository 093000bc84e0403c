//! Poll-until-terminal loop for generation tasks
//!
//! Queries task status at a fixed interval until the task completes, fails,
//! the wall-clock ceiling fires, or the caller cancels. Transient transport
//! failures are retried transparently inside the same ceiling; any
//! application-level error aborts the loop immediately. Every successfully
//! parsed observation is delivered to the progress callback exactly once, in
//! receipt order, before the loop sleeps or terminates.

use crate::config::Config;
use crate::error::{Error, IsRetryable, Result};
use crate::transport::GenerationApi;
use crate::types::{GenerationTask, ProgressUpdate, TaskId, TaskState};
use tokio_util::sync::CancellationToken;

/// Shown when a task fails without a server-supplied reason
const GENERIC_FAILURE_MESSAGE: &str =
    "Generation failed, please adjust your prompt and try again. \
     The prompt may be unsuitable or too complex.";

/// Poll a task until it reaches a terminal state, returning the result URL
///
/// The cancellation token is checked before each query and raced against each
/// interval sleep; a cancelled token surfaces as [`Error::Cancelled`]. A task
/// that claims completion without carrying a result URL is a protocol
/// failure, never a success.
pub async fn poll_until_complete<F>(
    api: &dyn GenerationApi,
    task_id: &TaskId,
    config: &Config,
    cancel: &CancellationToken,
    on_progress: &mut F,
) -> Result<String>
where
    F: FnMut(ProgressUpdate) + Send,
{
    let started = tokio::time::Instant::now();
    let mut task = GenerationTask::new(task_id.clone());
    tracing::info!(task_id = %task.id, "Polling task until terminal state");

    loop {
        if cancel.is_cancelled() {
            tracing::info!(task_id = %task.id, "Polling cancelled by caller");
            return Err(Error::Cancelled);
        }
        if started.elapsed() >= config.poll_timeout {
            tracing::error!(
                task_id = %task.id,
                timeout_secs = config.poll_timeout.as_secs(),
                "Gave up waiting for task to reach a terminal state"
            );
            return Err(Error::Timeout(config.poll_timeout));
        }

        match api.query(&task.id).await {
            Ok(snapshot) => {
                let update = task.observe(&snapshot);
                let state = update.state;
                on_progress(update);

                match state {
                    TaskState::Completed => {
                        return match task.result_url {
                            Some(url) => {
                                tracing::info!(task_id = %task.id, url = %url, "Task completed");
                                Ok(url)
                            }
                            None => Err(Error::Protocol(
                                "task completed without a result image URL".to_string(),
                            )),
                        };
                    }
                    TaskState::Failed => {
                        let message = task
                            .error
                            .take()
                            .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string());
                        tracing::error!(task_id = %task.id, error = %message, "Task failed");
                        return Err(Error::Service(message));
                    }
                    state => {
                        tracing::debug!(task_id = %task.id, state = %state, "Task not yet terminal");
                    }
                }
            }
            Err(e) if e.is_retryable() => {
                tracing::warn!(task_id = %task.id, error = %e, "Transient polling failure, retrying");
            }
            Err(e) => {
                tracing::error!(task_id = %task.id, error = %e, "Polling aborted");
                return Err(e);
            }
        }

        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!(task_id = %task.id, "Polling cancelled by caller");
                return Err(Error::Cancelled);
            }
            _ = tokio::time::sleep(config.poll_interval) => {}
        }
    }
}
