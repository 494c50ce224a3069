//! Wait engine
//!
//! Polls a [`TaskSource`] until every requested task reaches a terminal state,
//! a transport error occurs, or the timeout elapses.
//!
//! The initial snapshot is taken in the caller's flow. If anything is still
//! pending, a single background poller is spawned and raced against the
//! deadline. The poller holds a [`CancellationToken`] that is cancelled when
//! [`WaitEngine::wait`] returns, so a poller that lost the race stops at its
//! next sleep or in-flight request and prints nothing further.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::presenter::{RenderedActivities, TaskPresenter};
use crate::source::{TaskSource, TransportError};
use crate::task::{TaskSnapshot, TaskStatus};

/// Delay between two polls of the task source
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default overall wait timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

/// Wait errors
#[derive(Error, Debug)]
pub enum WaitError {
    #[error("no server task IDs provided, at least one is required")]
    NoJobsProvided,

    #[error("--progress flag is only supported when waiting for a single task")]
    ProgressRequiresSingleJob,

    #[error("no server tasks found")]
    NoTasksFound,

    #[error(transparent)]
    SnapshotFetchFailed(#[from] TransportError),

    #[error("One or more deployment tasks failed: {}", .0.join(", "))]
    TasksFailed(Vec<String>),

    #[error("timeout while waiting for pending tasks")]
    WaitTimeout,

    #[error("task poller stopped unexpectedly: {0}")]
    PollerAborted(String),
}

/// Options for a single wait
#[derive(Debug, Clone)]
pub struct WaitOptions {
    /// Deadline measured from the start of polling
    pub timeout: Duration,
    /// Render the activity log of the (single) task while waiting
    pub show_progress: bool,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            show_progress: false,
        }
    }
}

/// Waits for server tasks to finish
pub struct WaitEngine<W: Write + Send + 'static> {
    source: Arc<dyn TaskSource>,
    presenter: TaskPresenter<W>,
}

impl<W: Write + Send + 'static> WaitEngine<W> {
    pub fn new(source: Arc<dyn TaskSource>, presenter: TaskPresenter<W>) -> Self {
        Self { source, presenter }
    }

    /// Wait until all `task_ids` have completed.
    ///
    /// Fails with [`WaitError::TasksFailed`] listing every task that finished
    /// unsuccessfully, or with the first transport error seen.
    pub async fn wait(self, task_ids: &[String], options: &WaitOptions) -> Result<(), WaitError> {
        if task_ids.is_empty() {
            return Err(WaitError::NoJobsProvided);
        }

        if options.show_progress && task_ids.len() > 1 {
            return Err(WaitError::ProgressRequiresSingleJob);
        }

        let Self {
            source,
            mut presenter,
        } = self;

        let tasks = source.fetch_snapshots(task_ids).await?;
        if tasks.is_empty() {
            return Err(WaitError::NoTasksFound);
        }

        let mut pending = Vec::new();
        let mut failed = Vec::new();
        for task in &tasks {
            match task.status() {
                TaskStatus::Pending => pending.push(task.id.clone()),
                TaskStatus::Failed => failed.push(task.id.clone()),
                TaskStatus::Succeeded => {}
            }
            presenter.print_task_info(task);
        }

        if pending.is_empty() {
            return finish(failed);
        }

        tracing::info!(
            "Waiting for {} pending task(s), timeout {}s",
            pending.len(),
            options.timeout.as_secs()
        );

        let cancel = CancellationToken::new();
        let _stop_poller = cancel.clone().drop_guard();

        let poller = Poller {
            source,
            presenter,
            pending,
            failed,
            rendered: RenderedActivities::new(),
            show_progress: options.show_progress,
            cancel,
        };
        let mut handle = tokio::spawn(poller.run());

        match tokio::time::timeout(options.timeout, &mut handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(WaitError::PollerAborted(e.to_string())),
            Err(_) => {
                tracing::warn!("Timed out after {}s", options.timeout.as_secs());
                handle.abort();
                Err(WaitError::WaitTimeout)
            }
        }
    }
}

fn finish(failed: Vec<String>) -> Result<(), WaitError> {
    if failed.is_empty() {
        Ok(())
    } else {
        Err(WaitError::TasksFailed(failed))
    }
}

/// Background polling state; owned exclusively by the spawned task
struct Poller<W: Write> {
    source: Arc<dyn TaskSource>,
    presenter: TaskPresenter<W>,
    pending: Vec<String>,
    failed: Vec<String>,
    rendered: RenderedActivities,
    show_progress: bool,
    cancel: CancellationToken,
}

impl<W: Write> Poller<W> {
    async fn run(mut self) -> Result<(), WaitError> {
        while !self.pending.is_empty() {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    tracing::debug!("Poller cancelled with {} task(s) pending", self.pending.len());
                    return Ok(());
                }
                _ = tokio::time::sleep(POLL_INTERVAL) => {}
            }

            tracing::debug!("Polling {} pending task(s)", self.pending.len());
            let tasks = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    tracing::debug!("Poller cancelled during snapshot fetch");
                    return Ok(());
                }
                fetched = self.source.fetch_snapshots(&self.pending) => fetched?,
            };

            for task in &tasks {
                if self.show_progress {
                    self.render_progress(&task.id).await;
                }
                // Nothing is printed once the caller has stopped waiting
                if self.cancel.is_cancelled() {
                    return Ok(());
                }
                self.record(task);
            }
        }

        finish(self.failed)
    }

    async fn render_progress(&mut self, task_id: &str) {
        let fetched = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return,
            fetched = self.source.fetch_details(task_id) => fetched,
        };

        match fetched {
            Ok(detail) => {
                for activity in &detail.activity_logs {
                    self.presenter
                        .print_activity_element(activity, 0, &mut self.rendered);
                }
            }
            Err(e) => tracing::debug!("Skipping progress for {}: {}", task_id, e),
        }
    }

    fn record(&mut self, task: &TaskSnapshot) {
        let status = task.status();
        if !status.is_completed() {
            return;
        }

        let Some(index) = self.pending.iter().position(|id| id == &task.id) else {
            return;
        };

        if status == TaskStatus::Failed {
            tracing::info!("Task {} failed", task.id);
            self.failed.push(task.id.clone());
        } else {
            tracing::info!("Task {} completed", task.id);
        }
        self.presenter.print_task_info(task);
        self.pending.swap_remove(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::CallbackSource;

    fn engine(source: CallbackSource) -> WaitEngine<Vec<u8>> {
        WaitEngine::new(Arc::new(source), TaskPresenter::new(Vec::new()))
    }

    #[test]
    fn test_tasks_failed_message() {
        let err = WaitError::TasksFailed(vec!["ServerTasks-1".to_string(), "ServerTasks-3".to_string()]);
        assert_eq!(
            err.to_string(),
            "One or more deployment tasks failed: ServerTasks-1, ServerTasks-3"
        );
    }

    #[test]
    fn test_transport_error_is_surfaced_verbatim() {
        let err = WaitError::from(TransportError::StatusError {
            status: 401,
            body: "Unauthorized".to_string(),
        });
        assert_eq!(err.to_string(), "Server returned 401: Unauthorized");
    }

    #[tokio::test]
    async fn test_no_task_ids() {
        let source = CallbackSource::snapshots_only(|_| panic!("source must not be called"));
        let result = engine(source).wait(&[], &WaitOptions::default()).await;
        assert!(matches!(result, Err(WaitError::NoJobsProvided)));
    }

    #[tokio::test]
    async fn test_progress_requires_single_task() {
        let source = CallbackSource::snapshots_only(|_| panic!("source must not be called"));
        let options = WaitOptions {
            show_progress: true,
            ..Default::default()
        };
        let ids = vec!["ServerTasks-1".to_string(), "ServerTasks-2".to_string()];
        let result = engine(source).wait(&ids, &options).await;
        assert!(matches!(result, Err(WaitError::ProgressRequiresSingleJob)));
    }

    #[tokio::test]
    async fn test_empty_result_is_fatal() {
        let source = CallbackSource::snapshots_only(|_| Ok(Vec::new()));
        let ids = vec!["ServerTasks-1".to_string()];
        let result = engine(source).wait(&ids, &WaitOptions::default()).await;
        assert!(matches!(result, Err(WaitError::NoTasksFound)));
    }
}
