//! Task status sources
//!
//! The wait engine only talks to the server through [`TaskSource`], so tests
//! (and other hosts) can substitute their own implementation.

use async_trait::async_trait;
use thiserror::Error;

use crate::task::{TaskDetail, TaskSnapshot};

/// Failure talking to the task server
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Server returned {status}: {body}")]
    StatusError { status: u16, body: String },

    #[error("Failed to decode server response: {0}")]
    DecodeError(#[from] serde_json::Error),

    #[error("Client configuration error: {0}")]
    ConfigError(String),
}

/// Source of task snapshots and activity details
#[async_trait]
pub trait TaskSource: Send + Sync {
    /// Fetch current snapshots for the given task IDs
    async fn fetch_snapshots(&self, task_ids: &[String]) -> Result<Vec<TaskSnapshot>, TransportError>;

    /// Fetch the nested activity log for one task
    async fn fetch_details(&self, task_id: &str) -> Result<TaskDetail, TransportError>;
}

type SnapshotFn = dyn Fn(&[String]) -> Result<Vec<TaskSnapshot>, TransportError> + Send + Sync;
type DetailFn = dyn Fn(&str) -> Result<TaskDetail, TransportError> + Send + Sync;

/// Adapts a pair of plain callbacks into a [`TaskSource`]
pub struct CallbackSource {
    snapshots: Box<SnapshotFn>,
    details: Box<DetailFn>,
}

impl CallbackSource {
    pub fn new<S, D>(snapshots: S, details: D) -> Self
    where
        S: Fn(&[String]) -> Result<Vec<TaskSnapshot>, TransportError> + Send + Sync + 'static,
        D: Fn(&str) -> Result<TaskDetail, TransportError> + Send + Sync + 'static,
    {
        Self {
            snapshots: Box::new(snapshots),
            details: Box::new(details),
        }
    }

    /// Source without activity details; every detail fetch returns an empty log
    pub fn snapshots_only<S>(snapshots: S) -> Self
    where
        S: Fn(&[String]) -> Result<Vec<TaskSnapshot>, TransportError> + Send + Sync + 'static,
    {
        Self::new(snapshots, |_| Ok(TaskDetail::default()))
    }
}

#[async_trait]
impl TaskSource for CallbackSource {
    async fn fetch_snapshots(&self, task_ids: &[String]) -> Result<Vec<TaskSnapshot>, TransportError> {
        (self.snapshots)(task_ids)
    }

    async fn fetch_details(&self, task_id: &str) -> Result<TaskDetail, TransportError> {
        (self.details)(task_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_callback_source_forwards_arguments() {
        let source = CallbackSource::new(
            |ids| {
                Ok(ids
                    .iter()
                    .map(|id| TaskSnapshot {
                        id: id.clone(),
                        ..Default::default()
                    })
                    .collect())
            },
            |id| {
                Err(TransportError::StatusError {
                    status: 404,
                    body: format!("{} not found", id),
                })
            },
        );

        let tasks = source
            .fetch_snapshots(&["ServerTasks-1".to_string(), "ServerTasks-2".to_string()])
            .await
            .unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[1].id, "ServerTasks-2");

        let err = source.fetch_details("ServerTasks-3").await.unwrap_err();
        assert_eq!(err.to_string(), "Server returned 404: ServerTasks-3 not found");
    }

    #[tokio::test]
    async fn test_snapshots_only_has_empty_details() {
        let source = CallbackSource::snapshots_only(|_| Ok(Vec::new()));
        let detail = source.fetch_details("ServerTasks-1").await.unwrap();
        assert!(detail.activity_logs.is_empty());
    }
}
