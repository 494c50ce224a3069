//! Server task model
//!
//! Types deserialized from the task server's REST resources: point-in-time task
//! snapshots and the nested activity log used for progress display.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Outcome of a task as far as waiting is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Not completed yet (or completion not reported)
    Pending,
    /// Completed without a reported failure
    Succeeded,
    /// Completed and reported as unsuccessful
    Failed,
}

impl TaskStatus {
    pub fn is_completed(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Server-side task state, as reported by the `State` field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskState {
    Queued,
    Executing,
    Cancelling,
    Success,
    Failed,
    Canceled,
    TimedOut,
    Unknown(String),
}

impl Default for TaskState {
    fn default() -> Self {
        Self::Unknown(String::new())
    }
}

impl From<String> for TaskState {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Queued" => Self::Queued,
            "Executing" => Self::Executing,
            "Cancelling" => Self::Cancelling,
            "Success" => Self::Success,
            "Failed" => Self::Failed,
            "Canceled" => Self::Canceled,
            "TimedOut" => Self::TimedOut,
            _ => Self::Unknown(value),
        }
    }
}

impl From<TaskState> for String {
    fn from(value: TaskState) -> Self {
        value.to_string()
    }
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Queued => write!(f, "Queued"),
            Self::Executing => write!(f, "Executing"),
            Self::Cancelling => write!(f, "Cancelling"),
            Self::Success => write!(f, "Success"),
            Self::Failed => write!(f, "Failed"),
            Self::Canceled => write!(f, "Canceled"),
            Self::TimedOut => write!(f, "TimedOut"),
            Self::Unknown(s) => write!(f, "{}", s),
        }
    }
}

/// Point-in-time status read of one server task
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskSnapshot {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub state: TaskState,
    #[serde(default)]
    pub is_completed: Option<bool>,
    #[serde(default)]
    pub finished_successfully: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default)]
    pub has_warnings_or_errors: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_time: Option<DateTime<FixedOffset>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<FixedOffset>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_time: Option<DateTime<FixedOffset>>,
}

impl TaskSnapshot {
    /// Collapse the two optional completion flags into a single status.
    ///
    /// A completed task with no `FinishedSuccessfully` value counts as
    /// succeeded; only an explicit `false` is a failure.
    pub fn status(&self) -> TaskStatus {
        if self.is_completed != Some(true) {
            return TaskStatus::Pending;
        }
        match self.finished_successfully {
            Some(false) => TaskStatus::Failed,
            _ => TaskStatus::Succeeded,
        }
    }
}

/// State of one activity log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActivityStatus {
    Pending,
    Running,
    Success,
    SuccessWithWarning,
    Failed,
    Skipped,
    Canceled,
    Unknown(String),
}

impl Default for ActivityStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl ActivityStatus {
    /// True once the entry can no longer change
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending | Self::Running | Self::Unknown(_))
    }
}

impl From<String> for ActivityStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Pending" => Self::Pending,
            "Running" => Self::Running,
            "Success" => Self::Success,
            "SuccessWithWarning" => Self::SuccessWithWarning,
            "Failed" => Self::Failed,
            "Skipped" => Self::Skipped,
            "Canceled" => Self::Canceled,
            _ => Self::Unknown(value),
        }
    }
}

impl From<ActivityStatus> for String {
    fn from(value: ActivityStatus) -> Self {
        match value {
            ActivityStatus::Pending => "Pending".to_string(),
            ActivityStatus::Running => "Running".to_string(),
            ActivityStatus::Success => "Success".to_string(),
            ActivityStatus::SuccessWithWarning => "SuccessWithWarning".to_string(),
            ActivityStatus::Failed => "Failed".to_string(),
            ActivityStatus::Skipped => "Skipped".to_string(),
            ActivityStatus::Canceled => "Canceled".to_string(),
            ActivityStatus::Unknown(s) => s,
        }
    }
}

/// A single log line attached to an activity entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LogElement {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub message_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurred_at: Option<DateTime<FixedOffset>>,
}

/// Progress-log entry; may contain nested sub-steps
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ActivityNode {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: ActivityStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started: Option<DateTime<FixedOffset>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub log_elements: Vec<LogElement>,
    #[serde(default)]
    pub children: Vec<ActivityNode>,
}

/// Task detail resource: the task plus its activity log tree
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<TaskSnapshot>,
    #[serde(default)]
    pub activity_logs: Vec<ActivityNode>,
}
