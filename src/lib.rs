//! taskwait - wait for server tasks to finish
//!
//! Polls a task server until a set of asynchronous server tasks reach a
//! terminal state, optionally streaming the task's nested activity log.
//!
//! # Modules
//!
//! - [`wait`] - The wait engine: initial snapshot, background polling, deadline
//! - [`presenter`] - Task lines and activity-log tree rendering
//! - [`source`] - The [`TaskSource`] seam and callback adapter
//! - [`client`] - HTTP implementation of [`TaskSource`]
//! - [`task`] - Server task resources
//! - [`config`] - Configuration loading
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use taskwait::{AppConfig, ServerClient, TaskPresenter, WaitEngine, WaitOptions};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = AppConfig::load(None)?;
//! let client = ServerClient::from_config(&config)?;
//! let engine = WaitEngine::new(Arc::new(client), TaskPresenter::new(std::io::stdout()));
//!
//! engine
//!     .wait(&["ServerTasks-1234".to_string()], &WaitOptions::default())
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod input;
pub mod logging;
pub mod presenter;
pub mod source;
pub mod task;
pub mod wait;

pub use client::ServerClient;
pub use config::AppConfig;
pub use presenter::{RenderedActivities, TaskPresenter};
pub use source::{CallbackSource, TaskSource, TransportError};
pub use task::{ActivityNode, TaskDetail, TaskSnapshot, TaskStatus};
pub use wait::{WaitEngine, WaitError, WaitOptions, POLL_INTERVAL};
