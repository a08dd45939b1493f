//! Application layer for taskmate.
//!
//! This crate talks to the task service and holds client state: the task
//! lists, the create-and-share workflow, configuration and user feedback.

pub mod clock;
pub mod config;
pub mod error;
pub mod feedback;
pub mod http;
pub mod service;
pub mod sharing;
pub mod task_store;

#[cfg(test)]
mod test_support;

// Re-exports for convenience
pub use clock::local_now;
pub use config::{ClientConfig, DEFAULT_API_URL, UserConfig};
pub use error::ServiceError;
pub use feedback::{Confirm, Notification, NotificationLog, Notifier, Severity};
pub use http::HttpTaskService;
pub use service::{Friend, TaskService};
pub use sharing::{ShareFailure, SharePhase, ShareWorkflow, SubmitOutcome};
pub use task_store::{DELETE_PROMPT, Outcome, TaskStore};
