//! User-facing feedback seams: outcome notifications and confirmations.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// How a notification should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Successful outcome.
    Info,
    /// Failed operation.
    Error,
}

/// Receives one message per finished operation.
pub trait Notifier {
    /// Present a message to the user.
    fn notify(&self, message: &str, severity: Severity);
}

impl<F> Notifier for F
where
    F: Fn(&str, Severity),
{
    fn notify(&self, message: &str, severity: Severity) {
        self(message, severity);
    }
}

/// Asks the user before destructive calls.
pub trait Confirm {
    /// Return `true` to proceed.
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// A message handed to a [`Notifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Text shown to the user.
    pub message: String,
    /// Presentation hint.
    pub severity: Severity,
}

/// Notifier that queues messages for a front end to render later.
#[derive(Debug, Clone, Default)]
pub struct NotificationLog {
    entries: Arc<Mutex<Vec<Notification>>>,
}

impl NotificationLog {
    /// Empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every queued notification.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Notification> {
        self.guard().clone()
    }

    /// Remove and return every queued notification.
    #[must_use]
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.guard())
    }

    fn guard(&self) -> MutexGuard<'_, Vec<Notification>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Notifier for NotificationLog {
    fn notify(&self, message: &str, severity: Severity) {
        self.guard().push(Notification {
            message: message.to_owned(),
            severity,
        });
    }
}
