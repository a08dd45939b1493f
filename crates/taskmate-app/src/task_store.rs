//! Client-side task state: the two task lists, the friend list and every
//! mutation, each followed by the matching notification and a reload.

use taskmate_core::id::{TaskId, UserId};
use taskmate_core::projection::{Projection, ProjectionQuery, Tab, project};
use taskmate_core::workplan::Workplan;
use taskmate_core::{Task, TaskPatch};
use time::{Date, PrimitiveDateTime};
use tracing::{debug, info, warn};

use crate::error::ServiceError;
use crate::feedback::{Confirm, Notifier, Severity};
use crate::service::{Friend, TaskService};
use crate::sharing::{ShareWorkflow, SubmitOutcome};

/// Prompt shown before a delete is sent.
pub const DELETE_PROMPT: &str = "Are you sure you want to delete this task?";

/// What happened to a requested mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The service accepted the change.
    Applied,
    /// Nothing was changed; the user has been notified.
    Failed,
    /// The user declined or the input was rejected locally.
    Cancelled,
}

/// Owned and shared-with-me task lists for one signed-in user.
///
/// Lists are replaced wholesale by reloads, never patched locally.
/// Mutations take `&mut self`, so at most one is in flight per store.
#[derive(Debug)]
pub struct TaskStore<S, N> {
    service: S,
    notifier: N,
    user: UserId,
    own: Vec<Task>,
    shared: Vec<Task>,
    friends: Vec<Friend>,
}

#[allow(clippy::future_not_send)]
impl<S: TaskService, N: Notifier> TaskStore<S, N> {
    /// Empty store; call [`load`](Self::load) to populate it.
    pub const fn new(service: S, notifier: N, user: UserId) -> Self {
        Self {
            service,
            notifier,
            user,
            own: Vec::new(),
            shared: Vec::new(),
            friends: Vec::new(),
        }
    }

    /// Signed-in user.
    pub const fn user(&self) -> &UserId {
        &self.user
    }

    /// Where outcome messages go.
    pub const fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Tasks owned by the user, as last loaded.
    pub fn own_tasks(&self) -> &[Task] {
        &self.own
    }

    /// Tasks shared with the user, as last loaded.
    pub fn shared_tasks(&self) -> &[Task] {
        &self.shared
    }

    /// The list behind a tab.
    pub fn tasks(&self, tab: Tab) -> &[Task] {
        match tab {
            Tab::Mine => &self.own,
            Tab::SharedWithMe => &self.shared,
        }
    }

    /// Friends available as share targets.
    pub fn friends(&self) -> &[Friend] {
        &self.friends
    }

    /// Filtered and sorted view of one tab.
    pub fn projection(&self, tab: Tab, query: &ProjectionQuery, now: PrimitiveDateTime) -> Projection<'_> {
        project(self.tasks(tab), query, now)
    }

    /// Active tasks across both lists.
    pub fn workplan(&self, now: PrimitiveDateTime) -> Workplan<'_> {
        Workplan::build(&self.own, &self.shared, now)
    }

    /// Fetch both lists concurrently.
    ///
    /// A failure of one list leaves the other one usable; the failed list
    /// keeps its previous contents.
    pub async fn load(&mut self) {
        let (own, shared) = tokio::join!(
            self.service.list_tasks(&self.user),
            self.service.list_shared_tasks(&self.user)
        );
        self.apply(Tab::Mine, own);
        self.apply(Tab::SharedWithMe, shared);
    }

    /// Re-fetch one list.
    pub async fn reload(&mut self, tab: Tab) {
        let result = match tab {
            Tab::Mine => self.service.list_tasks(&self.user).await,
            Tab::SharedWithMe => self.service.list_shared_tasks(&self.user).await,
        };
        self.apply(tab, result);
    }

    /// Fetch the friend list for the share selector.
    pub async fn load_friends(&mut self) -> Outcome {
        match self.service.list_friends(&self.user).await {
            Ok(friends) => {
                debug!(count = friends.len(), "friends loaded");
                self.friends = friends;
                Outcome::Applied
            }
            Err(err) => {
                warn!(error = %err, "friend list failed");
                self.notifier.notify("Failed to load friends", Severity::Error);
                Outcome::Failed
            }
        }
    }

    /// Submit the workflow's draft, share the new task and reload the own list.
    pub async fn create(&mut self, workflow: &mut ShareWorkflow, today: Date) -> SubmitOutcome {
        let outcome = workflow.submit(&self.service, &self.user, today).await;
        match &outcome {
            SubmitOutcome::Invalid => {}
            SubmitOutcome::CreateFailed(err) => {
                self.notifier
                    .notify(&format!("Failed to create task: {err}"), Severity::Error);
            }
            SubmitOutcome::Created {
                shared, failures, ..
            } => {
                if let Some(first) = failures.first() {
                    self.notifier.notify(
                        &format!("Task created, but sharing failed: {}", first.error),
                        Severity::Error,
                    );
                } else if shared.is_empty() {
                    self.notifier.notify("Task created successfully!", Severity::Info);
                } else {
                    self.notifier.notify(
                        &format!("Task created and shared with {} friend(s)!", shared.len()),
                        Severity::Info,
                    );
                }
                self.reload(Tab::Mine).await;
            }
        }
        outcome
    }

    /// Flip the completion flag of a task in `tab` and reload that list.
    pub async fn toggle_completion(&mut self, task: &TaskId, tab: Tab) -> Outcome {
        let Some(current) = self.tasks(tab).iter().find(|t| &t.id == task) else {
            warn!(%task, "toggle on unknown task");
            self.notifier
                .notify("Failed to update task: Task not found", Severity::Error);
            return Outcome::Failed;
        };
        let completed = !current.completed;

        match self
            .service
            .update_task(task, &TaskPatch::completed(completed))
            .await
        {
            Ok(()) => {
                info!(%task, completed, "task updated");
                let message = if completed {
                    "Task completed!"
                } else {
                    "Task marked as incomplete"
                };
                self.notifier.notify(message, Severity::Info);
                self.reload(tab).await;
                Outcome::Applied
            }
            Err(err) => {
                self.notify_failure("Failed to update task", &err);
                Outcome::Failed
            }
        }
    }

    /// Delete an owned task after confirmation, then reload the own list.
    pub async fn delete(&mut self, task: &TaskId, confirm: &impl Confirm) -> Outcome {
        if !confirm.confirm(DELETE_PROMPT) {
            debug!(%task, "delete declined");
            return Outcome::Cancelled;
        }

        match self.service.delete_task(task).await {
            Ok(()) => {
                info!(%task, "task deleted");
                self.notifier.notify("Task deleted successfully", Severity::Info);
                self.reload(Tab::Mine).await;
                Outcome::Applied
            }
            Err(err) => {
                self.notify_failure("Failed to delete task", &err);
                Outcome::Failed
            }
        }
    }

    fn apply(&mut self, tab: Tab, result: Result<Vec<Task>, ServiceError>) {
        match (tab, result) {
            (Tab::Mine, Ok(tasks)) => {
                debug!(count = tasks.len(), "own tasks loaded");
                self.own = tasks;
                self.dedupe_shared();
            }
            (Tab::SharedWithMe, Ok(tasks)) => {
                debug!(count = tasks.len(), "shared tasks loaded");
                self.shared = tasks;
                self.dedupe_shared();
            }
            (Tab::Mine, Err(err)) => {
                warn!(error = %err, "own task list failed");
                self.notifier.notify("Failed to load tasks", Severity::Error);
            }
            (Tab::SharedWithMe, Err(err)) => {
                warn!(error = %err, "shared task list failed");
                self.notifier.notify("Failed to load shared tasks", Severity::Error);
            }
        }
    }

    // A task listed on both sides stays in the owned list only.
    fn dedupe_shared(&mut self) {
        let own = &self.own;
        self.shared.retain(|task| !own.iter().any(|o| o.id == task.id));
    }

    fn notify_failure(&self, action: &str, err: &ServiceError) {
        warn!(error = %err, "{action}");
        self.notifier
            .notify(&format!("{action}: {err}"), Severity::Error);
    }
}
