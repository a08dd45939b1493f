//! Create-and-share workflow: one create request fanned out into per-friend shares.

use std::collections::BTreeSet;

use futures::future::join_all;
use taskmate_core::form::TaskForm;
use taskmate_core::id::{FriendId, TaskId, UserId};
use taskmate_core::validate::Field;
use time::{Date, PrimitiveDateTime};
use tracing::{debug, info, warn};

use crate::error::ServiceError;
use crate::service::TaskService;

/// Where the workflow currently is.
///
/// A submit moves `Idle`/`Drafting` through `Submitting` and, when friends
/// are selected, `AwaitingShares` before landing in `Settled`. The next edit
/// starts a fresh draft; cancelling returns to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SharePhase {
    /// Nothing entered yet.
    #[default]
    Idle,
    /// Draft or share selection being edited; no requests issued.
    Drafting,
    /// Base task create request in flight.
    Submitting,
    /// Share requests in flight.
    AwaitingShares,
    /// Every request resolved; draft and selection cleared.
    Settled,
}

/// One share request that failed after the task was created.
#[derive(Debug)]
pub struct ShareFailure {
    /// Recipient of the failed share.
    pub friend: FriendId,
    /// Why it failed.
    pub error: ServiceError,
}

/// Result of a submit attempt.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Validation failed; errors are on the form, nothing was sent.
    Invalid,
    /// The create request failed; draft and selection are kept.
    CreateFailed(ServiceError),
    /// The task exists; some shares may have failed.
    Created {
        /// Id assigned by the service.
        task: TaskId,
        /// Friends the task was shared with.
        shared: Vec<FriendId>,
        /// Shares that failed, in selection order.
        failures: Vec<ShareFailure>,
    },
}

impl SubmitOutcome {
    /// True when the base task was created, regardless of share failures.
    #[must_use]
    pub const fn is_created(&self) -> bool {
        matches!(self, Self::Created { .. })
    }
}

/// Draft, share selection and phase of a single create workflow.
///
/// Selection is client state only; it is cleared when a create settles or
/// the workflow is cancelled.
#[derive(Debug, Default)]
pub struct ShareWorkflow {
    phase: SharePhase,
    form: TaskForm,
    selection: BTreeSet<FriendId>,
}

impl ShareWorkflow {
    /// Idle workflow with an empty draft.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> SharePhase {
        self.phase
    }

    /// Form being edited.
    #[must_use]
    pub const fn form(&self) -> &TaskForm {
        &self.form
    }

    /// Mutable form access; starts drafting.
    pub fn form_mut(&mut self) -> &mut TaskForm {
        self.begin_drafting();
        &mut self.form
    }

    /// Edit one draft field.
    pub fn edit(&mut self, field: Field, value: impl Into<String>) {
        self.form_mut().set(field, value);
    }

    /// "Set now": fill date and time from the local clock.
    pub fn set_now(&mut self, now: PrimitiveDateTime) {
        self.form_mut().set_now(now);
    }

    /// Add or remove a share target. Returns whether it is now selected.
    pub fn toggle_friend(&mut self, friend: FriendId) -> bool {
        self.begin_drafting();
        if self.selection.remove(&friend) {
            false
        } else {
            self.selection.insert(friend);
            true
        }
    }

    /// Whether a friend is selected.
    #[must_use]
    pub fn is_selected(&self, friend: &FriendId) -> bool {
        self.selection.contains(friend)
    }

    /// Selected share targets.
    pub fn selection(&self) -> impl Iterator<Item = &FriendId> {
        self.selection.iter()
    }

    /// "Task will be shared with N friend(s)" while anyone is selected.
    #[must_use]
    pub fn selection_summary(&self) -> Option<String> {
        (!self.selection.is_empty())
            .then(|| format!("Task will be shared with {} friend(s)", self.selection.len()))
    }

    /// Drop the share selection but keep the draft.
    pub fn cancel_sharing(&mut self) {
        self.selection.clear();
    }

    /// Discard draft and selection.
    pub fn cancel(&mut self) {
        self.clear();
        self.phase = SharePhase::Idle;
    }

    /// Validate, create the base task, then share it with every selected friend.
    ///
    /// Share requests run concurrently once the task exists and are all
    /// awaited. A failed share never undoes the task or the other shares.
    #[allow(clippy::future_not_send)]
    pub async fn submit<S: TaskService>(
        &mut self,
        service: &S,
        user: &UserId,
        today: Date,
    ) -> SubmitOutcome {
        self.begin_drafting();
        let Some(new_task) = self.form.submit(today) else {
            debug!(errors = %self.form.errors(), "task draft rejected");
            return SubmitOutcome::Invalid;
        };

        self.phase = SharePhase::Submitting;
        let task = match service.create_task(user, &new_task).await {
            Ok(task) => task,
            Err(err) => {
                warn!(error = %err, "task create failed");
                self.form.set_submit_error(format!("Failed to create task: {err}"));
                self.phase = SharePhase::Drafting;
                return SubmitOutcome::CreateFailed(err);
            }
        };
        info!(%task, "task created");

        let targets: Vec<FriendId> = self.selection.iter().cloned().collect();
        let mut shared = Vec::new();
        let mut failures = Vec::new();
        if !targets.is_empty() {
            self.phase = SharePhase::AwaitingShares;
            let requests = targets
                .iter()
                .map(|friend| service.share_task(&task, friend));
            let results = join_all(requests).await;
            for (friend, result) in targets.into_iter().zip(results) {
                match result {
                    Ok(()) => shared.push(friend),
                    Err(error) => {
                        warn!(%task, %friend, %error, "share failed");
                        failures.push(ShareFailure { friend, error });
                    }
                }
            }
            info!(%task, shared = shared.len(), failed = failures.len(), "shares settled");
        }

        self.clear();
        self.phase = SharePhase::Settled;
        SubmitOutcome::Created {
            task,
            shared,
            failures,
        }
    }

    fn begin_drafting(&mut self) {
        if matches!(self.phase, SharePhase::Idle | SharePhase::Settled) {
            self.phase = SharePhase::Drafting;
        }
    }

    fn clear(&mut self) {
        self.form.reset();
        self.selection.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Call, MockService, fill_valid};
    use std::time::Duration;
    use time::macros::date;

    const TODAY: Date = date!(2025 - 06 - 15);

    fn user() -> UserId {
        UserId::from_number(123)
    }

    #[test]
    fn selection_is_pure_client_state() {
        let mut workflow = ShareWorkflow::new();
        assert_eq!(workflow.phase(), SharePhase::Idle);
        assert!(workflow.toggle_friend(FriendId::from_number(10)));
        assert_eq!(workflow.phase(), SharePhase::Drafting);
        assert_eq!(
            workflow.selection_summary().as_deref(),
            Some("Task will be shared with 1 friend(s)")
        );
        assert!(!workflow.toggle_friend(FriendId::from_number(10)));
        assert!(workflow.selection_summary().is_none());

        workflow.toggle_friend(FriendId::from_number(11));
        workflow.cancel_sharing();
        assert_eq!(workflow.selection().count(), 0);
    }

    #[tokio::test]
    async fn invalid_draft_sends_nothing() {
        let service = MockService::default();
        let mut workflow = ShareWorkflow::new();
        workflow.toggle_friend(FriendId::from_number(10));

        let outcome = workflow.submit(&service, &user(), TODAY).await;
        assert!(matches!(outcome, SubmitOutcome::Invalid));
        assert!(service.calls().is_empty());
        assert_eq!(workflow.form().errors().len(), 4);
        assert_eq!(workflow.phase(), SharePhase::Drafting);
        assert!(workflow.is_selected(&FriendId::from_number(10)));
    }

    #[tokio::test]
    async fn create_failure_keeps_draft_and_skips_shares() {
        let service = MockService::default();
        service.fail_create("Database unavailable");
        let mut workflow = ShareWorkflow::new();
        fill_valid(&mut workflow);
        workflow.toggle_friend(FriendId::from_number(10));

        let outcome = workflow.submit(&service, &user(), TODAY).await;
        assert!(matches!(outcome, SubmitOutcome::CreateFailed(_)));
        assert_eq!(service.calls().len(), 1);
        assert_eq!(workflow.phase(), SharePhase::Drafting);
        assert_eq!(workflow.form().draft().name, "New Task");
        assert_eq!(
            workflow.form().submit_error(),
            Some("Failed to create task: Database unavailable")
        );
        assert!(workflow.is_selected(&FriendId::from_number(10)));
    }

    #[tokio::test]
    async fn partial_share_failure_keeps_task_and_successful_shares() {
        let service = MockService::default();
        service.fail_share(FriendId::from_number(11), "Friend not found");
        let mut workflow = ShareWorkflow::new();
        fill_valid(&mut workflow);
        workflow.toggle_friend(FriendId::from_number(10));
        workflow.toggle_friend(FriendId::from_number(11));

        let SubmitOutcome::Created {
            task,
            shared,
            failures,
        } = workflow.submit(&service, &user(), TODAY).await
        else {
            panic!("task should be created");
        };

        assert_eq!(shared, vec![FriendId::from_number(10)]);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].friend, FriendId::from_number(11));
        assert_eq!(failures[0].error.to_string(), "Friend not found");

        let share_calls: Vec<Call> = service
            .calls()
            .into_iter()
            .filter(|call| matches!(call, Call::Share { .. }))
            .collect();
        assert_eq!(share_calls.len(), 2);
        assert!(share_calls.iter().all(|call| matches!(call, Call::Share { task: t, .. } if *t == task)));

        assert_eq!(workflow.phase(), SharePhase::Settled);
        assert_eq!(workflow.selection().count(), 0);
        assert!(workflow.form().draft().name.is_empty());
    }

    #[tokio::test]
    async fn shares_are_sent_concurrently() {
        let service = MockService::default();
        service.gate_shares(3);
        let mut workflow = ShareWorkflow::new();
        fill_valid(&mut workflow);
        for friend in [10, 11, 12] {
            workflow.toggle_friend(FriendId::from_number(friend));
        }

        let outcome = tokio::time::timeout(
            Duration::from_secs(5),
            workflow.submit(&service, &user(), TODAY),
        )
        .await
        .unwrap_or_else(|_| panic!("shares were sent one at a time"));

        let SubmitOutcome::Created {
            shared, failures, ..
        } = outcome
        else {
            panic!("task should be created");
        };
        assert_eq!(shared.len(), 3);
        assert!(failures.is_empty());
        assert_eq!(service.count(|call| matches!(call, Call::Share { .. })), 3);
    }

    #[tokio::test]
    async fn settled_workflow_starts_a_fresh_draft_on_edit() {
        let service = MockService::default();
        let mut workflow = ShareWorkflow::new();
        fill_valid(&mut workflow);
        assert!(workflow.submit(&service, &user(), TODAY).await.is_created());
        assert_eq!(workflow.phase(), SharePhase::Settled);

        workflow.edit(Field::Name, "Follow-up");
        assert_eq!(workflow.phase(), SharePhase::Drafting);
        assert_eq!(workflow.form().draft().name, "Follow-up");
        assert!(workflow.form().draft().workload.is_empty());
    }

    #[tokio::test]
    async fn no_selection_means_single_request() {
        let service = MockService::default();
        let mut workflow = ShareWorkflow::new();
        fill_valid(&mut workflow);

        let outcome = workflow.submit(&service, &user(), TODAY).await;
        assert!(outcome.is_created());
        assert_eq!(service.calls().len(), 1);
        assert!(matches!(service.calls()[0], Call::Create { .. }));
    }

    #[test]
    fn cancel_clears_draft_and_selection() {
        let mut workflow = ShareWorkflow::new();
        fill_valid(&mut workflow);
        workflow.toggle_friend(FriendId::from_number(10));
        workflow.cancel();
        assert_eq!(workflow.phase(), SharePhase::Idle);
        assert!(workflow.form().draft().name.is_empty());
        assert_eq!(workflow.selection().count(), 0);
    }
}
