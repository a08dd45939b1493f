use time::PrimitiveDateTime;

use crate::Task;
use crate::workload::Workload;

/// Shown when nothing is left to plan.
pub const NO_ACTIVE_TASKS: &str = "No active tasks found. Please add some tasks first!";

/// One task that still needs attention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkplanEntry<'a> {
    /// The task itself.
    pub task: &'a Task,
    /// True when the task came from the shared-with-me list.
    pub shared: bool,
    /// Parsed workload; `None` when the stored value is malformed.
    pub workload: Option<Workload>,
}

/// Active tasks across both lists, most pressing first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workplan<'a> {
    /// Entries ordered by priority, then due instant.
    pub entries: Vec<WorkplanEntry<'a>>,
    /// Sum of every parseable workload.
    pub total: Workload,
}

impl<'a> Workplan<'a> {
    /// Collect tasks that are neither completed nor overdue as of `now`.
    #[must_use]
    pub fn build(own: &'a [Task], shared: &'a [Task], now: PrimitiveDateTime) -> Self {
        let mut entries: Vec<WorkplanEntry<'a>> = own
            .iter()
            .map(|task| (task, false))
            .chain(shared.iter().map(|task| (task, true)))
            .filter(|(task, _)| !task.completed && task.due_at() >= now)
            .map(|(task, shared)| WorkplanEntry {
                task,
                shared,
                workload: task.workload().ok(),
            })
            .collect();
        entries.sort_by(|a, b| {
            a.task
                .priority
                .rank()
                .cmp(&b.task.priority.rank())
                .then_with(|| a.task.due_at().cmp(&b.task.due_at()))
        });
        let total = entries.iter().filter_map(|entry| entry.workload).sum();
        Self { entries, total }
    }

    /// True when no task qualifies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
