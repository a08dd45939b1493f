use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use time::PrimitiveDateTime;

use crate::Task;
use crate::text_matcher::TextMatcher;

/// Which list a projection is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    /// Tasks owned by the current user.
    #[default]
    Mine,
    /// Tasks other users shared with the current user.
    SharedWithMe,
}

impl Tab {
    /// Heading shown above the list.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Mine => "My Tasks",
            Self::SharedWithMe => "Shared with me",
        }
    }
}

/// Narrowing by completion flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompletionFilter {
    /// Everything.
    #[default]
    All,
    /// Only tasks not yet completed.
    Active,
    /// Only completed tasks.
    Completed,
}

impl CompletionFilter {
    /// Whether a task passes the filter.
    #[must_use]
    pub const fn admits(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Active => !task.completed,
            Self::Completed => task.completed,
        }
    }
}

/// Ordering of projected tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortKey {
    /// Due instant, earliest first.
    #[default]
    Date,
    /// Name, case-insensitive ascending.
    Name,
    /// High, then Medium, then Low.
    Priority,
}

impl SortKey {
    fn compare(self, a: &Task, b: &Task) -> Ordering {
        match self {
            Self::Date => a.due_at().cmp(&b.due_at()),
            Self::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            Self::Priority => a.priority.rank().cmp(&b.priority.rank()),
        }
    }
}

/// Error returned for unknown filter or sort tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind}: {token}")]
pub struct ProjectionParseError {
    kind: &'static str,
    token: String,
}

impl FromStr for CompletionFilter {
    type Err = ProjectionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "active" | "pending" => Ok(Self::Active),
            "completed" | "done" => Ok(Self::Completed),
            _ => Err(ProjectionParseError {
                kind: "filter",
                token: s.to_owned(),
            }),
        }
    }
}

impl FromStr for SortKey {
    type Err = ProjectionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "date" | "due" => Ok(Self::Date),
            "name" => Ok(Self::Name),
            "priority" => Ok(Self::Priority),
            _ => Err(ProjectionParseError {
                kind: "sort key",
                token: s.to_owned(),
            }),
        }
    }
}

/// Search text, completion filter and sort key applied to one tab.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectionQuery {
    search: Option<String>,
    filter: CompletionFilter,
    sort: SortKey,
}

impl ProjectionQuery {
    /// Query that shows everything sorted by due date.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the search text (whitespace-only inputs become `None`).
    #[must_use]
    pub fn with_search(mut self, text: Option<String>) -> Self {
        self.search = text.and_then(|raw| {
            let trimmed = raw.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_owned())
        });
        self
    }

    /// Configure the completion filter.
    #[must_use]
    pub const fn with_filter(mut self, filter: CompletionFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Configure the sort key.
    #[must_use]
    pub const fn with_sort(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }

    /// Normalized search text.
    #[must_use]
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }
}

/// Summary counts over a whole tab.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    /// Every task in the tab.
    pub total: usize,
    /// Completed tasks.
    pub completed: usize,
    /// Tasks not yet completed.
    pub active: usize,
    /// Incomplete tasks whose due instant has passed.
    pub overdue: usize,
}

impl TaskStats {
    /// Count tasks as of `now`.
    #[must_use]
    pub fn compute(tasks: &[Task], now: PrimitiveDateTime) -> Self {
        let completed = tasks.iter().filter(|task| task.completed).count();
        Self {
            total: tasks.len(),
            completed,
            active: tasks.len() - completed,
            overdue: tasks.iter().filter(|task| task.is_overdue(now)).count(),
        }
    }
}

/// Why a projection has no rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    /// The tab holds no tasks at all.
    NoTasks,
    /// Tasks exist but the search or filter hid all of them.
    NoMatches,
}

impl EmptyState {
    /// Message for the given tab.
    #[must_use]
    pub const fn message(self, tab: Tab) -> &'static str {
        match (self, tab) {
            (Self::NoMatches, _) => "No tasks found matching your criteria",
            (Self::NoTasks, Tab::Mine) => "No tasks yet. Create your first task above!",
            (Self::NoTasks, Tab::SharedWithMe) => "No tasks have been shared with you yet",
        }
    }
}

/// Derived view over one tab.
#[derive(Debug, Clone)]
pub struct Projection<'a> {
    /// Visible tasks in display order.
    pub tasks: Vec<&'a Task>,
    /// Counts over the unfiltered tab.
    pub stats: TaskStats,
}

impl Projection<'_> {
    /// Empty-state classification, `None` when rows are visible.
    #[must_use]
    pub const fn empty_state(&self) -> Option<EmptyState> {
        if !self.tasks.is_empty() {
            None
        } else if self.stats.total == 0 {
            Some(EmptyState::NoTasks)
        } else {
            Some(EmptyState::NoMatches)
        }
    }
}

/// Search, filter and sort `tasks`; stats ignore the query.
///
/// Sorting is stable, so ties keep the service order.
#[must_use]
pub fn project<'a>(tasks: &'a [Task], query: &ProjectionQuery, now: PrimitiveDateTime) -> Projection<'a> {
    let matcher = query.search().and_then(TextMatcher::new);
    let mut visible: Vec<&Task> = tasks
        .iter()
        .filter(|task| matcher.as_ref().is_none_or(|m| m.matches(task)))
        .filter(|task| query.filter.admits(task))
        .collect();
    visible.sort_by(|a, b| query.sort.compare(a, b));

    Projection {
        tasks: visible,
        stats: TaskStats::compute(tasks, now),
    }
}

impl fmt::Display for TaskStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Total Tasks: {} | Completed: {} | Active: {} | Overdue: {}",
            self.total, self.completed, self.active, self.overdue
        )
    }
}
