use std::cell::Cell;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use anyhow::Result;
use taskmate_app::{
    ClientConfig, Confirm, HttpTaskService, Notifier, Severity, ShareWorkflow, SubmitOutcome, TaskStore,
    local_now,
};
use taskmate_core::projection::{ProjectionQuery, Tab};
use taskmate_core::validate::Field;
use taskmate_core::wire::{format_date, format_time};
use taskmate_core::workplan::{NO_ACTIVE_TASKS, Workplan, WorkplanEntry};
use taskmate_core::Task;
use time::PrimitiveDateTime;

use crate::{Command, LsFormat};

/// Prints outcome messages and remembers whether any of them was an error.
#[derive(Debug, Default)]
pub struct ConsoleNotifier {
    errors: Cell<usize>,
}

impl ConsoleNotifier {
    fn exit_code(&self) -> ExitCode {
        if self.errors.get() == 0 {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Info => println!("{message}"),
            Severity::Error => {
                self.errors.set(self.errors.get() + 1);
                eprintln!("error: {message}");
            }
        }
    }
}

/// y/N prompt on the terminal.
struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{prompt} [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

#[allow(clippy::future_not_send)]
pub async fn run(command: Command, config: &ClientConfig) -> Result<ExitCode> {
    let user = config.require_user()?.id.clone();
    let service = HttpTaskService::from_config(config)?;
    let mut store = TaskStore::new(service, ConsoleNotifier::default(), user);

    match command {
        Command::Ls {
            shared,
            search,
            filter,
            sort,
            format,
        } => {
            store.load().await;
            let tab = if shared { Tab::SharedWithMe } else { Tab::Mine };
            let query = ProjectionQuery::new()
                .with_search(search)
                .with_filter(filter)
                .with_sort(sort);
            let now = local_now();
            let view = store.projection(tab, &query, now);

            match format {
                LsFormat::Json => println!("{}", serde_json::to_string_pretty(&view.tasks)?),
                LsFormat::Table => {
                    println!("{}", tab.title());
                    println!("{}", view.stats);
                    if let Some(empty) = view.empty_state() {
                        println!("{}", empty.message(tab));
                    } else {
                        render_task_table(&view.tasks, tab, now);
                    }
                }
            }
        }
        Command::New {
            name,
            date,
            time,
            priority,
            workload,
            now,
            share,
        } => {
            let mut workflow = ShareWorkflow::new();
            workflow.edit(Field::Name, name);
            if now {
                workflow.set_now(local_now());
            } else {
                workflow.edit(Field::Date, date.unwrap_or_default());
                workflow.edit(Field::Time, time.unwrap_or_default());
            }
            workflow.edit(Field::Priority, priority);
            workflow.edit(Field::Workload, workload);
            for friend in share {
                workflow.toggle_friend(friend);
            }
            if let Some(summary) = workflow.selection_summary() {
                println!("{summary}");
            }

            let today = local_now().date();
            match store.create(&mut workflow, today).await {
                SubmitOutcome::Invalid => {
                    for (field, message) in workflow.form().errors().iter() {
                        store
                            .notifier()
                            .notify(&format!("{field}: {message}"), Severity::Error);
                    }
                }
                SubmitOutcome::Created { task, .. } => println!("created task: {task}"),
                SubmitOutcome::CreateFailed(_) => {}
            }
        }
        Command::Toggle { task, shared } => {
            let tab = if shared { Tab::SharedWithMe } else { Tab::Mine };
            store.reload(tab).await;
            store.toggle_completion(&task, tab).await;
        }
        Command::Rm { task, yes } => {
            if yes {
                store.delete(&task, &|_: &str| true).await;
            } else {
                store.delete(&task, &StdinConfirm).await;
            }
        }
        Command::Friends => {
            store.load_friends().await;
            if store.friends().is_empty() {
                println!("No friends yet");
            } else {
                println!("ID | Username");
                println!("-- | --------");
                for friend in store.friends() {
                    println!("{} | {}", friend.id, friend.username);
                }
            }
        }
        Command::Plan => {
            store.load().await;
            let plan = store.workplan(local_now());
            print!("{}", render_plan(&plan));
        }
    }

    Ok(store.notifier().exit_code())
}

fn render_task_table(tasks: &[&Task], tab: Tab, now: PrimitiveDateTime) {
    match tab {
        Tab::Mine => {
            println!("ID | Name | Due | Priority | Workload | Status");
            println!("-- | ---- | --- | -------- | -------- | ------");
        }
        Tab::SharedWithMe => {
            println!("ID | Name | Due | Priority | Workload | Status | Owner");
            println!("-- | ---- | --- | -------- | -------- | ------ | -----");
        }
    }
    for task in tasks {
        println!("{}", task_row(task, now));
    }
}

fn task_row(task: &Task, now: PrimitiveDateTime) -> String {
    let mut row = format!(
        "{} | {} | {} | {} | {} | {}",
        task.id,
        task.name,
        due_label(task),
        task.priority,
        task.workload,
        status_label(task, now)
    );
    if let Some(owner) = &task.owner_username {
        row.push_str(" | ");
        row.push_str(owner);
    }
    row
}

fn due_label(task: &Task) -> String {
    task.time.map_or_else(
        || format_date(task.date),
        |time| format!("{} {}", format_date(task.date), format_time(time)),
    )
}

fn status_label(task: &Task, now: PrimitiveDateTime) -> &'static str {
    if task.completed {
        "done"
    } else if task.is_overdue(now) {
        "overdue"
    } else {
        "open"
    }
}

fn render_plan(plan: &Workplan<'_>) -> String {
    if plan.is_empty() {
        return format!("{NO_ACTIVE_TASKS}\n");
    }
    let mut out = String::new();
    for (index, entry) in plan.entries.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", index + 1, plan_line(entry)));
    }
    out.push_str(&format!("Total workload: {}\n", plan.total));
    out
}

fn plan_line(entry: &WorkplanEntry<'_>) -> String {
    let task = entry.task;
    let workload = entry
        .workload
        .map_or_else(|| task.workload.clone(), |w| w.to_string());
    let mut line = format!(
        "[{}] {} (due {}, {})",
        task.priority,
        task.name,
        due_label(task),
        workload
    );
    if let Some(owner) = task.owner_username.as_deref().filter(|_| entry.shared) {
        line.push_str(&format!(" shared by {owner}"));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskmate_core::Priority;
    use taskmate_core::id::TaskId;
    use time::macros::{date, datetime, time};

    fn sample(id: u64, name: &str) -> Task {
        Task {
            id: TaskId::from_number(id),
            name: name.to_owned(),
            date: date!(2025 - 06 - 20),
            time: Some(time!(14:30)),
            priority: Priority::High,
            workload: "2hr 30min".to_owned(),
            completed: false,
            owner_username: None,
        }
    }

    #[test]
    fn rows_show_due_and_status() {
        let task = sample(1, "Write report");
        assert_eq!(
            task_row(&task, datetime!(2025-06-15 12:00)),
            "1 | Write report | 2025-06-20 14:30 | High | 2hr 30min | open"
        );
        assert_eq!(status_label(&task, datetime!(2025-06-21 00:00)), "overdue");
    }

    #[test]
    fn shared_rows_append_owner() {
        let mut task = sample(2, "Plan trip");
        task.time = None;
        task.completed = true;
        task.owner_username = Some("alice".into());
        assert_eq!(
            task_row(&task, datetime!(2025-06-15 12:00)),
            "2 | Plan trip | 2025-06-20 | High | 2hr 30min | done | alice"
        );
    }

    #[test]
    fn empty_plan_prints_hint() {
        let plan = Workplan::build(&[], &[], datetime!(2025-06-15 12:00));
        assert_eq!(render_plan(&plan), format!("{NO_ACTIVE_TASKS}\n"));
    }

    #[test]
    fn plan_lists_entries_and_total() {
        let own = vec![sample(1, "Write report")];
        let mut theirs = sample(2, "Plan trip");
        theirs.priority = Priority::Low;
        theirs.workload = "45min".into();
        theirs.owner_username = Some("alice".into());
        let shared = vec![theirs];

        let plan = Workplan::build(&own, &shared, datetime!(2025-06-15 12:00));
        assert_eq!(
            render_plan(&plan),
            "1. [High] Write report (due 2025-06-20 14:30, 2hr 30min)\n\
             2. [Low] Plan trip (due 2025-06-20 14:30, 45min) shared by alice\n\
             Total workload: 3hr 15min\n"
        );
    }

    #[test]
    fn console_notifier_tracks_errors() {
        let notifier = ConsoleNotifier::default();
        notifier.notify("Task completed!", Severity::Info);
        assert_eq!(notifier.errors.get(), 0);
        notifier.notify("Failed to load tasks", Severity::Error);
        assert_eq!(notifier.errors.get(), 1);
    }
}
