//! CLI entry point for taskmate.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use taskmate_app::ClientConfig;
use taskmate_core::id::{FriendId, TaskId, UserId};
use taskmate_core::projection::{CompletionFilter, SortKey};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod commands;

/// Personal tasks with friend sharing, backed by a REST task service.
#[derive(Parser, Debug)]
#[command(
    name = "taskmate",
    version,
    about = "taskmate: track tasks and share them with friends"
)]
struct Cli {
    /// Config file (defaults to <config dir>/taskmate/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Task service base URL.
    #[arg(long, global = true, env = "TASKMATE_API_URL")]
    api_url: Option<String>,

    /// Signed-in user id.
    #[arg(long, global = true, env = "TASKMATE_USER_ID")]
    user: Option<UserId>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List tasks with stats.
    Ls {
        /// Show tasks shared with you instead of your own.
        #[arg(long)]
        shared: bool,
        /// Case-insensitive substring of the task name.
        #[arg(long)]
        search: Option<String>,
        /// all, active or completed.
        #[arg(long, default_value = "all")]
        filter: CompletionFilter,
        /// date, name or priority.
        #[arg(long, default_value = "date")]
        sort: SortKey,
        #[arg(long, value_enum, default_value_t = LsFormat::Table)]
        format: LsFormat,
    },

    /// Create a task and optionally share it.
    New {
        #[arg(long)]
        name: String,
        /// Due date, YYYY-MM-DD.
        #[arg(long)]
        date: Option<String>,
        /// Due time, HH:MM.
        #[arg(long)]
        time: Option<String>,
        /// High, Medium or Low.
        #[arg(long)]
        priority: String,
        /// Workload such as "2hr 30min".
        #[arg(long)]
        workload: String,
        /// Use the current local date and time.
        #[arg(long, conflicts_with_all = ["date", "time"])]
        now: bool,
        /// Friend id to share with; repeatable.
        #[arg(short = 's', long = "share")]
        share: Vec<FriendId>,
    },

    /// Flip the completion flag of a task.
    Toggle {
        #[arg(long)]
        task: TaskId,
        /// The task is in the shared-with-me list.
        #[arg(long)]
        shared: bool,
    },

    /// Delete one of your tasks.
    Rm {
        #[arg(long)]
        task: TaskId,
        /// Skip the confirmation prompt.
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List friends available as share targets.
    Friends,

    /// Show active tasks across both lists, most pressing first.
    Plan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LsFormat {
    Table,
    Json,
}

fn main() -> Result<ExitCode> {
    let Cli {
        config,
        api_url,
        user,
        cmd,
    } = Cli::parse();

    install_tracing();

    let config = load_config(config.as_deref())?.with_overrides(api_url, user)?;
    debug!(api_url = %config.api_url, "configuration loaded");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(commands::run(cmd, &config))
}

fn load_config(path: Option<&Path>) -> Result<ClientConfig> {
    match (path, dirs::config_dir()) {
        (Some(path), _) => ClientConfig::from_path(path),
        (None, Some(dir)) => ClientConfig::from_config_dir(dir),
        (None, None) => Ok(ClientConfig::default()),
    }
}

fn install_tracing() {
    // RUST_LOG overrides. Logs go to stderr; stdout carries command output.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,taskmate=info,taskmate_app=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}
