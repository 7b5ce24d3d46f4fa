//! `taskpad` command line.
//!
//! ## Commands
//!
//! - `taskpad` (landing text)
//! - `taskpad login [--email <EMAIL>]`, `taskpad logout`, `taskpad signup`
//! - `taskpad whoami`
//! - `taskpad tasks list|add|status|rm`
//! - `taskpad subtasks add|toggle|rm`
//! - `taskpad suggest <TASK> [--save]`
//! - `taskpad search <QUERY>`
//! - `taskpad profile show|upload`
//! - `taskpad dashboard` (interactive)
//!
//! Task and subtask arguments accept a full id or any unique id prefix.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use taskpad_core::{Priority, TaskStatus};

mod auth_cmd;
mod context;
pub mod dashboard_cmd;
mod profile_cmd;
pub mod render;
mod task_cmd;

pub use context::AppContext;

/// Personal task manager backed by a hosted Postgres + auth platform.
#[derive(Debug, Parser)]
#[command(name = "taskpad", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in with email and password.
    Login(LoginArgs),
    /// Sign out and forget the stored session.
    Logout,
    /// Create an account (not available from the CLI yet).
    Signup,
    /// Show the signed-in user.
    Whoami(JsonFlag),
    /// Manage tasks.
    Tasks(TasksCli),
    /// Manage subtasks.
    Subtasks(SubtasksCli),
    /// Ask for suggested subtasks for a task.
    Suggest(SuggestArgs),
    /// Semantic search over your tasks.
    Search(SearchArgs),
    /// Show or update your profile.
    Profile(ProfileCli),
    /// Interactive dashboard.
    Dashboard,
}

#[derive(Debug, Args)]
pub struct JsonFlag {
    /// Output as JSON.
    #[arg(long = "json", short = 'j')]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Account email (prompted when omitted).
    #[arg(long = "email", short = 'e')]
    pub email: Option<String>,

    /// Read the password from this environment variable instead of stdin.
    #[arg(long = "password-env", value_name = "VAR")]
    pub password_env: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tasks
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
pub struct TasksCli {
    #[command(subcommand)]
    pub command: TasksSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum TasksSubcommand {
    /// List tasks with their subtasks, newest first.
    #[command(alias = "ls")]
    List(JsonFlag),
    /// Create a task.
    Add(AddTaskArgs),
    /// Change a task's status.
    Status(StatusArgs),
    /// Delete a task.
    #[command(alias = "delete")]
    Rm(IdArg),
}

#[derive(Debug, Args)]
pub struct AddTaskArgs {
    /// Task title.
    #[arg(required = true, num_args = 1..)]
    pub title: Vec<String>,

    /// low, medium or high.
    #[arg(long = "priority", short = 'p', default_value_t = Priority::Medium)]
    pub priority: Priority,
}

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Task id or unique prefix.
    pub id: String,

    /// pending, in-progress or done.
    pub status: TaskStatus,
}

#[derive(Debug, Args)]
pub struct IdArg {
    /// Id or unique prefix.
    pub id: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Subtasks
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
pub struct SubtasksCli {
    #[command(subcommand)]
    pub command: SubtasksSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum SubtasksSubcommand {
    /// Add a subtask to a task.
    Add(AddSubtaskArgs),
    /// Flip a subtask between done and not done.
    Toggle(IdArg),
    /// Delete a subtask.
    #[command(alias = "delete")]
    Rm(IdArg),
}

#[derive(Debug, Args)]
pub struct AddSubtaskArgs {
    /// Parent task id or unique prefix.
    pub task: String,

    /// Subtask title.
    #[arg(required = true, num_args = 1..)]
    pub title: Vec<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// AI
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SuggestArgs {
    /// Task id or unique prefix.
    pub task: String,

    /// Save every suggestion as a subtask.
    #[arg(long = "save")]
    pub save: bool,

    /// Output as JSON.
    #[arg(long = "json", short = 'j')]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Free-text query.
    #[arg(required = true, num_args = 1..)]
    pub query: Vec<String>,

    /// Output as JSON.
    #[arg(long = "json", short = 'j')]
    pub json: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Profile
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
pub struct ProfileCli {
    #[command(subcommand)]
    pub command: ProfileSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum ProfileSubcommand {
    /// Show your profile, creating it on first use.
    Show(JsonFlag),
    /// Upload a new profile picture.
    Upload(UploadArgs),
}

#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Image file to upload.
    pub path: PathBuf,
}

// ─────────────────────────────────────────────────────────────────────────────
// Dispatch
// ─────────────────────────────────────────────────────────────────────────────

impl Cli {
    pub async fn run(self) -> Result<(), String> {
        let Some(command) = self.command else {
            println!("{}", render::LANDING);
            return Ok(());
        };
        if let Command::Signup = command {
            return auth_cmd::cmd_signup();
        }

        let ctx = AppContext::load()?;
        match command {
            Command::Login(args) => auth_cmd::cmd_login(&ctx, &args).await,
            Command::Logout => auth_cmd::cmd_logout(&ctx).await,
            Command::Signup => auth_cmd::cmd_signup(),
            Command::Whoami(flag) => auth_cmd::cmd_whoami(&ctx, flag.json).await,
            Command::Tasks(tasks) => tasks.run(&ctx).await,
            Command::Subtasks(subtasks) => subtasks.run(&ctx).await,
            Command::Suggest(args) => task_cmd::cmd_suggest(&ctx, &args).await,
            Command::Search(args) => task_cmd::cmd_search(&ctx, &args).await,
            Command::Profile(profile) => profile.run(&ctx).await,
            Command::Dashboard => dashboard_cmd::run_interactive(&ctx).await,
        }
    }
}

impl TasksCli {
    async fn run(&self, ctx: &AppContext) -> Result<(), String> {
        match &self.command {
            TasksSubcommand::List(flag) => task_cmd::cmd_list(ctx, flag.json).await,
            TasksSubcommand::Add(args) => task_cmd::cmd_add(ctx, args).await,
            TasksSubcommand::Status(args) => task_cmd::cmd_status(ctx, args).await,
            TasksSubcommand::Rm(arg) => task_cmd::cmd_rm(ctx, &arg.id).await,
        }
    }
}

impl SubtasksCli {
    async fn run(&self, ctx: &AppContext) -> Result<(), String> {
        match &self.command {
            SubtasksSubcommand::Add(args) => task_cmd::cmd_subtask_add(ctx, args).await,
            SubtasksSubcommand::Toggle(arg) => task_cmd::cmd_subtask_toggle(ctx, &arg.id).await,
            SubtasksSubcommand::Rm(arg) => task_cmd::cmd_subtask_rm(ctx, &arg.id).await,
        }
    }
}

impl ProfileCli {
    async fn run(&self, ctx: &AppContext) -> Result<(), String> {
        match &self.command {
            ProfileSubcommand::Show(flag) => profile_cmd::cmd_show(ctx, flag.json).await,
            ProfileSubcommand::Upload(args) => profile_cmd::cmd_upload(ctx, &args.path).await,
        }
    }
}
