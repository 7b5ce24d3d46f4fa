//! Plain-text views of dashboard state.

use serde::Serialize;
use taskpad_core::{Dashboard, Profile, SearchState, Subtask, Task, TaskStatus};

pub const LANDING: &str = "\
taskpad: a personal task manager

Keep your tasks and their checklists in one place, let AI break a task into
subtasks, and find tasks by meaning instead of exact words.

  taskpad login       sign in
  taskpad signup      create an account
  taskpad dashboard   open your tasks";

const SHORT_ID_LEN: usize = 8;

/// Leading characters of an id, enough to type back.
pub fn short_id(id: &str) -> &str {
    id.get(..SHORT_ID_LEN).unwrap_or(id)
}

fn status_mark(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Pending => "[ ]",
        TaskStatus::InProgress => "[~]",
        TaskStatus::Done => "[x]",
    }
}

pub fn task_line(task: &Task) -> String {
    format!(
        "{} {}  {}  ({}, {})",
        status_mark(task.status),
        short_id(&task.id),
        task.title,
        task.priority,
        task.status
    )
}

pub fn subtask_line(subtask: &Subtask) -> String {
    let check = if subtask.completed { "x" } else { " " };
    format!(
        "      ({check}) {}  {}",
        short_id(&subtask.id),
        subtask.title
    )
}

/// The full task list with subtasks and pending suggestions.
pub fn board(dashboard: &Dashboard) -> String {
    if dashboard.tasks().is_empty() {
        return "No tasks yet. Add one with `taskpad tasks add <title>`.".to_string();
    }
    let mut lines = Vec::new();
    for task in dashboard.tasks() {
        lines.push(task_line(task));
        for subtask in dashboard.subtasks_for(&task.id) {
            lines.push(subtask_line(subtask));
        }
        for (n, suggestion) in dashboard.suggestions_for(&task.id).iter().enumerate() {
            lines.push(format!("      suggestion {}: {suggestion}", n + 1));
        }
    }
    lines.join("\n")
}

pub fn search(state: &SearchState) -> String {
    match state {
        SearchState::Idle => "Search cleared.".to_string(),
        SearchState::Completed { query, results } if results.is_empty() => {
            format!("No tasks match \"{query}\".")
        }
        SearchState::Completed { results, .. } => results
            .iter()
            .map(|r| {
                format!(
                    "{:>3.0}%  {}  {}  ({}, {})",
                    r.similarity * 100.0,
                    short_id(&r.id),
                    r.title,
                    r.priority,
                    r.status
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

pub fn profile(profile: &Profile) -> String {
    format!(
        "Email:   {}\nPicture: {}",
        profile.email.as_deref().unwrap_or("(none)"),
        profile.profile_picture_url.as_deref().unwrap_or("(none)")
    )
}

/// A task with its subtasks, for `--json` output.
#[derive(Serialize)]
pub struct TaskView<'a> {
    #[serde(flatten)]
    pub task: &'a Task,
    pub subtasks: &'a [Subtask],
}

pub fn task_views(dashboard: &Dashboard) -> Vec<TaskView<'_>> {
    dashboard
        .tasks()
        .iter()
        .map(|task| TaskView {
            task,
            subtasks: dashboard.subtasks_for(&task.id),
        })
        .collect()
}

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}
