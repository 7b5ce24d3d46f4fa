//! One-shot task, subtask, suggestion and search commands.
//!
//! Each command mounts the dashboard (loading tasks and subtasks), runs one
//! operation, and prints the result. Commands that create tasks flush the
//! background embedding requests before returning.

use taskpad_core::Dashboard;

use crate::context::AppContext;
use crate::render;
use crate::{AddSubtaskArgs, AddTaskArgs, SearchArgs, StatusArgs, SuggestArgs};

/// Resolves a full id or a unique prefix against `ids`.
pub(crate) fn resolve_id<'a>(
    kind: &str,
    input: &str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<String, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err(format!("Missing {kind} id"));
    }
    let mut matches = Vec::new();
    for id in ids {
        if id == input {
            return Ok(id.to_string());
        }
        if id.starts_with(input) {
            matches.push(id);
        }
    }
    match matches.as_slice() {
        [] => Err(format!("No {kind} matches '{input}'")),
        [id] => Ok((*id).to_string()),
        _ => Err(format!("'{input}' matches several {kind}s; use more characters")),
    }
}

pub(crate) fn resolve_task(dashboard: &Dashboard, input: &str) -> Result<String, String> {
    resolve_id(
        "task",
        input,
        dashboard.tasks().iter().map(|t| t.id.as_str()),
    )
}

pub(crate) fn resolve_subtask(dashboard: &Dashboard, input: &str) -> Result<String, String> {
    resolve_id(
        "subtask",
        input,
        dashboard
            .subtasks()
            .values()
            .flatten()
            .map(|s| s.id.as_str()),
    )
}

pub(crate) async fn cmd_list(ctx: &AppContext, json: bool) -> Result<(), String> {
    let dashboard = ctx.dashboard().await?;
    if json {
        println!("{}", render::to_json(&render::task_views(&dashboard)));
    } else {
        println!("{}", render::board(&dashboard));
    }
    Ok(())
}

pub(crate) async fn cmd_add(ctx: &AppContext, args: &AddTaskArgs) -> Result<(), String> {
    let mut dashboard = ctx.dashboard().await?;
    let title = args.title.join(" ");
    let created = dashboard.add_task(&title, args.priority).await;
    dashboard.flush_background().await;
    match created? {
        Some(task) => println!("Added {}", render::task_line(&task)),
        None => return Err("Task title is required".to_string()),
    }
    Ok(())
}

pub(crate) async fn cmd_status(ctx: &AppContext, args: &StatusArgs) -> Result<(), String> {
    let mut dashboard = ctx.dashboard().await?;
    let id = resolve_task(&dashboard, &args.id)?;
    dashboard.set_status(&id, args.status).await?;
    if let Some(task) = dashboard.task(&id) {
        println!("{}", render::task_line(task));
    }
    Ok(())
}

pub(crate) async fn cmd_rm(ctx: &AppContext, input: &str) -> Result<(), String> {
    let mut dashboard = ctx.dashboard().await?;
    let id = resolve_task(&dashboard, input)?;
    dashboard.delete_task(&id).await?;
    println!("Deleted task {}", render::short_id(&id));
    Ok(())
}

pub(crate) async fn cmd_subtask_add(ctx: &AppContext, args: &AddSubtaskArgs) -> Result<(), String> {
    let mut dashboard = ctx.dashboard().await?;
    let task_id = resolve_task(&dashboard, &args.task)?;
    let title = args.title.join(" ");
    match dashboard.add_subtask(&task_id, &title).await? {
        Some(subtask) => println!("Added{}", render::subtask_line(&subtask)),
        None => return Err("Subtask title is required".to_string()),
    }
    Ok(())
}

pub(crate) async fn cmd_subtask_toggle(ctx: &AppContext, input: &str) -> Result<(), String> {
    let mut dashboard = ctx.dashboard().await?;
    let id = resolve_subtask(&dashboard, input)?;
    dashboard.toggle_subtask(&id).await?;
    if let Some(subtask) = dashboard.subtasks().values().flatten().find(|s| s.id == id) {
        println!("{}", render::subtask_line(subtask).trim_start());
    }
    Ok(())
}

pub(crate) async fn cmd_subtask_rm(ctx: &AppContext, input: &str) -> Result<(), String> {
    let mut dashboard = ctx.dashboard().await?;
    let id = resolve_subtask(&dashboard, input)?;
    dashboard.delete_subtask(&id).await?;
    println!("Deleted subtask {}", render::short_id(&id));
    Ok(())
}

pub(crate) async fn cmd_suggest(ctx: &AppContext, args: &SuggestArgs) -> Result<(), String> {
    let mut dashboard = ctx.dashboard().await?;
    let task_id = resolve_task(&dashboard, &args.task)?;
    let suggestions = dashboard.suggest_subtasks(&task_id).await?.to_vec();

    if args.save {
        for suggestion in &suggestions {
            dashboard.save_suggestion(&task_id, suggestion).await?;
        }
    }

    if args.json {
        println!(
            "{}",
            render::to_json(&serde_json::json!({
                "task_id": task_id,
                "suggestions": suggestions,
                "saved": args.save,
            }))
        );
    } else if suggestions.is_empty() {
        println!("No suggestions.");
    } else {
        let verb = if args.save { "Saved" } else { "Suggested" };
        println!("{verb} for {}:", render::short_id(&task_id));
        for (n, suggestion) in suggestions.iter().enumerate() {
            println!("  {}. {suggestion}", n + 1);
        }
    }
    Ok(())
}

pub(crate) async fn cmd_search(ctx: &AppContext, args: &SearchArgs) -> Result<(), String> {
    let mut dashboard = ctx.dashboard().await?;
    let state = dashboard.run_search(&args.query.join(" ")).await?;
    if args.json {
        println!("{}", render::to_json(state.results()));
    } else {
        println!("{}", render::search(state));
    }
    Ok(())
}
