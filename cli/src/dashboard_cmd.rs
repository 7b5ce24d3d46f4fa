//! Interactive dashboard: a line-oriented loop over one [`Dashboard`].

use std::io::Write;

use taskpad_core::{Dashboard, Priority, TaskStatus};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::context::AppContext;
use crate::render;
use crate::task_cmd::{resolve_subtask, resolve_task};

const PROMPT: &str = "taskpad> ";

pub const HELP: &str = "\
Commands (ids accept any unique prefix):
  ls                              reload and show tasks
  add [low|medium|high] <title>   create a task
  status <task> <status>          pending, in-progress or done
  rm <task>                       delete a task
  sub <task> <title>              add a subtask
  toggle <subtask>                flip a subtask
  subrm <subtask>                 delete a subtask
  suggest <task>                  ask AI for subtasks
  save <task> <n|all>             keep suggestion n (or all)
  dismiss <task>                  drop suggestions
  search [query]                  semantic search; empty clears
  help                            this text
  quit                            leave";

/// Result of one input line.
#[derive(Debug, PartialEq, Eq)]
pub enum Step {
    Continue(String),
    Quit,
}

pub struct Repl {
    dashboard: Dashboard,
}

fn split_first(input: &str) -> (&str, &str) {
    let input = input.trim();
    match input.split_once(char::is_whitespace) {
        Some((head, tail)) => (head, tail.trim()),
        None => (input, ""),
    }
}

impl Repl {
    pub fn new(dashboard: Dashboard) -> Self {
        Self { dashboard }
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub async fn execute(&mut self, line: &str) -> Step {
        let (command, rest) = split_first(line);
        match command {
            "quit" | "exit" | "q" => Step::Quit,
            "" => Step::Continue(String::new()),
            "help" | "?" => Step::Continue(HELP.to_string()),
            _ => match self.dispatch(command, rest).await {
                Ok(output) => Step::Continue(output),
                Err(message) => Step::Continue(format!("! {message}")),
            },
        }
    }

    async fn dispatch(&mut self, command: &str, rest: &str) -> Result<String, String> {
        match command {
            "ls" | "list" => {
                self.dashboard.load().await?;
            }
            "add" => {
                let (first, remainder) = split_first(rest);
                let (priority, title) = match first.parse::<Priority>() {
                    Ok(priority) if !remainder.is_empty() => (priority, remainder),
                    _ => (Priority::Medium, rest),
                };
                if self.dashboard.add_task(title, priority).await?.is_none() {
                    return Err("Task title is required".to_string());
                }
            }
            "status" => {
                let (task, status) = split_first(rest);
                let id = resolve_task(&self.dashboard, task)?;
                let status = status.parse::<TaskStatus>()?;
                self.dashboard.set_status(&id, status).await?;
            }
            "rm" => {
                let id = resolve_task(&self.dashboard, rest)?;
                self.dashboard.delete_task(&id).await?;
            }
            "sub" => {
                let (task, title) = split_first(rest);
                let id = resolve_task(&self.dashboard, task)?;
                if self.dashboard.add_subtask(&id, title).await?.is_none() {
                    return Err("Subtask title is required".to_string());
                }
            }
            "toggle" => {
                let id = resolve_subtask(&self.dashboard, rest)?;
                self.dashboard.toggle_subtask(&id).await?;
            }
            "subrm" => {
                let id = resolve_subtask(&self.dashboard, rest)?;
                self.dashboard.delete_subtask(&id).await?;
            }
            "suggest" => {
                let id = resolve_task(&self.dashboard, rest)?;
                if self.dashboard.suggest_subtasks(&id).await?.is_empty() {
                    return Ok("No suggestions.".to_string());
                }
            }
            "save" => {
                let (task, which) = split_first(rest);
                let id = resolve_task(&self.dashboard, task)?;
                let suggestions = self.dashboard.suggestions_for(&id).to_vec();
                let chosen = if which == "all" {
                    suggestions
                } else {
                    let n: usize = which
                        .parse()
                        .map_err(|_| format!("Expected a suggestion number, got '{which}'"))?;
                    let picked = n
                        .checked_sub(1)
                        .and_then(|i| suggestions.get(i))
                        .ok_or_else(|| format!("No suggestion {n}"))?;
                    vec![picked.clone()]
                };
                for suggestion in &chosen {
                    self.dashboard.save_suggestion(&id, suggestion).await?;
                }
            }
            "dismiss" => {
                let id = resolve_task(&self.dashboard, rest)?;
                self.dashboard.dismiss_suggestions(&id);
            }
            "search" => {
                let state = self.dashboard.run_search(rest).await?;
                return Ok(render::search(state));
            }
            other => return Err(format!("Unknown command '{other}'. Type `help`.")),
        }
        Ok(render::board(&self.dashboard))
    }

    /// Waits for background work before the process exits.
    pub async fn finish(mut self) {
        self.dashboard.flush_background().await;
    }
}

pub(crate) async fn run_interactive(ctx: &AppContext) -> Result<(), String> {
    let dashboard = ctx.dashboard().await?;
    println!("{}", render::board(&dashboard));
    println!("Type `help` for commands.");

    let mut repl = Repl::new(dashboard);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{PROMPT}");
        std::io::stdout().flush().map_err(|e| e.to_string())?;
        let Some(line) = lines.next_line().await.map_err(|e| e.to_string())? else {
            println!();
            break;
        };
        match repl.execute(&line).await {
            Step::Quit => break,
            Step::Continue(output) if output.is_empty() => {}
            Step::Continue(output) => println!("{output}"),
        }
    }
    repl.finish().await;
    Ok(())
}
