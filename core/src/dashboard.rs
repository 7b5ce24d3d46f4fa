//! Client-side state behind the task dashboard.
//!
//! The remote store is the only source of truth: every mutation is followed
//! by a full re-fetch of the collection(s) it touched, never by patching the
//! local copy. Suggestions and search results are side channels that live
//! only as long as the [`Dashboard`] value.
//!
//! Operations take `&mut self`, so a single dashboard never has two requests
//! of its own in flight. Failures come back as the message string that the
//! view shows in its banner, and the same string is kept in
//! [`Dashboard::banner`] until the next operation starts.

use std::collections::HashMap;
use std::sync::Arc;

use crate::embedding::EmbeddingTrigger;
use crate::error::TaskpadError;
use crate::functions::Augmentation;
use crate::models::{Priority, SearchResult, Subtask, Task, TaskStatus};
use crate::subtasks::{SubtaskGroups, SubtaskRepository, group_by_task};
use crate::tasks::TaskRepository;

/// Outcome of a dashboard operation; `Err` is the banner text.
pub type Outcome<T> = Result<T, String>;

/// State of the search panel.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SearchState {
    /// No search has run yet (or the query was cleared).
    #[default]
    Idle,
    /// A search ran; `results` may be empty ("no matches").
    Completed {
        query: String,
        results: Vec<SearchResult>,
    },
}

impl SearchState {
    pub fn results(&self) -> &[SearchResult] {
        match self {
            SearchState::Idle => &[],
            SearchState::Completed { results, .. } => results,
        }
    }

    /// True after a search that matched nothing.
    pub fn is_no_match(&self) -> bool {
        matches!(self, SearchState::Completed { results, .. } if results.is_empty())
    }
}

pub struct Dashboard {
    tasks_repo: Arc<dyn TaskRepository>,
    subtasks_repo: Arc<dyn SubtaskRepository>,
    augmentation: Arc<dyn Augmentation>,
    embeddings: EmbeddingTrigger,

    tasks: Vec<Task>,
    subtasks: SubtaskGroups,
    suggestions: HashMap<String, Vec<String>>,
    search: SearchState,
    banner: Option<String>,
}

impl Dashboard {
    pub fn new(
        tasks_repo: Arc<dyn TaskRepository>,
        subtasks_repo: Arc<dyn SubtaskRepository>,
        augmentation: Arc<dyn Augmentation>,
    ) -> Self {
        let embeddings = EmbeddingTrigger::new(Arc::clone(&augmentation));
        Self {
            tasks_repo,
            subtasks_repo,
            augmentation,
            embeddings,
            tasks: Vec::new(),
            subtasks: SubtaskGroups::new(),
            suggestions: HashMap::new(),
            search: SearchState::Idle,
            banner: None,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub fn subtasks(&self) -> &SubtaskGroups {
        &self.subtasks
    }

    pub fn subtasks_for(&self, task_id: &str) -> &[Subtask] {
        self.subtasks.get(task_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn suggestions_for(&self, task_id: &str) -> &[String] {
        self.suggestions
            .get(task_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn search(&self) -> &SearchState {
        &self.search
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    /// Loads tasks and subtasks, as on first mount.
    pub async fn load(&mut self) -> Outcome<()> {
        self.banner = None;
        self.refresh_tasks().await?;
        self.refresh_subtasks().await
    }

    /// Creates a task. Blank titles are ignored without any request and
    /// return `Ok(None)`.
    pub async fn add_task(&mut self, title: &str, priority: Priority) -> Outcome<Option<Task>> {
        self.banner = None;
        let title = title.trim();
        if title.is_empty() {
            return Ok(None);
        }
        let created = self.tasks_repo.create(title, priority).await;
        let created = match created {
            Ok(task) => {
                self.embeddings.fire(&task.id, &task.title);
                Some(task)
            }
            Err(e) => {
                self.fail(e);
                None
            }
        };
        let refreshed = self.refresh_tasks().await;
        match (created, refreshed) {
            (Some(task), Ok(())) => Ok(Some(task)),
            (Some(_), Err(msg)) => Err(msg),
            (None, _) => Err(self.banner.clone().unwrap_or_default()),
        }
    }

    pub async fn set_status(&mut self, task_id: &str, status: TaskStatus) -> Outcome<()> {
        self.banner = None;
        let result = self.tasks_repo.update_status(task_id, status).await;
        self.settle(result, RefreshScope::Tasks).await
    }

    /// Deletes a task, then re-fetches both tasks and subtasks. Subtask rows
    /// are left to the server's referential rules.
    pub async fn delete_task(&mut self, task_id: &str) -> Outcome<()> {
        self.banner = None;
        let result = self.tasks_repo.delete(task_id).await;
        if result.is_ok() {
            self.suggestions.remove(task_id);
        }
        self.settle(result, RefreshScope::Both).await
    }

    pub async fn add_subtask(&mut self, task_id: &str, title: &str) -> Outcome<Option<Subtask>> {
        self.banner = None;
        let title = title.trim();
        if title.is_empty() {
            return Ok(None);
        }
        let result = self.subtasks_repo.create(task_id, title).await;
        let created = match result {
            Ok(subtask) => Some(subtask),
            Err(e) => {
                self.fail(e);
                None
            }
        };
        let refreshed = self.refresh_subtasks().await;
        match (created, refreshed) {
            (Some(subtask), Ok(())) => Ok(Some(subtask)),
            (Some(_), Err(msg)) => Err(msg),
            (None, _) => Err(self.banner.clone().unwrap_or_default()),
        }
    }

    /// Flips the completed flag of a subtask based on the last fetched state.
    pub async fn toggle_subtask(&mut self, subtask_id: &str) -> Outcome<()> {
        self.banner = None;
        let Some(current) = self
            .subtasks
            .values()
            .flatten()
            .find(|s| s.id == subtask_id)
            .map(|s| s.completed)
        else {
            return Err(self.report(format!("Unknown subtask {subtask_id}")));
        };
        let result = self.subtasks_repo.set_completed(subtask_id, !current).await;
        self.settle(result, RefreshScope::Subtasks).await
    }

    pub async fn delete_subtask(&mut self, subtask_id: &str) -> Outcome<()> {
        self.banner = None;
        let result = self.subtasks_repo.delete(subtask_id).await;
        self.settle(result, RefreshScope::Subtasks).await
    }

    /// Asks for suggested subtasks and stores them under the task, replacing
    /// earlier suggestions for it.
    pub async fn suggest_subtasks(&mut self, task_id: &str) -> Outcome<&[String]> {
        self.banner = None;
        let Some(title) = self.task(task_id).map(|t| t.title.clone()) else {
            return Err(self.report(format!("Unknown task {task_id}")));
        };
        match self.augmentation.generate_subtasks(task_id, &title).await {
            Ok(suggestions) => {
                self.suggestions.insert(task_id.to_string(), suggestions);
                Ok(self.suggestions_for(task_id))
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Persists one suggestion as a subtask and drops it from the suggestion
    /// set. Returns `Ok(false)` without any request when the suggestion is
    /// not (or no longer) present. On failure the suggestion stays.
    pub async fn save_suggestion(&mut self, task_id: &str, suggestion: &str) -> Outcome<bool> {
        self.banner = None;
        let present = self
            .suggestions
            .get(task_id)
            .is_some_and(|list| list.iter().any(|s| s == suggestion));
        if !present {
            return Ok(false);
        }
        if let Err(e) = self.subtasks_repo.create(task_id, suggestion).await {
            let message = self.fail(e);
            // The banner keeps the create failure.
            let _ = self.refresh_subtasks().await;
            return Err(message);
        }
        if let Some(list) = self.suggestions.get_mut(task_id) {
            if let Some(pos) = list.iter().position(|s| s == suggestion) {
                list.remove(pos);
            }
            if list.is_empty() {
                self.suggestions.remove(task_id);
            }
        }
        self.refresh_subtasks().await?;
        Ok(true)
    }

    /// Drops all suggestions for a task without saving any.
    pub fn dismiss_suggestions(&mut self, task_id: &str) {
        self.suggestions.remove(task_id);
    }

    /// Runs a semantic search. A blank query resets the panel to
    /// [`SearchState::Idle`] without a request.
    pub async fn run_search(&mut self, query: &str) -> Outcome<&SearchState> {
        self.banner = None;
        let query = query.trim();
        if query.is_empty() {
            self.search = SearchState::Idle;
            return Ok(&self.search);
        }
        match self.augmentation.semantic_search(query).await {
            Ok(results) => {
                self.search = SearchState::Completed {
                    query: query.to_string(),
                    results,
                };
                Ok(&self.search)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Waits for background embedding requests. Call before the process
    /// exits; never fails.
    pub async fn flush_background(&mut self) {
        self.embeddings.flush().await;
    }

    pub async fn refresh_tasks(&mut self) -> Outcome<()> {
        match self.tasks_repo.list().await {
            Ok(tasks) => {
                self.tasks = tasks;
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    pub async fn refresh_subtasks(&mut self) -> Outcome<()> {
        match self.subtasks_repo.list().await {
            Ok(subtasks) => {
                self.subtasks = group_by_task(subtasks);
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Records a mutation's outcome, then re-fetches regardless of it.
    async fn settle(
        &mut self,
        result: crate::error::Result<()>,
        scope: RefreshScope,
    ) -> Outcome<()> {
        let mutation = result.map_err(|e| self.fail(e));
        let tasks = match scope {
            RefreshScope::Tasks | RefreshScope::Both => self.refresh_tasks().await,
            RefreshScope::Subtasks => Ok(()),
        };
        let subtasks = match scope {
            RefreshScope::Subtasks | RefreshScope::Both => self.refresh_subtasks().await,
            RefreshScope::Tasks => Ok(()),
        };
        mutation.and(tasks).and(subtasks)
    }

    fn fail(&mut self, err: TaskpadError) -> String {
        self.report(err.to_string())
    }

    fn report(&mut self, message: String) -> String {
        tracing::debug!("banner: {message}");
        // Keep the first failure of an operation; refresh errors come later.
        if self.banner.is_none() {
            self.banner = Some(message.clone());
        }
        message
    }
}

#[derive(Clone, Copy)]
enum RefreshScope {
    Tasks,
    Subtasks,
    Both,
}
