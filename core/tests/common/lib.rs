#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use taskpad_core::BackendConfig;
use taskpad_core::error::{Result, TaskpadError};
use taskpad_core::models::{Priority, SearchResult, Session, Subtask, Task, TaskStatus, User};
use taskpad_core::{Augmentation, SessionProvider, SubtaskRepository, TaskRepository};
use tokio::sync::Mutex;
use url::Url;
use wiremock::MockServer;

pub const TEST_USER_ID: &str = "user-1";
pub const TEST_EMAIL: &str = "ada@example.com";
pub const TEST_ACCESS_TOKEN: &str = "access-token-1";
pub const TEST_ANON_KEY: &str = "anon-key";

/// A signed-in session for [`TEST_USER_ID`] that never expires.
pub fn test_session() -> Session {
    Session {
        access_token: TEST_ACCESS_TOKEN.to_string(),
        refresh_token: Some("refresh-token-1".to_string()),
        expires_at: None,
        user: User {
            id: TEST_USER_ID.to_string(),
            email: Some(TEST_EMAIL.to_string()),
        },
    }
}

/// Backend settings pointing at a wiremock server.
pub fn backend_for(server: &MockServer) -> BackendConfig {
    BackendConfig::new(Url::parse(&server.uri()).unwrap(), TEST_ANON_KEY)
}

/// Session provider with a fixed answer.
pub struct StaticSession(Option<Session>);

impl StaticSession {
    pub fn signed_in() -> Arc<Self> {
        Arc::new(Self(Some(test_session())))
    }

    pub fn signed_out() -> Arc<Self> {
        Arc::new(Self(None))
    }
}

#[async_trait]
impl SessionProvider for StaticSession {
    async fn current_session(&self) -> Option<Session> {
        self.0.clone()
    }
}

/// Which in-memory operation should fail next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    ListTasks,
    CreateTask,
    UpdateTask,
    DeleteTask,
    ListSubtasks,
    CreateSubtask,
    UpdateSubtask,
    DeleteSubtask,
    GenerateSubtasks,
    Search,
    Embedding,
}

#[derive(Default)]
struct State {
    tasks: Vec<Task>,
    subtasks: Vec<Subtask>,
    suggestions: Vec<String>,
    failures: Vec<FailOn>,
    embedding_calls: Vec<(String, String)>,
    search_calls: Vec<String>,
    suggestion_calls: Vec<String>,
    clock: i64,
}

impl State {
    fn tick(&mut self) -> DateTime<Utc> {
        self.clock += 1;
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(self.clock)
    }

    fn check(&mut self, op: FailOn) -> Result<()> {
        if let Some(pos) = self.failures.iter().position(|f| *f == op) {
            self.failures.remove(pos);
            return Err(TaskpadError::Api {
                status: 500,
                message: format!("{op:?} failed"),
            });
        }
        Ok(())
    }
}

/// In-process stand-in for the hosted backend, owned by [`TEST_USER_ID`].
///
/// Deleting a task also deletes its subtasks, matching the cascade rule the
/// remote schema applies.
#[derive(Default)]
pub struct InMemoryBackend {
    state: Mutex<State>,
}

impl InMemoryBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Titles returned by the next `generate_subtasks` calls.
    pub async fn set_suggestions(&self, suggestions: &[&str]) {
        self.state.lock().await.suggestions = suggestions.iter().map(ToString::to_string).collect();
    }

    /// Makes the next call of `op` fail with a 500.
    pub async fn fail_next(&self, op: FailOn) {
        self.state.lock().await.failures.push(op);
    }

    pub async fn tasks(&self) -> Vec<Task> {
        self.state.lock().await.tasks.clone()
    }

    pub async fn subtasks(&self) -> Vec<Subtask> {
        self.state.lock().await.subtasks.clone()
    }

    pub async fn embedding_calls(&self) -> Vec<(String, String)> {
        self.state.lock().await.embedding_calls.clone()
    }

    pub async fn search_calls(&self) -> Vec<String> {
        self.state.lock().await.search_calls.clone()
    }

    pub async fn suggestion_calls(&self) -> Vec<String> {
        self.state.lock().await.suggestion_calls.clone()
    }
}

#[async_trait]
impl TaskRepository for InMemoryBackend {
    async fn list(&self) -> Result<Vec<Task>> {
        let mut state = self.state.lock().await;
        state.check(FailOn::ListTasks)?;
        let mut tasks = state.tasks.clone();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    async fn create(&self, title: &str, priority: Priority) -> Result<Task> {
        let mut state = self.state.lock().await;
        state.check(FailOn::CreateTask)?;
        let now = state.tick();
        let task = Task {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: TEST_USER_ID.to_string(),
            title: title.to_string(),
            priority,
            status: TaskStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        state.tasks.push(task.clone());
        Ok(task)
    }

    async fn update_status(&self, task_id: &str, status: TaskStatus) -> Result<()> {
        let mut state = self.state.lock().await;
        state.check(FailOn::UpdateTask)?;
        let now = state.tick();
        if let Some(task) = state.tasks.iter_mut().find(|t| t.id == task_id) {
            task.status = status;
            task.updated_at = now;
        }
        Ok(())
    }

    async fn delete(&self, task_id: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        state.check(FailOn::DeleteTask)?;
        state.tasks.retain(|t| t.id != task_id);
        state.subtasks.retain(|s| s.task_id != task_id);
        Ok(())
    }
}

#[async_trait]
impl SubtaskRepository for InMemoryBackend {
    async fn list(&self) -> Result<Vec<Subtask>> {
        let mut state = self.state.lock().await;
        state.check(FailOn::ListSubtasks)?;
        let mut subtasks = state.subtasks.clone();
        subtasks.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(subtasks)
    }

    async fn create(&self, task_id: &str, title: &str) -> Result<Subtask> {
        let mut state = self.state.lock().await;
        state.check(FailOn::CreateSubtask)?;
        let now = state.tick();
        let subtask = Subtask {
            id: uuid::Uuid::new_v4().to_string(),
            task_id: task_id.to_string(),
            user_id: TEST_USER_ID.to_string(),
            title: title.to_string(),
            completed: false,
            created_at: now,
        };
        state.subtasks.push(subtask.clone());
        Ok(subtask)
    }

    async fn set_completed(&self, subtask_id: &str, completed: bool) -> Result<()> {
        let mut state = self.state.lock().await;
        state.check(FailOn::UpdateSubtask)?;
        if let Some(subtask) = state.subtasks.iter_mut().find(|s| s.id == subtask_id) {
            subtask.completed = completed;
        }
        Ok(())
    }

    async fn delete(&self, subtask_id: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        state.check(FailOn::DeleteSubtask)?;
        state.subtasks.retain(|s| s.id != subtask_id);
        Ok(())
    }
}

#[async_trait]
impl Augmentation for InMemoryBackend {
    async fn generate_subtasks(&self, _task_id: &str, task_title: &str) -> Result<Vec<String>> {
        let mut state = self.state.lock().await;
        state.check(FailOn::GenerateSubtasks)?;
        state.suggestion_calls.push(task_title.to_string());
        Ok(state.suggestions.clone())
    }

    /// Case-insensitive substring match standing in for vector similarity.
    async fn semantic_search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let mut state = self.state.lock().await;
        state.check(FailOn::Search)?;
        state.search_calls.push(query.to_string());
        let needle = query.to_lowercase();
        Ok(state
            .tasks
            .iter()
            .filter(|t| t.title.to_lowercase().contains(&needle))
            .map(|t| SearchResult {
                id: t.id.clone(),
                title: t.title.clone(),
                priority: t.priority,
                status: t.status,
                similarity: 0.9,
            })
            .collect())
    }

    async fn generate_embedding(&self, task_id: &str, task_title: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        state
            .embedding_calls
            .push((task_id.to_string(), task_title.to_string()));
        state.check(FailOn::Embedding)
    }
}

/// JSON row for a task as the REST interface returns it.
pub fn task_row(id: &str, title: &str, priority: &str, status: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "user_id": TEST_USER_ID,
        "title": title,
        "priority": priority,
        "status": status,
        "created_at": "2026-01-01T00:00:00Z",
        "updated_at": "2026-01-01T00:00:00Z",
    })
}

/// JSON row for a subtask as the REST interface returns it.
pub fn subtask_row(id: &str, task_id: &str, title: &str, completed: bool) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "task_id": task_id,
        "user_id": TEST_USER_ID,
        "title": title,
        "completed": completed,
        "created_at": "2026-01-01T00:00:00Z",
    })
}
