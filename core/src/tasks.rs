//! Task store: CRUD on the remote `tasks` collection, scoped to the owner.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;

use crate::error::{Result, TaskpadError};
use crate::models::{NewTask, Priority, Task, TaskStatus};
use crate::rest::{Order, RestClient};
use crate::session::{SessionProvider, require_session};

pub const TASKS_TABLE: &str = "tasks";

/// Operations on the current user's tasks.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// All of the user's tasks, newest first.
    async fn list(&self) -> Result<Vec<Task>>;

    /// Inserts a `pending` task owned by the current user.
    async fn create(&self, title: &str, priority: Priority) -> Result<Task>;

    /// Sets `status` and bumps `updated_at`.
    async fn update_status(&self, task_id: &str, status: TaskStatus) -> Result<()>;

    async fn delete(&self, task_id: &str) -> Result<()>;
}

#[derive(Serialize)]
struct StatusPatch {
    status: TaskStatus,
    updated_at: chrono::DateTime<Utc>,
}

/// [`TaskRepository`] backed by the hosted REST interface.
pub struct RemoteTaskStore {
    rest: RestClient,
    sessions: Arc<dyn SessionProvider>,
}

impl RemoteTaskStore {
    pub fn new(rest: RestClient, sessions: Arc<dyn SessionProvider>) -> Self {
        Self { rest, sessions }
    }
}

#[async_trait]
impl TaskRepository for RemoteTaskStore {
    async fn list(&self) -> Result<Vec<Task>> {
        let session = require_session(self.sessions.as_ref()).await?;
        self.rest
            .from(TASKS_TABLE)
            .eq("user_id", session.user_id())
            .order("created_at", Order::Descending)
            .select(&session)
            .await
    }

    async fn create(&self, title: &str, priority: Priority) -> Result<Task> {
        let title = title.trim();
        if title.is_empty() {
            return Err(TaskpadError::Invalid("Task title is required".to_string()));
        }
        let session = require_session(self.sessions.as_ref()).await?;
        let row = NewTask {
            user_id: session.user_id().to_string(),
            title: title.to_string(),
            priority,
            status: TaskStatus::Pending,
        };
        let task: Task = self.rest.from(TASKS_TABLE).insert(&row, &session).await?;
        tracing::info!("created task {}", task.id);
        Ok(task)
    }

    async fn update_status(&self, task_id: &str, status: TaskStatus) -> Result<()> {
        let session = require_session(self.sessions.as_ref()).await?;
        let patch = StatusPatch {
            status,
            updated_at: Utc::now(),
        };
        let rows: Vec<Task> = self
            .rest
            .from(TASKS_TABLE)
            .eq("id", task_id)
            .eq("user_id", session.user_id())
            .update(&patch, &session)
            .await?;
        if rows.is_empty() {
            tracing::warn!("status update for task {task_id} matched no rows");
        }
        Ok(())
    }

    async fn delete(&self, task_id: &str) -> Result<()> {
        let session = require_session(self.sessions.as_ref()).await?;
        self.rest
            .from(TASKS_TABLE)
            .eq("id", task_id)
            .eq("user_id", session.user_id())
            .delete(&session)
            .await
    }
}
