//! Subtask store: CRUD on the remote `subtasks` collection.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::{Result, TaskpadError};
use crate::models::{NewSubtask, Subtask};
use crate::rest::{Order, RestClient};
use crate::session::{SessionProvider, require_session};

pub const SUBTASKS_TABLE: &str = "subtasks";

/// Subtasks grouped by parent task id, each group in creation order.
pub type SubtaskGroups = BTreeMap<String, Vec<Subtask>>;

/// Operations on the current user's subtasks.
#[async_trait]
pub trait SubtaskRepository: Send + Sync {
    /// All of the user's subtasks, oldest first.
    async fn list(&self) -> Result<Vec<Subtask>>;

    async fn create(&self, task_id: &str, title: &str) -> Result<Subtask>;

    async fn set_completed(&self, subtask_id: &str, completed: bool) -> Result<()>;

    async fn delete(&self, subtask_id: &str) -> Result<()>;
}

/// Groups a flat list by `task_id`, keeping the input order inside a group.
pub fn group_by_task(subtasks: Vec<Subtask>) -> SubtaskGroups {
    let mut groups = SubtaskGroups::new();
    for subtask in subtasks {
        groups
            .entry(subtask.task_id.clone())
            .or_default()
            .push(subtask);
    }
    groups
}

#[derive(Serialize)]
struct CompletedPatch {
    completed: bool,
}

/// [`SubtaskRepository`] backed by the hosted REST interface.
pub struct RemoteSubtaskStore {
    rest: RestClient,
    sessions: Arc<dyn SessionProvider>,
}

impl RemoteSubtaskStore {
    pub fn new(rest: RestClient, sessions: Arc<dyn SessionProvider>) -> Self {
        Self { rest, sessions }
    }
}

#[async_trait]
impl SubtaskRepository for RemoteSubtaskStore {
    async fn list(&self) -> Result<Vec<Subtask>> {
        let session = require_session(self.sessions.as_ref()).await?;
        self.rest
            .from(SUBTASKS_TABLE)
            .eq("user_id", session.user_id())
            .order("created_at", Order::Ascending)
            .select(&session)
            .await
    }

    async fn create(&self, task_id: &str, title: &str) -> Result<Subtask> {
        let title = title.trim();
        if title.is_empty() {
            return Err(TaskpadError::Invalid("Subtask title is required".to_string()));
        }
        let session = require_session(self.sessions.as_ref()).await?;
        let row = NewSubtask {
            task_id: task_id.to_string(),
            user_id: session.user_id().to_string(),
            title: title.to_string(),
            completed: false,
        };
        self.rest.from(SUBTASKS_TABLE).insert(&row, &session).await
    }

    async fn set_completed(&self, subtask_id: &str, completed: bool) -> Result<()> {
        let session = require_session(self.sessions.as_ref()).await?;
        let _: Vec<Subtask> = self
            .rest
            .from(SUBTASKS_TABLE)
            .eq("id", subtask_id)
            .eq("user_id", session.user_id())
            .update(&CompletedPatch { completed }, &session)
            .await?;
        Ok(())
    }

    async fn delete(&self, subtask_id: &str) -> Result<()> {
        let session = require_session(self.sessions.as_ref()).await?;
        self.rest
            .from(SUBTASKS_TABLE)
            .eq("id", subtask_id)
            .eq("user_id", session.user_id())
            .delete(&session)
            .await
    }
}
