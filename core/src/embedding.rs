//! Best-effort embedding generation after a task is created.
//!
//! Each request runs as a detached tokio task. Callers never wait on it to
//! finish an operation and never see its errors; failures are only logged.
//! [`EmbeddingTrigger::flush`] exists for short-lived processes that would
//! otherwise exit before the request is sent.

use std::sync::Arc;

use tokio::task::JoinSet;

use crate::functions::Augmentation;

pub struct EmbeddingTrigger {
    augmentation: Arc<dyn Augmentation>,
    in_flight: JoinSet<()>,
}

impl EmbeddingTrigger {
    pub fn new(augmentation: Arc<dyn Augmentation>) -> Self {
        Self {
            augmentation,
            in_flight: JoinSet::new(),
        }
    }

    /// Spawns the request and returns immediately.
    pub fn fire(&mut self, task_id: &str, task_title: &str) {
        self.reap_finished();

        let augmentation = Arc::clone(&self.augmentation);
        let task_id = task_id.to_string();
        let task_title = task_title.to_string();
        self.in_flight.spawn(async move {
            match augmentation.generate_embedding(&task_id, &task_title).await {
                Ok(()) => tracing::debug!("embedding generated for task {task_id}"),
                Err(e) => tracing::warn!("embedding generation failed for task {task_id}: {e}"),
            }
        });
    }

    /// Number of requests not yet observed as finished.
    pub fn pending(&self) -> usize {
        self.in_flight.len()
    }

    /// Waits for every outstanding request. Never fails.
    pub async fn flush(&mut self) {
        while let Some(joined) = self.in_flight.join_next().await {
            if let Err(e) = joined {
                tracing::warn!("embedding task did not complete: {e}");
            }
        }
    }

    fn reap_finished(&mut self) {
        while let Some(joined) = self.in_flight.try_join_next() {
            if let Err(e) = joined {
                tracing::warn!("embedding task did not complete: {e}");
            }
        }
    }
}

impl Drop for EmbeddingTrigger {
    fn drop(&mut self) {
        // JoinSet aborts its tasks on drop; let outstanding requests run on.
        self.in_flight.detach_all();
    }
}
