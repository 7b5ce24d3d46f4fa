use std::sync::Arc;

use pretty_assertions::assert_eq;
use taskpad_core::{Dashboard, Priority, SearchState, TaskStatus};
use taskpad_test_support::{FailOn, InMemoryBackend};

fn dashboard(backend: &Arc<InMemoryBackend>) -> Dashboard {
    Dashboard::new(backend.clone(), backend.clone(), backend.clone())
}

fn titles(dashboard: &Dashboard) -> Vec<String> {
    dashboard.tasks().iter().map(|t| t.title.clone()).collect()
}

#[tokio::test]
async fn add_task_refetches_and_fires_embedding() {
    let backend = InMemoryBackend::new();
    let mut dash = dashboard(&backend);
    dash.load().await.unwrap();
    assert!(dash.tasks().is_empty());

    let created = dash
        .add_task("Buy milk", Priority::Low)
        .await
        .unwrap()
        .unwrap();
    dash.add_task("Write report", Priority::High).await.unwrap();
    dash.flush_background().await;

    assert_eq!(titles(&dash), vec!["Write report", "Buy milk"]);
    assert_eq!(created.status, TaskStatus::Pending);
    let embedded: Vec<_> = backend
        .embedding_calls()
        .await
        .into_iter()
        .map(|(_, title)| title)
        .collect();
    assert_eq!(embedded, vec!["Buy milk", "Write report"]);
}

#[tokio::test]
async fn blank_title_makes_no_call() {
    let backend = InMemoryBackend::new();
    let mut dash = dashboard(&backend);
    assert_eq!(dash.add_task("   ", Priority::Medium).await.unwrap(), None);
    assert!(backend.tasks().await.is_empty());
    assert_eq!(dash.banner(), None);
}

#[tokio::test]
async fn embedding_failure_does_not_affect_creation() {
    let backend = InMemoryBackend::new();
    backend.fail_next(FailOn::Embedding).await;
    let mut dash = dashboard(&backend);
    dash.add_task("Buy milk", Priority::Low).await.unwrap();
    dash.flush_background().await;
    assert_eq!(titles(&dash), vec!["Buy milk"]);
    assert_eq!(dash.banner(), None);
}

#[tokio::test]
async fn failed_create_sets_banner_and_keeps_list() {
    let backend = InMemoryBackend::new();
    let mut dash = dashboard(&backend);
    dash.add_task("Buy milk", Priority::Low).await.unwrap();

    backend.fail_next(FailOn::CreateTask).await;
    let err = dash
        .add_task("Write report", Priority::High)
        .await
        .unwrap_err();
    assert_eq!(err, "CreateTask failed");
    assert_eq!(dash.banner(), Some("CreateTask failed"));
    assert_eq!(titles(&dash), vec!["Buy milk"]);
    dash.flush_background().await;
    assert_eq!(backend.embedding_calls().await.len(), 1);
}

#[tokio::test]
async fn status_change_is_visible_after_refetch() {
    let backend = InMemoryBackend::new();
    let mut dash = dashboard(&backend);
    let task = dash
        .add_task("Buy milk", Priority::Low)
        .await
        .unwrap()
        .unwrap();

    dash.set_status(&task.id, TaskStatus::Done).await.unwrap();
    assert_eq!(dash.task(&task.id).unwrap().status, TaskStatus::Done);
    assert!(dash.task(&task.id).unwrap().updated_at > task.updated_at);
}

#[tokio::test]
async fn suggestions_save_one_at_a_time() {
    let backend = InMemoryBackend::new();
    backend
        .set_suggestions(&["Check fridge", "Go to store", "Pay"])
        .await;
    let mut dash = dashboard(&backend);
    let task = dash
        .add_task("Buy milk", Priority::Low)
        .await
        .unwrap()
        .unwrap();

    let suggested = dash.suggest_subtasks(&task.id).await.unwrap().to_vec();
    assert_eq!(suggested, vec!["Check fridge", "Go to store", "Pay"]);
    assert_eq!(backend.suggestion_calls().await, vec!["Buy milk"]);

    assert!(dash.save_suggestion(&task.id, "Go to store").await.unwrap());
    assert_eq!(dash.suggestions_for(&task.id), ["Check fridge", "Pay"]);
    let saved: Vec<_> = dash
        .subtasks_for(&task.id)
        .iter()
        .map(|s| (s.title.as_str(), s.completed))
        .collect();
    assert_eq!(saved, vec![("Go to store", false)]);

    // Already saved: nothing happens.
    assert!(!dash.save_suggestion(&task.id, "Go to store").await.unwrap());
    assert_eq!(dash.subtasks_for(&task.id).len(), 1);

    dash.dismiss_suggestions(&task.id);
    assert!(dash.suggestions_for(&task.id).is_empty());
}

#[tokio::test]
async fn failed_save_keeps_suggestion() {
    let backend = InMemoryBackend::new();
    backend.set_suggestions(&["Pay"]).await;
    let mut dash = dashboard(&backend);
    let task = dash
        .add_task("Buy milk", Priority::Low)
        .await
        .unwrap()
        .unwrap();
    dash.suggest_subtasks(&task.id).await.unwrap();

    backend.fail_next(FailOn::CreateSubtask).await;
    assert!(dash.save_suggestion(&task.id, "Pay").await.is_err());
    assert_eq!(dash.suggestions_for(&task.id), ["Pay"]);
}

#[tokio::test]
async fn failed_save_still_refetches_subtasks() {
    let backend = InMemoryBackend::new();
    backend.set_suggestions(&["Pay"]).await;
    let mut dash = dashboard(&backend);
    let task = dash
        .add_task("Buy milk", Priority::Low)
        .await
        .unwrap()
        .unwrap();
    dash.suggest_subtasks(&task.id).await.unwrap();

    // Written elsewhere; this dashboard has not seen it yet.
    let mut other = dashboard(&backend);
    other.load().await.unwrap();
    other.add_subtask(&task.id, "Check fridge").await.unwrap();
    assert!(dash.subtasks_for(&task.id).is_empty());

    backend.fail_next(FailOn::CreateSubtask).await;
    let err = dash.save_suggestion(&task.id, "Pay").await.unwrap_err();
    assert_eq!(err, "CreateSubtask failed");
    assert_eq!(dash.banner(), Some("CreateSubtask failed"));
    let seen: Vec<&str> = dash
        .subtasks_for(&task.id)
        .iter()
        .map(|s| s.title.as_str())
        .collect();
    assert_eq!(seen, ["Check fridge"]);
}

#[tokio::test]
async fn failed_suggestion_request_keeps_previous_suggestions() {
    let backend = InMemoryBackend::new();
    backend.set_suggestions(&["Pay"]).await;
    let mut dash = dashboard(&backend);
    let task = dash
        .add_task("Buy milk", Priority::Low)
        .await
        .unwrap()
        .unwrap();
    dash.suggest_subtasks(&task.id).await.unwrap();

    backend.fail_next(FailOn::GenerateSubtasks).await;
    let err = dash.suggest_subtasks(&task.id).await.unwrap_err();
    assert_eq!(err, "GenerateSubtasks failed");
    assert_eq!(dash.suggestions_for(&task.id), ["Pay"]);
}

#[tokio::test]
async fn toggle_flips_from_last_fetched_state() {
    let backend = InMemoryBackend::new();
    let mut dash = dashboard(&backend);
    let task = dash
        .add_task("Buy milk", Priority::Low)
        .await
        .unwrap()
        .unwrap();
    let subtask = dash
        .add_subtask(&task.id, "Pay")
        .await
        .unwrap()
        .unwrap();

    dash.toggle_subtask(&subtask.id).await.unwrap();
    assert!(dash.subtasks_for(&task.id)[0].completed);
    dash.toggle_subtask(&subtask.id).await.unwrap();
    assert!(!dash.subtasks_for(&task.id)[0].completed);

    assert!(dash.toggle_subtask("missing").await.is_err());
}

#[tokio::test]
async fn deleting_task_drops_its_subtasks_after_refetch() {
    let backend = InMemoryBackend::new();
    backend.set_suggestions(&["Pay"]).await;
    let mut dash = dashboard(&backend);
    let milk = dash
        .add_task("Buy milk", Priority::Low)
        .await
        .unwrap()
        .unwrap();
    let report = dash
        .add_task("Write report", Priority::High)
        .await
        .unwrap()
        .unwrap();
    dash.add_subtask(&milk.id, "Pay").await.unwrap();
    dash.add_subtask(&report.id, "Outline").await.unwrap();
    dash.suggest_subtasks(&milk.id).await.unwrap();

    dash.delete_task(&milk.id).await.unwrap();

    assert_eq!(titles(&dash), vec!["Write report"]);
    assert!(dash.subtasks_for(&milk.id).is_empty());
    assert_eq!(dash.subtasks_for(&report.id).len(), 1);
    assert!(dash.suggestions_for(&milk.id).is_empty());
}

#[tokio::test]
async fn delete_subtask_refetches() {
    let backend = InMemoryBackend::new();
    let mut dash = dashboard(&backend);
    let task = dash
        .add_task("Buy milk", Priority::Low)
        .await
        .unwrap()
        .unwrap();
    let subtask = dash
        .add_subtask(&task.id, "Pay")
        .await
        .unwrap()
        .unwrap();
    dash.delete_subtask(&subtask.id).await.unwrap();
    assert!(dash.subtasks_for(&task.id).is_empty());
}

#[tokio::test]
async fn search_states() {
    let backend = InMemoryBackend::new();
    let mut dash = dashboard(&backend);
    dash.add_task("Buy milk", Priority::Low).await.unwrap();

    let state = dash.run_search("milk").await.unwrap().clone();
    assert_eq!(state.results().len(), 1);
    assert_eq!(state.results()[0].title, "Buy milk");

    let state = dash.run_search("taxes").await.unwrap().clone();
    assert!(state.is_no_match());

    let state = dash.run_search("   ").await.unwrap().clone();
    assert_eq!(state, SearchState::Idle);
    assert_eq!(backend.search_calls().await, vec!["milk", "taxes"]);
}

#[tokio::test]
async fn failed_refetch_is_reported() {
    let backend = InMemoryBackend::new();
    let mut dash = dashboard(&backend);
    backend.fail_next(FailOn::ListTasks).await;
    let err = dash.load().await.unwrap_err();
    assert_eq!(err, "ListTasks failed");
    assert_eq!(dash.banner(), Some("ListTasks failed"));

    dash.load().await.unwrap();
    assert_eq!(dash.banner(), None);
}
