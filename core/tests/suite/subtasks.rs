use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use taskpad_core::SubtaskRepository;
use taskpad_core::rest::RestClient;
use taskpad_core::subtasks::{RemoteSubtaskStore, group_by_task};
use taskpad_test_support::{StaticSession, TEST_USER_ID, backend_for, subtask_row};
use wiremock::matchers::{body_json, body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn store(server: &MockServer) -> RemoteSubtaskStore {
    let rest = RestClient::new(reqwest::Client::new(), Arc::new(backend_for(server)));
    RemoteSubtaskStore::new(rest, StaticSession::signed_in())
}

#[tokio::test]
async fn list_is_oldest_first_and_groups_by_task() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/subtasks"))
        .and(query_param("user_id", format!("eq.{TEST_USER_ID}")))
        .and(query_param("order", "created_at.asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            subtask_row("s1", "t1", "Check fridge", false),
            subtask_row("s2", "t2", "Outline", true),
            subtask_row("s3", "t1", "Go to store", false),
        ])))
        .mount(&server)
        .await;

    let groups = group_by_task(store(&server).list().await.unwrap());
    let t1: Vec<_> = groups["t1"].iter().map(|s| s.title.as_str()).collect();
    assert_eq!(t1, vec!["Check fridge", "Go to store"]);
    assert!(groups["t2"][0].completed);
    assert!(!groups.contains_key("t3"));
}

#[tokio::test]
async fn create_is_incomplete_and_owned() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/subtasks"))
        .and(body_json(json!({
            "task_id": "t1",
            "user_id": TEST_USER_ID,
            "title": "Go to store",
            "completed": false,
        })))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!([subtask_row("s1", "t1", "Go to store", false)])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let subtask = store(&server).create("t1", "Go to store").await.unwrap();
    assert_eq!(subtask.id, "s1");
    assert!(!subtask.completed);
}

#[tokio::test]
async fn set_completed_patches_flag_only() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/subtasks"))
        .and(query_param("id", "eq.s1"))
        .and(body_partial_json(json!({"completed": true})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([subtask_row("s1", "t1", "Go to store", true)])),
        )
        .expect(1)
        .mount(&server)
        .await;

    store(&server).set_completed("s1", true).await.unwrap();
}

#[tokio::test]
async fn delete_failure_reports_fallback_message() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/rest/v1/subtasks"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = store(&server).delete("s1").await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to delete subtasks");
}
