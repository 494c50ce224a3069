//! HTTP task source against a mock task server

use std::time::Duration;

use assert_matches::assert_matches;
use serde_json::json;
use taskwait::task::ActivityStatus;
use taskwait::{ServerClient, TaskSource, TaskStatus, TransportError};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> ServerClient {
    ServerClient::new(&server.uri(), "Spaces-1", "API-TEST", Duration::from_secs(5)).unwrap()
}

fn task_json(id: &str, completed: bool) -> serde_json::Value {
    json!({
        "Id": id,
        "Name": "Deploy",
        "Description": format!("Deploy {}", id),
        "State": if completed { "Success" } else { "Executing" },
        "IsCompleted": completed,
        "FinishedSuccessfully": if completed { json!(true) } else { json!(null) },
        "HasWarningsOrErrors": false
    })
}

#[tokio::test]
async fn test_fetch_snapshots_sends_ids_and_api_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/Spaces-1/tasks"))
        .and(query_param("ids", "ServerTasks-1,ServerTasks-2"))
        .and(query_param("skip", "0"))
        .and(header("X-Octopus-ApiKey", "API-TEST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Items": [task_json("ServerTasks-1", true), task_json("ServerTasks-2", false)],
            "ItemsPerPage": 30,
            "TotalResults": 2
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tasks = client(&server)
        .fetch_snapshots(&["ServerTasks-1".to_string(), "ServerTasks-2".to_string()])
        .await
        .unwrap();

    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].status(), TaskStatus::Succeeded);
    assert_eq!(tasks[1].status(), TaskStatus::Pending);
}

#[tokio::test]
async fn test_fetch_snapshots_follows_pages() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/Spaces-1/tasks"))
        .and(query_param("skip", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Items": [task_json("ServerTasks-1", true)],
            "ItemsPerPage": 1,
            "TotalResults": 2
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/Spaces-1/tasks"))
        .and(query_param("skip", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Items": [task_json("ServerTasks-2", true)],
            "ItemsPerPage": 1,
            "TotalResults": 2
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tasks = client(&server)
        .fetch_snapshots(&["ServerTasks-1".to_string(), "ServerTasks-2".to_string()])
        .await
        .unwrap();

    let ids: Vec<_> = tasks.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["ServerTasks-1", "ServerTasks-2"]);
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/Spaces-1/tasks"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API key"))
        .mount(&server)
        .await;

    let err = client(&server)
        .fetch_snapshots(&["ServerTasks-1".to_string()])
        .await
        .unwrap_err();

    assert_matches!(err, TransportError::StatusError { status: 401, ref body } if body == "Invalid API key");
}

#[tokio::test]
async fn test_invalid_body_is_a_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/Spaces-1/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let err = client(&server)
        .fetch_snapshots(&["ServerTasks-1".to_string()])
        .await
        .unwrap_err();

    assert_matches!(err, TransportError::DecodeError(_));
}

#[tokio::test]
async fn test_fetch_details() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/Spaces-1/tasks/ServerTasks-7/details"))
        .and(query_param("verbose", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Task": task_json("ServerTasks-7", false),
            "ActivityLogs": [{
                "Id": "ServerTasks-7",
                "Name": "Deploy release",
                "Status": "Running",
                "LogElements": [],
                "Children": [{
                    "Id": "ServerTasks-7_1",
                    "Name": "Acquire packages",
                    "Status": "Success",
                    "LogElements": [{
                        "Category": "Info",
                        "MessageText": "All packages acquired",
                        "OccurredAt": "2024-05-01T10:00:05.000+00:00"
                    }],
                    "Children": []
                }]
            }]
        })))
        .mount(&server)
        .await;

    let detail = client(&server).fetch_details("ServerTasks-7").await.unwrap();

    assert_eq!(detail.task.map(|t| t.id), Some("ServerTasks-7".to_string()));
    let root = &detail.activity_logs[0];
    assert_eq!(root.status, ActivityStatus::Running);
    assert_eq!(root.children[0].log_elements[0].message_text, "All packages acquired");
}
