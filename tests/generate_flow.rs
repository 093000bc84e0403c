//! End-to-end generation flow against a mocked HTTP service

use kontext_client::{Config, Error, GenerationRequest, KontextClient, TaskState};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> Config {
    Config {
        api_key: "integration-key".to_string(),
        base_url: server.uri(),
        upload_url: format!("{}/file-stream-upload", server.uri()),
        asset_base_url: Some("https://gallery.example".to_string()),
        poll_interval: Duration::from_millis(10),
        poll_timeout: Duration::from_secs(5),
        ..Default::default()
    }
}

#[tokio::test]
async fn upload_then_generate_round_trip() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/file-stream-upload"))
        .and(header("authorization", "Bearer integration-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "code": 200,
            "msg": "ok",
            "data": { "downloadUrl": "https://files.example/uploads/photo.jpg" },
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/generate"))
        .and(body_partial_json(json!({
            "inputImage": "https://files.example/uploads/photo.jpg",
            "prompt": "turn the sky stormy",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200,
            "msg": "success",
            "data": { "taskId": "task-900" },
        })))
        .expect(1)
        .mount(&server)
        .await;

    // First status query sees the task processing, the second completion
    Mock::given(method("GET"))
        .and(path("/record-info"))
        .and(query_param("taskId", "task-900"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200,
            "msg": "success",
            "data": { "successFlag": 0, "progress": 40 },
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/record-info"))
        .and(query_param("taskId", "task-900"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200,
            "msg": "success",
            "data": {
                "successFlag": 1,
                "response": { "resultImageUrl": "https://cdn.example/result.jpg" },
            },
        })))
        .mount(&server)
        .await;

    let client = KontextClient::new(config_for(&server)).unwrap();

    let asset = client
        .upload_asset(vec![0xFF, 0xD8, 0xFF, 0xE0], "photo.jpg")
        .await
        .unwrap();
    assert_eq!(asset.url, "https://files.example/uploads/photo.jpg");

    let mut updates = Vec::new();
    let result_url = client
        .generate(
            GenerationRequest::new(asset.url.clone(), "turn the sky stormy"),
            |update| updates.push(update),
        )
        .await
        .unwrap();

    assert_eq!(result_url, "https://cdn.example/result.jpg");
    let states: Vec<_> = updates.iter().map(|u| u.state).collect();
    assert_eq!(states, vec![TaskState::Processing, TaskState::Completed]);
    assert_eq!(updates[0].progress, Some(40));
    assert_eq!(updates[1].progress, Some(100));
}

#[tokio::test]
async fn catalog_source_is_resolved_before_submission() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/generate"))
        .and(body_partial_json(json!({
            "inputImage":
                "https://gallery.example/images/paintings/the_scream_edvard_munch_painting_high_quality.jpg",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200,
            "msg": "success",
            "data": { "taskId": "task-901" },
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/record-info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200,
            "msg": "success",
            "data": {
                "successFlag": 1,
                "response": { "resultImageUrl": "https://cdn.example/scream.jpg" },
            },
        })))
        .mount(&server)
        .await;

    let client = KontextClient::new(config_for(&server)).unwrap();
    let result_url = client
        .generate(
            GenerationRequest::new("the-scream", "make it calm and serene"),
            |_| {},
        )
        .await
        .unwrap();
    assert_eq!(result_url, "https://cdn.example/scream.jpg");
}

#[tokio::test]
async fn failed_submission_never_polls() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 422,
            "msg": "prompt rejected by safety filter",
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/record-info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200,
            "msg": "success",
            "data": { "successFlag": 0 },
        })))
        .expect(0)
        .mount(&server)
        .await;

    let client = KontextClient::new(config_for(&server)).unwrap();
    let err = client
        .generate(GenerationRequest::new("mona-lisa", "something"), |_| {})
        .await
        .unwrap_err();

    match err {
        Error::Service(msg) => assert!(msg.contains("prompt rejected")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn task_reported_failed_surfaces_server_reason() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200,
            "msg": "success",
            "data": { "taskId": "task-902" },
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/record-info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200,
            "msg": "success",
            "data": {
                "successFlag": 3,
                "errorMessage": "content policy violation",
            },
        })))
        .mount(&server)
        .await;

    let client = KontextClient::new(config_for(&server)).unwrap();
    let mut last_state = None;
    let err = client
        .generate(GenerationRequest::new("mona-lisa", "something"), |update| {
            last_state = Some(update.state)
        })
        .await
        .unwrap_err();

    match err {
        Error::Service(msg) => assert_eq!(msg, "content policy violation"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(last_state, Some(TaskState::Failed));
}
