//! HTTP API tests driven through the router with `tower::ServiceExt::oneshot`.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use common::{app_with, grounded_responder, unconfigured_tracker, TWO_AREA_REQUIREMENTS};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use storyforge::adapters::http::build_router;
use storyforge::adapters::llm::ScriptedBackend;

fn router_with(backend: ScriptedBackend) -> Router {
    build_router(
        Arc::new(app_with(Arc::new(backend), unconfigured_tracker())),
        false,
    )
}

fn grounded_router() -> Router {
    router_with(ScriptedBackend::with_responder(grounded_responder))
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn chunks_json() -> Value {
    let chunks = storyforge::services::Chunker::new().chunk(TWO_AREA_REQUIREMENTS);
    serde_json::to_value(chunks).unwrap()
}

#[tokio::test]
async fn test_health_and_service_info() {
    let (status, body) = send(grounded_router(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));

    let (status, body) = send(grounded_router(), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "storyforge");
}

#[tokio::test]
async fn test_generate_epics() {
    let request = post_json("/epics/generate", &json!({"chunks": chunks_json()}));
    let (status, body) = send(grounded_router(), request).await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["epics"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["epic_name"].as_str())
        .collect();
    assert_eq!(names.len(), 3);
    assert!(names.contains(&"Billing Management"));
}

#[tokio::test]
async fn test_generate_stories() {
    let request = post_json(
        "/stories/generate",
        &json!({
            "epic": {"epic_name": "Accounts Management", "description": "Sign-up and access"},
            "chunks": chunks_json(),
            "top_k": 1
        }),
    );
    let (status, body) = send(grounded_router(), request).await;

    assert_eq!(status, StatusCode::OK);
    let stories = body["stories"].as_array().unwrap();
    assert!(!stories.is_empty());
    assert!(stories
        .iter()
        .all(|s| s["epic_name"] == "Accounts Management"));
}

#[tokio::test]
async fn test_invalid_model_output_is_bad_gateway_with_raw() {
    let router = router_with(ScriptedBackend::with_responder(|_| {
        Ok("definitely not json".to_string())
    }));
    let request = post_json("/epics/generate", &json!({"chunks": chunks_json()}));
    let (status, body) = send(router, request).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "all_chunks_failed");
    assert_eq!(body["raw"], "definitely not json");
}

#[tokio::test]
async fn test_unsupported_stack_is_bad_request() {
    let backend = Arc::new(ScriptedBackend::with_responder(grounded_responder));
    let router = build_router(
        Arc::new(app_with(backend.clone(), unconfigured_tracker())),
        false,
    );
    let request = post_json(
        "/stories/generate-code",
        &json!({"story": {"epic_name": "Billing", "summary": "Send invoices"}, "stack": "cobol"}),
    );
    let (status, body) = send(router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("cobol"));
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_generate_code_returns_files() {
    let router = router_with(ScriptedBackend::new(vec![Ok(json!({
        "files": {
            "app/main.py": "app = FastAPI()\n",
            "../escape.py": "nope"
        }
    })
    .to_string())]));
    let request = post_json(
        "/stories/generate-code",
        &json!({"story": {"epic_name": "Billing", "summary": "Send invoices"}, "stack": "python_fastapi"}),
    );
    let (status, body) = send(router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["files"], json!({"app/main.py": "app = FastAPI()\n"}));
}

#[tokio::test]
async fn test_regenerate_story_keeps_identity() {
    let router = router_with(ScriptedBackend::new(vec![Ok(json!({
        "summary": "Email invoices on the first business day",
        "description": "As finance, I want invoices emailed automatically",
        "acceptance_criteria": ["Invoice PDF attached"],
        "definition_of_done": []
    })
    .to_string())]));
    let request = post_json(
        "/stories/regenerate",
        &json!({
            "story": {
                "epic_name": "Billing",
                "summary": "Send invoices",
                "description": "Send invoices monthly",
                "definition_of_done": ["Reviewed"],
                "source_chunk_id": "C-abc"
            },
            "source": "Send invoices monthly"
        }),
    );
    let (status, body) = send(router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["epic_name"], "Billing");
    assert_eq!(body["source_chunk_id"], "C-abc");
    assert_eq!(body["summary"], "Email invoices on the first business day");
    assert_eq!(body["definition_of_done"], json!(["Reviewed"]));
}

#[tokio::test]
async fn test_tracker_endpoints_without_configuration() {
    let (status, body) = send(grounded_router(), get("/jira/config")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["configured"], false);
    assert!(body.get("api_token").is_none());

    let request = post_json(
        "/jira/create-stories",
        &json!({"stories": [{"epic_name": "Billing", "summary": "Send invoices"}]}),
    );
    let (status, body) = send(grounded_router(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "tracker_not_configured");

    let (status, body) = send(grounded_router(), get("/jira/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], false);
}

#[tokio::test]
async fn test_configure_reports_token_presence_only() {
    let request = post_json(
        "/jira/configure",
        &json!({"url": "https://example.atlassian.net", "api_token": "secret-token"}),
    );
    let (status, body) = send(grounded_router(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["url"], "https://example.atlassian.net");
    assert_eq!(body["token_configured"], true);
    assert_eq!(body["configured"], false);
    assert!(!body.to_string().contains("secret-token"));
}

#[tokio::test]
async fn test_check_duplicates_rejects_out_of_range_threshold() {
    let request = post_json(
        "/stories/check-duplicates",
        &json!({"story": {"epic_name": "Billing", "summary": "Send invoices"}, "threshold": 2.0}),
    );
    let (status, _) = send(grounded_router(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

fn multipart_request(field: &str, filename: &str, contents: &str) -> Request<Body> {
    let boundary = "storyforge-test-boundary";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n{contents}\r\n--{boundary}--\r\n"
    );
    Request::builder()
        .method("POST")
        .uri("/requirements/parse")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_parse_upload() {
    let request = multipart_request("file", "reqs.txt", TWO_AREA_REQUIREMENTS);
    let (status, body) = send(grounded_router(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["filename"], "reqs.txt");
    assert_eq!(body["chunks"].as_array().unwrap().len(), 2);
    assert!(body["chunks"][0]["chunk_id"]
        .as_str()
        .unwrap()
        .starts_with("C-"));
}

#[tokio::test]
async fn test_parse_upload_errors() {
    let request = multipart_request("file", "reqs.docx", "whatever");
    let (status, body) = send(grounded_router(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Unsupported"));

    let request = multipart_request("attachment", "reqs.txt", "Billing:\nSend invoices");
    let (status, body) = send(grounded_router(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_upload");
}
