use serde_json::json;
use wiremock::matchers::{basic_auth, body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use storyforge::adapters::jira::{JiraClient, JiraSettings};
use storyforge::domain::models::Story;
use storyforge::domain::ports::{IssueTracker, TrackerConfigUpdate, TrackerError};
use storyforge::services::{DuplicateService, DuplicateServiceConfig};
use std::sync::Arc;

fn settings_for(server: &MockServer) -> JiraSettings {
    JiraSettings {
        url: Some(server.uri()),
        email: Some("pm@example.com".to_string()),
        api_token: Some("jira-token".to_string()),
        project_key: Some("PAY".to_string()),
    }
}

fn client_for(server: &MockServer) -> JiraClient {
    JiraClient::with_settings(settings_for(server), 5).unwrap()
}

#[tokio::test]
async fn test_recent_issues_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/api/2/search"))
        .and(basic_auth("pm@example.com", "jira-token"))
        .and(query_param(
            "jql",
            "project = PAY AND issuetype IN (Story, Task, Bug) AND created >= -90d ORDER BY created DESC",
        ))
        .and(query_param("maxResults", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "issues": [
                {"key": "PAY-7", "fields": {"summary": "Send invoice by email"}},
                {"key": "PAY-3", "fields": {"summary": "Export ledger"}}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let issues = client_for(&server)
        .recent_issues(&["Story", "Task", "Bug"], 90, 50)
        .await
        .unwrap();

    assert_eq!(issues.len(), 2);
    assert_eq!(issues[0].key, "PAY-7");
    assert_eq!(issues[1].summary, "Export ledger");
}

#[tokio::test]
async fn test_create_stories_returns_keys_in_order() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/api/2/issue"))
        .and(body_partial_json(json!({
            "fields": {"summary": "Send invoice email", "issuetype": {"name": "Story"}, "project": {"key": "PAY"}}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "1", "key": "PAY-10"})))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/api/2/issue"))
        .and(body_partial_json(json!({"fields": {"summary": "Refund payment"}})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "2", "key": "PAY-11"})))
        .mount(&server)
        .await;

    let stories = vec![
        Story {
            acceptance_criteria: vec!["Email arrives".to_string()],
            ..Story::new("Billing", "Send invoice email")
        },
        Story::new("Billing", "Refund payment"),
    ];

    let keys = client_for(&server).create_stories(&stories).await.unwrap();
    assert_eq!(keys, vec!["PAY-10", "PAY-11"]);

    let requests = server.received_requests().await.unwrap();
    let first: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(first["fields"]["description"]
        .as_str()
        .unwrap()
        .contains("Acceptance Criteria:\n- Email arrives"));
}

#[tokio::test]
async fn test_create_failure_partway_keeps_created_keys() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/api/2/issue"))
        .and(body_partial_json(json!({"fields": {"summary": "Send invoice email"}})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "1", "key": "PAY-10"})))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/api/2/issue"))
        .and(body_partial_json(json!({"fields": {"summary": "Refund payment"}})))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let stories = vec![
        Story::new("Billing", "Send invoice email"),
        Story::new("Billing", "Refund payment"),
        Story::new("Billing", "Never sent"),
    ];

    let err = client_for(&server)
        .create_stories(&stories)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        TrackerError::PartialCreate {
            created: vec!["PAY-10".to_string()],
            requested: 3,
            source: Box::new(TrackerError::Status {
                status: 500,
                body: "boom".to_string()
            }),
        }
    );
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_first_create_failure_is_plain_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/api/2/issue"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .create_stories(&[Story::new("Billing", "Send invoice email")])
        .await
        .unwrap_err();

    assert!(matches!(err, TrackerError::Status { status: 500, .. }));
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/api/2/search"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .recent_issues(&["Story"], 90, 50)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        TrackerError::Status {
            status: 401,
            body: "unauthorized".to_string()
        }
    );
}

#[tokio::test]
async fn test_health_reports_user_and_failures() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/api/2/myself"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "displayName": "Ada Lovelace",
            "emailAddress": "pm@example.com"
        })))
        .mount(&server)
        .await;

    let health = client_for(&server).health().await;
    assert!(health.ok);
    assert_eq!(health.user.as_deref(), Some("Ada Lovelace"));

    let unconfigured = JiraClient::with_settings(JiraSettings::default(), 5).unwrap();
    let health = unconfigured.health().await;
    assert!(!health.ok);
    assert!(health.error.unwrap().contains("url"));
}

#[tokio::test]
async fn test_unconfigured_tracker_makes_no_requests() {
    let client = JiraClient::with_settings(JiraSettings::default(), 5).unwrap();

    let err = client.create_stories(&[Story::new("E", "S")]).await.unwrap_err();
    assert!(matches!(err, TrackerError::MissingConfig(_)));
}

#[tokio::test]
async fn test_configure_then_search() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/api/2/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"issues": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = JiraClient::with_settings(JiraSettings::default(), 5).unwrap();
    let view = client
        .configure(TrackerConfigUpdate {
            url: Some(server.uri()),
            email: Some("pm@example.com".to_string()),
            api_token: Some("jira-token".to_string()),
            project_key: Some("PAY".to_string()),
        })
        .await;

    assert!(view.configured);
    assert!(view.token_configured);
    assert!(client.recent_issues(&["Story"], 30, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_duplicate_check_against_tracker() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/api/2/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "issues": [
                {"key": "PAY-7", "fields": {"summary": "Send invoice by email"}},
                {"key": "PAY-8", "fields": {"summary": "Rotate signing keys"}}
            ]
        })))
        .mount(&server)
        .await;

    let service = DuplicateService::new(
        Arc::new(client_for(&server)),
        DuplicateServiceConfig::default(),
    );
    let matches = service
        .check_story(&Story::new("Billing", "Send invoice email"), None)
        .await
        .unwrap();

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].jira_key, "PAY-7");
    assert!((matches[0].similarity - 0.92).abs() < 1e-9);
}
