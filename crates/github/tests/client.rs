//! Tests for the GitHub client against a mock GitHub API.

use github::{GitHubApiError, GitHubClient};
use pipeline::{GitHubUsername, IssueNumber, IssueState, IssueTracker, LabelSet, MutationRequest};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ISSUE_PATH: &str = "/repos/some-org/some-repo/issues/42";

fn client_for(server: &MockServer) -> GitHubClient {
    GitHubClient::new(reqwest::Client::new(), "some-org", "some-repo", "gh-token")
        .with_base_url(server.uri())
}

#[tokio::test]
async fn reads_label_names() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ISSUE_PATH))
        .and(header("authorization", "Bearer gh-token"))
        .and(header("accept", "application/vnd.github+json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "number": 42,
            "title": "Some issue",
            "state": "open",
            "labels": [
                {"id": 1, "name": "initial-unrelated-label", "color": "ededed"},
                {"id": 2, "name": "enhancement", "color": "a2eeef"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let snapshot = client_for(&server)
        .fetch_issue(IssueNumber::new(42))
        .await
        .unwrap();

    let expected: LabelSet = ["initial-unrelated-label", "enhancement"].into_iter().collect();
    assert_eq!(snapshot.labels, expected);
}

#[tokio::test]
async fn update_sends_only_set_fields() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(ISSUE_PATH))
        .and(body_json(json!({
            "labels": ["initial-unrelated-label", "state/accepted"],
            "assignees": [],
            "state": "closed"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"number": 42})))
        .expect(1)
        .mount(&server)
        .await;

    let request = MutationRequest {
        labels: Some(["initial-unrelated-label", "state/accepted"].into_iter().collect()),
        assignees: Some(Vec::new()),
        state: Some(IssueState::Closed),
        ..MutationRequest::default()
    };
    client_for(&server)
        .update_issue(IssueNumber::new(42), &request)
        .await
        .unwrap();
}

#[tokio::test]
async fn update_sends_assignee_logins() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(ISSUE_PATH))
        .and(body_json(json!({"assignees": ["github-user1"], "title": "Renamed"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let request = MutationRequest {
        assignees: GitHubUsername::new("github-user1").map(|u| vec![u]),
        title: Some("Renamed".to_string()),
        ..MutationRequest::default()
    };
    client_for(&server)
        .edit_issue(IssueNumber::new(42), &request)
        .await
        .unwrap();
}

#[tokio::test]
async fn error_status_is_reported_with_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ISSUE_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get_issue(IssueNumber::new(42))
        .await
        .unwrap_err();
    match err {
        GitHubApiError::Status { status, body, .. } => {
            assert_eq!(status.as_u16(), 404);
            assert_eq!(body, "Not Found");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn failed_update_maps_to_github_service_error() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(ISSUE_PATH))
        .respond_with(ResponseTemplate::new(422))
        .mount(&server)
        .await;

    let request = MutationRequest {
        body: Some("text".to_string()),
        ..MutationRequest::default()
    };
    let err = client_for(&server)
        .update_issue(IssueNumber::new(42), &request)
        .await
        .unwrap_err();
    assert_eq!(err.service, "github");
}
