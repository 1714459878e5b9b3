//! Integration tests for the request pipeline over real HTTP, using WireMock.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use integrations_atlassian::{
    AtlassianClient, AtlassianErrorKind, Method, Payload, RequestContext,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> AtlassianClient {
    AtlassianClient::builder()
        .base_url(server.uri())
        .build()
        .expect("Failed to build client")
}

#[tokio::test]
async fn test_basic_auth_votes_request() {
    let server = MockServer::start().await;
    let expected_auth = format!("Basic {}", STANDARD.encode("user@x.com:tok"));

    Mock::given(method("GET"))
        .and(path("/rest/api/3/issue/10001/votes"))
        .and(header("Authorization", expected_auth.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"votes": 4, "hasVoted": true})))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client(&server);
    client.auth_mut().set_basic_auth("user@x.com", "tok");

    let (votes, response) = client
        .issue_votes()
        .get(RequestContext::background(), "10001")
        .await
        .unwrap();

    assert_eq!(votes.votes, 4);
    assert_eq!(
        response.endpoint().as_str(),
        format!("{}/rest/api/3/issue/10001/votes", server.uri())
    );
}

#[tokio::test]
async fn test_bearer_replaces_basic() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/api/3/myself"))
        .and(header("Authorization", "Bearer tok-2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client(&server);
    client.auth_mut().set_basic_auth("user@x.com", "tok");
    client.auth_mut().set_bearer_token("tok-2");

    let response = client
        .call(
            RequestContext::background(),
            Method::GET,
            "rest/api/3/myself",
            Payload::Empty,
        )
        .await
        .unwrap();

    assert_eq!(response.status_code(), 200);
}

#[tokio::test]
async fn test_server_error_body_is_preserved() {
    let server = MockServer::start().await;
    let body = r#"{"errorMessages":["Internal server error"],"errors":{}}"#;

    Mock::given(method("GET"))
        .and(path("/rest/api/3/screens"))
        .respond_with(ResponseTemplate::new(500).set_body_string(body))
        .mount(&server)
        .await;

    let response = client(&server)
        .call(
            RequestContext::background(),
            Method::GET,
            "rest/api/3/screens",
            Payload::Empty,
        )
        .await
        .unwrap();

    assert_eq!(response.status_code(), 500);
    assert_eq!(response.bytes().as_ref(), body.as_bytes());
    assert!(!response.is_success());
}

#[tokio::test]
async fn test_query_and_json_body_reach_server() {
    let server = MockServer::start().await;
    let payload = json!({"name": "Duplicate", "inward": "Duplicated by", "outward": "Duplicates"});

    Mock::given(method("POST"))
        .and(path("/rest/api/3/issueLinkType"))
        .and(query_param("notifyUsers", "false"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(payload.clone()))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "10000"})))
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server)
        .call(
            RequestContext::background(),
            Method::POST,
            "/rest/api/3/issueLinkType?notifyUsers=false",
            Payload::json(&payload),
        )
        .await
        .unwrap();

    assert_eq!(response.status_code(), 201);
    assert_eq!(response.endpoint().query(), Some("notifyUsers=false"));
}

#[tokio::test]
async fn test_endpoint_reflects_redirect() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/api/3/issue/KP-1"))
        .respond_with(
            ResponseTemplate::new(301)
                .insert_header("Location", format!("{}/rest/api/3/issue/10001", server.uri()).as_str()),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/api/3/issue/10001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "10001"})))
        .mount(&server)
        .await;

    let response = client(&server)
        .call(
            RequestContext::background(),
            Method::GET,
            "rest/api/3/issue/KP-1",
            Payload::Empty,
        )
        .await
        .unwrap();

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.endpoint().path(), "/rest/api/3/issue/10001");
}

#[tokio::test]
async fn test_redirects_can_be_disabled() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/api/3/issue/KP-1"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/elsewhere"))
        .mount(&server)
        .await;

    let client = AtlassianClient::builder()
        .base_url(server.uri())
        .max_redirects(0)
        .build()
        .unwrap();

    let response = client
        .call(
            RequestContext::background(),
            Method::GET,
            "rest/api/3/issue/KP-1",
            Payload::Empty,
        )
        .await
        .unwrap();

    assert_eq!(response.status_code(), 302);
    assert_eq!(response.endpoint().path(), "/rest/api/3/issue/KP-1");
}

#[tokio::test]
async fn test_slow_reply_is_cut_by_deadline() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/api/3/myself"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(10)))
        .mount(&server)
        .await;

    let ctx = RequestContext::background().with_timeout(Duration::from_millis(100));
    let error = client(&server)
        .call(ctx, Method::GET, "rest/api/3/myself", Payload::Empty)
        .await
        .unwrap_err();

    assert_eq!(error.kind(), AtlassianErrorKind::DeadlineExceeded);
}

#[tokio::test]
async fn test_slow_reply_is_cut_by_cancellation() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/api/3/myself"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(10)))
        .mount(&server)
        .await;

    let ctx = RequestContext::background();
    let canceller = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        canceller.cancel();
    });

    let error = client(&server)
        .call(ctx, Method::GET, "rest/api/3/myself", Payload::Empty)
        .await
        .unwrap_err();

    assert_eq!(error.kind(), AtlassianErrorKind::Cancelled);
}

#[tokio::test]
async fn test_concurrent_calls_share_client() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/api/3/myself"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(8)
        .mount(&server)
        .await;

    let client = std::sync::Arc::new(client(&server));
    let mut handles = Vec::new();
    for _ in 0..8 {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            client
                .call(
                    RequestContext::background(),
                    Method::GET,
                    "rest/api/3/myself",
                    Payload::Empty,
                )
                .await
                .map(|r| r.status_code())
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), 200);
    }
}

#[tokio::test]
async fn test_connection_refused_is_transport_failure() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let client = AtlassianClient::builder().base_url(base).build().unwrap();
    let error = client
        .call(
            RequestContext::background(),
            Method::GET,
            "rest/api/3/myself",
            Payload::Empty,
        )
        .await
        .unwrap_err();

    assert_eq!(error.kind(), AtlassianErrorKind::TransportFailure);
    assert!(!error.is_caller_abort());
    assert_eq!(error.endpoint().unwrap().path(), "/rest/api/3/myself");
}
