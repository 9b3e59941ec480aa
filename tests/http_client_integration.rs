//! Integration tests for the reqwest-backed request issuer.

mod support;

use futures_util::StreamExt;
use reqwest::header::CONTENT_DISPOSITION;
use uncut_edges_core::transfer::{HttpClient, RequestIssuer, TransferError};
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, ResponseTemplate};

use support::socket_guard::start_mock_server_or_skip;

#[tokio::test]
async fn test_issue_returns_headers_and_body() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };

    Mock::given(method("GET"))
        .and(path("/parse/penn/81431-p3hk28"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Disposition", "attachment; filename=81431-p3hk28.pdf")
                .set_body_bytes(b"%PDF-1.7".to_vec()),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = HttpClient::new().expect("client builds");
    let url = format!("{}/parse/penn/81431-p3hk28", mock_server.uri());

    let mut response = client.issue(&url).await.expect("request should succeed");
    assert_eq!(response.url, url);
    assert_eq!(
        response
            .headers
            .get(CONTENT_DISPOSITION)
            .expect("disposition header"),
        "attachment; filename=81431-p3hk28.pdf"
    );

    let mut body = Vec::new();
    while let Some(chunk) = response.body.next().await {
        body.extend_from_slice(&chunk.expect("body chunk"));
    }
    assert_eq!(body, b"%PDF-1.7");
}

#[tokio::test]
async fn test_issue_maps_error_status() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Error parsing pages"))
        .mount(&mock_server)
        .await;

    let client = HttpClient::new().expect("client builds");
    let url = format!("{}/parse/abc?pages=x", mock_server.uri());

    match client.issue(&url).await {
        Err(TransferError::UnsuccessfulStatus { status, .. }) => assert_eq!(status, 400),
        other => panic!("Expected UnsuccessfulStatus, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_issue_sends_user_agent() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };

    Mock::given(method("GET"))
        .and(header_exists("user-agent"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = HttpClient::new().expect("client builds");
    let result = client.issue(&format!("{}/parse/x", mock_server.uri())).await;
    assert!(result.is_ok(), "Expected Ok, got: {result:?}");
}
