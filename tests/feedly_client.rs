//! Integration tests for the Feedly client against a mock HTTP server.

use futures::StreamExt;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use feedly_rules::channels::{FeedSource, FeedlyClient, saved_entries};
use feedly_rules::error::FeedError;
use feedly_rules::pipeline::{Entry, Origin, Summary};

const SAVED_STREAM: &str = "user/test_user_id/tag/global.saved";

async fn mount_profile(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v3/profile"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "test_user_id",
            "email": "reader@example.com"
        })))
        .mount(server)
        .await;
}

async fn connect(server: &MockServer) -> FeedlyClient {
    FeedlyClient::connect(SecretString::from("test-token"), &server.uri())
        .await
        .unwrap()
}

#[tokio::test]
async fn resolves_saved_stream_from_profile() {
    let server = MockServer::start().await;
    mount_profile(&server).await;

    let client = connect(&server).await;
    assert_eq!(client.saved_stream_id(), SAVED_STREAM);
}

#[tokio::test]
async fn rejected_token_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/profile"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = FeedlyClient::connect(SecretString::from("expired"), &server.uri()).await;
    assert!(matches!(result, Err(FeedError::Auth(_))));
}

#[tokio::test]
async fn connects_from_token_dir() {
    let server = MockServer::start().await;
    mount_profile(&server).await;

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("access.token"), "test-token\n").unwrap();

    let client = FeedlyClient::from_token_dir(dir.path(), &server.uri())
        .await
        .unwrap();
    assert_eq!(client.saved_stream_id(), SAVED_STREAM);
}

#[tokio::test]
async fn single_page_maps_wire_fields() {
    let server = MockServer::start().await;
    mount_profile(&server).await;

    Mock::given(method("GET"))
        .and(path("/v3/streams/contents"))
        .and(query_param("streamId", SAVED_STREAM))
        .and(query_param("count", "1000"))
        .and(query_param("ranked", "oldest"))
        .and(query_param_is_missing("continuation"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": SAVED_STREAM,
            "items": [{
                "id": "entry1",
                "title": "Title 1",
                "author": "Author 1",
                "published": 1678886400000_i64,
                "summary": {"content": "Summary 1", "direction": "ltr"},
                "canonicalUrl": "http://example.com/canonical/1",
                "origin": {
                    "htmlUrl": "http://example.com/1",
                    "streamId": "stream1",
                    "title": "Origin 1"
                }
            }],
            "continuation": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let entries: Vec<Entry> = saved_entries(&client)
        .map(|e| e.unwrap())
        .collect()
        .await;

    assert_eq!(
        entries,
        vec![Entry {
            title: Some("Title 1".into()),
            author: Some("Author 1".into()),
            published: Some(1_678_886_400_000),
            summary: Some(Summary {
                content: "Summary 1".into()
            }),
            canonical_url: Some("http://example.com/canonical/1".into()),
            origin: Some(Origin {
                html_url: "http://example.com/1".into(),
                stream_id: "stream1".into(),
                title: "Origin 1".into(),
            }),
            ..Entry::new("entry1")
        }]
    );
}

#[tokio::test]
async fn follows_continuation_across_pages() {
    let server = MockServer::start().await;
    mount_profile(&server).await;

    Mock::given(method("GET"))
        .and(path("/v3/streams/contents"))
        .and(query_param_is_missing("continuation"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": "entry1"}, {"id": "entry2"}],
            "continuation": "continuation1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v3/streams/contents"))
        .and(query_param("streamId", SAVED_STREAM))
        .and(query_param("continuation", "continuation1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": "entry3"}, {"id": "entry4"}],
            "continuation": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let ids: Vec<String> = saved_entries(&client)
        .map(|e| e.unwrap().id)
        .collect()
        .await;

    assert_eq!(ids, vec!["entry1", "entry2", "entry3", "entry4"]);
}

#[tokio::test]
async fn empty_stream_yields_nothing() {
    let server = MockServer::start().await;
    mount_profile(&server).await;

    Mock::given(method("GET"))
        .and(path("/v3/streams/contents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [],
            "continuation": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let entries: Vec<_> = saved_entries(&client).collect().await;
    assert!(entries.is_empty());
}

#[tokio::test]
async fn server_error_is_status_error() {
    let server = MockServer::start().await;
    mount_profile(&server).await;

    Mock::given(method("GET"))
        .and(path("/v3/streams/contents"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let client = connect(&server).await;
    match client.fetch_page(None).await {
        Err(FeedError::Status { status, body, .. }) => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("Expected Status error, got {:?}", other),
    }
}

#[tokio::test]
async fn malformed_page_is_decode_error() {
    let server = MockServer::start().await;
    mount_profile(&server).await;

    Mock::given(method("GET"))
        .and(path("/v3/streams/contents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"title": "missing id"}]
        })))
        .mount(&server)
        .await;

    let client = connect(&server).await;
    assert!(matches!(client.fetch_page(None).await, Err(FeedError::Decode(_))));
}
