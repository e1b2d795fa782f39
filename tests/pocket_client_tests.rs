use pocketmanager::core::link::LinkStatus;
use pocketmanager::pocket::{PocketClient, PocketError, RemoteDeleter};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, method, path},
};

fn client_for(server: &MockServer) -> PocketClient {
    PocketClient::new(
        "consumer".to_string(),
        "token".to_string(),
        Some(server.uri()),
    )
}

// ============================================================================
// Retrieve
// ============================================================================

#[tokio::test]
async fn test_retrieve_parses_item_map() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/get"))
        .and(body_partial_json(json!({
            "consumer_key": "consumer",
            "access_token": "token",
            "state": "all",
            "detailType": "complete",
            "since": 1700000000
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 1,
            "list": {
                "229279689": {
                    "item_id": "229279689",
                    "given_url": "http://example.com/a",
                    "resolved_url": "https://example.com/a",
                    "given_title": "",
                    "resolved_title": "An Article",
                    "excerpt": "Short text",
                    "status": "1",
                    "time_added": "1700000100"
                },
                "42": {
                    "item_id": "42",
                    "status": "2"
                }
            }
        })))
        .mount(&mock_server)
        .await;

    let items = client_for(&mock_server)
        .retrieve(Some(1_700_000_000))
        .await
        .unwrap();

    let mut links: Vec<_> = items.into_iter().filter_map(|i| i.into_link()).collect();
    links.sort_by_key(|l| l.id);
    assert_eq!(links.len(), 2);

    assert_eq!(links[0].id, 42);
    assert_eq!(links[0].status, LinkStatus::Deleted);
    assert_eq!(links[0].created_at, None);

    let article = &links[1];
    assert_eq!(article.id, 229279689);
    assert_eq!(article.title(), "An Article");
    assert_eq!(article.url(), Some("https://example.com/a"));
    assert_eq!(article.status, LinkStatus::Archived);
    assert_eq!(article.created_at.map(|t| t.timestamp()), Some(1_700_000_100));
}

#[tokio::test]
async fn test_retrieve_accepts_empty_list_array() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 2,
            "list": []
        })))
        .mount(&mock_server)
        .await;

    let items = client_for(&mock_server).retrieve(None).await.unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn test_api_error_uses_x_error_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/get"))
        .respond_with(
            ResponseTemplate::new(401).insert_header("X-Error", "Invalid consumer key."),
        )
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server).retrieve(None).await.unwrap_err();
    match err {
        PocketError::Api { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Invalid consumer key.");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/get"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server).retrieve(None).await.unwrap_err();
    assert!(matches!(err, PocketError::Parse(_)));
}

// ============================================================================
// Remote Delete
// ============================================================================

#[tokio::test]
async fn test_delete_confirmed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/send"))
        .and(body_partial_json(json!({
            "actions": [{ "action": "delete", "item_id": "42" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 1,
            "action_results": [true]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let confirmation = client_for(&mock_server)
        .request_remote_delete(42)
        .await
        .unwrap();
    assert!(confirmation.confirmed);
}

#[tokio::test]
async fn test_delete_with_false_result_is_not_confirmed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/send"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 1,
            "action_results": [false]
        })))
        .mount(&mock_server)
        .await;

    let confirmation = client_for(&mock_server)
        .request_remote_delete(42)
        .await
        .unwrap();
    assert!(!confirmation.confirmed);
}

#[tokio::test]
async fn test_delete_with_failed_batch_is_not_confirmed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/send"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 0,
            "action_results": [true]
        })))
        .mount(&mock_server)
        .await;

    let confirmation = client_for(&mock_server)
        .request_remote_delete(42)
        .await
        .unwrap();
    assert!(!confirmation.confirmed);
}
