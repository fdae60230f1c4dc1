//! Integration tests for the HTTP transport.
//!
//! These tests run the reqwest-backed client against a mock server and
//! verify URL and query construction, authentication headers, multipart
//! framing, error conversion and retry behavior.

use los_api::clients::{HttpClient, HttpError, HttpMethod, HttpRequest};
use los_api::rest::resources::{
    AccountsApi, CreateManyApplicationDocumentsParams, FindApplicationsParams,
};
use los_api::rest::{FileAttachment, MultipartPayload};
use los_api::{AccessToken, ApiKey, ApiVersion, BaseUrl, LosClient, LosConfig};
use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer, tries: u32) -> LosConfig {
    LosConfig::builder()
        .base_url(BaseUrl::new(server.uri()).unwrap())
        .api_key(ApiKey::new("key-1").unwrap())
        .api_version(ApiVersion::Current)
        .tries(tries)
        .build()
        .unwrap()
}

// ============================================================================
// Requests
// ============================================================================

#[tokio::test]
async fn test_repeated_query_keys_reach_the_server() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/applications/search"))
        .and(query_param("statusIds", "active"))
        .and(query_param("statusIds", "pending"))
        .and(header("Authorization", "Bearer key-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [],
            "total": 0
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = LosClient::new(&config_for(&server, 1)).unwrap();
    let page = assert_ok!(
        client
            .applications()
            .find(&FindApplicationsParams {
                status_ids: Some(vec!["active".to_string(), "pending".to_string()]),
                ..Default::default()
            })
            .await
    );

    assert!(page.is_empty());
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn test_multipart_upload_is_framed_by_the_transport() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/application-documents/batch"))
        .and(body_string_contains(r#"name="files"; filename="one.pdf""#))
        .and(body_string_contains(r#"name="options[1].anchor""#))
        .and(body_string_contains("income"))
        .and(body_string_contains(r#"name="applicationId""#))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let client = LosClient::new(&config_for(&server, 1)).unwrap();
    let params = CreateManyApplicationDocumentsParams {
        files: vec![
            FileAttachment::new(b"one".to_vec(), "one.pdf"),
            FileAttachment::new(b"two".to_vec(), "two.pdf").anchor("income"),
        ],
        ..Default::default()
    };

    assert_ok!(
        client
            .application_documents()
            .create_many("app-1", &params)
            .await
    );
}

#[tokio::test]
async fn test_raw_multipart_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/uploads"))
        .and(body_string_contains(r#"name="note""#))
        .and(body_string_contains("hello"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new(BaseUrl::new(server.uri()).unwrap(), None).unwrap();
    let request = HttpRequest::builder(HttpMethod::Post, "/uploads")
        .multipart(MultipartPayload::builder().text("note", "hello").build())
        .build()
        .unwrap();

    let response = assert_ok!(client.request(request).await);
    assert_eq!(response.code, 200);
    assert_eq!(response.body, json!({"ok": true}));
}

#[tokio::test]
async fn test_account_requests_go_to_the_auth_service() {
    let api = MockServer::start().await;
    let auth = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/accounts"))
        .and(header("accountAccessToken", "user-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "acc-1",
            "email": "jane@example.com",
            "status": "active",
            "borrowerId": "b-1"
        })))
        .expect(1)
        .mount(&auth)
        .await;

    let config = LosConfig::builder()
        .base_url(BaseUrl::new(api.uri()).unwrap())
        .auth_base_url(BaseUrl::new(auth.uri()).unwrap())
        .build()
        .unwrap();
    let client = LosClient::new(&config).unwrap();

    let accounts: AccountsApi<_> = client.accounts();
    let account = assert_ok!(
        accounts
            .get_current_user(&AccessToken::new("user-token").unwrap())
            .await
    );

    assert_eq!(account.id, "acc-1");
    assert_eq!(account.attributes.get("borrowerId"), Some(&json!("b-1")));
}

// ============================================================================
// Responses
// ============================================================================

#[tokio::test]
async fn test_empty_body_parses_to_null() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/applications/a1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new(BaseUrl::new(server.uri()).unwrap(), None).unwrap();
    let request = HttpRequest::builder(HttpMethod::Delete, "/applications/a1")
        .build()
        .unwrap();

    let response = assert_ok!(client.request(request).await);
    assert_eq!(response.code, 204);
    assert!(response.body.is_null());
}

#[tokio::test]
async fn test_error_response_carries_status_and_request_id() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/application-statuses"))
        .respond_with(
            ResponseTemplate::new(404)
                .insert_header("x-request-id", "req-123")
                .set_body_json(json!({"message": "Product not found"})),
        )
        .mount(&server)
        .await;

    let client = LosClient::new(&config_for(&server, 1)).unwrap();
    let result = client.application_statuses().find("missing").await;

    let error = assert_err!(result);
    assert_eq!(error.request_id(), Some("req-123"));
    match error {
        los_api::ResourceError::Http(HttpError::Response(response)) => {
            assert_eq!(response.code, 404);
            assert!(response.message.contains("Product not found"));
        }
        other => panic!("Expected Http(Response), got {other:?}"),
    }
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/product-calculations"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"message": "bad"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = LosClient::new(&config_for(&server, 3)).unwrap();
    let result = client.product_calculations().find("p1").await;

    let error = assert_err!(result);
    assert!(!error.is_version_error());
}

// ============================================================================
// Retries
// ============================================================================

#[tokio::test]
async fn test_server_error_is_retried_until_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/application-statuses"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/application-statuses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = LosClient::new(&config_for(&server, 2)).unwrap();
    let statuses = assert_ok!(client.application_statuses().find("p1").await);
    assert!(statuses.is_empty());
}

#[tokio::test]
async fn test_exhausted_retries_report_max_retries() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/application-statuses"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let client = HttpClient::from_config(&config_for(&server, 2)).unwrap();
    let request = HttpRequest::builder(HttpMethod::Get, "/application-statuses")
        .query_param("productId", "p1")
        .build()
        .unwrap();

    match assert_err!(client.request(request).await) {
        HttpError::MaxRetries(error) => {
            assert_eq!(error.code, 503);
            assert_eq!(error.tries, 2);
        }
        other => panic!("Expected MaxRetries, got {other:?}"),
    }
}
