//! Integration tests for HttpTransport and the compilers over real HTTP.
//!
//! A wiremock server stands in for the Madek API.

use madek_compiler::transport::{HttpTransport, Transport, JSON_ROA};
use madek_compiler::{Client, Error};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn serve_json(server: &MockServer, route: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn serve_status(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_body_is_returned_on_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/keywords/k1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"term":"Design"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new().unwrap();
    let body = transport.fetch(&format!("{}/api/keywords/k1", server.uri())).await.unwrap();

    assert_eq!(body, r#"{"term":"Design"}"#);
}

#[tokio::test]
async fn test_status_classification() {
    let server = MockServer::start().await;
    serve_status(&server, "/unauthorized", 401).await;
    serve_status(&server, "/forbidden", 403).await;
    serve_status(&server, "/missing", 404).await;
    serve_status(&server, "/broken", 500).await;
    serve_status(&server, "/teapot", 418).await;

    let transport = HttpTransport::new().unwrap();
    let url = |p: &str| format!("{}{}", server.uri(), p);

    assert_eq!(
        transport.fetch(&url("/unauthorized")).await,
        Err(Error::InvalidAuthentication { url: url("/unauthorized") })
    );
    assert_eq!(
        transport.fetch(&url("/forbidden")).await,
        Err(Error::AccessForbidden { url: url("/forbidden") })
    );
    assert_eq!(
        transport.fetch(&url("/missing")).await,
        Err(Error::NotFound { url: url("/missing") })
    );

    let err = transport.fetch(&url("/broken")).await.unwrap_err();
    assert_eq!(
        err,
        Error::RequestFailed {
            url: url("/broken"),
            status: 500
        }
    );
    assert!(err.is_retryable());

    assert!(matches!(
        transport.fetch(&url("/teapot")).await,
        Err(Error::RequestFailed { status: 418, .. })
    ));
}

#[tokio::test]
async fn test_sends_accept_and_basic_auth_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/licenses/l1"))
        .and(header("accept", JSON_ROA))
        // base64("user:secret")
        .and(header("authorization", "Basic dXNlcjpzZWNyZXQ="))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::builder().credentials("user", "secret").build().unwrap();
    let result = transport.fetch(&format!("{}/api/licenses/l1", server.uri())).await;

    assert!(result.is_ok(), "Headers should match: {:?}", result.err());
}

#[tokio::test]
async fn test_anonymous_requests_carry_no_credentials() {
    let server = MockServer::start().await;
    serve_status(&server, "/api/people/p1", 401).await;

    let transport = HttpTransport::new().unwrap();
    let result = transport.fetch(&format!("{}/api/people/p1", server.uri())).await;
    assert!(matches!(result, Err(Error::InvalidAuthentication { .. })));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_connection_refused_is_transport_failure() {
    // Reserve a free port, then close it so nothing is listening there
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let address = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let transport = HttpTransport::new().unwrap();
    let url = format!("{}/api/collections/c1", address);
    let err = transport.fetch(&url).await.unwrap_err();

    assert!(
        matches!(&err, Error::TransportFailure { url: failed, .. } if *failed == url),
        "Expected a transport failure, got {:?}",
        err
    );
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_compile_collection_over_http() {
    let server = MockServer::start().await;
    let created_at = "2016-05-25T09:46:40.533Z";

    serve_json(
        &server,
        "/api/collections/c1",
        json!({ "id": "c1", "created_at": created_at }),
    )
    .await;
    serve_json(
        &server,
        "/api/collections/c1/meta-data/",
        json!({ "meta-data": [
            { "id": "m1", "meta_key_id": "madek_core:title" },
            { "id": "m2", "meta_key_id": "madek_core:authors" },
            { "id": "m3", "meta_key_id": "foo:bar" }
        ]}),
    )
    .await;
    serve_json(
        &server,
        "/api/meta-data/m1",
        json!({ "type": "MetaDatum::Text", "value": "Meduza" }),
    )
    .await;
    serve_json(
        &server,
        "/api/meta-data/m2",
        json!({ "type": "MetaDatum::People", "value": [{ "id": "p1" }] }),
    )
    .await;
    serve_json(
        &server,
        "/api/people/p1",
        json!({ "id": "p1", "first_name": "Simon", "last_name": "Häusler" }),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/api/media-entries/"))
        .and(query_param("collection_id", "c1"))
        .and(query_param("page", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "media-entries": [{ "id": "e1" }],
            "_json-roa": {
                "collection": {
                    "next": { "href": "/api/media-entries/?collection_id=c1&page=1" }
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/media-entries/"))
        .and(query_param("collection_id", "c1"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "media-entries": [],
            "_json-roa": { "collection": { "next": null } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    serve_json(
        &server,
        "/api/media-entries/e1",
        json!({
            "id": "e1",
            "created_at": created_at,
            "_json-roa": { "relations": { "media-file": { "href": "/api/media-files/f1" } } }
        }),
    )
    .await;
    serve_json(&server, "/api/media-entries/e1/meta-data/", json!({ "meta-data": [] })).await;
    serve_json(
        &server,
        "/api/media-files/f1",
        json!({
            "id": "f1",
            "filename": "meduza.mp4",
            "previews": [{ "id": "pv1" }],
            "_json-roa": {
                "relations": {
                    "data-stream": { "href": "/api/media-files/f1/data-stream" }
                }
            }
        }),
    )
    .await;
    serve_json(
        &server,
        "/api/previews/pv1",
        json!({
            "media_type": "video",
            "content_type": "video/mp4",
            "thumbnail": "large",
            "width": 620,
            "height": 349
        }),
    )
    .await;

    let client = Client::new(server.uri(), Arc::new(HttpTransport::new().unwrap()));
    let collection = client.compile_collection("c1").await.unwrap();

    assert_eq!(collection.meta_data.title.as_deref(), Some("Meduza"));
    assert_eq!(collection.meta_data.authors[0].first_name, "Simon");
    assert_eq!(collection.media_entries.len(), 1);

    let entry = &collection.media_entries[0];
    assert_eq!(entry.file_name, "meduza.mp4");
    assert_eq!(entry.download_url, format!("{}/files/f1", server.uri()));
    assert_eq!(entry.stream_url, format!("{}/api/media-files/f1/data-stream", server.uri()));
    assert_eq!(entry.previews[0].url, format!("{}/media/pv1", server.uri()));

    let requests = server.received_requests().await.unwrap();
    assert!(
        requests.iter().all(|r| r.url.path() != "/api/meta-data/m3"),
        "Unsupported keys should never be fetched"
    );
}
