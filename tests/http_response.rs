use fetchkit::RequestBuilder;
use serde::Deserialize;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

#[derive(Debug, Deserialize, PartialEq)]
struct Item {
    id: u32,
    name: String,
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn test_response_headers_and_json_body() -> anyhow::Result<()> {
    if !can_bind_localhost() {
        return Ok(());
    }

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/items/1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Request-Id", "42")
                .set_body_json(json!({ "id": 1, "name": "bolt" })),
        )
        .mount(&server)
        .await;

    let mut builder = RequestBuilder::new();
    builder.set_url(format!("{}/items/1", server.uri()));
    let response = builder.get().await?;

    assert!(response.is_success());
    assert_eq!(response.header("x-request-id"), Some("42"));
    assert_eq!(response.header("X-Request-Id"), Some("42"));
    assert_eq!(response.headers().get("x-request-id").map(String::as_str), Some("42"));
    assert!(response
        .content_type()
        .is_some_and(|ct| ct.starts_with("application/json")));
    assert_eq!(
        response.json::<Item>()?,
        Item {
            id: 1,
            name: "bolt".to_string()
        }
    );
    assert!(response.json_pretty()?.contains("\n  \"id\": 1"));
    assert_eq!(response.url().path(), "/items/1");
    Ok(())
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn test_non_json_body_reports_json_error() {
    if !can_bind_localhost() {
        return;
    }

    let server = MockServer::start().await;
    Mock::given(path("/plain"))
        .respond_with(ResponseTemplate::new(200).set_body_string("plain text"))
        .mount(&server)
        .await;

    let mut builder = RequestBuilder::new();
    builder.set_url(format!("{}/plain", server.uri()));
    let response = builder.get().await.expect("request should succeed");

    let err = response.json::<Item>().expect_err("not json");
    assert!(matches!(err, fetchkit::FetchError::Json(_)));
    assert_eq!(response.into_body(), b"plain text".to_vec());
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn test_builder_sends_twice_independently() {
    if !can_bind_localhost() {
        return;
    }

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/again"))
        .and(header("X-Test", "v"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(2)
        .mount(&server)
        .await;

    let mut builder = RequestBuilder::new();
    builder
        .set_url(format!("{}/again", server.uri()))
        .header("X-Test", "v")
        .query("x", "1");

    let first = builder.get().await.expect("first send");
    let second = builder.get().await.expect("second send");
    assert_eq!(first.text(), "ok");
    assert_eq!(second.text(), "ok");

    // Configured queries are applied once per send, never accumulated.
    let realized = builder.last_request().expect("realized request");
    assert_eq!(realized.url().query(), Some("x=1"));

    let requests = server.received_requests().await.expect("requests");
    assert!(requests.iter().all(|r| r.url.query() == Some("x=1")));
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn test_shared_client_is_used_for_every_send() {
    if !can_bind_localhost() {
        return;
    }

    let server = MockServer::start().await;
    Mock::given(path("/shared"))
        .and(header("X-Client", "shared"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let mut defaults = reqwest::header::HeaderMap::new();
    defaults.insert("X-Client", "shared".parse().expect("header value"));
    let client = reqwest::Client::builder()
        .default_headers(defaults)
        .build()
        .expect("client should build");

    let mut builder = RequestBuilder::with_client(client);
    builder.set_url(format!("{}/shared", server.uri()));

    builder.get().await.expect("first send");
    builder.delete().await.expect("second send");
}
