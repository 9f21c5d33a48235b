//! End-to-end tests: real providers talking to a local stand-in upstream.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tokio::net::TcpListener;
use tower::ServiceExt;

use draftschema_cli::{build_router, AppState};
use draftschema_config::Config;
use draftschema_providers::ProviderRegistry;

const LOGIN_DESIGN: &str = r#"{"screens":[{"name":"Login","fields":["email","password"]}]}"#;
const LOGIN_SCHEMA: &str = r#"{"tables":[{"name":"users","columns":["email","password"]}],"relationships":[],"notes":[]}"#;

struct Captured {
    method: String,
    path: String,
    headers: HeaderMap,
    body: Value,
}

/// A throwaway HTTP server answering every request with one canned reply.
struct Upstream {
    addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<Captured>>>,
}

impl Upstream {
    async fn spawn(status: StatusCode, body: String) -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let requests = Arc::new(Mutex::new(Vec::new()));

        let app = {
            let hits = Arc::clone(&hits);
            let requests = Arc::clone(&requests);
            Router::new().fallback(move |req: Request<Body>| {
                let hits = Arc::clone(&hits);
                let requests = Arc::clone(&requests);
                let body = body.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    let (parts, incoming) = req.into_parts();
                    let bytes = to_bytes(incoming, usize::MAX).await.unwrap_or_default();
                    requests.lock().unwrap().push(Captured {
                        method: parts.method.to_string(),
                        path: parts.uri.to_string(),
                        headers: parts.headers,
                        body: serde_json::from_slice(&bytes).unwrap_or(Value::Null),
                    });
                    (status, [(header::CONTENT_TYPE, "application/json")], body)
                }
            })
        };

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            hits,
            requests,
        }
    }

    fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

fn openai_config(upstream: &Upstream, key: Option<&str>) -> Config {
    Config {
        provider: "openai".into(),
        openai_api_key: key.map(str::to_string),
        openai_base_url: upstream.url(),
        ..Config::default()
    }
}

fn gemini_config(upstream: &Upstream, key: Option<&str>) -> Config {
    Config {
        provider: "gemini".into(),
        gemini_api_key: key.map(str::to_string),
        gemini_base_url: upstream.url(),
        ..Config::default()
    }
}

fn proxy(config: Config) -> Router {
    let provider = ProviderRegistry::from_config(&config)
        .select(&config.provider)
        .unwrap();
    build_router(Arc::new(AppState::new(config, provider)))
}

fn post_design() -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/infer-schema")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(LOGIN_DESIGN))
        .unwrap()
}

async fn read(response: axum::response::Response) -> (StatusCode, String) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn openai_success_returns_output_text() {
    let envelope = serde_json::json!({ "id": "resp_1", "output_text": LOGIN_SCHEMA }).to_string();
    let upstream = Upstream::spawn(StatusCode::OK, envelope).await;

    let (status, body) = read(
        proxy(openai_config(&upstream, Some("sk-test")))
            .oneshot(post_design())
            .await
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, LOGIN_SCHEMA);

    let requests = upstream.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let sent = &requests[0];
    assert_eq!(sent.method, "POST");
    assert_eq!(sent.path, "/v1/responses");
    assert_eq!(sent.headers[header::AUTHORIZATION], "Bearer sk-test");
    assert_eq!(sent.body["model"], "gpt-4.1-mini");
    assert_eq!(sent.body["input"][2]["content"], LOGIN_DESIGN);
    assert_eq!(sent.body["text"]["format"]["schema"]["additionalProperties"], false);
}

#[tokio::test]
async fn openai_missing_key_makes_no_call() {
    let upstream = Upstream::spawn(StatusCode::OK, "{}".into()).await;

    let (status, body) = read(
        proxy(openai_config(&upstream, None))
            .oneshot(post_design())
            .await
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["error"], "Missing OPENAI_API_KEY");
    assert_eq!(upstream.hits(), 0);
}

#[tokio::test]
async fn openai_error_status_becomes_internal_error_with_raw() {
    let error = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#;
    let upstream = Upstream::spawn(StatusCode::UNAUTHORIZED, error.into()).await;

    let (status, body) = read(
        proxy(openai_config(&upstream, Some("sk-wrong")))
            .oneshot(post_design())
            .await
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["raw"]["error"]["type"], "invalid_request_error");
    assert!(body["error"].as_str().unwrap().contains("401"));
}

#[tokio::test]
async fn openai_without_output_text_is_internal_error() {
    let envelope = r#"{"id":"resp_2","status":"incomplete","output":[]}"#;
    let upstream = Upstream::spawn(StatusCode::OK, envelope.into()).await;

    let (status, body) = read(
        proxy(openai_config(&upstream, Some("sk-test")))
            .oneshot(post_design())
            .await
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["error"], "No output_text");
    assert_eq!(body["raw"]["id"], "resp_2");
}

#[tokio::test]
async fn gemini_success_returns_first_part_text() {
    let envelope = serde_json::json!({
        "candidates": [{ "content": { "role": "model", "parts": [{ "text": LOGIN_SCHEMA }] } }]
    })
    .to_string();
    let upstream = Upstream::spawn(StatusCode::OK, envelope).await;

    let (status, body) = read(
        proxy(gemini_config(&upstream, Some("AIza-test")))
            .oneshot(post_design())
            .await
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, LOGIN_SCHEMA);

    let requests = upstream.requests.lock().unwrap();
    let sent = &requests[0];
    assert_eq!(sent.path, "/v1beta/models/gemini-2.0-flash:generateContent");
    assert_eq!(sent.headers["x-goog-api-key"], "AIza-test");
    assert_eq!(
        sent.body["generationConfig"]["responseMimeType"],
        "application/json"
    );
    let prompt = sent.body["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(prompt.contains(LOGIN_DESIGN));
}

#[tokio::test]
async fn gemini_error_status_is_mirrored() {
    let error = r#"{"error":{"code":429,"message":"Resource has been exhausted","status":"RESOURCE_EXHAUSTED"}}"#;
    let upstream = Upstream::spawn(StatusCode::TOO_MANY_REQUESTS, error.into()).await;

    let (status, body) = read(
        proxy(gemini_config(&upstream, Some("AIza-test")))
            .oneshot(post_design())
            .await
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["raw"]["error"]["status"], "RESOURCE_EXHAUSTED");
}

#[tokio::test]
async fn gemini_without_candidates_is_internal_error() {
    let envelope = r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#;
    let upstream = Upstream::spawn(StatusCode::OK, envelope.into()).await;

    let (status, body) = read(
        proxy(gemini_config(&upstream, Some("AIza-test")))
            .oneshot(post_design())
            .await
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert!(body["error"].as_str().unwrap().starts_with("No text"));
    assert_eq!(body["raw"]["promptFeedback"]["blockReason"], "SAFETY");
}

#[tokio::test]
async fn gemini_missing_key_makes_no_call() {
    let upstream = Upstream::spawn(StatusCode::OK, "{}".into()).await;
    let router = proxy(gemini_config(&upstream, None));

    let (status, body) = read(router.clone().oneshot(post_design()).await.unwrap()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("Missing GEMINI_API_KEY"));

    let (status, _) = read(
        router
            .oneshot(Request::get("/models").body(Body::empty()).unwrap())
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(upstream.hits(), 0);
}

#[tokio::test]
async fn gemini_models_are_forwarded_verbatim() {
    let catalog = r#"{"models":[{"name":"models/gemini-2.0-flash"}]}"#;
    let upstream = Upstream::spawn(StatusCode::OK, catalog.into()).await;

    let (status, body) = read(
        proxy(gemini_config(&upstream, Some("AIza-test")))
            .oneshot(Request::get("/models").body(Body::empty()).unwrap())
            .await
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, catalog);
    let requests = upstream.requests.lock().unwrap();
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].path, "/v1beta/models");
}

#[tokio::test]
async fn unreachable_provider_is_internal_error() {
    let closed = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = closed.local_addr().unwrap();
    drop(closed);

    let config = Config {
        provider: "openai".into(),
        openai_api_key: Some("sk-test".into()),
        openai_base_url: format!("http://{addr}"),
        ..Config::default()
    };

    let (status, body) = read(proxy(config).oneshot(post_design()).await.unwrap()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert!(body["error"].as_str().unwrap().starts_with("openai request failed"));
    assert!(body.get("raw").is_none());
}
