use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::connect_info::MockConnectInfo;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use linkhop_cache::MokaUrlCache;
use linkhop_core::{ClickRepository, ShortCode};
use linkhop_gateway::{App, AppState};
use linkhop_generator::{RandomGenerator, RandomGeneratorSettings};
use linkhop_shortener::{AnalyticsService, ShortenerService, ShortenerSettings};
use linkhop_storage::InMemoryRepository;
use serde_json::{json, Value};
use tower::ServiceExt;

const BASE_URL: &str = "http://lh.test";

struct TestApp {
    router: Router,
    repository: Arc<InMemoryRepository>,
}

fn test_app() -> TestApp {
    let repository = Arc::new(InMemoryRepository::default());
    let generator = RandomGenerator::new(RandomGeneratorSettings::builder().build()).unwrap();
    let shortener = ShortenerService::new(
        repository.clone(),
        generator,
        ShortenerSettings::builder().base_url(BASE_URL).build(),
    )
    .with_cache(Arc::new(MokaUrlCache::new()));
    let analytics = AnalyticsService::new(repository.clone());

    let state = AppState::new(Arc::new(shortener), Arc::new(analytics));
    let router = App::router(state).layer(MockConnectInfo(SocketAddr::from((
        [192, 0, 2, 10],
        51_000,
    ))));

    TestApp { router, repository }
}

impl TestApp {
    async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, body.to_vec())
    }

    async fn get_json(&self, uri: &str) -> (StatusCode, Value) {
        let (status, body) = self
            .send(Request::get(uri).body(Body::empty()).unwrap())
            .await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn shorten(&self, payload: Value) -> (StatusCode, Value) {
        let request = Request::post("/api/shorten")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap();
        let (status, body) = self.send(request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }
}

#[tokio::test]
async fn shorten_returns_created_link() {
    let app = test_app();

    let (status, body) = app.shorten(json!({ "url": "https://example.com" })).await;

    assert_eq!(status, StatusCode::CREATED);
    let code = body["short_code"].as_str().unwrap();
    assert_eq!(code.len(), 6);
    assert_eq!(body["short_url"], format!("{BASE_URL}/s/{code}"));
    assert_eq!(body["original_url"], "https://example.com");
}

#[tokio::test]
async fn shorten_rejects_malformed_body() {
    let app = test_app();
    let request = Request::post("/api/shorten")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = app.send(request).await;
    let body: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid request body");
}

#[tokio::test]
async fn shorten_rejects_invalid_url_and_alias() {
    let app = test_app();

    let (status, body) = app.shorten(json!({ "url": "ftp://example.com" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("invalid url"));

    let (status, _) = app.shorten(json!({ "url": "" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .shorten(json!({ "url": "https://example.com", "custom_alias": "has space" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_alias_is_bad_request() {
    let app = test_app();

    let (status, body) = app
        .shorten(json!({ "url": "https://example.com", "custom_alias": "" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("invalid short code"));

    let (status, _) = app
        .shorten(json!({ "url": "https://example.com", "custom_alias": null }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn duplicate_alias_conflicts() {
    let app = test_app();
    let payload = json!({ "url": "https://example.com", "custom_alias": "promo" });

    let (status, body) = app.shorten(payload.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["short_code"], "promo");

    let (status, body) = app.shorten(payload).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("promo"));
}

#[tokio::test(flavor = "multi_thread")]
async fn redirect_sends_302_and_tracks_click() {
    let app = test_app();
    app.shorten(json!({ "url": "https://example.com/page", "custom_alias": "go" }))
        .await;

    let request = Request::get("/s/go")
        .header(header::USER_AGENT, "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0)")
        .header(header::REFERER, "https://news.example")
        .header("x-forwarded-for", "203.0.113.5, 10.0.0.1")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers()[header::LOCATION],
        "https://example.com/page"
    );

    let repository = app.repository.clone();
    let code = ShortCode::new_unchecked("go");
    awaitility::at_most(Duration::from_secs(2))
        .poll_interval(Duration::from_millis(10))
        .until_async(|| async {
            !repository
                .recent_clicks(&code, 10)
                .await
                .unwrap()
                .is_empty()
        })
        .await;

    let (status, clicks) = app.get_json("/api/analytics/go/recent").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(clicks[0]["ip"], "203.0.113.5");
    assert_eq!(clicks[0]["referer"], "https://news.example");

    let (_, devices) = app.get_json("/api/analytics/go/devices").await;
    assert_eq!(devices, json!({ "Mobile": 1 }));
}

#[tokio::test]
async fn redirect_unknown_code_is_plain_text_404() {
    let app = test_app();

    let response = app
        .router
        .clone()
        .oneshot(Request::get("/s/missing").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"URL not found");
}

#[tokio::test]
async fn list_urls_honours_limit() {
    let app = test_app();
    for alias in ["a1", "a2", "a3"] {
        app.shorten(json!({ "url": "https://example.com", "custom_alias": alias }))
            .await;
    }

    let (status, body) = app.get_json("/api/urls?limit=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, body) = app.get_json("/api/urls?limit=abc").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn popular_urls_lists_cached_records() {
    let app = test_app();
    app.shorten(json!({ "url": "https://example.com", "custom_alias": "hot" }))
        .await;
    let (status, _) = app
        .send(Request::get("/s/hot").body(Body::empty()).unwrap())
        .await;
    assert_eq!(status, StatusCode::FOUND);

    let (status, body) = app.get_json("/api/urls/popular").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["short_code"], "hot");
}

#[tokio::test]
async fn analytics_for_unknown_code_is_404() {
    let app = test_app();

    for uri in [
        "/api/analytics/nope",
        "/api/analytics/nope/daily",
        "/api/analytics/nope/monthly?days=3",
        "/api/analytics/nope/devices",
        "/api/analytics/nope/recent",
    ] {
        let (status, body) = app.get_json(uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn analytics_report_has_every_section() {
    let app = test_app();
    app.shorten(json!({ "url": "https://example.com", "custom_alias": "rep" }))
        .await;

    let (status, body) = app.get_json("/api/analytics/rep").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["short_code"], "rep");
    assert_eq!(body["original_url"], "https://example.com");
    assert_eq!(body["total_clicks"], 0);
    assert_eq!(body["daily_stats"], json!({}));
    assert_eq!(body["monthly_stats"], json!({}));
    assert_eq!(body["devices"], json!({}));
    assert_eq!(body["recent_clicks"], json!([]));
}

#[tokio::test]
async fn health_reports_ok() {
    let app = test_app();

    let (status, body) = app.get_json("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["time"].is_string());
}
