mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{spawn_app, wait_for};
use dashlink::domain::repositories::AnalyticsRepository;

#[tokio::test]
async fn test_click_totals_are_conserved() {
    let app = spawn_app();

    app.server
        .post("/api/urls")
        .json(&json!({ "url": "https://example.com", "customSlug": "tracked" }))
        .await
        .assert_status(StatusCode::CREATED);

    for _ in 0..5 {
        app.server.get("/tracked").await.assert_status(StatusCode::FOUND);
    }

    wait_for("all clicks aggregated", || async {
        app.analytics.summary("tracked").await.unwrap().total_clicks == 5
    })
    .await;

    let response = app.server.get("/api/analytics/tracked").await;
    response.assert_status_ok();

    let body = response.json::<serde_json::Value>();
    assert_eq!(body["totalClicks"], 5);

    let by_date = body["clicksByDate"].as_array().unwrap();
    let date_sum: i64 = by_date.iter().map(|b| b["clicks"].as_i64().unwrap()).sum();
    assert_eq!(date_sum, 5);
}

#[tokio::test]
async fn test_summary_is_idempotent_between_clicks() {
    let app = spawn_app();

    app.server
        .post("/api/urls")
        .json(&json!({ "url": "https://example.com", "customSlug": "stable" }))
        .await
        .assert_status(StatusCode::CREATED);

    app.server.get("/stable").await.assert_status(StatusCode::FOUND);
    wait_for("click aggregated", || async {
        app.analytics.summary("stable").await.unwrap().total_clicks == 1
    })
    .await;

    let first = app
        .server
        .get("/api/analytics/stable")
        .await
        .json::<serde_json::Value>();
    let second = app
        .server
        .get("/api/analytics/stable")
        .await
        .json::<serde_json::Value>();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_analytics_unknown_slug_is_not_found() {
    let app = spawn_app();

    let response = app.server.get("/api/analytics/no.such.slug").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_link_without_clicks_has_empty_summary() {
    let app = spawn_app();

    app.server
        .post("/api/urls")
        .json(&json!({ "url": "https://example.com", "customSlug": "untouched" }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = app.server.get("/api/analytics/untouched").await;
    response.assert_status_ok();

    let body = response.json::<serde_json::Value>();
    assert_eq!(body["totalClicks"], 0);
    assert_eq!(body["uniqueVisitors"], 0);
    assert!(body["clicksByDate"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_dimensions_are_bucketed() {
    let app = spawn_app();

    app.server
        .post("/api/urls")
        .json(&json!({ "url": "https://example.com", "customSlug": "dims" }))
        .await
        .assert_status(StatusCode::CREATED);

    const CHROME_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
        AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

    app.server
        .get("/dims")
        .add_header("user-agent", CHROME_UA)
        .add_header("referer", "https://google.com/search?q=x")
        .add_header("cf-ipcountry", "DE")
        .await
        .assert_status(StatusCode::FOUND);

    // No UA, no referrer, no country: lands in the default buckets.
    app.server.get("/dims").await.assert_status(StatusCode::FOUND);

    wait_for("both clicks aggregated", || async {
        app.analytics.summary("dims").await.unwrap().total_clicks == 2
    })
    .await;

    let body = app
        .server
        .get("/api/analytics/dims")
        .await
        .json::<serde_json::Value>();

    assert_eq!(body["countries"]["DE"], 1);
    assert_eq!(body["countries"]["unknown"], 1);
    assert_eq!(body["devices"]["desktop"], 1);
    assert_eq!(body["browsers"]["Chrome"], 1);
    assert_eq!(body["referrers"]["google.com"], 1);
    assert_eq!(body["referrers"]["direct"], 1);
    assert_eq!(body["uniqueVisitors"].as_i64().unwrap(), 2);
}
