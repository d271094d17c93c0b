mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{TestOptions, spawn_app, spawn_app_with, wait_for};
use dashlink::domain::entities::{ExpiryPolicy, NewLink};
use dashlink::domain::repositories::{LinkRepository, ProfileRepository};

const USER_SLUGS: [&str; 5] = [
    "acme.shoes.sale",
    "acme.boots.buy",
    "acme.socks.deal",
    "acme.hats.shop",
    "acme.bags.get",
];

async fn create_user_links(app: &common::TestApp, user: &str, slugs: &[&str]) {
    for (i, slug) in slugs.iter().enumerate() {
        app.server
            .post("/api/urls")
            .add_header("x-user-id", user)
            .json(&json!({
                "url": format!("https://example.com/{i}"),
                "customSlug": slug
            }))
            .await
            .assert_status(StatusCode::CREATED);
    }
}

#[tokio::test]
async fn test_profile_is_not_found_before_analysis() {
    let app = spawn_app();

    let response = app
        .server
        .get("/api/profile")
        .add_header("x-user-id", "u1")
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_fifth_link_triggers_background_analysis() {
    let app = spawn_app();

    create_user_links(&app, "u1", &USER_SLUGS[..4]).await;
    assert!(app.profiles.get("u1").await.unwrap().is_none());

    create_user_links(&app, "u1", &USER_SLUGS[4..]).await;

    wait_for("profile to be derived", || async {
        app.profiles.get("u1").await.unwrap().is_some()
    })
    .await;

    let profile = app.profiles.get("u1").await.unwrap().unwrap();
    assert_eq!(profile.links_analyzed, 5);
    assert_eq!(profile.separator, '.');
    assert!(profile.components.contains(&"acme".to_string()));
    assert!(profile.confidence > 0.0);
}

#[tokio::test]
async fn test_profile_endpoint_after_analysis() {
    let app = spawn_app();
    create_user_links(&app, "u1", &USER_SLUGS).await;

    wait_for("profile to be derived", || async {
        app.profiles.get("u1").await.unwrap().is_some()
    })
    .await;

    let response = app
        .server
        .get("/api/profile")
        .add_header("x-user-id", "u1")
        .await;
    response.assert_status_ok();

    let body = response.json::<serde_json::Value>();
    assert_eq!(body["userId"], "u1");
    assert_eq!(body["separator"], ".");
    assert_eq!(body["linksAnalyzed"], 5);
    assert_eq!(body["avgWordCount"], 3.0);
    assert_eq!(body["capitalization"], "lowercase");
}

#[tokio::test]
async fn test_explicit_analysis_respects_cooldown_unless_forced() {
    let app = spawn_app();
    create_user_links(&app, "u1", &USER_SLUGS).await;

    // The fifth link already claimed an analysis in the background.
    wait_for("background analysis to land", || async {
        app.profiles.get("u1").await.unwrap().is_some()
    })
    .await;

    let unforced = app
        .server
        .post("/api/profile/analyze")
        .add_header("x-user-id", "u1")
        .await;
    unforced.assert_status_ok();
    let body = unforced.json::<serde_json::Value>();
    assert_eq!(body["status"], "skipped");
    assert_eq!(body["reason"], "cooldown");

    let forced = app
        .server
        .post("/api/profile/analyze")
        .add_header("x-user-id", "u1")
        .json(&json!({ "force": true }))
        .await;
    forced.assert_status_ok();
    let body = forced.json::<serde_json::Value>();
    assert_eq!(body["status"], "updated");
    assert_eq!(body["profile"]["userId"], "u1");
    assert_eq!(body["profile"]["linksAnalyzed"], 5);
}

#[tokio::test]
async fn test_analysis_skips_thin_histories() {
    let app = spawn_app();
    create_user_links(&app, "u1", &USER_SLUGS[..2]).await;

    let response = app
        .server
        .post("/api/profile/analyze")
        .add_header("x-user-id", "u1")
        .json(&json!({ "force": true }))
        .await;

    response.assert_status_ok();
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["status"], "skipped");
    assert_eq!(body["reason"], "not_enough_links");
}

#[tokio::test]
async fn test_creation_survives_unavailable_analysis_queue() {
    let app = spawn_app_with(TestOptions {
        analysis_worker: false,
        ..Default::default()
    });

    // Every refresh trigger is dropped; creation itself must not notice.
    create_user_links(&app, "u1", &USER_SLUGS).await;

    assert_eq!(app.links.count_for_owner("u1").await.unwrap(), 5);
    assert!(app.profiles.get("u1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_batch_sweep_covers_active_owners_once() {
    let app = spawn_app();

    // Seed through the store directly so no incremental trigger claims the
    // users before the sweep does.
    for user in ["u1", "u2"] {
        for slug in USER_SLUGS {
            app.links
                .create(NewLink {
                    slug: format!("{user}.{slug}"),
                    long_url: "https://example.com".to_string(),
                    owner_id: Some(user.to_string()),
                    expiry: ExpiryPolicy::None,
                })
                .await
                .unwrap();
        }
    }
    // Below the minimum history; never enters the sweep population.
    app.links
        .create(NewLink {
            slug: "u3.only.link".to_string(),
            long_url: "https://example.com".to_string(),
            owner_id: Some("u3".to_string()),
            expiry: ExpiryPolicy::None,
        })
        .await
        .unwrap();

    let first = app.pattern_service.analyze_all_active_users().await.unwrap();
    assert_eq!(first.total, 2);
    assert_eq!(first.successful, 2);
    assert_eq!(first.failed, 0);

    assert!(app.profiles.get("u1").await.unwrap().is_some());
    assert!(app.profiles.get("u2").await.unwrap().is_some());
    assert!(app.profiles.get("u3").await.unwrap().is_none());

    // An immediate second sweep finds the same owners inside cooldown.
    let second = app.pattern_service.analyze_all_active_users().await.unwrap();
    assert_eq!(second.total, 2);
    assert_eq!(second.successful, 0);
    assert_eq!(second.skipped, 2);
}
