#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum_test::TestServer;
use tokio::sync::mpsc;

use dashlink::application::services::{
    AnalyticsService, LinkService, PatternConfig, PatternService,
};
use dashlink::config::RateLimitSettings;
use dashlink::domain::click_worker::run_click_worker;
use dashlink::domain::entities::PatternProfile;
use dashlink::infrastructure::cache::{CacheService, MokaCache};
use dashlink::infrastructure::geoip::NullCountryResolver;
use dashlink::infrastructure::persistence::{
    MemoryAnalyticsRepository, MemoryLinkRepository, MemoryProfileRepository,
};
use dashlink::infrastructure::suggestion::{
    NullSuggestionProvider, SlugSuggestion, SuggestionError, SuggestionProvider,
};
use dashlink::routes::app_router;
use dashlink::state::AppState;

pub const BASE_URL: &str = "http://test.local";

/// Knobs a test can override before spawning the app.
pub struct TestOptions {
    pub suggestions: Arc<dyn SuggestionProvider>,
    pub pattern: PatternConfig,
    pub rate_limits: RateLimitSettings,
    /// When false the analysis queue has no consumer and enqueues fail,
    /// exercising the dropped-trigger path.
    pub analysis_worker: bool,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            suggestions: Arc::new(NullSuggestionProvider),
            pattern: PatternConfig::default(),
            // Generous enough that ordinary tests never trip the gate.
            rate_limits: RateLimitSettings {
                create_limit: 10_000,
                create_window: Duration::from_secs(60),
                read_limit: 10_000,
                read_window: Duration::from_secs(60),
            },
            analysis_worker: true,
        }
    }
}

/// A fully wired app over the in-memory store, with both background workers
/// running.
pub struct TestApp {
    pub server: TestServer,
    pub links: Arc<MemoryLinkRepository>,
    pub analytics: Arc<MemoryAnalyticsRepository>,
    pub profiles: Arc<MemoryProfileRepository>,
    pub pattern_service: Arc<PatternService>,
}

pub fn spawn_app() -> TestApp {
    spawn_app_with(TestOptions::default())
}

pub fn spawn_app_with(options: TestOptions) -> TestApp {
    let links = Arc::new(MemoryLinkRepository::new());
    let analytics = Arc::new(MemoryAnalyticsRepository::new());
    let profiles = Arc::new(MemoryProfileRepository::new());

    let cache: Arc<dyn CacheService> = Arc::new(MokaCache::new(Duration::from_secs(60)));

    let link_service = Arc::new(LinkService::new(
        links.clone(),
        profiles.clone(),
        options.suggestions,
        Duration::from_millis(200),
    ));
    let analytics_service = Arc::new(AnalyticsService::new(links.clone(), analytics.clone()));
    let pattern_service = Arc::new(PatternService::new(
        links.clone(),
        profiles.clone(),
        options.pattern,
    ));

    let (click_tx, click_rx) = mpsc::channel(100);
    tokio::spawn(run_click_worker(
        click_rx,
        links.clone(),
        analytics.clone(),
        Arc::new(NullCountryResolver),
    ));

    let (analysis_tx, analysis_rx) = mpsc::channel(100);
    if options.analysis_worker {
        tokio::spawn(dashlink::jobs::run_analysis_worker(
            analysis_rx,
            pattern_service.clone(),
        ));
    } else {
        drop(analysis_rx);
    }

    let state = AppState {
        link_service,
        analytics_service,
        pattern_service: pattern_service.clone(),
        profiles: profiles.clone(),
        cache,
        click_tx,
        analysis_tx,
        base_url: BASE_URL.to_string(),
        click_queue_capacity: 100,
    };

    let router = app_router(state, &options.rate_limits);
    let server = TestServer::new(router).unwrap();

    TestApp {
        server,
        links,
        analytics,
        profiles,
        pattern_service,
    }
}

/// Polls until `cond` holds; panics after ~2s. Background workers process
/// telemetry asynchronously, so tests wait on observable state instead of
/// sleeping fixed amounts.
pub async fn wait_for<F, Fut>(what: &str, mut cond: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..200 {
        if cond().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for: {what}");
}

/// Suggestion provider serving a fixed candidate list.
pub struct StaticSuggestions(pub Vec<SlugSuggestion>);

#[async_trait]
impl SuggestionProvider for StaticSuggestions {
    async fn suggest(
        &self,
        _url: &str,
        _profile: Option<PatternProfile>,
        _keywords: Vec<String>,
    ) -> Result<Vec<SlugSuggestion>, SuggestionError> {
        Ok(self.0.clone())
    }
}

/// Suggestion provider that hangs longer than the creation-path timeout.
pub struct SlowSuggestions;

#[async_trait]
impl SuggestionProvider for SlowSuggestions {
    async fn suggest(
        &self,
        _url: &str,
        _profile: Option<PatternProfile>,
        _keywords: Vec<String>,
    ) -> Result<Vec<SlugSuggestion>, SuggestionError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(vec![])
    }
}
