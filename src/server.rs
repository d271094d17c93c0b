//! HTTP server initialization and runtime setup.
//!
//! Wires the storage backend, external collaborators, background workers,
//! and the Axum server lifecycle.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tokio::sync::mpsc;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tower::Layer;
use tower_http::normalize_path::NormalizePathLayer;

use crate::application::services::{AnalyticsService, LinkService, PatternConfig, PatternService};
use crate::config::Config;
use crate::domain::click_worker::run_click_worker;
use crate::domain::repositories::{AnalyticsRepository, LinkRepository, ProfileRepository};
use crate::infrastructure::cache::{CacheService, MokaCache, NullCache};
use crate::infrastructure::geoip::{CountryResolver, ExternalApiResolver, NullCountryResolver};
use crate::infrastructure::persistence::{
    MemoryAnalyticsRepository, MemoryLinkRepository, MemoryProfileRepository,
    PgAnalyticsRepository, PgLinkRepository, PgProfileRepository,
};
use crate::infrastructure::suggestion::{
    HttpSuggestionClient, NullSuggestionProvider, SuggestionProvider,
};
use crate::jobs::{run_analysis_worker, scheduler};
use crate::routes::app_router;
use crate::state::AppState;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Storage (PostgreSQL with migrations, or the in-memory store)
/// - Redirect cache
/// - Suggestion and GeoIP collaborators
/// - Background click and analysis workers
/// - The weekly batch scheduler (when enabled)
/// - Axum HTTP server
///
/// # Errors
///
/// Returns an error if the database connection, migrations, or the listener
/// bind fail.
pub async fn run(config: Config) -> Result<()> {
    let (links, analytics, profiles) = build_repositories(&config).await?;

    let cache: Arc<dyn CacheService> = match config.cache_ttl_seconds {
        0 => Arc::new(NullCache::new()),
        ttl => Arc::new(MokaCache::new(Duration::from_secs(ttl))),
    };

    let suggestions: Arc<dyn SuggestionProvider> = match &config.suggestion_api_url {
        Some(url) => {
            tracing::info!("Suggestion collaborator enabled");
            Arc::new(HttpSuggestionClient::new(url, config.suggestion_timeout))
        }
        None => {
            tracing::info!("Suggestion collaborator disabled, fallback generation only");
            Arc::new(NullSuggestionProvider)
        }
    };

    let geo: Arc<dyn CountryResolver> = match &config.geoip_api_url {
        Some(url) => Arc::new(ExternalApiResolver::new(url)),
        None => Arc::new(NullCountryResolver),
    };

    let link_service = Arc::new(LinkService::new(
        links.clone(),
        profiles.clone(),
        suggestions,
        config.suggestion_timeout,
    ));
    let analytics_service = Arc::new(AnalyticsService::new(links.clone(), analytics.clone()));
    let pattern_service = Arc::new(PatternService::new(
        links.clone(),
        profiles.clone(),
        PatternConfig {
            cooldown: Duration::from_secs(config.pattern.cooldown_hours * 3_600),
            min_links: config.pattern.min_links,
            sample_size: config.pattern.sample_size,
            refresh_every: config.pattern.batch_threshold,
            active_window: Duration::from_secs(config.pattern.active_window_days * 86_400),
        },
    ));

    let (click_tx, click_rx) = mpsc::channel(config.click_queue_capacity);
    tokio::spawn(run_click_worker(click_rx, links, analytics, geo));
    tracing::info!("Click worker started");

    let (analysis_tx, analysis_rx) = mpsc::channel(config.analysis_queue_capacity);
    tokio::spawn(run_analysis_worker(analysis_rx, pattern_service.clone()));

    if config.scheduler_enabled {
        scheduler::start(pattern_service.clone());
    }

    let state = AppState {
        link_service,
        analytics_service,
        pattern_service,
        profiles,
        cache,
        click_tx,
        analysis_tx,
        base_url: config.base_url.clone(),
        click_queue_capacity: config.click_queue_capacity,
    };

    let app = NormalizePathLayer::trim_trailing_slash()
        .layer(app_router(state, &config.rate_limits));

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .await?;

    Ok(())
}

type Repositories = (
    Arc<dyn LinkRepository>,
    Arc<dyn AnalyticsRepository>,
    Arc<dyn ProfileRepository>,
);

async fn build_repositories(config: &Config) -> Result<Repositories> {
    match &config.database_url {
        Some(url) => {
            let pool = connect_pool(url, config).await?;
            tracing::info!("Connected to database");

            sqlx::migrate!("./migrations").run(&pool).await?;

            let pool = Arc::new(pool);
            Ok((
                Arc::new(PgLinkRepository::new(pool.clone())),
                Arc::new(PgAnalyticsRepository::new(pool.clone())),
                Arc::new(PgProfileRepository::new(pool)),
            ))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store");
            Ok((
                Arc::new(MemoryLinkRepository::new()),
                Arc::new(MemoryAnalyticsRepository::new()),
                Arc::new(MemoryProfileRepository::new()),
            ))
        }
    }
}

/// Connects with exponential backoff; a database briefly unavailable at
/// startup (e.g. compose ordering) should not kill the process.
async fn connect_pool(url: &str, config: &Config) -> Result<PgPool> {
    let strategy = ExponentialBackoff::from_millis(500).map(jitter).take(5);

    let pool = Retry::spawn(strategy, || {
        PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
            .connect(url)
    })
    .await?;

    Ok(pool)
}
