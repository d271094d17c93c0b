//! Shared application state injected into handlers.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::application::services::{AnalyticsService, LinkService, PatternService};
use crate::domain::entities::ClickEvent;
use crate::domain::repositories::ProfileRepository;
use crate::infrastructure::cache::CacheService;
use crate::jobs::AnalysisTask;

#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    pub analytics_service: Arc<AnalyticsService>,
    pub pattern_service: Arc<PatternService>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub cache: Arc<dyn CacheService>,
    pub click_tx: mpsc::Sender<ClickEvent>,
    pub analysis_tx: mpsc::Sender<AnalysisTask>,
    pub base_url: String,
    pub click_queue_capacity: usize,
}
