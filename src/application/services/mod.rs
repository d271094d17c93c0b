//! Application services orchestrating domain logic over the repositories.

mod analytics_service;
mod link_service;
mod pattern_service;

pub use analytics_service::AnalyticsService;
pub use link_service::{CreatedLink, LinkService};
pub use pattern_service::{PatternConfig, PatternService};
