pub mod analytics_repository;
pub mod link_repository;
pub mod profile_repository;

pub use analytics_repository::AnalyticsRepository;
pub use link_repository::LinkRepository;
pub use profile_repository::ProfileRepository;

#[cfg(test)]
pub use analytics_repository::MockAnalyticsRepository;
#[cfg(test)]
pub use link_repository::MockLinkRepository;
#[cfg(test)]
pub use profile_repository::MockProfileRepository;
