//! Repository implementations: PostgreSQL for deployments, in-memory for
//! tests and database-less runs.

mod memory;
mod pg_analytics_repository;
mod pg_link_repository;
mod pg_profile_repository;

pub use memory::{MemoryAnalyticsRepository, MemoryLinkRepository, MemoryProfileRepository};
pub use pg_analytics_repository::PgAnalyticsRepository;
pub use pg_link_repository::PgLinkRepository;
pub use pg_profile_repository::PgProfileRepository;
