//! Infrastructure layer: persistence, caching, and outbound HTTP clients.

pub mod cache;
pub mod geoip;
pub mod persistence;
pub mod suggestion;
