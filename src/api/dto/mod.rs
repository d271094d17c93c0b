//! Request and response types for the HTTP API.

pub mod analytics;
pub mod health;
pub mod links;
pub mod profile;
pub mod shorten;
