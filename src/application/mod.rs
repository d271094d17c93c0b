//! Application layer: pure analysis logic and the services over it.

pub mod pattern_engine;
pub mod services;
