//! HTTP handler modules for murimi-api.

pub mod analytics;
pub mod cluster_leaders;
pub mod events;
pub mod export;
pub mod members;
pub mod soil_samples;
