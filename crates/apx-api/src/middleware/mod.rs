//! # Middleware
//!
//! Tower layers applied to the API router.

pub mod metrics;
pub mod tracing_layer;
