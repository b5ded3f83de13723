//! # Route Handlers
//!
//! | Module      | Routes          |
//! |-------------|-----------------|
//! | [`fetch`]   | `GET /fetch`    |
//! | [`metrics`] | `GET /metrics`  |

pub mod fetch;
pub mod metrics;
