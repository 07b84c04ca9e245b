//! HTTP backend-for-frontend of the community platform.

pub mod api;
pub mod metrics;
pub mod state;
