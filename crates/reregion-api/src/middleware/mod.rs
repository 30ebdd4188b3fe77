//! # Middleware Stack
//!
//! - [`metrics`]: Prometheus request metrics.
//!
//! Request tracing uses `tower_http::trace::TraceLayer` and CORS uses
//! `tower_http::cors::CorsLayer`, both applied in [`crate::app`].

pub mod metrics;
