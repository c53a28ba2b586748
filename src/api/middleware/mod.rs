//! HTTP middleware for request processing and protection.
//!
//! Provides identity resolution, rate limiting, CORS, and observability.

pub mod auth;
pub mod cors;
pub mod rate_limit;
pub mod tracing;
