//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer and holds the
//! process-local stores.
//!
//! - [`memory`] - Rate limiter and session store
//! - [`persistence`] - PostgreSQL repository implementations

pub mod memory;
pub mod persistence;
