//! Shared service plumbing for Murmur services.
//!
//! Health endpoints, request-id middleware, tracing init, and serde helpers.

pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
