//! Auth types shared across Murmur services.
//!
//! Provides JWT claim validation and cookie builders for the token cookies
//! set by the auth service and read by everything else.

pub mod cookie;
pub mod token;
