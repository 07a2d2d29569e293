//! Admin authentication and rate limiting

pub mod admin;
pub mod rate_limit;

pub use admin::AdminIdentity;
