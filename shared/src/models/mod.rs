//! Data models
//!
//! Shared between the server and the storefront (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (Postgres BIGSERIAL).

pub mod harvest;
pub mod order;
pub mod product;

// Re-exports
pub use harvest::*;
pub use order::*;
pub use product::*;
