//! Database access layer
//!
//! Free functions over `&PgPool`, grouped per table.

pub mod harvest;
pub mod orders;
pub mod products;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
