//! Shared types for the Pearl Flat storefront backend
//!
//! Holds everything both the server and its clients need to agree on:
//!
//! - **Errors** (`error`): unified error codes, HTTP mapping, `AppError` and
//!   the `ApiResponse` envelope
//! - **Models** (`models`): product, order and harvest domain types
//! - **Client DTOs** (`client`): request/response payloads for the HTTP API

pub mod client;
pub mod error;
pub mod models;
pub mod util;

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
