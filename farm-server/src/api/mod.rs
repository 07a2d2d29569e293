//! API routes for farm-server

pub mod auth;
pub mod checkout;
pub mod health;
pub mod orders;
pub mod products;

use crate::auth::admin::admin_auth_middleware;
use crate::auth::rate_limit::login_rate_limit;
use crate::state::AppState;
use axum::routing::{get, post, put};
use axum::{Router, middleware};
use shared::error::AppError;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub type ApiResult<T> = Result<axum::Json<T>, AppError>;

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    // Admin login (rate-limited, no auth)
    let login = Router::new()
        .route("/api/admin/login", post(auth::login))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            login_rate_limit,
        ));

    // Admin API (Bearer token required)
    let admin = Router::new()
        .route("/api/admin/session", get(auth::check_session))
        .route("/api/admin/products", get(products::list_all_products))
        .route("/api/admin/products/{id}", put(products::update_product))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            admin_auth_middleware,
        ));

    // Public storefront API
    let public = Router::new()
        .route("/api/products", get(products::list_products))
        .route("/api/orders/complete", post(orders::complete_order))
        .route("/api/checkout/session", post(checkout::create_session))
        .route("/api/checkout/session/{id}", get(checkout::get_session));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(public)
        .merge(login)
        .merge(admin)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
