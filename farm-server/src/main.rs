//! farm-server — Pearl Flat Oyster Co. storefront backend
//!
//! Long-running service that:
//! - Serves the product catalog
//! - Reconciles completed orders against inventory (harvest counter + stock)
//! - Provides an admin API (JWT authenticated, single shared password)
//! - Creates Stripe Checkout sessions and sends order receipt emails

mod api;
mod auth;
mod config;
mod db;
mod email;
mod error;
mod reconcile;
mod state;
mod stripe;
mod util;

use config::Config;
use state::AppState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "farm_server=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting farm-server (env: {})", config.environment);

    if config.admin_password.is_none() {
        tracing::warn!("ADMIN_PASSWORD not set; admin login is disabled");
    }

    // Initialize application state
    let state = AppState::new(&config).await?;

    // Periodic rate limiter cleanup (every 5 minutes)
    let rate_limiter = state.rate_limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(300));
        loop {
            interval.tick().await;
            rate_limiter.cleanup().await;
        }
    });

    let app = api::create_router(state);

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("farm-server HTTP listening on {addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;

    Ok(())
}
