//! Application state

use aws_sdk_sesv2::Client as SesClient;
use sqlx::PgPool;

use crate::config::Config;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    /// AWS SES client for sending receipt emails
    pub ses: SesClient,
    /// SES sender email address
    pub ses_from_email: String,
    /// Stripe secret key
    pub stripe_secret_key: String,
    /// URL to redirect after successful checkout
    pub checkout_success_url: String,
    /// URL to redirect after cancelled checkout
    pub checkout_cancel_url: String,
    /// JWT signing secret for admin session tokens
    pub jwt_secret: String,
    /// Single shared admin password (`None` disables admin login)
    pub admin_password: Option<String>,
    /// Rate limiter for the login route
    pub rate_limiter: crate::auth::rate_limit::RateLimiter,
}

impl AppState {
    /// Create a new AppState
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPool::connect(&config.database_url).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

        let ses = if let Ok(ses_region) = std::env::var("SES_REGION") {
            let ses_config = aws_config
                .to_builder()
                .region(aws_config::Region::new(ses_region))
                .build();
            SesClient::new(&ses_config)
        } else {
            SesClient::new(&aws_config)
        };

        Ok(Self {
            pool,
            ses,
            ses_from_email: config.ses_from_email.clone(),
            stripe_secret_key: config.stripe_secret_key.clone(),
            checkout_success_url: config.checkout_success_url.clone(),
            checkout_cancel_url: config.checkout_cancel_url.clone(),
            jwt_secret: config.jwt_secret.clone(),
            admin_password: config.admin_password.clone(),
            rate_limiter: crate::auth::rate_limit::RateLimiter::new(),
        })
    }
}
