//! Application state for qios-server

use std::sync::Arc;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::ai::{GeminiClient, TextGenerator};
use crate::auth::RateLimiter;
use crate::config::Config;
use crate::payment::GatewayFactory;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    pub config: Config,
    /// Payment gateway clients, built per request from the configured credentials
    pub gateways: GatewayFactory,
    /// Text generator for analytics (absent when GEMINI_API_KEY is unset)
    pub ai: Option<Arc<dyn TextGenerator>>,
    /// Rate limiter for login/registration routes
    pub rate_limiter: RateLimiter,
}

impl AppState {
    /// Connect to PostgreSQL, run migrations and build the state
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");

        Ok(Self::with_pool(pool, config.clone()))
    }

    /// Build the state around an existing pool
    pub fn with_pool(pool: PgPool, config: Config) -> Self {
        let ai = config.gemini_api_key.clone().map(|key| {
            Arc::new(GeminiClient::new(key, config.gemini_model.clone())) as Arc<dyn TextGenerator>
        });
        if ai.is_none() {
            tracing::warn!("GEMINI_API_KEY not set, analytics endpoints are disabled");
        }

        let gateways = GatewayFactory::new(config.payment.clone());
        for gateway in gateways.available() {
            tracing::info!(gateway = %gateway.name, "Payment gateway configured");
        }

        Self {
            pool,
            gateways,
            ai,
            rate_limiter: RateLimiter::new(),
            config,
        }
    }

    /// Replace the text generator (tests)
    pub fn with_text_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.ai = Some(generator);
        self
    }
}
