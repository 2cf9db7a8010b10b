//! dGPU Market - a marketplace backend for renting AI agents
//!
//! Catalog, rental settlement (price oracle -> token transfer -> rental
//! record -> countdown), chat proxying to LLM providers, reviews,
//! discussions, usage analytics, and an admin surface.

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::AppError;

pub use models::{
    Agent, AgentStatus, ChatMessage, CreateAgentRequest, CreateRentalRequest, Discussion,
    DiscussionReply, OracleSource, PurchaseResponse, Rental, RentalQuote, RentalStatusResponse,
    Review, UsageLog,
};

pub use services::{
    AdminService, AgentCatalogService, ChatService, Clock, DiscussionService, LlmRouter,
    PgPriceCache, PriceOracleClient, RatingJob, RatingJobConfig, RentalPricingService,
    RentalService, ReviewService, RpcWalletClient, SystemClock, UsageLogService, WalletClient,
};

/// Application state shared across handlers
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: Config,
    pub pricing: RentalPricingService,
    pub wallet: Arc<dyn WalletClient>,
    pub clock: Arc<dyn Clock>,
    pub router: Arc<LlmRouter>,
}

impl AppState {
    /// Production wiring: Postgres-backed price cache, JSON-RPC wallet
    /// client, wall-clock time
    pub fn new(db: sqlx::PgPool, config: Config) -> Self {
        let oracle =
            PriceOracleClient::new(config.oracle_url.clone(), config.oracle_token_key.clone());
        let cache = Arc::new(PgPriceCache::new(db.clone()));
        let pricing = RentalPricingService::new(
            db.clone(),
            oracle,
            cache,
            config.default_hourly_rate_usd,
        );

        Self {
            pricing,
            wallet: Arc::new(RpcWalletClient::new(config.rpc_url.clone())),
            clock: Arc::new(SystemClock),
            router: Arc::new(LlmRouter::from_config(&config)),
            db,
            config,
        }
    }
}
