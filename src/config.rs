use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,
    /// Maximum database connections in pool
    pub database_max_connections: u32,
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Price-feed endpoint returning `{ <token_key>: { "usd": n } }`
    pub oracle_url: String,
    /// Key under which the token's quote appears in the oracle payload
    pub oracle_token_key: String,
    /// Blockchain RPC endpoint used to broadcast token transfers
    pub rpc_url: String,
    /// Mint address of the payment token
    pub token_mint: String,
    /// Treasury wallet receiving rental payments
    pub treasury_wallet: String,
    /// Decimal places of the payment token (default: 6)
    pub token_decimals: u32,
    /// USD hourly rate applied to agents without a listed price (default: 0.25)
    pub default_hourly_rate_usd: f64,
    /// Interval between rating aggregation runs in seconds (default: 300)
    pub rating_job_interval_secs: u64,
    /// Whether the rating aggregation job runs at all (default: true)
    pub rating_job_enabled: bool,
    /// Provider credentials; a missing key disables that provider's routes
    pub gemini_api_key: Option<String>,
    pub deepseek_api_key: Option<String>,
    pub grok2_api_key: Option<String>,
    pub stability_api_key: Option<String>,
    /// Provider endpoints, overridable for tests
    pub gemini_api_url: String,
    pub deepseek_api_url: String,
    pub grok2_api_url: String,
    pub stability_api_url: String,
}

const DEFAULT_GEMINI_URL: &str =
    "https://generativelanguage.googleapis.com/v1/models/gemini-1.5-pro-001:generateContent";
const DEFAULT_DEEPSEEK_URL: &str = "https://api.deepseek.ai/v1/chat/completions";
const DEFAULT_GROK2_URL: &str = "https://api.x.ai/v1/chat/completions";
const DEFAULT_STABILITY_URL: &str =
    "https://api.stability.ai/v2beta/stable-image/generate/core";

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::MissingEnvVar("DATABASE_URL"))?;

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS"))?;

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "8787".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PORT"))?;

        let oracle_url =
            env::var("ORACLE_URL").map_err(|_| ConfigError::MissingEnvVar("ORACLE_URL"))?;

        let oracle_token_key =
            env::var("ORACLE_TOKEN_KEY").unwrap_or_else(|_| "dante".to_string());

        let rpc_url = env::var("RPC_URL").map_err(|_| ConfigError::MissingEnvVar("RPC_URL"))?;

        let token_mint =
            env::var("TOKEN_MINT").map_err(|_| ConfigError::MissingEnvVar("TOKEN_MINT"))?;

        let treasury_wallet = env::var("TREASURY_WALLET")
            .map_err(|_| ConfigError::MissingEnvVar("TREASURY_WALLET"))?;

        let token_decimals = env::var("TOKEN_DECIMALS")
            .unwrap_or_else(|_| "6".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("TOKEN_DECIMALS"))?;

        let default_hourly_rate_usd = env::var("DEFAULT_HOURLY_RATE_USD")
            .unwrap_or_else(|_| "0.25".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("DEFAULT_HOURLY_RATE_USD"))?;

        let rating_job_interval_secs = env::var("RATING_JOB_INTERVAL_SECS")
            .unwrap_or_else(|_| "300".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("RATING_JOB_INTERVAL_SECS"))?;

        let rating_job_enabled = env::var("RATING_JOB_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("RATING_JOB_ENABLED"))?;

        Ok(Self {
            database_url,
            database_max_connections,
            host,
            port,
            oracle_url,
            oracle_token_key,
            rpc_url,
            token_mint,
            treasury_wallet,
            token_decimals,
            default_hourly_rate_usd,
            rating_job_interval_secs,
            rating_job_enabled,
            gemini_api_key: env::var("GEMINI_API_KEY").ok(),
            deepseek_api_key: env::var("DEEPSEEK_API_KEY").ok(),
            grok2_api_key: env::var("GROK2_API_KEY").ok(),
            stability_api_key: env::var("STABILITY_API_KEY").ok(),
            gemini_api_url: env::var("GEMINI_API_URL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_URL.to_string()),
            deepseek_api_url: env::var("DEEPSEEK_API_URL")
                .unwrap_or_else(|_| DEFAULT_DEEPSEEK_URL.to_string()),
            grok2_api_url: env::var("GROK2_API_URL")
                .unwrap_or_else(|_| DEFAULT_GROK2_URL.to_string()),
            stability_api_url: env::var("STABILITY_API_URL")
                .unwrap_or_else(|_| DEFAULT_STABILITY_URL.to_string()),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}
