//! Rental Price Calculator
//!
//! Converts an agent's USD hourly rate into a token amount via the price
//! oracle, falling back to the last cached non-zero price when the fresh
//! read fails. When neither source yields a usable price the quote is
//! "unavailable" and callers must not proceed to payment.

use std::sync::Arc;

use sqlx::PgPool;
use thiserror::Error;
use tracing::{error, warn};

use crate::models::{OracleSource, RentalQuote};
use crate::services::oracle::PriceOracleClient;
use crate::services::price_cache::PriceCache;

#[derive(Debug, Error)]
pub enum PricingError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub struct RentalPricingService {
    pool: PgPool,
    oracle: PriceOracleClient,
    cache: Arc<dyn PriceCache>,
    default_rate_usd: f64,
}

impl RentalPricingService {
    pub fn new(
        pool: PgPool,
        oracle: PriceOracleClient,
        cache: Arc<dyn PriceCache>,
        default_rate_usd: f64,
    ) -> Self {
        Self {
            pool,
            oracle,
            cache,
            default_rate_usd,
        }
    }

    /// USD hourly rate for an agent: its listed price, or the platform
    /// default when the agent is unlisted or carries no price.
    pub async fn hourly_rate_usd(&self, agent_slug: &str) -> Result<f64, PricingError> {
        let listed: Option<Option<f64>> =
            sqlx::query_scalar("SELECT price FROM agents WHERE slug = $1")
                .bind(agent_slug)
                .fetch_optional(&self.pool)
                .await?;

        Ok(listed.flatten().unwrap_or(self.default_rate_usd))
    }

    /// Quote a rental: `token_amount = usd_rate * hours / oracle_price`.
    /// `None` means pricing is unavailable (oracle down, cache empty).
    pub async fn quote(
        &self,
        agent_slug: &str,
        hours: i32,
    ) -> Result<Option<RentalQuote>, PricingError> {
        let usd_rate = self.hourly_rate_usd(agent_slug).await?;
        Ok(self.quote_with_rate(agent_slug, usd_rate, hours).await)
    }

    /// Quote with an already-resolved USD rate. Separated from `quote` so
    /// the oracle/cache interplay is testable without a database.
    pub async fn quote_with_rate(
        &self,
        agent_slug: &str,
        usd_rate: f64,
        hours: i32,
    ) -> Option<RentalQuote> {
        let (oracle_price, oracle_source) = self.resolve_oracle_price().await?;

        let usd_total = usd_rate * hours as f64;
        // oracle_price is guaranteed non-zero by resolve_oracle_price
        let token_amount = usd_total / oracle_price;

        Some(RentalQuote {
            agent_slug: agent_slug.to_string(),
            hours,
            usd_rate,
            usd_total,
            oracle_price,
            oracle_source,
            token_amount,
        })
    }

    /// Token amount due for the rental, or `0.0` when pricing is
    /// unavailable.
    pub async fn calculate_amount(
        &self,
        agent_slug: &str,
        hours: i32,
    ) -> Result<f64, PricingError> {
        Ok(self
            .quote(agent_slug, hours)
            .await?
            .map(|q| q.token_amount)
            .unwrap_or(0.0))
    }

    /// Fresh oracle read, cache fallback. A successful fresh read
    /// overwrites the cache; the zero check happens before any division.
    async fn resolve_oracle_price(&self) -> Option<(f64, OracleSource)> {
        let fresh = self.oracle.get_token_price_usd().await;
        if fresh > 0.0 {
            self.cache.set(fresh).await;
            return Some((fresh, OracleSource::Fresh));
        }

        match self.cache.get().await {
            Some(cached) if cached > 0.0 => {
                warn!("Fresh oracle price unavailable, using cached: {cached}");
                Some((cached, OracleSource::Cached))
            }
            _ => {
                error!("No valid oracle price available, fresh or cached");
                None
            }
        }
    }
}
