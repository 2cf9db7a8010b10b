//! Last-known-good oracle price cache
//!
//! Explicit key-value interface injected into the pricing service. The
//! production implementation persists a single row so the fallback survives
//! restarts; the in-memory implementation backs unit tests.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::sync::Mutex;
use tracing::warn;

/// Row key for the persisted price; carried over from the original
/// client-side cache
const PRICE_CACHE_KEY: &str = "cached_dgpu_price_usd";

#[async_trait]
pub trait PriceCache: Send + Sync {
    /// Last cached price, if any. A cache read failure reads as a miss.
    async fn get(&self) -> Option<f64>;
    /// Overwrite the cached price. Best-effort; failures are logged.
    async fn set(&self, price: f64);
    async fn clear(&self);
}

/// Postgres-backed cache, one row in `price_cache`
#[derive(Debug, Clone)]
pub struct PgPriceCache {
    pool: PgPool,
}

impl PgPriceCache {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PriceCache for PgPriceCache {
    async fn get(&self) -> Option<f64> {
        let result: Result<Option<f64>, sqlx::Error> =
            sqlx::query_scalar("SELECT value FROM price_cache WHERE key = $1")
                .bind(PRICE_CACHE_KEY)
                .fetch_optional(&self.pool)
                .await;

        match result {
            Ok(value) => value,
            Err(e) => {
                warn!("Price cache read failed: {e}");
                None
            }
        }
    }

    async fn set(&self, price: f64) {
        let result = sqlx::query(
            r#"
            INSERT INTO price_cache (key, value, updated_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (key) DO UPDATE SET value = $2, updated_at = $3
            "#,
        )
        .bind(PRICE_CACHE_KEY)
        .bind(price)
        .bind(Utc::now())
        .execute(&self.pool)
        .await;

        if let Err(e) = result {
            warn!("Price cache write failed: {e}");
        }
    }

    async fn clear(&self) {
        let result = sqlx::query("DELETE FROM price_cache WHERE key = $1")
            .bind(PRICE_CACHE_KEY)
            .execute(&self.pool)
            .await;

        if let Err(e) = result {
            warn!("Price cache clear failed: {e}");
        }
    }
}

/// In-memory cache for tests
#[derive(Debug, Default)]
pub struct InMemoryPriceCache {
    value: Mutex<Option<f64>>,
}

impl InMemoryPriceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_price(price: f64) -> Self {
        Self {
            value: Mutex::new(Some(price)),
        }
    }
}

#[async_trait]
impl PriceCache for InMemoryPriceCache {
    async fn get(&self) -> Option<f64> {
        *self.value.lock().unwrap()
    }

    async fn set(&self, price: f64) {
        *self.value.lock().unwrap() = Some(price);
    }

    async fn clear(&self) {
        *self.value.lock().unwrap() = None;
    }
}
