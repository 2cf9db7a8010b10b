use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A paid, time-boxed access grant to chat with one agent.
///
/// Immutable after creation. A rental "expires" purely by wall-clock
/// comparison against `end_time`; nothing ever mutates the row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Rental {
    pub id: Uuid,
    pub user_wallet: String,
    pub agent_slug: String,
    pub duration_hours: i32,
    pub start_time: DateTime<Utc>,
    /// Always exactly `start_time + duration_hours * 3600s`
    pub end_time: DateTime<Utc>,
    /// Signature of the on-chain token transfer that paid for this rental
    pub tx_signature: String,
    pub created_at: DateTime<Utc>,
}

/// Request payload for purchasing a rental
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRentalRequest {
    pub user_wallet: String,
    pub agent_slug: String,
    pub duration_hours: i32,
}

/// Where the oracle price used for a quote came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OracleSource {
    Fresh,
    Cached,
}

/// Priced rental offer: USD rate and the token amount due at the quoted
/// oracle price
#[derive(Debug, Clone, Serialize)]
pub struct RentalQuote {
    pub agent_slug: String,
    pub hours: i32,
    pub usd_rate: f64,
    pub usd_total: f64,
    pub oracle_price: f64,
    pub oracle_source: OracleSource,
    pub token_amount: f64,
}

/// Response for a completed purchase
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseResponse {
    pub rental: Rental,
    pub quote: RentalQuote,
}

/// Derived countdown state for the latest rental of a (wallet, agent) pair
#[derive(Debug, Clone, Serialize)]
pub struct RentalStatusResponse {
    pub rental: Rental,
    /// Clamped at zero, never negative
    pub remaining_seconds: i64,
    pub active: bool,
}
