//! Rental Record Writer + countdown math
//!
//! Persists the rental window after a successful token transfer and derives
//! the remaining time for the countdown display. Rentals never change after
//! insertion; expiry is purely a wall-clock comparison against `end_time`.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Agent, AgentStatus, Rental, RentalStatusResponse};
use crate::services::clock::Clock;

#[derive(Debug, Error)]
pub enum RentalError {
    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    #[error("Agent is not rentable: {0}")]
    AgentInactive(String),

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    /// The transfer already succeeded when this write failed; the payment
    /// is unreconciled and the signature is the only handle on it.
    #[error("Rental write failed after payment {tx_signature}: {source}")]
    RecordFailed {
        tx_signature: String,
        source: sqlx::Error,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// End of the rental window: exactly `start + hours * 3600` seconds
pub fn rental_end_time(start: DateTime<Utc>, hours: i32) -> DateTime<Utc> {
    start + Duration::hours(hours as i64)
}

/// Seconds left before `end_time`, clamped at zero
pub fn remaining_seconds(end_time: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (end_time - now).num_seconds().max(0)
}

#[derive(Clone)]
pub struct RentalService {
    pool: PgPool,
    clock: Arc<dyn Clock>,
}

impl RentalService {
    pub fn new(pool: PgPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    /// Pre-payment check: the agent must exist and be active. Runs before
    /// any transfer is submitted so nobody pays for an unrentable agent.
    pub async fn validate_rentable(&self, agent_slug: &str) -> Result<Agent, RentalError> {
        let agent: Option<Agent> = sqlx::query_as("SELECT * FROM agents WHERE slug = $1")
            .bind(agent_slug)
            .fetch_optional(&self.pool)
            .await?;

        let agent = agent.ok_or_else(|| RentalError::AgentNotFound(agent_slug.to_string()))?;

        if agent.status != AgentStatus::Active.as_str() {
            return Err(RentalError::AgentInactive(agent_slug.to_string()));
        }

        Ok(agent)
    }

    /// Persist the rental window. Called only after a transfer signature
    /// was obtained, so every failure in here is an unreconciled payment
    /// and maps to `RecordFailed`.
    pub async fn create(
        &self,
        user_wallet: &str,
        agent_slug: &str,
        duration_hours: i32,
        tx_signature: &str,
    ) -> Result<Rental, RentalError> {
        if duration_hours < 1 {
            return Err(RentalError::InvalidDuration(
                "duration_hours must be at least 1".to_string(),
            ));
        }

        let start_time = self.clock.now();
        let end_time = rental_end_time(start_time, duration_hours);

        let record_failed = |source: sqlx::Error| RentalError::RecordFailed {
            tx_signature: tx_signature.to_string(),
            source,
        };

        let mut tx = self.pool.begin().await.map_err(record_failed)?;

        let rental: Rental = sqlx::query_as(
            r#"
            INSERT INTO rentals
                (id, user_wallet, agent_slug, duration_hours, start_time, end_time,
                 tx_signature, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_wallet)
        .bind(agent_slug)
        .bind(duration_hours)
        .bind(start_time)
        .bind(end_time)
        .bind(tx_signature)
        .bind(start_time)
        .fetch_one(&mut *tx)
        .await
        .map_err(record_failed)?;

        sqlx::query(
            "UPDATE agents SET deployments = deployments + 1, updated_at = $2 WHERE slug = $1",
        )
        .bind(agent_slug)
        .bind(start_time)
        .execute(&mut *tx)
        .await
        .map_err(record_failed)?;

        tx.commit().await.map_err(record_failed)?;

        Ok(rental)
    }

    /// Most recent rental for a (wallet, agent) pair by `end_time`
    pub async fn latest_for(
        &self,
        user_wallet: &str,
        agent_slug: &str,
    ) -> Result<Option<Rental>, RentalError> {
        let rental = sqlx::query_as(
            r#"
            SELECT * FROM rentals
            WHERE user_wallet = $1 AND agent_slug = $2
            ORDER BY end_time DESC
            LIMIT 1
            "#,
        )
        .bind(user_wallet)
        .bind(agent_slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(rental)
    }

    /// Derived countdown state; nothing about the timer is persisted
    pub fn status(&self, rental: Rental) -> RentalStatusResponse {
        let remaining = remaining_seconds(rental.end_time, self.clock.now());
        RentalStatusResponse {
            remaining_seconds: remaining,
            active: remaining > 0,
            rental,
        }
    }

    /// Whether the wallet currently holds an unexpired rental for the agent
    pub async fn has_active(
        &self,
        user_wallet: &str,
        agent_slug: &str,
    ) -> Result<bool, RentalError> {
        let latest = self.latest_for(user_wallet, agent_slug).await?;
        Ok(latest
            .map(|r| remaining_seconds(r.end_time, self.clock.now()) > 0)
            .unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::clock::FixedClock;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn rental_at(start: DateTime<Utc>, hours: i32) -> Rental {
        Rental {
            id: Uuid::new_v4(),
            user_wallet: "Wallet111".to_string(),
            agent_slug: "gemini-2-0-flash".to_string(),
            duration_hours: hours,
            start_time: start,
            end_time: rental_end_time(start, hours),
            tx_signature: "Sig111".to_string(),
            created_at: start,
        }
    }

    fn service_at(now: DateTime<Utc>) -> RentalService {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .expect("lazy pool");
        RentalService::new(pool, Arc::new(FixedClock(now)))
    }

    #[test]
    fn end_time_is_start_plus_exact_hours() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = rental_end_time(start, 3);
        assert_eq!(end, Utc.with_ymd_and_hms(2024, 1, 1, 3, 0, 0).unwrap());
        assert_eq!((end - start).num_seconds(), 3 * 3600);
    }

    #[tokio::test]
    async fn mid_window_countdown() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 1, 30, 0).unwrap();
        let svc = service_at(now);

        let status = svc.status(rental_at(start, 3));
        assert_eq!(status.remaining_seconds, 5400);
        assert!(status.active);
    }

    #[tokio::test]
    async fn expired_rental_clamps_to_zero() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let svc = service_at(now);

        let status = svc.status(rental_at(start, 3));
        assert_eq!(status.remaining_seconds, 0);
        assert!(!status.active);
    }

    #[tokio::test]
    async fn expiry_boundary_is_inactive() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let svc = service_at(rental_end_time(start, 1));

        let status = svc.status(rental_at(start, 1));
        assert_eq!(status.remaining_seconds, 0);
        assert!(!status.active);
    }

    proptest! {
        #[test]
        fn end_time_invariant_holds_for_any_duration(hours in 1i32..=8760) {
            let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
            let end = rental_end_time(start, hours);
            prop_assert_eq!((end - start).num_seconds(), hours as i64 * 3600);
        }

        #[test]
        fn remaining_is_never_negative(offset_secs in 0i64..=40_000_000) {
            let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
            let end = rental_end_time(start, 3);
            let now = start + Duration::seconds(offset_secs);
            prop_assert!(remaining_seconds(end, now) >= 0);
        }
    }
}
