//! Usage Log Service
//!
//! Append-only audit trail of proxied provider calls, for analytics only.
//! Recording is best-effort from the caller's perspective: a failed insert
//! must never fail the chat that triggered it.

use chrono::{NaiveDate, Utc};
use sqlx::{PgPool, Row};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{DailyUsage, UsageLog};

#[derive(Debug, Error)]
pub enum UsageError {
    #[error("Invalid date range: {0}")]
    InvalidRange(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// One provider call to append
#[derive(Debug, Clone)]
pub struct NewUsageLog {
    pub tool: String,
    pub user_wallet: Option<String>,
    pub params: serde_json::Value,
    pub duration_ms: i64,
    pub success: bool,
    pub error_code: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UsageLogService {
    pool: PgPool,
}

impl UsageLogService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn record(&self, entry: NewUsageLog) -> Result<(), UsageError> {
        let status = if entry.success { "success" } else { "error" };

        sqlx::query(
            r#"
            INSERT INTO usage_logs
                (id, tool, user_wallet, invoked_at, params, duration_ms, status,
                 error_code, source)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'api')
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&entry.tool)
        .bind(&entry.user_wallet)
        .bind(Utc::now())
        .bind(&entry.params)
        .bind(entry.duration_ms)
        .bind(status)
        .bind(&entry.error_code)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Per-day invocation counts for one tool over a closed date range
    pub async fn daily_summary(
        &self,
        tool: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyUsage>, UsageError> {
        if from > to {
            return Err(UsageError::InvalidRange(format!(
                "from {from} is after to {to}"
            )));
        }

        let rows = sqlx::query(
            r#"
            SELECT CAST(invoked_at AS DATE) AS day,
                   COUNT(*) AS invocations,
                   COUNT(*) FILTER (WHERE status = 'success') AS successes,
                   COUNT(*) FILTER (WHERE status = 'error') AS errors
            FROM usage_logs
            WHERE tool = $1
              AND CAST(invoked_at AS DATE) BETWEEN $2 AND $3
            GROUP BY day
            ORDER BY day
            "#,
        )
        .bind(tool)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        let summary = rows
            .into_iter()
            .map(|row| DailyUsage {
                day: row.get("day"),
                invocations: row.get("invocations"),
                successes: row.get("successes"),
                errors: row.get("errors"),
            })
            .collect();

        Ok(summary)
    }

    /// Most recent log entries, for the admin panel
    pub async fn recent(&self, limit: i64) -> Result<Vec<UsageLog>, UsageError> {
        let logs =
            sqlx::query_as("SELECT * FROM usage_logs ORDER BY invoked_at DESC LIMIT $1")
                .bind(limit.clamp(1, 500))
                .fetch_all(&self.pool)
                .await?;

        Ok(logs)
    }
}
