use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Audit record appended after each proxied provider call
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UsageLog {
    pub id: Uuid,
    /// Provider route identifier (gemini, deepseek, grok2, stability)
    pub tool: String,
    pub user_wallet: Option<String>,
    pub invoked_at: DateTime<Utc>,
    pub params: serde_json::Value,
    pub duration_ms: i64,
    pub status: String,
    pub error_code: Option<String>,
    pub source: String,
}

/// Per-day invocation counts for one tool
#[derive(Debug, Clone, Serialize)]
pub struct DailyUsage {
    pub day: NaiveDate,
    pub invocations: i64,
    pub successes: i64,
    pub errors: i64,
}
