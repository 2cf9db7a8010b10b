use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A user review of an agent; feeds the agent's aggregate rating
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub id: Uuid,
    pub agent_id: Uuid,
    pub user_wallet: String,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Request payload for submitting a review
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitReviewRequest {
    pub user_wallet: String,
    /// 1 to 5 stars
    pub rating: i32,
    pub comment: String,
}
