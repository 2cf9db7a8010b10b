use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A community discussion thread
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Discussion {
    pub id: Uuid,
    pub author_wallet: String,
    pub title: String,
    pub body: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

/// Discussion listing entry with its reply count
#[derive(Debug, Clone, Serialize)]
pub struct DiscussionSummary {
    pub id: Uuid,
    pub author_wallet: String,
    pub title: String,
    pub body: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub reply_count: i64,
}

/// Request payload for opening a discussion thread
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDiscussionRequest {
    pub author_wallet: String,
    pub title: String,
    pub body: String,
    pub category: String,
}

/// A reply within a discussion thread
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DiscussionReply {
    pub id: Uuid,
    pub discussion_id: Uuid,
    pub author_wallet: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Request payload for replying to a discussion
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReplyRequest {
    pub author_wallet: String,
    pub body: String,
}
