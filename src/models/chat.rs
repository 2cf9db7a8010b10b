use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One message in a conversation, user- or bot-authored. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChatMessage {
    pub id: Uuid,
    pub user_wallet: String,
    pub agent_id: Option<Uuid>,
    pub content: String,
    pub is_bot: bool,
    pub is_markdown: bool,
    pub created_at: DateTime<Utc>,
}

/// Request payload for sending a chat message to an agent
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    pub user_wallet: String,
    pub content: String,
    #[serde(default)]
    pub is_markdown: bool,
}

/// The persisted user message together with the provider's reply
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageResponse {
    pub user_message: ChatMessage,
    pub bot_message: ChatMessage,
}
