//! Chat Service
//!
//! Persists the conversation and forwards prompts to the provider behind
//! each agent. Access is gated on an unexpired rental; expiry is a soft
//! gate that the user clears by renting again.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use sqlx::PgPool;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::models::{Agent, AgentStatus, ChatMessage, SendMessageRequest, SendMessageResponse};
use crate::services::providers::{tool_for_slug, LlmRouter, ProviderError};
use crate::services::rental::{RentalError, RentalService};
use crate::services::usage::{NewUsageLog, UsageLogService};

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    #[error("Agent is inactive: {0}")]
    AgentInactive(String),

    #[error("No active rental for agent {agent_slug} and wallet {user_wallet}")]
    RentalExpired {
        user_wallet: String,
        agent_slug: String,
    },

    #[error("Message content must not be empty")]
    EmptyMessage,

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Rental lookup failed: {0}")]
    Rental(#[from] RentalError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

fn provider_error_code(err: &ProviderError) -> &'static str {
    match err {
        ProviderError::NotConfigured { .. } => "NOT_CONFIGURED",
        ProviderError::UnknownRoute(_) => "UNKNOWN_ROUTE",
        ProviderError::Upstream { .. } => "UPSTREAM_ERROR",
        ProviderError::EmptyResponse { .. } => "EMPTY_RESPONSE",
    }
}

pub struct ChatService {
    pool: PgPool,
    rentals: RentalService,
    router: Arc<LlmRouter>,
    usage: UsageLogService,
}

impl ChatService {
    pub fn new(
        pool: PgPool,
        rentals: RentalService,
        router: Arc<LlmRouter>,
        usage: UsageLogService,
    ) -> Self {
        Self {
            pool,
            rentals,
            router,
            usage,
        }
    }

    /// Persist the user message, get the provider's reply, persist it as
    /// the bot message. The user message stays on provider failure so the
    /// transcript reflects what was actually sent.
    pub async fn send(
        &self,
        agent_slug: &str,
        request: SendMessageRequest,
    ) -> Result<SendMessageResponse, ChatError> {
        let content = request.content.trim();
        if content.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let agent = self.resolve_agent(agent_slug).await?;
        if agent.status != AgentStatus::Active.as_str() {
            return Err(ChatError::AgentInactive(agent_slug.to_string()));
        }

        if !self
            .rentals
            .has_active(&request.user_wallet, agent_slug)
            .await?
        {
            return Err(ChatError::RentalExpired {
                user_wallet: request.user_wallet.clone(),
                agent_slug: agent_slug.to_string(),
            });
        }

        let user_message = self
            .insert_message(&request.user_wallet, agent.id, content, false, request.is_markdown)
            .await?;

        let started = Instant::now();
        let result = self.router.generate(agent_slug, content).await;
        let duration_ms = started.elapsed().as_millis() as i64;

        if let Some(tool) = tool_for_slug(agent_slug) {
            let entry = NewUsageLog {
                tool: tool.to_string(),
                user_wallet: Some(request.user_wallet.clone()),
                params: serde_json::json!({
                    "agent_slug": agent_slug,
                    "prompt": content,
                    "is_markdown": request.is_markdown,
                }),
                duration_ms,
                success: result.is_ok(),
                error_code: result
                    .as_ref()
                    .err()
                    .map(|e| provider_error_code(e).to_string()),
            };

            if let Err(e) = self.usage.record(entry).await {
                warn!("Usage log write failed: {e}");
            }
        }

        let reply = result?;

        let bot_message = self
            .insert_message(
                &request.user_wallet,
                agent.id,
                &reply.content,
                true,
                reply.markdown || request.is_markdown,
            )
            .await?;

        Ok(SendMessageResponse {
            user_message,
            bot_message,
        })
    }

    /// Conversation history for a (wallet, agent) pair, oldest first
    pub async fn history(
        &self,
        agent_slug: &str,
        user_wallet: &str,
    ) -> Result<Vec<ChatMessage>, ChatError> {
        let agent = self.resolve_agent(agent_slug).await?;

        let messages = sqlx::query_as(
            r#"
            SELECT * FROM chat_messages
            WHERE user_wallet = $1 AND agent_id = $2
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_wallet)
        .bind(agent.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    /// Wipe the wallet's entire conversation history
    pub async fn clear(&self, user_wallet: &str) -> Result<u64, ChatError> {
        let result = sqlx::query("DELETE FROM chat_messages WHERE user_wallet = $1")
            .bind(user_wallet)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn resolve_agent(&self, agent_slug: &str) -> Result<Agent, ChatError> {
        let agent: Option<Agent> = sqlx::query_as("SELECT * FROM agents WHERE slug = $1")
            .bind(agent_slug)
            .fetch_optional(&self.pool)
            .await?;

        agent.ok_or_else(|| ChatError::AgentNotFound(agent_slug.to_string()))
    }

    async fn insert_message(
        &self,
        user_wallet: &str,
        agent_id: Uuid,
        content: &str,
        is_bot: bool,
        is_markdown: bool,
    ) -> Result<ChatMessage, ChatError> {
        let message = sqlx::query_as(
            r#"
            INSERT INTO chat_messages
                (id, user_wallet, agent_id, content, is_bot, is_markdown, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_wallet)
        .bind(agent_id)
        .bind(content)
        .bind(is_bot)
        .bind(is_markdown)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }
}
