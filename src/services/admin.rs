//! Admin Service
//!
//! Platform statistics, paginated agent management, and moderation
//! (status flips). Agents are never hard-deleted; an inactive agent is
//! hidden from the catalog and cannot be rented.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Agent, AgentStatus};

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Agent not found: {0}")]
    AgentNotFound(Uuid),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Platform-wide totals for the admin dashboard
#[derive(Debug, Clone, Serialize)]
pub struct PlatformStats {
    pub total_agents: i64,
    pub active_agents: i64,
    pub total_rentals: i64,
    pub total_rental_hours: i64,
    pub distinct_renters: i64,
    pub total_messages: i64,
    pub total_reviews: i64,
    pub total_discussions: i64,
}

/// Pagination query parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationParams {
    /// Page number (1-indexed, defaults to 1)
    pub page: Option<i64>,
    /// Items per page (defaults to 20, max 100)
    pub per_page: Option<i64>,
    /// Search query matched against name and slug
    pub search: Option<String>,
}

impl PaginationParams {
    const DEFAULT_PER_PAGE: i64 = 20;
    const MAX_PER_PAGE: i64 = 100;

    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn per_page(&self) -> i64 {
        self.per_page
            .unwrap_or(Self::DEFAULT_PER_PAGE)
            .clamp(1, Self::MAX_PER_PAGE)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.per_page()
    }
}

/// One page of results plus the page arithmetic
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, total: i64, page: i64, per_page: i64) -> Self {
        let total_pages = if total == 0 {
            1
        } else {
            (total + per_page - 1) / per_page
        };

        Self {
            items,
            total,
            page,
            per_page,
            total_pages,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AdminService {
    pool: PgPool,
}

impl AdminService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn platform_stats(&self) -> Result<PlatformStats, AdminError> {
        let total_agents: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM agents")
            .fetch_one(&self.pool)
            .await?;

        let active_agents: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM agents WHERE status = 'active'")
                .fetch_one(&self.pool)
                .await?;

        let total_rentals: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rentals")
            .fetch_one(&self.pool)
            .await?;

        let total_rental_hours: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(duration_hours), 0) FROM rentals")
                .fetch_one(&self.pool)
                .await?;

        let distinct_renters: i64 =
            sqlx::query_scalar("SELECT COUNT(DISTINCT user_wallet) FROM rentals")
                .fetch_one(&self.pool)
                .await?;

        let total_messages: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chat_messages")
            .fetch_one(&self.pool)
            .await?;

        let total_reviews: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM agent_reviews")
            .fetch_one(&self.pool)
            .await?;

        let total_discussions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM discussions")
            .fetch_one(&self.pool)
            .await?;

        Ok(PlatformStats {
            total_agents,
            active_agents,
            total_rentals,
            total_rental_hours,
            distinct_renters,
            total_messages,
            total_reviews,
            total_discussions,
        })
    }

    /// Paginated catalog listing including inactive agents
    pub async fn list_agents(
        &self,
        params: PaginationParams,
    ) -> Result<PaginatedResponse<Agent>, AdminError> {
        let pattern = params.search.as_ref().map(|s| format!("%{s}%"));

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM agents
            WHERE ($1::TEXT IS NULL OR name ILIKE $1 OR slug ILIKE $1)
            "#,
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        let items = sqlx::query_as(
            r#"
            SELECT * FROM agents
            WHERE ($1::TEXT IS NULL OR name ILIKE $1 OR slug ILIKE $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&pattern)
        .bind(params.per_page())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(PaginatedResponse::new(
            items,
            total,
            params.page(),
            params.per_page(),
        ))
    }

    /// Moderation: flip an agent between active and inactive
    pub async fn set_agent_status(
        &self,
        agent_id: Uuid,
        status: &str,
    ) -> Result<Agent, AdminError> {
        let status = AgentStatus::parse(status)
            .ok_or_else(|| AdminError::InvalidStatus(status.to_string()))?;

        let agent: Option<Agent> = sqlx::query_as(
            "UPDATE agents SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(agent_id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;

        agent.ok_or(AdminError::AgentNotFound(agent_id))
    }
}
