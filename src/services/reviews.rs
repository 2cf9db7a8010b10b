//! Review Service
//!
//! User reviews of agents. Submitting a review recomputes the agent's mean
//! rating inside the same transaction, so the aggregate can never drift
//! from the review rows it summarizes.

use chrono::Utc;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Review, SubmitReviewRequest};

/// Maximum length for a review comment
const MAX_COMMENT_LENGTH: usize = 2000;

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    #[error("Invalid rating: {0} (must be 1-5)")]
    InvalidRating(i32),

    #[error("Invalid comment: {0}")]
    InvalidComment(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
pub struct ReviewService {
    pool: PgPool,
}

impl ReviewService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn submit(
        &self,
        agent_slug: &str,
        request: SubmitReviewRequest,
    ) -> Result<Review, ReviewError> {
        if !(1..=5).contains(&request.rating) {
            return Err(ReviewError::InvalidRating(request.rating));
        }

        if request.comment.trim().is_empty() {
            return Err(ReviewError::InvalidComment(
                "Comment must not be empty".to_string(),
            ));
        }

        if request.comment.len() > MAX_COMMENT_LENGTH {
            return Err(ReviewError::InvalidComment(format!(
                "Comment exceeds maximum length of {} characters",
                MAX_COMMENT_LENGTH
            )));
        }

        let agent_id: Option<Uuid> = sqlx::query_scalar("SELECT id FROM agents WHERE slug = $1")
            .bind(agent_slug)
            .fetch_optional(&self.pool)
            .await?;

        let agent_id = agent_id.ok_or_else(|| ReviewError::AgentNotFound(agent_slug.to_string()))?;

        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        let review: Review = sqlx::query_as(
            r#"
            INSERT INTO agent_reviews (id, agent_id, user_wallet, rating, comment, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(agent_id)
        .bind(&request.user_wallet)
        .bind(request.rating)
        .bind(&request.comment)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        // Recompute the aggregate from the rows themselves
        sqlx::query(
            r#"
            UPDATE agents
            SET rating = (
                    SELECT CAST(COALESCE(AVG(rating), 0) AS DOUBLE PRECISION)
                    FROM agent_reviews WHERE agent_id = $1
                ),
                updated_at = $2
            WHERE id = $1
            "#,
        )
        .bind(agent_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(review)
    }

    /// Reviews for an agent, newest first
    pub async fn list_for_agent(&self, agent_slug: &str) -> Result<Vec<Review>, ReviewError> {
        let agent_id: Option<Uuid> = sqlx::query_scalar("SELECT id FROM agents WHERE slug = $1")
            .bind(agent_slug)
            .fetch_optional(&self.pool)
            .await?;

        let agent_id = agent_id.ok_or_else(|| ReviewError::AgentNotFound(agent_slug.to_string()))?;

        let reviews = sqlx::query_as(
            "SELECT * FROM agent_reviews WHERE agent_id = $1 ORDER BY created_at DESC",
        )
        .bind(agent_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }
}
