//! Discussion Service
//!
//! Community threads and replies. Append-only apart from the cascade on
//! thread deletion, which only moderation tooling would ever trigger.

use chrono::Utc;
use sqlx::{PgPool, Row};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    CreateDiscussionRequest, CreateReplyRequest, Discussion, DiscussionReply, DiscussionSummary,
};

const MAX_TITLE_LENGTH: usize = 200;

#[derive(Debug, Error)]
pub enum DiscussionError {
    #[error("Discussion not found: {0}")]
    NotFound(Uuid),

    #[error("Invalid discussion: {0}")]
    Invalid(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
pub struct DiscussionService {
    pool: PgPool,
}

impl DiscussionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        request: CreateDiscussionRequest,
    ) -> Result<Discussion, DiscussionError> {
        if request.title.trim().is_empty() || request.title.len() > MAX_TITLE_LENGTH {
            return Err(DiscussionError::Invalid(format!(
                "Title must be 1-{} characters",
                MAX_TITLE_LENGTH
            )));
        }

        if request.body.trim().is_empty() {
            return Err(DiscussionError::Invalid("Body must not be empty".to_string()));
        }

        let discussion = sqlx::query_as(
            r#"
            INSERT INTO discussions (id, author_wallet, title, body, category, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.author_wallet)
        .bind(&request.title)
        .bind(&request.body)
        .bind(&request.category)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(discussion)
    }

    /// Threads, newest first, with their reply counts
    pub async fn list(&self) -> Result<Vec<DiscussionSummary>, DiscussionError> {
        let rows = sqlx::query(
            r#"
            SELECT d.id, d.author_wallet, d.title, d.body, d.category, d.created_at,
                   COUNT(r.id) AS reply_count
            FROM discussions d
            LEFT JOIN discussion_replies r ON r.discussion_id = d.id
            GROUP BY d.id
            ORDER BY d.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let summaries = rows
            .into_iter()
            .map(|row| DiscussionSummary {
                id: row.get("id"),
                author_wallet: row.get("author_wallet"),
                title: row.get("title"),
                body: row.get("body"),
                category: row.get("category"),
                created_at: row.get("created_at"),
                reply_count: row.get("reply_count"),
            })
            .collect();

        Ok(summaries)
    }

    pub async fn add_reply(
        &self,
        discussion_id: Uuid,
        request: CreateReplyRequest,
    ) -> Result<DiscussionReply, DiscussionError> {
        if request.body.trim().is_empty() {
            return Err(DiscussionError::Invalid("Reply must not be empty".to_string()));
        }

        let exists: Option<Uuid> = sqlx::query_scalar("SELECT id FROM discussions WHERE id = $1")
            .bind(discussion_id)
            .fetch_optional(&self.pool)
            .await?;

        if exists.is_none() {
            return Err(DiscussionError::NotFound(discussion_id));
        }

        let reply = sqlx::query_as(
            r#"
            INSERT INTO discussion_replies (id, discussion_id, author_wallet, body, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(discussion_id)
        .bind(&request.author_wallet)
        .bind(&request.body)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(reply)
    }

    /// Replies within a thread, oldest first
    pub async fn list_replies(
        &self,
        discussion_id: Uuid,
    ) -> Result<Vec<DiscussionReply>, DiscussionError> {
        let exists: Option<Uuid> = sqlx::query_scalar("SELECT id FROM discussions WHERE id = $1")
            .bind(discussion_id)
            .fetch_optional(&self.pool)
            .await?;

        if exists.is_none() {
            return Err(DiscussionError::NotFound(discussion_id));
        }

        let replies = sqlx::query_as(
            "SELECT * FROM discussion_replies WHERE discussion_id = $1 ORDER BY created_at ASC",
        )
        .bind(discussion_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(replies)
    }
}
