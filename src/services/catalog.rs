//! Agent Catalog Service
//!
//! Create/list/update for the browsable agent catalog. Agents are never
//! hard-deleted through public flows; moderation flips `status` instead.

use chrono::Utc;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Agent, AgentStatus, CreateAgentRequest, UpdateAgentRequest};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Agent slug already exists: {0}")]
    SlugExists(String),

    #[error("Invalid agent name: {0}")]
    InvalidName(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Agent not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Derive the URL-safe slug: lowercase, alphanumeric runs preserved,
/// everything else collapsed to single hyphens, no leading/trailing hyphen
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_hyphen = true; // suppress a leading hyphen

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    slug
}

#[derive(Debug, Clone)]
pub struct AgentCatalogService {
    pool: PgPool,
}

/// Filters for the public catalog listing
#[derive(Debug, Clone, Default)]
pub struct AgentFilter {
    pub category: Option<String>,
    pub status: Option<String>,
}

impl AgentCatalogService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List a new agent. The slug is derived from the name and must be
    /// unique; rating and deployments start at zero.
    pub async fn create(&self, request: CreateAgentRequest) -> Result<Agent, CatalogError> {
        if request.name.trim().is_empty() || request.name.len() > 128 {
            return Err(CatalogError::InvalidName(
                "Agent name must be 1-128 characters".to_string(),
            ));
        }

        let slug = slugify(&request.name);
        if slug.is_empty() {
            return Err(CatalogError::InvalidName(
                "Agent name must contain at least one alphanumeric character".to_string(),
            ));
        }

        let now = Utc::now();
        let specs = request
            .technical_specs
            .unwrap_or_else(|| serde_json::json!({}));

        let mut tx = self.pool.begin().await?;

        let existing: Option<Uuid> = sqlx::query_scalar("SELECT id FROM agents WHERE slug = $1")
            .bind(&slug)
            .fetch_optional(&mut *tx)
            .await?;

        if existing.is_some() {
            return Err(CatalogError::SlugExists(slug));
        }

        let agent: Agent = sqlx::query_as(
            r#"
            INSERT INTO agents
                (id, name, slug, description, category, creator, price, rating,
                 deployments, image_url, technical_specs, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 0, 0, $8, $9, $10, $11, $11)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.name)
        .bind(&slug)
        .bind(&request.description)
        .bind(&request.category)
        .bind(&request.creator)
        .bind(request.price)
        .bind(&request.image_url)
        .bind(&specs)
        .bind(AgentStatus::Active.as_str())
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(agent)
    }

    /// Catalog listing, newest first
    pub async fn list(&self, filter: AgentFilter) -> Result<Vec<Agent>, CatalogError> {
        let agents = sqlx::query_as(
            r#"
            SELECT * FROM agents
            WHERE ($1::TEXT IS NULL OR category = $1)
              AND ($2::TEXT IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(filter.category)
        .bind(filter.status)
        .fetch_all(&self.pool)
        .await?;

        Ok(agents)
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Agent>, CatalogError> {
        let agent = sqlx::query_as("SELECT * FROM agents WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        Ok(agent)
    }

    /// Partial update; absent fields are left unchanged
    pub async fn update(
        &self,
        slug: &str,
        request: UpdateAgentRequest,
    ) -> Result<Agent, CatalogError> {
        if let Some(status) = &request.status {
            if AgentStatus::parse(status).is_none() {
                return Err(CatalogError::InvalidStatus(status.clone()));
            }
        }

        let agent: Option<Agent> = sqlx::query_as(
            r#"
            UPDATE agents SET
                description = COALESCE($2, description),
                category = COALESCE($3, category),
                price = COALESCE($4, price),
                image_url = COALESCE($5, image_url),
                technical_specs = COALESCE($6, technical_specs),
                status = COALESCE($7, status),
                updated_at = $8
            WHERE slug = $1
            RETURNING *
            "#,
        )
        .bind(slug)
        .bind(request.description)
        .bind(request.category)
        .bind(request.price)
        .bind(request.image_url)
        .bind(request.technical_specs)
        .bind(request.status)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        agent.ok_or_else(|| CatalogError::NotFound(slug.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn slug_collapses_punctuation_runs() {
        assert_eq!(slugify("Gemini 2.0 Flash"), "gemini-2-0-flash");
        assert_eq!(slugify("DeepSeek V3 (FW)"), "deepseek-v3-fw");
        assert_eq!(slugify("  Grok-2!  "), "grok-2");
    }

    #[test]
    fn slug_of_pure_punctuation_is_empty() {
        assert_eq!(slugify("!!! ???"), "");
    }

    proptest! {
        #[test]
        fn slug_is_url_safe(name in ".{0,64}") {
            let slug = slugify(&name);
            prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            prop_assert!(!slug.starts_with('-'));
            prop_assert!(!slug.ends_with('-'));
            prop_assert!(!slug.contains("--"));
        }

        #[test]
        fn slug_is_idempotent(name in "[a-zA-Z0-9 .]{1,64}") {
            let once = slugify(&name);
            prop_assert_eq!(slugify(&once), once);
        }
    }
}
