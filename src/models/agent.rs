use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Catalog entity for a rentable AI agent
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Agent {
    pub id: Uuid,
    pub name: String,
    /// URL-safe derivative of the name, unique across the catalog
    pub slug: String,
    pub description: String,
    pub category: String,
    pub creator: String,
    /// USD per hour; `None` means the platform default rate applies
    pub price: Option<f64>,
    /// Mean review rating, recomputed on every review
    pub rating: f64,
    /// Number of rentals taken out against this agent
    pub deployments: i32,
    pub image_url: Option<String>,
    /// Capability tags, context length, response speed
    pub technical_specs: serde_json::Value,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Agent visibility state; inactive agents are hidden and cannot be rented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Active,
    Inactive,
}

impl AgentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            _ => None,
        }
    }
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Request payload for listing a new agent
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAgentRequest {
    pub name: String,
    pub description: String,
    pub category: String,
    pub creator: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub technical_specs: Option<serde_json::Value>,
}

/// Partial update for an existing agent; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAgentRequest {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub technical_specs: Option<serde_json::Value>,
    #[serde(default)]
    pub status: Option<String>,
}
