//! Agent catalog handlers
//!
//! CRUD over the browsable catalog plus per-agent reviews.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::error::AppError;
use crate::models::{CreateAgentRequest, SubmitReviewRequest, UpdateAgentRequest};
use crate::services::catalog::CatalogError;
use crate::services::reviews::ReviewError;
use crate::services::{AgentCatalogService, AgentFilter, ReviewService};
use crate::AppState;

use super::ApiResponse;

#[derive(Debug, Deserialize)]
pub struct ListAgentsQuery {
    pub category: Option<String>,
    /// "active" (default), "inactive", or "all"
    pub status: Option<String>,
}

/// GET /v1/agents
///
/// Catalog listing, newest first. Inactive agents are hidden unless
/// explicitly requested.
pub async fn list_agents(
    state: web::Data<AppState>,
    query: web::Query<ListAgentsQuery>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    let status = match query.status.as_deref() {
        None => Some("active".to_string()),
        Some("all") => None,
        Some(other) => Some(other.to_string()),
    };

    let catalog = AgentCatalogService::new(state.db.clone());
    let agents = catalog
        .list(AgentFilter {
            category: query.category,
            status,
        })
        .await
        .map_err(map_catalog_error)?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(agents)))
}

/// POST /v1/agents
pub async fn create_agent(
    state: web::Data<AppState>,
    body: web::Json<CreateAgentRequest>,
) -> Result<HttpResponse, AppError> {
    let catalog = AgentCatalogService::new(state.db.clone());
    let agent = catalog
        .create(body.into_inner())
        .await
        .map_err(map_catalog_error)?;

    Ok(HttpResponse::Created().json(ApiResponse::new(agent)))
}

/// GET /v1/agents/{slug}
pub async fn get_agent(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let slug = path.into_inner();
    let catalog = AgentCatalogService::new(state.db.clone());

    let agent = catalog
        .get_by_slug(&slug)
        .await
        .map_err(map_catalog_error)?
        .ok_or_else(|| AppError::NotFound(format!("Agent not found: {slug}")))?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(agent)))
}

/// PATCH /v1/agents/{slug}
pub async fn update_agent(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<UpdateAgentRequest>,
) -> Result<HttpResponse, AppError> {
    let slug = path.into_inner();
    let catalog = AgentCatalogService::new(state.db.clone());

    let agent = catalog
        .update(&slug, body.into_inner())
        .await
        .map_err(map_catalog_error)?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(agent)))
}

/// GET /v1/agents/{slug}/reviews
pub async fn list_reviews(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let slug = path.into_inner();
    let reviews = ReviewService::new(state.db.clone());

    let items = reviews
        .list_for_agent(&slug)
        .await
        .map_err(map_review_error)?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(items)))
}

/// POST /v1/agents/{slug}/reviews
///
/// Submit a review; the agent's aggregate rating is recomputed in the
/// same transaction.
pub async fn submit_review(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<SubmitReviewRequest>,
) -> Result<HttpResponse, AppError> {
    let slug = path.into_inner();
    let reviews = ReviewService::new(state.db.clone());

    let review = reviews
        .submit(&slug, body.into_inner())
        .await
        .map_err(map_review_error)?;

    Ok(HttpResponse::Created().json(ApiResponse::new(review)))
}

fn map_catalog_error(e: CatalogError) -> AppError {
    match e {
        CatalogError::SlugExists(slug) => {
            AppError::Conflict(format!("Agent slug already exists: {slug}"))
        }
        CatalogError::InvalidName(msg) => AppError::Validation(msg),
        CatalogError::InvalidStatus(status) => {
            AppError::Validation(format!("Invalid status: {status}"))
        }
        CatalogError::NotFound(slug) => AppError::NotFound(format!("Agent not found: {slug}")),
        CatalogError::Database(e) => AppError::Database(e),
    }
}

fn map_review_error(e: ReviewError) -> AppError {
    match e {
        ReviewError::AgentNotFound(slug) => {
            AppError::NotFound(format!("Agent not found: {slug}"))
        }
        ReviewError::InvalidRating(rating) => {
            AppError::Validation(format!("Invalid rating: {rating} (must be 1-5)"))
        }
        ReviewError::InvalidComment(msg) => AppError::Validation(msg),
        ReviewError::Database(e) => AppError::Database(e),
    }
}

/// Configure agent catalog routes
pub fn configure_agent_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/agents")
            .route("", web::get().to(list_agents))
            .route("", web::post().to(create_agent))
            .route("/{slug}", web::get().to(get_agent))
            .route("/{slug}", web::patch().to(update_agent))
            .route("/{slug}/reviews", web::get().to(list_reviews))
            .route("/{slug}/reviews", web::post().to(submit_review)),
    );
}
