//! Admin handlers
//!
//! Dashboard statistics, paginated agent management, moderation, and
//! recent usage logs.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::services::admin::AdminError;
use crate::services::{AdminService, PaginationParams, UsageLogService};
use crate::AppState;

use super::ApiResponse;

/// GET /v1/admin/stats
pub async fn get_stats(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let stats = AdminService::new(state.db.clone())
        .platform_stats()
        .await
        .map_err(map_admin_error)?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(stats)))
}

/// GET /v1/admin/agents?page=&per_page=&search=
pub async fn list_agents(
    state: web::Data<AppState>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse, AppError> {
    let page = AdminService::new(state.db.clone())
        .list_agents(query.into_inner())
        .await
        .map_err(map_admin_error)?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(page)))
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: String,
}

/// POST /v1/admin/agents/{id}/status
pub async fn set_agent_status(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<SetStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let agent = AdminService::new(state.db.clone())
        .set_agent_status(path.into_inner(), &body.status)
        .await
        .map_err(map_admin_error)?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(agent)))
}

#[derive(Debug, Deserialize)]
pub struct RecentUsageQuery {
    pub limit: Option<i64>,
}

/// GET /v1/admin/usage?limit=
pub async fn recent_usage(
    state: web::Data<AppState>,
    query: web::Query<RecentUsageQuery>,
) -> Result<HttpResponse, AppError> {
    let logs = UsageLogService::new(state.db.clone())
        .recent(query.limit.unwrap_or(50))
        .await
        .map_err(super::usage::map_usage_error)?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(logs)))
}

fn map_admin_error(e: AdminError) -> AppError {
    match e {
        AdminError::AgentNotFound(id) => AppError::NotFound(format!("Agent not found: {id}")),
        AdminError::InvalidStatus(status) => {
            AppError::Validation(format!("Invalid status: {status}"))
        }
        AdminError::Database(e) => AppError::Database(e),
    }
}

/// Configure admin routes
pub fn configure_admin_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/stats", web::get().to(get_stats))
            .route("/agents", web::get().to(list_agents))
            .route("/agents/{id}/status", web::post().to(set_agent_status))
            .route("/usage", web::get().to(recent_usage)),
    );
}
