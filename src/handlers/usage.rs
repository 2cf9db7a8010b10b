//! Usage analytics handlers

use actix_web::{web, HttpResponse};
use chrono::{Duration, NaiveDate};
use serde::Deserialize;

use crate::error::AppError;
use crate::services::usage::UsageError;
use crate::services::UsageLogService;
use crate::AppState;

use super::ApiResponse;

#[derive(Debug, Deserialize)]
pub struct UsageQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// GET /v1/tools/{tool}/usage?from=&to=
///
/// Per-day invocation counts for one provider route. Defaults to the
/// trailing 30 days.
pub async fn get_tool_usage(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<UsageQuery>,
) -> Result<HttpResponse, AppError> {
    let tool = path.into_inner();

    let to = query
        .to
        .unwrap_or_else(|| state.clock.now().date_naive());
    let from = query.from.unwrap_or_else(|| to - Duration::days(30));

    let usage = UsageLogService::new(state.db.clone())
        .daily_summary(&tool, from, to)
        .await
        .map_err(map_usage_error)?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(usage)))
}

pub(crate) fn map_usage_error(e: UsageError) -> AppError {
    match e {
        UsageError::InvalidRange(msg) => AppError::Validation(msg),
        UsageError::Database(e) => AppError::Database(e),
    }
}

/// Configure usage routes
pub fn configure_usage_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/tools").route("/{tool}/usage", web::get().to(get_tool_usage)));
}
