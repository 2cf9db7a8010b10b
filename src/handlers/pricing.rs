//! Pricing handlers
//!
//! Quote endpoint for the rental purchase flow. A quote can be requested
//! for any slug; unlisted agents price at the platform default rate.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::error::AppError;
use crate::services::pricing::PricingError;
use crate::AppState;

use super::ApiResponse;

#[derive(Debug, Deserialize)]
pub struct QuoteQuery {
    /// Rental duration; defaults to one hour
    pub hours: Option<i32>,
}

/// GET /v1/pricing/{slug}/quote?hours=N
pub async fn get_quote(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<QuoteQuery>,
) -> Result<HttpResponse, AppError> {
    let slug = path.into_inner();
    let hours = query.hours.unwrap_or(1);

    if hours < 1 {
        return Err(AppError::Validation(
            "hours must be at least 1".to_string(),
        ));
    }

    let quote = state
        .pricing
        .quote(&slug, hours)
        .await
        .map_err(map_pricing_error)?
        .ok_or_else(|| {
            AppError::PricingUnavailable(
                "no oracle price available, fresh or cached".to_string(),
            )
        })?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(quote)))
}

pub(crate) fn map_pricing_error(e: PricingError) -> AppError {
    match e {
        PricingError::Database(e) => AppError::Database(e),
    }
}

/// Configure pricing routes
pub fn configure_pricing_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/pricing").route("/{slug}/quote", web::get().to(get_quote)));
}
