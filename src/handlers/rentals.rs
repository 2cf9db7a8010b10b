//! Rental handlers
//!
//! The purchase flow is the one cross-system sequence in the service:
//! quote the price, submit the token transfer, persist the rental window.
//! The record write is attempted only after a transfer signature exists,
//! so a stored rental always implies a submitted payment. The converse
//! does not hold: a write failure after payment surfaces as
//! RENTAL_NOT_RECORDED, distinct from PAYMENT_FAILED, and is not
//! auto-recovered.

use actix_web::{web, HttpResponse};
use tracing::{error, warn};

use crate::error::AppError;
use crate::models::{CreateRentalRequest, PurchaseResponse};
use crate::services::rental::RentalError;
use crate::services::transfer::{to_base_units, TransferRequest};
use crate::services::RentalService;
use crate::AppState;

use super::ApiResponse;

/// POST /v1/rentals
pub async fn create_rental(
    state: web::Data<AppState>,
    body: web::Json<CreateRentalRequest>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();

    if request.user_wallet.trim().is_empty() {
        return Err(AppError::Validation(
            "user_wallet must not be empty".to_string(),
        ));
    }

    if request.duration_hours < 1 {
        return Err(AppError::Validation(
            "duration_hours must be at least 1".to_string(),
        ));
    }

    let rentals = RentalService::new(state.db.clone(), state.clock.clone());

    // Fail before any money moves if the agent cannot be rented
    rentals
        .validate_rentable(&request.agent_slug)
        .await
        .map_err(map_rental_error)?;

    let quote = state
        .pricing
        .quote(&request.agent_slug, request.duration_hours)
        .await
        .map_err(super::pricing::map_pricing_error)?
        .ok_or_else(|| {
            AppError::PricingUnavailable(
                "no oracle price available, fresh or cached".to_string(),
            )
        })?;

    let transfer = TransferRequest {
        sender: request.user_wallet.clone(),
        mint: state.config.token_mint.clone(),
        recipient: state.config.treasury_wallet.clone(),
        amount_base_units: to_base_units(quote.token_amount, state.config.token_decimals),
    };

    let tx_signature = state
        .wallet
        .send_token_transfer(&transfer)
        .await
        .map_err(|e| {
            warn!("Token transfer failed for {}: {e}", request.user_wallet);
            AppError::PaymentFailed(e.to_string())
        })?;

    let rental = rentals
        .create(
            &request.user_wallet,
            &request.agent_slug,
            request.duration_hours,
            &tx_signature,
        )
        .await
        .map_err(map_rental_error)?;

    Ok(HttpResponse::Created().json(ApiResponse::new(PurchaseResponse { rental, quote })))
}

/// GET /v1/rentals/{wallet}/{slug}
///
/// Latest rental for the pair with its derived countdown. Clients re-poll
/// this; nothing about the timer is stored server-side.
pub async fn get_rental_status(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
    let (wallet, slug) = path.into_inner();
    let rentals = RentalService::new(state.db.clone(), state.clock.clone());

    let rental = rentals
        .latest_for(&wallet, &slug)
        .await
        .map_err(map_rental_error)?
        .ok_or_else(|| {
            AppError::NotFound(format!("No rental found for wallet {wallet} and agent {slug}"))
        })?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(rentals.status(rental))))
}

fn map_rental_error(e: RentalError) -> AppError {
    match e {
        RentalError::AgentNotFound(slug) => {
            AppError::NotFound(format!("Agent not found: {slug}"))
        }
        RentalError::AgentInactive(slug) => {
            AppError::Conflict(format!("Agent is not rentable: {slug}"))
        }
        RentalError::InvalidDuration(msg) => AppError::Validation(msg),
        RentalError::RecordFailed {
            tx_signature,
            source,
        } => {
            // Money moved and the rental did not: keep the signature loud
            // in the logs until someone reconciles it by hand
            error!(
                "Rental write failed after successful transfer {tx_signature}: {source}"
            );
            AppError::RentalNotRecorded {
                tx_signature,
                message: source.to_string(),
            }
        }
        RentalError::Database(e) => AppError::Database(e),
    }
}

/// Configure rental routes
pub fn configure_rental_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/rentals")
            .route("", web::post().to(create_rental))
            .route("/{wallet}/{slug}", web::get().to(get_rental_status)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    // A persistence failure after payment and a payment failure must
    // never collapse into the same error code: the first means money
    // moved, the second means it did not.
    #[test]
    fn record_failure_is_distinct_from_payment_failure() {
        let recorded = map_rental_error(RentalError::RecordFailed {
            tx_signature: "5SigAfterPayment".to_string(),
            source: sqlx::Error::PoolClosed,
        });
        assert!(matches!(
            recorded,
            AppError::RentalNotRecorded { ref tx_signature, .. } if tx_signature == "5SigAfterPayment"
        ));

        let not_found = map_rental_error(RentalError::AgentNotFound("x".to_string()));
        assert!(matches!(not_found, AppError::NotFound(_)));
    }
}
