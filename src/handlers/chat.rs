//! Chat handlers
//!
//! Send/read/clear for agent conversations. Sending is gated on an
//! unexpired rental; an expired rental soft-gates with RENTAL_EXPIRED and
//! the user re-rents to continue.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::error::AppError;
use crate::models::SendMessageRequest;
use crate::services::chat::ChatError;
use crate::services::providers::ProviderError;
use crate::services::rental::RentalError;
use crate::services::{ChatService, RentalService, UsageLogService};
use crate::AppState;

use super::ApiResponse;

#[derive(Debug, Deserialize)]
pub struct WalletQuery {
    pub wallet: String,
}

fn chat_service(state: &web::Data<AppState>) -> ChatService {
    ChatService::new(
        state.db.clone(),
        RentalService::new(state.db.clone(), state.clock.clone()),
        state.router.clone(),
        UsageLogService::new(state.db.clone()),
    )
}

/// POST /v1/chat/{slug}/messages
pub async fn send_message(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<SendMessageRequest>,
) -> Result<HttpResponse, AppError> {
    let slug = path.into_inner();

    let response = chat_service(&state)
        .send(&slug, body.into_inner())
        .await
        .map_err(map_chat_error)?;

    Ok(HttpResponse::Created().json(ApiResponse::new(response)))
}

/// GET /v1/chat/{slug}/messages?wallet=
pub async fn get_messages(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<WalletQuery>,
) -> Result<HttpResponse, AppError> {
    let slug = path.into_inner();

    let messages = chat_service(&state)
        .history(&slug, &query.wallet)
        .await
        .map_err(map_chat_error)?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(messages)))
}

/// DELETE /v1/chat/messages?wallet=
pub async fn clear_messages(
    state: web::Data<AppState>,
    query: web::Query<WalletQuery>,
) -> Result<HttpResponse, AppError> {
    let deleted = chat_service(&state)
        .clear(&query.wallet)
        .await
        .map_err(map_chat_error)?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(serde_json::json!({ "deleted": deleted }))))
}

fn map_chat_error(e: ChatError) -> AppError {
    match e {
        ChatError::AgentNotFound(slug) => {
            AppError::NotFound(format!("Agent not found: {slug}"))
        }
        ChatError::AgentInactive(slug) => {
            AppError::Conflict(format!("Agent is inactive: {slug}"))
        }
        ChatError::RentalExpired {
            user_wallet,
            agent_slug,
        } => AppError::RentalExpired(format!(
            "No active rental for agent {agent_slug} and wallet {user_wallet}"
        )),
        ChatError::EmptyMessage => {
            AppError::Validation("Message content must not be empty".to_string())
        }
        ChatError::Provider(ProviderError::UnknownRoute(slug)) => {
            AppError::Validation(format!("No provider route for agent slug: {slug}"))
        }
        ChatError::Provider(e) => AppError::Upstream(e.to_string()),
        ChatError::Rental(RentalError::Database(e)) => AppError::Database(e),
        ChatError::Rental(e) => AppError::Internal(e.to_string()),
        ChatError::Database(e) => AppError::Database(e),
    }
}

/// Configure chat routes
pub fn configure_chat_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/chat")
            // Static path must come before the parameterized one
            .route("/messages", web::delete().to(clear_messages))
            .route("/{slug}/messages", web::post().to(send_message))
            .route("/{slug}/messages", web::get().to(get_messages)),
    );
}
