//! Discussion handlers

use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{CreateDiscussionRequest, CreateReplyRequest};
use crate::services::discussions::DiscussionError;
use crate::services::DiscussionService;
use crate::AppState;

use super::ApiResponse;

/// GET /v1/discussions
pub async fn list_discussions(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let discussions = DiscussionService::new(state.db.clone())
        .list()
        .await
        .map_err(map_discussion_error)?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(discussions)))
}

/// POST /v1/discussions
pub async fn create_discussion(
    state: web::Data<AppState>,
    body: web::Json<CreateDiscussionRequest>,
) -> Result<HttpResponse, AppError> {
    let discussion = DiscussionService::new(state.db.clone())
        .create(body.into_inner())
        .await
        .map_err(map_discussion_error)?;

    Ok(HttpResponse::Created().json(ApiResponse::new(discussion)))
}

/// GET /v1/discussions/{id}/replies
pub async fn list_replies(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let replies = DiscussionService::new(state.db.clone())
        .list_replies(path.into_inner())
        .await
        .map_err(map_discussion_error)?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(replies)))
}

/// POST /v1/discussions/{id}/replies
pub async fn add_reply(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<CreateReplyRequest>,
) -> Result<HttpResponse, AppError> {
    let reply = DiscussionService::new(state.db.clone())
        .add_reply(path.into_inner(), body.into_inner())
        .await
        .map_err(map_discussion_error)?;

    Ok(HttpResponse::Created().json(ApiResponse::new(reply)))
}

fn map_discussion_error(e: DiscussionError) -> AppError {
    match e {
        DiscussionError::NotFound(id) => {
            AppError::NotFound(format!("Discussion not found: {id}"))
        }
        DiscussionError::Invalid(msg) => AppError::Validation(msg),
        DiscussionError::Database(e) => AppError::Database(e),
    }
}

/// Configure discussion routes
pub fn configure_discussion_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/discussions")
            .route("", web::get().to(list_discussions))
            .route("", web::post().to(create_discussion))
            .route("/{id}/replies", web::get().to(list_replies))
            .route("/{id}/replies", web::post().to(add_reply)),
    );
}
