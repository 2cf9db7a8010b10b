use serde::Serialize;

pub mod admin;
pub mod agents;
pub mod chat;
pub mod discussions;
pub mod pricing;
pub mod rentals;
pub mod usage;

#[cfg(test)]
mod rentals_http_tests;

pub use admin::configure_admin_routes;
pub use agents::configure_agent_routes;
pub use chat::configure_chat_routes;
pub use discussions::configure_discussion_routes;
pub use pricing::configure_pricing_routes;
pub use rentals::configure_rental_routes;
pub use usage::configure_usage_routes;

/// Standard API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            meta: ResponseMeta {
                request_id: uuid::Uuid::new_v4().to_string(),
            },
        }
    }
}
