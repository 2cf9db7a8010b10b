pub mod admin;
pub mod catalog;
pub mod chat;
pub mod clock;
pub mod discussions;
pub mod jobs;
pub mod oracle;
pub mod price_cache;
pub mod pricing;
pub mod providers;
pub mod rental;
pub mod reviews;
pub mod transfer;
pub mod usage;

pub use admin::{
    AdminError, AdminService, PaginatedResponse, PaginationParams, PlatformStats,
};
pub use catalog::{slugify, AgentCatalogService, AgentFilter, CatalogError};
pub use chat::{ChatError, ChatService};
pub use clock::{Clock, SystemClock};
pub use discussions::{DiscussionError, DiscussionService};
pub use jobs::{run_rating_aggregation, RatingJob, RatingJobConfig};
pub use oracle::PriceOracleClient;
pub use price_cache::{InMemoryPriceCache, PgPriceCache, PriceCache};
pub use pricing::{PricingError, RentalPricingService};
pub use providers::{
    tool_for_slug, ChatCompletionsClient, GeminiClient, LlmRouter, ProviderError, ProviderReply,
    StabilityClient,
};
pub use rental::{
    remaining_seconds, rental_end_time, RentalError, RentalService,
};
pub use reviews::{ReviewError, ReviewService};
pub use transfer::{
    to_base_units, RpcWalletClient, TransferError, TransferRequest, WalletClient,
};
pub use usage::{NewUsageLog, UsageError, UsageLogService};
