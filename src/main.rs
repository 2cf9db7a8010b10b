use std::time::Duration;

use actix_web::{middleware, web, App, HttpResponse, HttpServer};
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dgpu_market::services::{RatingJob, RatingJobConfig};
use dgpu_market::{handlers, AppState, Config};

/// Health check endpoint
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "dgpu-market"
    }))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dgpu_market=debug,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().expect("Failed to load configuration");

    info!("Starting dGPU market server on {}:{}", config.host, config.port);

    // Create database connection pool
    let db_pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .expect("Failed to create database pool");

    info!("Database connection pool established");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run database migrations");

    info!("Database migrations completed");

    // Start the rating aggregation background job
    let rating_job = RatingJob::new(
        db_pool.clone(),
        RatingJobConfig {
            interval: Duration::from_secs(config.rating_job_interval_secs),
            enabled: config.rating_job_enabled,
        },
    );
    let _rating_shutdown = rating_job.start();
    info!("Rating aggregation job started");

    let server_addr = format!("{}:{}", config.host, config.port);

    let app_state = web::Data::new(AppState::new(db_pool, config));

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .route("/health", web::get().to(health_check))
            .service(
                web::scope("/v1")
                    .configure(handlers::configure_agent_routes)
                    .configure(handlers::configure_pricing_routes)
                    .configure(handlers::configure_rental_routes)
                    .configure(handlers::configure_chat_routes)
                    .configure(handlers::configure_discussion_routes)
                    .configure(handlers::configure_usage_routes)
                    .configure(handlers::configure_admin_routes),
            )
    })
    .bind(&server_addr)?
    .run()
    .await
}
