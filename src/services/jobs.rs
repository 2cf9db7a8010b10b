//! Background Jobs
//!
//! Periodic projection repair for the catalog's aggregate columns. The
//! per-write aggregation in the review and rental paths is authoritative;
//! this job re-derives ratings and deployment counts from the source rows
//! so any drift heals on the next run.

use sqlx::PgPool;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info};

/// Configuration for the rating aggregation job
#[derive(Debug, Clone)]
pub struct RatingJobConfig {
    /// Interval between aggregation runs (default: 5 minutes)
    pub interval: Duration,
    /// Whether the job is enabled
    pub enabled: bool,
}

impl Default for RatingJobConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5 * 60),
            enabled: true,
        }
    }
}

/// Background job runner for rating and deployment aggregation
pub struct RatingJob {
    pool: PgPool,
    config: RatingJobConfig,
}

impl RatingJob {
    pub fn new(pool: PgPool, config: RatingJobConfig) -> Self {
        Self { pool, config }
    }

    /// Start the aggregation job.
    ///
    /// Returns a shutdown sender that can be used to stop the job.
    pub fn start(self) -> watch::Sender<bool> {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        if !self.config.enabled {
            info!("Rating aggregation job is disabled");
            return shutdown_tx;
        }

        let pool = self.pool.clone();
        let interval = self.config.interval;

        tokio::spawn(async move {
            info!("Starting rating aggregation job with interval {:?}", interval);

            // Run immediately on startup
            if let Err(e) = run_rating_aggregation(&pool).await {
                error!("Initial rating aggregation failed: {}", e);
            }

            let mut interval_timer = tokio::time::interval(interval);
            interval_timer.tick().await; // Skip the first immediate tick

            loop {
                tokio::select! {
                    _ = interval_timer.tick() => {
                        if let Err(e) = run_rating_aggregation(&pool).await {
                            error!("Rating aggregation failed: {}", e);
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            info!("Rating aggregation job shutting down");
                            break;
                        }
                    }
                }
            }
        });

        shutdown_tx
    }
}

/// Run a single aggregation pass (also used for manual triggering and
/// tests). Returns the number of agent rows touched.
pub async fn run_rating_aggregation(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let ratings = sqlx::query(
        r#"
        UPDATE agents a
        SET rating = COALESCE(
            (SELECT CAST(AVG(r.rating) AS DOUBLE PRECISION)
             FROM agent_reviews r WHERE r.agent_id = a.id),
            0
        )
        "#,
    )
    .execute(pool)
    .await?;

    let deployments = sqlx::query(
        r#"
        UPDATE agents a
        SET deployments = (
            SELECT CAST(COUNT(*) AS INTEGER)
            FROM rentals rn WHERE rn.agent_slug = a.slug
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(ratings.rows_affected() + deployments.rows_affected())
}
