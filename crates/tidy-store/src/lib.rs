//! Postgres persistence for the Tidy pipeline.
//!
//! Three repositories over one pool:
//! - [`MediaRepo`] — per-clip records with partial-field updates
//! - [`QueueRepo`] — the durable claim queue (`FOR UPDATE SKIP LOCKED`)
//! - [`TrainingRepo`] — the anonymized training corpus
//!
//! All mutations are single-row upserts/updates keyed by media id, so lock
//! scope stays row-level.

pub mod error;
pub mod media_repo;
pub mod queue_repo;
pub mod training_repo;

pub use error::{StoreError, StoreResult};
pub use media_repo::{AiCompletion, MediaRepo};
pub use queue_repo::QueueRepo;
pub use training_repo::TrainingRepo;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

/// Connect to Postgres with sensible pool defaults.
pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Run embedded migrations.
pub async fn run_migrations(pool: &PgPool) -> StoreResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
