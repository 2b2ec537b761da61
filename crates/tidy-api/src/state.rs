//! Application state.

use std::sync::Arc;

use sqlx::PgPool;

use tidy_annotate::VideoIntelClient;
use tidy_pipeline::{TrainingCorpus, VideoPipeline};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub pool: PgPool,
    pub pipeline: VideoPipeline,
    pub corpus: TrainingCorpus,
}

impl AppState {
    /// Create new application state: connect to Postgres, run migrations,
    /// and wire the annotation client into the pipeline.
    pub async fn new(config: ApiConfig) -> anyhow::Result<Self> {
        crate::error::init_error_rendering(config.is_production());

        let pool =
            tidy_store::connect(&config.database_url, config.database_max_connections).await?;
        tidy_store::run_migrations(&pool).await?;

        let annotator = Arc::new(VideoIntelClient::from_env()?);
        let pipeline = VideoPipeline::new(pool.clone(), annotator);
        let corpus = TrainingCorpus::new(pool.clone());

        Ok(Self {
            config,
            pool,
            pipeline,
            corpus,
        })
    }
}
