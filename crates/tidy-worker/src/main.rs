//! Video processing worker binary.
//!
//! Polls the processing queue on an interval, draining up to a batch of
//! claimable items per cycle. Multiple worker processes can run against the
//! same database; the queue's claim operation keeps them from colliding.

use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tidy_annotate::VideoIntelClient;
use tidy_pipeline::VideoPipeline;
use tidy_worker::WorkerConfig;

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("tidy=info".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting tidy-worker");

    // Load configuration
    let config = WorkerConfig::from_env();
    info!("Worker config: {:?}", config);

    // Connect to Postgres and prepare the schema
    let pool = match tidy_store::connect(&config.database_url, config.database_max_connections)
        .await
    {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = tidy_store::run_migrations(&pool).await {
        error!("Failed to run migrations: {}", e);
        std::process::exit(1);
    }

    // Create the annotation client and pipeline
    let annotator = match VideoIntelClient::from_env() {
        Ok(c) => Arc::new(c),
        Err(e) => {
            error!("Failed to create annotation client: {}", e);
            std::process::exit(1);
        }
    };
    let pipeline = VideoPipeline::new(pool, annotator);

    // Poll until shutdown
    let mut interval = tokio::time::interval(config.poll_interval);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                match pipeline.process_batch(config.batch_size).await {
                    Ok(outcome) if outcome.processed > 0 || outcome.failed > 0 => {
                        info!(
                            processed = outcome.processed,
                            failed = outcome.failed,
                            "polling cycle complete"
                        );
                    }
                    Ok(_) => {}
                    Err(e) => warn!("polling cycle failed: {}", e),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal");
                break;
            }
        }
    }

    info!("Worker shutdown complete");
}
