//! Curation invariants against a live Postgres instance.
//!
//! Run with `DATABASE_URL` pointing at a scratch database:
//! `cargo test -p tidy-pipeline -- --ignored --test-threads=1`

use tidy_models::{AiStatus, MediaId, MediaRecord, TrainingStatus, VideoAnnotations};
use tidy_pipeline::{derive_completion, TrainingCorpus};
use tidy_store::{MediaRepo, TrainingRepo};

async fn test_pool() -> sqlx::PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = tidy_store::connect(&url, 5).await.expect("connect");
    tidy_store::run_migrations(&pool).await.expect("migrate");
    pool
}

async fn seed_pending(pool: &sqlx::PgPool) -> MediaId {
    let record = MediaRecord::new(MediaId::new(), "gs://bucket/clip.mp4");
    MediaRepo::insert(pool, &record).await.expect("insert");
    record.media_id
}

async fn seed_completed(pool: &sqlx::PgPool) -> MediaId {
    let media_id = seed_pending(pool).await;
    let completion = derive_completion(VideoAnnotations::empty());
    MediaRepo::save_completion(pool, &media_id, &completion)
        .await
        .expect("save completion");
    media_id
}

#[tokio::test]
#[ignore = "requires a postgres instance"]
async fn approve_requires_completed_status_and_mutates_nothing_otherwise() {
    let pool = test_pool().await;
    let corpus = TrainingCorpus::new(pool.clone());

    let media_id = seed_pending(&pool).await;
    let err = corpus.approve(&media_id).await.unwrap_err();
    assert!(err.to_string().contains("must be processed before approval"));

    let record = MediaRepo::get(&pool, &media_id).await.unwrap().unwrap();
    assert_eq!(record.ai_status, AiStatus::Pending);
    assert_eq!(record.training_status, None);
    assert!(TrainingRepo::get(&pool, &media_id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires a postgres instance"]
async fn approve_then_reject_leaves_no_corpus_entry() {
    let pool = test_pool().await;
    let corpus = TrainingCorpus::new(pool.clone());

    let media_id = seed_completed(&pool).await;

    corpus.approve(&media_id).await.unwrap();
    let record = MediaRepo::get(&pool, &media_id).await.unwrap().unwrap();
    assert_eq!(record.training_status, Some(TrainingStatus::Approved));
    assert!(record.training_approved_at.is_some());
    assert!(TrainingRepo::get(&pool, &media_id).await.unwrap().is_some());

    corpus.reject(&media_id).await.unwrap();
    let record = MediaRepo::get(&pool, &media_id).await.unwrap().unwrap();
    assert_eq!(record.training_status, Some(TrainingStatus::Rejected));
    assert!(TrainingRepo::get(&pool, &media_id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires a postgres instance"]
async fn reject_unknown_media_is_an_error() {
    let pool = test_pool().await;
    let corpus = TrainingCorpus::new(pool.clone());

    let media_id = MediaId::new();
    let err = corpus.reject(&media_id).await.unwrap_err();
    assert!(err.to_string().contains("not found"));

    assert!(MediaRepo::get(&pool, &media_id).await.unwrap().is_none());
    assert!(TrainingRepo::get(&pool, &media_id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires a postgres instance"]
async fn reject_is_idempotent() {
    let pool = test_pool().await;
    let corpus = TrainingCorpus::new(pool.clone());

    let media_id = seed_completed(&pool).await;

    corpus.reject(&media_id).await.unwrap();
    corpus.reject(&media_id).await.unwrap();

    let record = MediaRepo::get(&pool, &media_id).await.unwrap().unwrap();
    assert_eq!(record.training_status, Some(TrainingStatus::Rejected));
    assert!(TrainingRepo::get(&pool, &media_id).await.unwrap().is_none());
}
