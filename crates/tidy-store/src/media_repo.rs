//! Repository for the `media_records` table.
//!
//! Every write is a targeted partial update: the pipeline touches only the
//! AI lifecycle fields, curation touches only the training fields, and
//! neither clobbers columns it does not own.

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use tidy_models::{AiStatus, MediaId, MediaRecord, TrainingStatus, VideoAnnotations};

use crate::error::{StoreError, StoreResult};

/// Column list for `media_records` queries.
const COLUMNS: &str = "\
    media_id, video_url, ai_status, ai_annotations, ai_error, \
    ai_processing_started, ai_processed_at, ai_failed_at, \
    ai_room_type, ai_action_types, ai_object_labels, \
    ai_quality_score, ai_duration, ai_raw_label_count, ai_filtered_label_count, \
    training_status, training_approved_at, training_rejected_at, created_at";

/// Everything the pipeline persists when annotation succeeds.
#[derive(Debug, Clone)]
pub struct AiCompletion {
    pub annotations: VideoAnnotations,
    pub room_type: Option<String>,
    pub action_types: Vec<String>,
    /// Filtered, deduplicated, capped object labels
    pub object_labels: Vec<String>,
    pub quality_score: f64,
    pub duration: Option<i64>,
    pub raw_label_count: i32,
    pub filtered_label_count: i32,
}

/// Provides operations on per-clip media records.
pub struct MediaRepo;

impl MediaRepo {
    /// Insert a fresh record (upload-time entry point; also used in tests).
    pub async fn insert(pool: &PgPool, record: &MediaRecord) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO media_records (media_id, video_url, ai_status, created_at) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(record.media_id.as_str())
        .bind(&record.video_url)
        .bind(record.ai_status.as_str())
        .bind(record.created_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Fetch a record by media id.
    pub async fn get(pool: &PgPool, media_id: &MediaId) -> StoreResult<Option<MediaRecord>> {
        let query = format!("SELECT {COLUMNS} FROM media_records WHERE media_id = $1");
        let row = sqlx::query(&query)
            .bind(media_id.as_str())
            .fetch_optional(pool)
            .await?;
        row.map(|r| media_from_row(&r)).transpose()
    }

    /// Mark a record as processing, clearing any prior error.
    pub async fn mark_processing(pool: &PgPool, media_id: &MediaId) -> StoreResult<()> {
        sqlx::query(
            "UPDATE media_records \
             SET ai_status = 'processing', ai_processing_started = NOW(), ai_error = NULL \
             WHERE media_id = $1",
        )
        .bind(media_id.as_str())
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Record a processing failure.
    pub async fn mark_failed(pool: &PgPool, media_id: &MediaId, error: &str) -> StoreResult<()> {
        sqlx::query(
            "UPDATE media_records \
             SET ai_status = 'failed', ai_error = $2, ai_failed_at = NOW() \
             WHERE media_id = $1",
        )
        .bind(media_id.as_str())
        .bind(error)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Persist a successful annotation run and open the curation window
    /// (`training_status = 'pending'`).
    pub async fn save_completion(
        pool: &PgPool,
        media_id: &MediaId,
        completion: &AiCompletion,
    ) -> StoreResult<()> {
        let annotations = serde_json::to_value(&completion.annotations)?;
        sqlx::query(
            "UPDATE media_records SET \
                 ai_status = 'completed', \
                 ai_annotations = $2, \
                 ai_processed_at = NOW(), \
                 ai_room_type = $3, \
                 ai_action_types = $4, \
                 ai_object_labels = $5, \
                 ai_quality_score = $6, \
                 ai_duration = $7, \
                 ai_raw_label_count = $8, \
                 ai_filtered_label_count = $9, \
                 training_status = 'pending' \
             WHERE media_id = $1",
        )
        .bind(media_id.as_str())
        .bind(annotations)
        .bind(&completion.room_type)
        .bind(&completion.action_types)
        .bind(&completion.object_labels)
        .bind(completion.quality_score)
        .bind(completion.duration)
        .bind(completion.raw_label_count)
        .bind(completion.filtered_label_count)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Set the curation decision, stamping the matching timestamp.
    pub async fn set_training_status(
        pool: &PgPool,
        media_id: &MediaId,
        status: TrainingStatus,
    ) -> StoreResult<()> {
        let query = match status {
            TrainingStatus::Approved => {
                "UPDATE media_records \
                 SET training_status = 'approved', training_approved_at = NOW() \
                 WHERE media_id = $1"
            }
            TrainingStatus::Rejected => {
                "UPDATE media_records \
                 SET training_status = 'rejected', training_rejected_at = NOW() \
                 WHERE media_id = $1"
            }
            TrainingStatus::Pending => {
                "UPDATE media_records SET training_status = 'pending' WHERE media_id = $1"
            }
        };
        sqlx::query(query)
            .bind(media_id.as_str())
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Curation counters over completed media: (pending, approved, rejected).
    ///
    /// Completed records whose `training_status` is missing count as pending.
    pub async fn training_counts(pool: &PgPool) -> StoreResult<(i64, i64, i64)> {
        let row = sqlx::query(
            "SELECT \
                 COUNT(*) FILTER (WHERE training_status IS NULL OR training_status = 'pending') AS pending, \
                 COUNT(*) FILTER (WHERE training_status = 'approved') AS approved, \
                 COUNT(*) FILTER (WHERE training_status = 'rejected') AS rejected \
             FROM media_records WHERE ai_status = 'completed'",
        )
        .fetch_one(pool)
        .await?;
        Ok((
            row.try_get("pending")?,
            row.try_get("approved")?,
            row.try_get("rejected")?,
        ))
    }
}

fn media_from_row(row: &PgRow) -> StoreResult<MediaRecord> {
    let ai_status: String = row.try_get("ai_status")?;
    let ai_status: AiStatus = ai_status.parse().map_err(StoreError::Decode)?;

    let training_status: Option<String> = row.try_get("training_status")?;
    let training_status = training_status
        .map(|s| s.parse::<TrainingStatus>())
        .transpose()
        .map_err(StoreError::Decode)?;

    let annotations: Option<serde_json::Value> = row.try_get("ai_annotations")?;
    let ai_annotations = annotations
        .map(serde_json::from_value::<VideoAnnotations>)
        .transpose()?;

    let media_id: String = row.try_get("media_id")?;

    Ok(MediaRecord {
        media_id: MediaId::from_string(media_id),
        video_url: row.try_get("video_url")?,
        ai_status,
        ai_annotations,
        ai_error: row.try_get("ai_error")?,
        ai_processing_started: row.try_get("ai_processing_started")?,
        ai_processed_at: row.try_get("ai_processed_at")?,
        ai_failed_at: row.try_get("ai_failed_at")?,
        ai_room_type: row.try_get("ai_room_type")?,
        ai_action_types: row.try_get("ai_action_types")?,
        ai_object_labels: row.try_get("ai_object_labels")?,
        ai_quality_score: row.try_get("ai_quality_score")?,
        ai_duration: row.try_get("ai_duration")?,
        ai_raw_label_count: row.try_get("ai_raw_label_count")?,
        ai_filtered_label_count: row.try_get("ai_filtered_label_count")?,
        training_status,
        training_approved_at: row.try_get("training_approved_at")?,
        training_rejected_at: row.try_get("training_rejected_at")?,
        created_at: row.try_get("created_at")?,
    })
}
