//! Repository for the `training_videos` table (the anonymized corpus).

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use tidy_models::{MediaId, TrainingVideoRecord};

use crate::error::StoreResult;

/// Column list for `training_videos` queries.
const COLUMNS: &str = "\
    source_media_id, video_url, room_type, action_types, object_labels, \
    technique_tags, duration_seconds, quality_score, is_featured";

/// Provides operations on the training corpus.
pub struct TrainingRepo;

impl TrainingRepo {
    /// Upsert a corpus entry keyed by source media id.
    ///
    /// Re-approval refreshes the AI-derived fields but preserves curator
    /// edits to `technique_tags` and `is_featured`.
    pub async fn upsert(pool: &PgPool, record: &TrainingVideoRecord) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO training_videos ( \
                 source_media_id, video_url, room_type, action_types, object_labels, \
                 technique_tags, duration_seconds, quality_score, is_featured \
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT (source_media_id) DO UPDATE SET \
                 room_type = EXCLUDED.room_type, \
                 action_types = EXCLUDED.action_types, \
                 object_labels = EXCLUDED.object_labels, \
                 quality_score = EXCLUDED.quality_score, \
                 updated_at = NOW()",
        )
        .bind(record.source_media_id.as_str())
        .bind(&record.video_url)
        .bind(&record.room_type)
        .bind(&record.action_types)
        .bind(&record.object_labels)
        .bind(&record.technique_tags)
        .bind(record.duration_seconds)
        .bind(record.quality_score)
        .bind(record.is_featured)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Delete the corpus entry for a source media id, if any.
    ///
    /// Idempotent: deleting an absent entry is not an error.
    pub async fn delete(pool: &PgPool, media_id: &MediaId) -> StoreResult<()> {
        sqlx::query("DELETE FROM training_videos WHERE source_media_id = $1")
            .bind(media_id.as_str())
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Fetch a corpus entry by source media id.
    pub async fn get(
        pool: &PgPool,
        media_id: &MediaId,
    ) -> StoreResult<Option<TrainingVideoRecord>> {
        let query = format!("SELECT {COLUMNS} FROM training_videos WHERE source_media_id = $1");
        let row = sqlx::query(&query)
            .bind(media_id.as_str())
            .fetch_optional(pool)
            .await?;
        row.map(|r| training_from_row(&r)).transpose()
    }
}

fn training_from_row(row: &PgRow) -> StoreResult<TrainingVideoRecord> {
    let source_media_id: String = row.try_get("source_media_id")?;
    Ok(TrainingVideoRecord {
        source_media_id: MediaId::from_string(source_media_id),
        video_url: row.try_get("video_url")?,
        room_type: row.try_get("room_type")?,
        action_types: row.try_get("action_types")?,
        object_labels: row.try_get("object_labels")?,
        technique_tags: row.try_get("technique_tags")?,
        duration_seconds: row.try_get("duration_seconds")?,
        quality_score: row.try_get("quality_score")?,
        is_featured: row.try_get("is_featured")?,
    })
}
