//! Repository for the `processing_queue` table.
//!
//! The claim operation is the pipeline's only synchronization point:
//! `FOR UPDATE SKIP LOCKED` guarantees exactly one worker wins a given row
//! while concurrent claimers skip past it instead of blocking.

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use tidy_models::{MediaId, QueueItem, QueueStatus};

use crate::error::{StoreError, StoreResult};

/// Column list for `processing_queue` queries.
const COLUMNS: &str = "\
    media_id, status, priority, attempts, max_attempts, last_error, \
    queued_at, started_at, completed_at";

/// Provides operations on the durable processing queue.
pub struct QueueRepo;

impl QueueRepo {
    /// Enqueue a media id, upserting on conflict.
    ///
    /// Re-enqueueing resets the row to `queued` with zero attempts and keeps
    /// the higher of the old and new priorities.
    pub async fn enqueue(pool: &PgPool, media_id: &MediaId, priority: i32) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO processing_queue (media_id, priority) \
             VALUES ($1, $2) \
             ON CONFLICT (media_id) DO UPDATE SET \
                 status = 'queued', \
                 priority = GREATEST(processing_queue.priority, $2), \
                 attempts = 0, \
                 last_error = NULL, \
                 queued_at = NOW()",
        )
        .bind(media_id.as_str())
        .bind(priority)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Atomically claim the next eligible item.
    ///
    /// Picks the highest-priority, oldest-queued row with attempts left,
    /// transitions it to `processing` and increments its attempt counter.
    /// Safe under concurrent callers: only one can win a given row.
    pub async fn claim_next(pool: &PgPool) -> StoreResult<Option<QueueItem>> {
        let query = format!(
            "UPDATE processing_queue \
             SET status = 'processing', started_at = NOW(), attempts = attempts + 1 \
             WHERE media_id = ( \
                 SELECT media_id FROM processing_queue \
                 WHERE status = 'queued' AND attempts < max_attempts \
                 ORDER BY priority DESC, queued_at ASC \
                 LIMIT 1 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query(&query).fetch_optional(pool).await?;
        row.map(|r| item_from_row(&r)).transpose()
    }

    /// Mark an item completed after a successful pipeline run.
    pub async fn mark_completed(pool: &PgPool, media_id: &MediaId) -> StoreResult<()> {
        sqlx::query(
            "UPDATE processing_queue \
             SET status = 'completed', completed_at = NOW() \
             WHERE media_id = $1",
        )
        .bind(media_id.as_str())
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Mark an item failed with its error message.
    ///
    /// No automatic requeue: failed items stay out of the pool until an
    /// explicit [`QueueRepo::retry_failed`].
    pub async fn mark_failed(pool: &PgPool, media_id: &MediaId, error: &str) -> StoreResult<()> {
        sqlx::query(
            "UPDATE processing_queue \
             SET status = 'failed', last_error = $2 \
             WHERE media_id = $1",
        )
        .bind(media_id.as_str())
        .bind(error)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Return every failed item to the pool with a clean slate.
    ///
    /// Returns the number of items reset.
    pub async fn retry_failed(pool: &PgPool) -> StoreResult<u64> {
        let result = sqlx::query(
            "UPDATE processing_queue \
             SET status = 'queued', attempts = 0, last_error = NULL, queued_at = NOW() \
             WHERE status = 'failed'",
        )
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Fetch one item by media id.
    pub async fn get(pool: &PgPool, media_id: &MediaId) -> StoreResult<Option<QueueItem>> {
        let query = format!("SELECT {COLUMNS} FROM processing_queue WHERE media_id = $1");
        let row = sqlx::query(&query)
            .bind(media_id.as_str())
            .fetch_optional(pool)
            .await?;
        row.map(|r| item_from_row(&r)).transpose()
    }

    /// Count items by status: (queued, processing, completed, failed).
    pub async fn counts(pool: &PgPool) -> StoreResult<(i64, i64, i64, i64)> {
        let rows = sqlx::query(
            "SELECT status, COUNT(*) AS count FROM processing_queue GROUP BY status",
        )
        .fetch_all(pool)
        .await?;

        let mut counts = (0, 0, 0, 0);
        for row in rows {
            let status: String = row.try_get("status")?;
            let count: i64 = row.try_get("count")?;
            match status.parse::<QueueStatus>().map_err(StoreError::Decode)? {
                QueueStatus::Queued => counts.0 = count,
                QueueStatus::Processing => counts.1 = count,
                QueueStatus::Completed => counts.2 = count,
                QueueStatus::Failed => counts.3 = count,
            }
        }
        Ok(counts)
    }
}

fn item_from_row(row: &PgRow) -> StoreResult<QueueItem> {
    let status: String = row.try_get("status")?;
    let status: QueueStatus = status.parse().map_err(StoreError::Decode)?;
    let media_id: String = row.try_get("media_id")?;

    Ok(QueueItem {
        media_id: MediaId::from_string(media_id),
        status,
        priority: row.try_get("priority")?,
        attempts: row.try_get("attempts")?,
        max_attempts: row.try_get("max_attempts")?,
        last_error: row.try_get("last_error")?,
        queued_at: row.try_get("queued_at")?,
        started_at: row.try_get("started_at")?,
        completed_at: row.try_get("completed_at")?,
    })
}
