//! Processing-queue models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::media::MediaId;

/// Processing status of a queue item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QueueStatus {
    /// Waiting for a worker
    #[default]
    Queued,
    /// Claimed by a worker
    Processing,
    /// Pipeline succeeded
    Completed,
    /// Pipeline failed; eligible for explicit retry
    Failed,
}

impl QueueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueStatus::Queued => "queued",
            QueueStatus::Processing => "processing",
            QueueStatus::Completed => "completed",
            QueueStatus::Failed => "failed",
        }
    }

    /// Check if this is a terminal state (no more transitions without an
    /// explicit retry or re-enqueue).
    pub fn is_terminal(&self) -> bool {
        matches!(self, QueueStatus::Completed | QueueStatus::Failed)
    }
}

impl fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for QueueStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(QueueStatus::Queued),
            "processing" => Ok(QueueStatus::Processing),
            "completed" => Ok(QueueStatus::Completed),
            "failed" => Ok(QueueStatus::Failed),
            other => Err(format!("unknown queue status: {other}")),
        }
    }
}

/// One row of the durable processing queue, keyed 1:1 by media id.
///
/// Re-enqueueing an existing media id upserts the row (raising priority and
/// resetting attempts) rather than duplicating it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueItem {
    pub media_id: MediaId,
    pub status: QueueStatus,
    /// Higher is served sooner; ties break oldest-queued-first
    pub priority: i32,
    /// Claims so far; a queued item at or past `max_attempts` is skipped
    pub attempts: i32,
    pub max_attempts: i32,
    pub last_error: Option<String>,
    pub queued_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl QueueItem {
    /// True when the item can still be claimed.
    pub fn is_claimable(&self) -> bool {
        self.status == QueueStatus::Queued && self.attempts < self.max_attempts
    }
}

/// Aggregate queue and curation counters for operator dashboards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueueStats {
    pub queued: i64,
    pub processing: i64,
    pub completed: i64,
    pub failed: i64,
    /// Completed media not yet reviewed by a curator
    pub pending_approval: i64,
    pub approved: i64,
    pub rejected: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(status: QueueStatus, attempts: i32) -> QueueItem {
        QueueItem {
            media_id: MediaId::from_string("m-1"),
            status,
            priority: 0,
            attempts,
            max_attempts: 3,
            last_error: None,
            queued_at: Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }

    #[test]
    fn test_claimable_respects_attempt_cutoff() {
        assert!(item(QueueStatus::Queued, 0).is_claimable());
        assert!(item(QueueStatus::Queued, 2).is_claimable());
        assert!(!item(QueueStatus::Queued, 3).is_claimable());
        assert!(!item(QueueStatus::Processing, 0).is_claimable());
        assert!(!item(QueueStatus::Failed, 0).is_claimable());
    }

    #[test]
    fn test_terminal_states() {
        assert!(QueueStatus::Completed.is_terminal());
        assert!(QueueStatus::Failed.is_terminal());
        assert!(!QueueStatus::Queued.is_terminal());
        assert!(!QueueStatus::Processing.is_terminal());
    }
}
