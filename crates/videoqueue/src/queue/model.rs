use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::queue::error::QueueError;
use crate::queue::link::VideoLink;

/// Processing lifecycle of a queue item.
///
/// The store only ever writes `Pending`. Every later state is written by the
/// drain worker, which checks each write against [`QueueStatus::can_transition_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueStatus {
    Pending,
    Processing,
    Done,
    Failed,
}

impl QueueStatus {
    pub const ALL: [QueueStatus; 4] = [
        QueueStatus::Pending,
        QueueStatus::Processing,
        QueueStatus::Done,
        QueueStatus::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueueStatus::Pending => "pending",
            QueueStatus::Processing => "processing",
            QueueStatus::Done => "done",
            QueueStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "done" => Some(Self::Done),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, QueueStatus::Done | QueueStatus::Failed)
    }

    /// pending -> processing -> {done | failed}. Terminal states never move.
    pub fn can_transition_to(&self, next: QueueStatus) -> bool {
        matches!(
            (self, next),
            (QueueStatus::Pending, QueueStatus::Processing)
                | (QueueStatus::Processing, QueueStatus::Done)
                | (QueueStatus::Processing, QueueStatus::Failed)
        )
    }
}

impl fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One link-plus-note record tracked through processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueItem {
    pub id: Uuid,
    pub source_url: String,
    pub note: Option<String>,
    pub status: QueueStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl QueueItem {
    pub(crate) fn pending(id: Uuid, item: NewQueueItem, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            source_url: item.source_url,
            note: item.note,
            status: QueueStatus::Pending,
            created_at,
            error_detail: None,
        }
    }

    /// Rebuilds an item read back from storage.
    /// A detail stored on a non-failed row is dropped.
    pub(crate) fn from_stored(
        id: Uuid,
        source_url: String,
        note: Option<String>,
        status: QueueStatus,
        created_at: DateTime<Utc>,
        error_detail: Option<String>,
    ) -> Self {
        let error_detail = match status {
            QueueStatus::Failed => error_detail,
            _ => None,
        };
        Self {
            id,
            source_url,
            note,
            status,
            created_at,
            error_detail,
        }
    }
}

/// A validated link waiting to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQueueItem {
    source_url: String,
    video_id: String,
    note: Option<String>,
}

impl NewQueueItem {
    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }
}

/// Non-empty batch of validated links sharing one note.
///
/// Only buildable from [`VideoLink`]s, so a store never receives an
/// unvalidated url.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBatch {
    items: Vec<NewQueueItem>,
}

impl NewBatch {
    pub fn new(links: Vec<VideoLink>, note: Option<String>) -> Result<Self, QueueError> {
        if links.is_empty() {
            return Err(QueueError::EmptyBatch);
        }

        let note = note.filter(|n| !n.trim().is_empty());
        let items = links
            .into_iter()
            .map(|link| {
                let (source_url, video_id) = link.into_parts();
                NewQueueItem {
                    source_url,
                    video_id,
                    note: note.clone(),
                }
            })
            .collect();

        Ok(Self { items })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[NewQueueItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<NewQueueItem> {
        self.items
    }
}

/// Item totals per lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub pending: i64,
    pub processing: i64,
    pub done: i64,
    pub failed: i64,
}

impl StatusCounts {
    pub fn from_items(items: &[QueueItem]) -> Self {
        let mut counts = Self::default();
        for item in items {
            counts.add(item.status, 1);
        }
        counts
    }

    pub fn add(&mut self, status: QueueStatus, n: i64) {
        match status {
            QueueStatus::Pending => self.pending += n,
            QueueStatus::Processing => self.processing += n,
            QueueStatus::Done => self.done += n,
            QueueStatus::Failed => self.failed += n,
        }
    }

    pub fn total(&self) -> i64 {
        self.pending + self.processing + self.done + self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(raw: &str) -> VideoLink {
        VideoLink::parse(raw).expect("valid link")
    }

    #[test]
    fn lifecycle_only_moves_forward() {
        use QueueStatus::*;

        assert!(Pending.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Done));
        assert!(Processing.can_transition_to(Failed));

        assert!(!Pending.can_transition_to(Done));
        assert!(!Pending.can_transition_to(Failed));
        assert!(!Processing.can_transition_to(Pending));

        for terminal in [Done, Failed] {
            assert!(terminal.is_terminal());
            for next in QueueStatus::ALL {
                assert!(!terminal.can_transition_to(next), "{terminal} -> {next}");
            }
        }
    }

    #[test]
    fn status_strings_match_storage_values() {
        for status in QueueStatus::ALL {
            assert_eq!(QueueStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(QueueStatus::parse(" DONE "), Some(QueueStatus::Done));
        assert_eq!(QueueStatus::parse("succeeded"), None);
        assert_eq!(
            serde_json::to_string(&QueueStatus::Processing).unwrap(),
            "\"processing\""
        );
    }

    #[test]
    fn batch_requires_at_least_one_link() {
        let err = NewBatch::new(vec![], Some("note".into())).unwrap_err();
        assert!(matches!(err, QueueError::EmptyBatch));
    }

    #[test]
    fn batch_items_share_note_and_blank_note_is_absent() {
        let batch = NewBatch::new(
            vec![
                link("https://youtube.com/watch?v=dQw4w9WgXcQ"),
                link("https://youtu.be/9bZkp7q19f0"),
            ],
            Some("cool video".into()),
        )
        .unwrap();
        assert_eq!(batch.len(), 2);
        assert!(batch.items().iter().all(|i| i.note() == Some("cool video")));
        assert_eq!(batch.items()[1].video_id(), "9bZkp7q19f0");

        let batch = NewBatch::new(
            vec![link("https://youtu.be/dQw4w9WgXcQ")],
            Some("   ".into()),
        )
        .unwrap();
        assert_eq!(batch.items()[0].note(), None);
    }

    #[test]
    fn stored_detail_is_kept_only_for_failed_items() {
        let now = Utc::now();
        let done = QueueItem::from_stored(
            Uuid::new_v4(),
            "https://youtu.be/dQw4w9WgXcQ".into(),
            None,
            QueueStatus::Done,
            now,
            Some("Already processed".into()),
        );
        assert_eq!(done.error_detail, None);

        let failed = QueueItem::from_stored(
            Uuid::new_v4(),
            "https://youtu.be/dQw4w9WgXcQ".into(),
            None,
            QueueStatus::Failed,
            now,
            Some("yt-dlp failed".into()),
        );
        assert_eq!(failed.error_detail.as_deref(), Some("yt-dlp failed"));
    }

    #[test]
    fn counts_tally_each_status() {
        let now = Utc::now();
        let mk = |status| {
            QueueItem::from_stored(Uuid::new_v4(), "u".into(), None, status, now, None)
        };
        let items = vec![
            mk(QueueStatus::Pending),
            mk(QueueStatus::Pending),
            mk(QueueStatus::Done),
            mk(QueueStatus::Processing),
        ];
        let counts = StatusCounts::from_items(&items);
        assert_eq!(counts.pending, 2);
        assert_eq!(counts.processing, 1);
        assert_eq!(counts.done, 1);
        assert_eq!(counts.failed, 0);
        assert_eq!(counts.total(), 4);
    }
}
