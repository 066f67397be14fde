use serde::{Deserialize, Serialize};

use crate::queue::error::QueueError;
use crate::queue::link::VideoLink;
use crate::queue::model::NewBatch;

/// Raw operator input: one link per line plus a note shared by the batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Submission {
    pub urls: String,
    #[serde(default)]
    pub note: Option<String>,
}

impl Submission {
    pub fn new(urls: impl Into<String>, note: Option<String>) -> Self {
        Self {
            urls: urls.into(),
            note,
        }
    }

    pub fn into_batch(self) -> Result<NewBatch, QueueError> {
        Self::parse(&self.urls, self.note)
    }

    /// Splits `raw` on newlines, drops blank lines and validates the rest.
    ///
    /// All-or-nothing: if any line fails, the error lists every failing line
    /// and no batch is produced.
    pub fn parse(raw: &str, note: Option<String>) -> Result<NewBatch, QueueError> {
        let mut links = Vec::new();
        let mut invalid = Vec::new();

        for line in raw.lines().map(str::trim).filter(|l| !l.is_empty()) {
            match VideoLink::parse(line) {
                Some(link) => links.push(link),
                None => invalid.push(line.to_string()),
            }
        }

        if !invalid.is_empty() {
            return Err(QueueError::InvalidLinks(invalid));
        }

        NewBatch::new(links, note)
    }
}
