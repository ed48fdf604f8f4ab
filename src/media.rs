//! Media metadata provider and transfer status - external collaborators.
//!
//! The engine never touches media files or the network itself. It asks a
//! [`MediaProvider`] for per-reference metadata and consults transfer maps
//! only to decide whether a "possibly missing media" diagnostic should be
//! suppressed while an upload or download is still in flight.
//!
//! Absence is always an empty record, never an error: an unknown reference
//! resolves to zero duration and no chapters.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::entities::Chapter;

/// Metadata for one media reference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    pub exists: bool,
    /// Intrinsic duration in seconds (0 for still images / unknown media).
    pub duration: f64,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
    /// Stream descriptors (codec/labels), informational only.
    #[serde(default)]
    pub streams: Vec<String>,
}

impl MediaInfo {
    /// Record for media that could not be found or probed.
    pub fn missing() -> Self {
        Self::default()
    }

    pub fn with_duration(duration: f64) -> Self {
        Self {
            exists: true,
            duration,
            chapters: Vec::new(),
            streams: Vec::new(),
        }
    }
}

/// External source of media metadata.
pub trait MediaProvider {
    /// Metadata for a media reference. Must not fail: unknown references
    /// return [`MediaInfo::missing`].
    fn info(&self, filename: &str) -> MediaInfo;
}

/// In-memory provider: a plain filename -> info table.
/// Used by tests, the CLI (`--media` JSON) and previews.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticMedia {
    map: HashMap<String, MediaInfo>,
}

impl StaticMedia {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, filename: impl Into<String>, info: MediaInfo) {
        self.map.insert(filename.into(), info);
    }

    pub fn insert_duration(&mut self, filename: impl Into<String>, duration: f64) {
        self.insert(filename, MediaInfo::with_duration(duration));
    }
}

impl MediaProvider for StaticMedia {
    fn info(&self, filename: &str) -> MediaInfo {
        self.map.get(filename).cloned().unwrap_or_default()
    }
}

/// State of one upload/download slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferState {
    Pending,
    Active,
    Done,
    Failed,
}

/// Progress record for a transfer keyed by item id (or its `upload_id`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransferStatus {
    pub state: TransferState,
    pub bytes: u64,
    pub total: u64,
}

impl TransferStatus {
    /// A transfer that has not finished yet (missing media is expected).
    pub fn in_flight(&self) -> bool {
        matches!(self.state, TransferState::Pending | TransferState::Active)
    }
}

/// Transfer progress keyed by item id.
pub type TransferMap = HashMap<String, TransferStatus>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_reference_is_empty_record() {
        let media = StaticMedia::new();
        let info = media.info("nope.mp4");
        assert!(!info.exists);
        assert_eq!(info.duration, 0.0);
        assert!(info.chapters.is_empty());
    }

    #[test]
    fn test_in_flight_states() {
        let t = TransferStatus {
            state: TransferState::Active,
            bytes: 10,
            total: 100,
        };
        assert!(t.in_flight());
        let t = TransferStatus {
            state: TransferState::Done,
            bytes: 100,
            total: 100,
        };
        assert!(!t.in_flight());
    }
}
