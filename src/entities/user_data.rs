//! UserData - memoized derived timing/chapter bundle for one item.
//!
//! Produced by the resolver, cached per item id, discarded (not recomputed)
//! on invalidation. Two time axes run in parallel: media time follows raw
//! per-item durations, timeline time follows the display-scheduled durations
//! (zero-length items clamped up to a visible minimum).

use serde::{Deserialize, Serialize};

use crate::clip::Clipping;

/// One chapter on an item's timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    /// Sequential position after the final sort/re-index pass.
    pub index: usize,
    /// Chapter start in seconds, media time, zero-based on the owning item.
    pub start: f64,
    /// Chapter end in seconds.
    pub end: f64,
    /// Child item id for chapters derived from a merged playlist walk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Chapter {
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            index: 0,
            start,
            end,
            id: None,
            title: None,
        }
    }
}

/// Derived timing for one item. `start`/`end` and the timeline twins are
/// positions within the *parent's* timeline and are written only while a
/// parent resolves its children.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserData {
    /// Effective play duration in seconds (override / clipping applied).
    pub duration: f64,
    /// Intrinsic duration: media metadata for leaves, track aggregation
    /// for containers.
    pub media_duration: f64,
    /// Aggregated children total in media time (0 for leaves).
    pub children_duration: f64,
    /// Display-scheduled duration (clamped to the nonzero floor, rounded).
    pub timeline_duration: f64,
    /// Position in the parent's media-time axis.
    pub start: f64,
    pub end: f64,
    /// Position in the parent's timeline-time axis.
    pub timeline_start: f64,
    pub timeline_end: f64,
    /// Present only when the item is genuinely clipped/looped relative to
    /// its intrinsic media length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clipping: Option<Clipping>,
    pub chapters: Vec<Chapter>,
    /// Display name (sentinel name or filename stem).
    pub name: String,
    /// Any non-cosmetic override set on the item.
    pub is_modified: bool,
}
