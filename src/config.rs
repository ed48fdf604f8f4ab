//! Engine-wide constants and tunables.
//!
//! The thresholds here are product-tuned: they shape how degenerate items
//! (still images, zero-length slots, runaway loops) behave, not whether the
//! engine is correct. Callers that need different behavior pass their own
//! [`Tunables`] to `Session::with_tunables`.

use serde::{Deserialize, Serialize};

/// Id of the distinguished root item. The root always exists, has no parent
/// and is never returned by navigation.
pub const ROOT_ID: &str = "0";

/// Float comparison tolerance for durations and segment math (seconds).
pub const TIME_EPSILON: f64 = 1e-6;

/// Hard cap on clip segments produced by looping. A clipping whose implied
/// segment count exceeds this resolves to "unplayable" (no segments).
pub const MAX_CLIP_SEGMENTS: usize = 128;

/// Media shorter than this is treated as a still image (duration 0).
pub const IMAGE_DURATION_THRESHOLD: f64 = 0.25;

/// Floor for timeline durations. Zero-length items are clamped up so they
/// stay visible and navigable on the merged timeline.
pub const MIN_TIMELINE_DURATION: f64 = 1.0;

/// Runtime-adjustable copies of the magic numbers above.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Tunables {
    pub image_duration_threshold: f64,
    pub min_timeline_duration: f64,
    pub max_clip_segments: usize,
    pub epsilon: f64,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            image_duration_threshold: IMAGE_DURATION_THRESHOLD,
            min_timeline_duration: MIN_TIMELINE_DURATION,
            max_clip_segments: MAX_CLIP_SEGMENTS,
            epsilon: TIME_EPSILON,
        }
    }
}
