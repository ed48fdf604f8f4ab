//! Clip segmentation: subrange + loop -> contiguous play segments.
//!
//! A clipping plays the source subrange `[start, end)` for `duration` total
//! seconds, beginning at `offset` within the subrange. Durations longer than
//! the subrange wrap around (looping); a fractional tail yields a partial
//! final segment. Degenerate inputs (zero-length subrange, runaway loop
//! counts) resolve to an empty schedule, never an error.

use serde::{Deserialize, Serialize};

use crate::config::{MAX_CLIP_SEGMENTS, TIME_EPSILON};

/// Subrange-plus-loop transformation applied to an item's intrinsic
/// duration. `length` is `end - start`; `duration` is the total play time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Clipping {
    pub start: f64,
    pub end: f64,
    pub length: f64,
    pub duration: f64,
    pub offset: f64,
    pub loops: f64,
}

/// One contiguous stretch of source playback.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub duration: f64,
}

impl Clipping {
    pub fn new(start: f64, end: f64, duration: f64, offset: f64, loops: f64) -> Self {
        Self {
            start,
            end,
            length: (end - start).max(0.0),
            duration,
            offset,
            loops,
        }
    }

    /// Ordered play segments covering `duration` seconds, default cap.
    pub fn segments(&self) -> Vec<Segment> {
        self.segments_capped(MAX_CLIP_SEGMENTS)
    }

    /// Ordered play segments with an explicit segment-count cap.
    ///
    /// Walks a cursor from `start + (offset mod length)`, emitting a segment
    /// up to `end` or until the remaining duration runs out, wrapping the
    /// cursor back to `start` at the subrange end. A clipping whose implied
    /// segment count exceeds `cap` is unplayable and yields no segments.
    pub fn segments_capped(&self, cap: usize) -> Vec<Segment> {
        let length = self.end - self.start;
        if length <= TIME_EPSILON || self.duration <= TIME_EPSILON {
            return Vec::new();
        }
        // +1 covers the split first loop when offset is non-zero
        let implied = (self.duration / length).ceil() as usize + 1;
        if implied > cap {
            return Vec::new();
        }

        let mut segments = Vec::new();
        let mut cursor = self.start + self.offset.rem_euclid(length);
        let mut remaining = self.duration;

        while remaining > TIME_EPSILON {
            if segments.len() >= cap {
                return Vec::new();
            }
            let seg_end = (cursor + remaining).min(self.end);
            let seg_len = seg_end - cursor;
            if seg_len <= TIME_EPSILON {
                cursor = self.start;
                continue;
            }
            segments.push(Segment {
                start: cursor,
                end: seg_end,
                duration: seg_len,
            });
            remaining -= seg_len;
            cursor = if self.end - seg_end <= TIME_EPSILON {
                self.start
            } else {
                seg_end
            };
        }
        segments
    }
}
