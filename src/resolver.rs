//! Timeline resolution: item properties + resolved children -> UserData.
//!
//! `Session::resolve` is the only entry point. It is pure given the current
//! item snapshot, memoized per id, and recomputes bottom-up after
//! invalidation: children are resolved before their parent, and the parent
//! walk is the single place that writes each child's `start`/`end` and
//! `timeline_start`/`timeline_end`.
//!
//! Failure policy: missing media metadata degrades to zero duration and no
//! chapters; degenerate clippings degrade to an empty segment schedule.
//! Nothing in here returns an error.

use std::cmp::Ordering;

use crate::clip::Clipping;
use crate::entities::keys::*;
use crate::entities::{Chapter, Item, UserData};
use crate::session::Session;

impl Session {
    /// Resolved timing/chapters for one item, memoized until invalidated.
    /// Unknown ids resolve to an all-zero bundle.
    pub fn resolve(&self, id: &str) -> UserData {
        if let Some(ud) = self.user_data.borrow().get(id) {
            return ud.clone();
        }
        let ud = self.resolve_fresh(id);
        self.user_data
            .borrow_mut()
            .insert(id.to_string(), ud.clone());
        ud
    }

    fn resolve_fresh(&self, id: &str) -> UserData {
        self.resolves.set(self.resolves.get() + 1);
        let Some(item) = self.tree().get(id) else {
            return UserData::default();
        };
        let tun = *self.tunables();
        let kids = self.tree().children(id);
        let is_playlist = !kids.is_empty() || item.is_sub_playlist();
        let merged = item.is_merged();

        let mut chapters: Vec<Chapter> = Vec::new();
        let media_duration;
        let mut children_duration = 0.0;
        let mut timeline_children = 0.0;

        if is_playlist {
            // Per-track walk: accumulate both time axes, position each
            // child inside this parent, stop at an exit marker.
            let mut media_totals = [0.0f64; 2];
            let mut timeline_totals = [0.0f64; 2];
            let mut occupied = [false; 2];
            for track in 0..=1u8 {
                let mut media_cursor = 0.0;
                let mut timeline_cursor = 0.0;
                for cid in kids
                    .iter()
                    .filter(|cid| self.tree().get(cid).map(|c| c.track) == Some(track))
                {
                    let child = match self.tree().get(cid) {
                        Some(c) => c,
                        None => continue,
                    };
                    occupied[track as usize] = true;
                    if child.is_exit() {
                        break;
                    }
                    let cud = self.resolve(cid);
                    {
                        let mut table = self.user_data.borrow_mut();
                        if let Some(slot) = table.get_mut(cid.as_str()) {
                            slot.start = media_cursor;
                            slot.end = media_cursor + cud.duration;
                            slot.timeline_start = timeline_cursor;
                            slot.timeline_end = timeline_cursor + cud.timeline_duration;
                        }
                    }
                    if merged && track == 0 {
                        chapters.push(Chapter {
                            index: 0,
                            start: media_cursor,
                            end: media_cursor + cud.duration,
                            id: Some(cid.clone()),
                            title: Some(cud.name.clone()),
                        });
                    }
                    media_cursor += cud.duration;
                    timeline_cursor += cud.timeline_duration;
                }
                media_totals[track as usize] = media_cursor;
                timeline_totals[track as usize] = timeline_cursor;
            }
            let dual_shortest = item.playlist_mode() == MODE_DUAL_TRACK
                && item.end_on_shortest()
                && occupied[0]
                && occupied[1];
            if dual_shortest {
                media_duration = media_totals[0].min(media_totals[1]);
                timeline_children = timeline_totals[0].min(timeline_totals[1]);
            } else {
                media_duration = media_totals[0].max(media_totals[1]);
                timeline_children = timeline_totals[0].max(timeline_totals[1]);
            }
            children_duration = media_duration;
        } else {
            let info = self.media().info(&item.filename);
            // below the image threshold the media counts as a still
            media_duration = if info.exists && info.duration >= tun.image_duration_threshold {
                info.duration
            } else {
                0.0
            };
            chapters = info.chapters;
        }

        let override_duration = item.attrs.get_f64(A_DURATION);
        let mut duration = override_duration.unwrap_or(media_duration).max(0.0);

        let clipping = build_clipping(item, duration, media_duration, override_duration, &tun);
        if let Some(c) = &clipping {
            duration = c.duration;
        }

        // Timeline axis: containers follow their children's scheduled
        // total unless an override/clipping pins the duration.
        let timeline_base = if is_playlist && override_duration.is_none() && clipping.is_none() {
            timeline_children
        } else {
            duration
        };
        let timeline_duration = timeline_base.max(tun.min_timeline_duration).round();

        if let Some(c) = &clipping {
            reslice_chapters(&mut chapters, c, &item.display_name(), tun.max_clip_segments);
        }

        // Final pass: drop out-of-range, sort, re-index, default titles.
        chapters.retain(|ch| ch.end > tun.epsilon && ch.start < duration - tun.epsilon);
        chapters.sort_by(|a, b| a.start.partial_cmp(&b.start).unwrap_or(Ordering::Equal));
        for (i, ch) in chapters.iter_mut().enumerate() {
            ch.index = i;
            if ch.id.is_none() && ch.title.is_none() {
                ch.title = Some(format!("Chapter {}", i + 1));
            }
        }

        UserData {
            duration,
            media_duration,
            children_duration,
            timeline_duration,
            start: 0.0,
            end: 0.0,
            timeline_start: 0.0,
            timeline_end: 0.0,
            clipping,
            chapters,
            name: item.display_name(),
            is_modified: item.is_modified(),
        }
    }
}

/// Clipping descriptor from the item's overrides, relative to the resolved
/// duration. Present only when it actually changes playback against the
/// intrinsic media length.
fn build_clipping(
    item: &Item,
    base: f64,
    media_duration: f64,
    override_duration: Option<f64>,
    tun: &crate::config::Tunables,
) -> Option<Clipping> {
    let attrs = &item.attrs;
    if !(attrs.contains(A_CLIP_START)
        || attrs.contains(A_CLIP_END)
        || attrs.contains(A_CLIP_OFFSET)
        || attrs.contains(A_CLIP_LOOPS))
    {
        return None;
    }
    let start = attrs.get_f64_or(A_CLIP_START, 0.0).clamp(0.0, base);
    let end = attrs.get_f64_or(A_CLIP_END, base).clamp(start, base);
    let offset = attrs.get_f64_or(A_CLIP_OFFSET, 0.0);
    let loops = attrs.get_f64_or(A_CLIP_LOOPS, 1.0).max(0.0);

    let genuine = start > tun.epsilon
        || end < media_duration - tun.epsilon
        || offset.abs() > tun.epsilon
        || (loops - 1.0).abs() > tun.epsilon;
    if !genuine {
        return None;
    }
    let length = (end - start).max(0.0);
    let duration = override_duration.unwrap_or(length * loops).max(0.0);
    Some(Clipping {
        start,
        end,
        length,
        duration,
        offset,
        loops,
    })
}

/// Re-slice a chapter list to a clipped window. One segment clamps and
/// zero-bases the existing chapters; several segments (looping) replace
/// them with one synthesized chapter per segment.
fn reslice_chapters(chapters: &mut Vec<Chapter>, clipping: &Clipping, name: &str, cap: usize) {
    let segments = clipping.segments_capped(cap);
    match segments.len() {
        0 => chapters.clear(),
        1 => {
            let seg = segments[0];
            for ch in chapters.iter_mut() {
                ch.start = ch.start.max(seg.start) - seg.start;
                ch.end = ch.end.min(seg.end) - seg.start;
            }
            chapters.retain(|ch| ch.end > ch.start);
        }
        _ => {
            let mut cursor = 0.0;
            *chapters = segments
                .iter()
                .map(|seg| {
                    let ch = Chapter {
                        index: 0,
                        start: cursor,
                        end: cursor + seg.duration,
                        id: None,
                        title: Some(name.to_string()),
                    };
                    cursor += seg.duration;
                    ch
                })
                .collect();
        }
    }
}
