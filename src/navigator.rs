//! Navigator - depth-first predecessor/successor over the playlist tree.
//!
//! Forward descends into non-merged containers, then falls back to the next
//! sibling on the same track, then climbs ancestors. Backward mirrors it:
//! previous sibling (entered at its deepest, rightmost descendant) or the
//! parent. Merged playlists are opaque units - traversal never descends
//! into them. The root is never a result; reaching it ends the walk.
//!
//! With `skip_pass_through` set, candidates that are plain (non-merged)
//! containers are stepped through transparently until a playable item or
//! the boundary is found.

use crate::config::ROOT_ID;
use crate::session::Session;

impl Session {
    /// Neighbor of `id` in depth-first play order. `dir` is +1 (successor)
    /// or -1 (predecessor). Returns `None` at the tree boundary.
    pub fn adjacent(&self, id: &str, dir: i32, skip_pass_through: bool) -> Option<String> {
        let candidate = if dir >= 0 {
            self.next_of(id)
        } else {
            self.prev_of(id)
        }?;
        if skip_pass_through && self.is_pass_through(&candidate) {
            return self.adjacent(&candidate, dir, skip_pass_through);
        }
        Some(candidate)
    }

    /// A plain playlist that navigation steps through rather than stops on.
    fn is_pass_through(&self, id: &str) -> bool {
        let Some(item) = self.tree().get(id) else {
            return false;
        };
        let container = !self.tree().children(id).is_empty() || item.is_sub_playlist();
        container && !item.is_merged()
    }

    fn next_of(&self, id: &str) -> Option<String> {
        let item = self.tree().get(id)?;
        if !item.is_merged() {
            if let Some(first) = self.tree().children(id).first() {
                return Some(first.clone());
            }
        }
        let mut cur = id.to_string();
        loop {
            let parent = self.tree().get(&cur)?.parent.clone()?;
            if let Some(next) = self.sibling(&parent, &cur, 1) {
                return Some(next);
            }
            if parent == ROOT_ID {
                return None;
            }
            cur = parent;
        }
    }

    fn prev_of(&self, id: &str) -> Option<String> {
        let parent = self.tree().get(id)?.parent.clone()?;
        match self.sibling(&parent, id, -1) {
            Some(prev) => Some(self.deepest_tail(&prev)),
            None if parent == ROOT_ID => None,
            None => Some(parent),
        }
    }

    /// Last playable position inside `id`: follow last children down while
    /// the node is a non-merged container.
    fn deepest_tail(&self, id: &str) -> String {
        let mut cur = id.to_string();
        loop {
            match self.tree().get(&cur) {
                Some(item) if !item.is_merged() => match self.tree().children(&cur).last() {
                    Some(last) => cur = last.clone(),
                    None => return cur,
                },
                _ => return cur,
            }
        }
    }

    /// Sibling of `id` under `parent` on the same track, offset by `dir`.
    fn sibling(&self, parent: &str, id: &str, dir: i32) -> Option<String> {
        let track = self.tree().get(id)?.track;
        let siblings = self.tree().children_on_track(parent, track);
        let pos = siblings.iter().position(|s| s == id)? as i32 + dir;
        if pos < 0 {
            return None;
        }
        siblings.get(pos as usize).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::keys::*;
    use crate::entities::AttrValue;
    use crate::media::StaticMedia;

    struct Fixture {
        s: Session,
        list: String,
        a1: String,
        a2: String,
        merged: String,
        m1: String,
        leaf: String,
    }

    /// root -> [ list(a1, a2), merged(m1, m2), leaf ]
    fn fixture() -> Fixture {
        let mut m = StaticMedia::new();
        for f in ["a1.mp4", "a2.mp4", "m1.mp4", "m2.mp4", "leaf.mp4"] {
            m.insert_duration(f, 10.0);
        }
        let mut s = Session::new(Box::new(m));
        let list = s.add_item(ROOT_ID, 0, F_PLAYLIST).unwrap();
        let a1 = s.add_item(&list, 0, "a1.mp4").unwrap();
        let a2 = s.add_item(&list, 0, "a2.mp4").unwrap();
        let merged = s.add_item(ROOT_ID, 0, F_PLAYLIST).unwrap();
        s.set_attr(&merged, A_MODE, AttrValue::Int(MODE_MERGED)).unwrap();
        let m1 = s.add_item(&merged, 0, "m1.mp4").unwrap();
        s.add_item(&merged, 0, "m2.mp4").unwrap();
        let leaf = s.add_item(ROOT_ID, 0, "leaf.mp4").unwrap();
        Fixture {
            s,
            list,
            a1,
            a2,
            merged,
            m1,
            leaf,
        }
    }

    #[test]
    fn test_forward_descends_into_plain_playlist() {
        let f = fixture();
        assert_eq!(f.s.adjacent(&f.list, 1, false), Some(f.a1.clone()));
        assert_eq!(f.s.adjacent(&f.a1, 1, false), Some(f.a2.clone()));
    }

    #[test]
    fn test_forward_climbs_out_to_ancestor_sibling() {
        let f = fixture();
        // last item of the sub-playlist: up and over to the merged list
        assert_eq!(f.s.adjacent(&f.a2, 1, false), Some(f.merged.clone()));
    }

    #[test]
    fn test_merged_playlist_is_an_opaque_stop() {
        let f = fixture();
        // never descends into a merged playlist
        assert_eq!(f.s.adjacent(&f.merged, 1, false), Some(f.leaf.clone()));
        assert_eq!(f.s.adjacent(&f.merged, 1, true), Some(f.leaf.clone()));
        // backward from the leaf stops on the merged unit, not inside it
        assert_eq!(f.s.adjacent(&f.leaf, -1, true), Some(f.merged.clone()));
        // m1 is inside: its backward neighbor is the containing unit
        assert_eq!(f.s.adjacent(&f.m1, -1, false), Some(f.merged.clone()));
    }

    #[test]
    fn test_backward_enters_previous_sibling_at_its_tail() {
        let f = fixture();
        assert_eq!(f.s.adjacent(&f.merged, -1, false), Some(f.a2.clone()));
        assert_eq!(f.s.adjacent(&f.a2, -1, false), Some(f.a1.clone()));
        // no previous sibling: the parent container
        assert_eq!(f.s.adjacent(&f.a1, -1, false), Some(f.list.clone()));
    }

    #[test]
    fn test_boundaries_never_return_root() {
        let f = fixture();
        // backward from the first top-level item: none, not the root
        assert_eq!(f.s.adjacent(&f.list, -1, false), None);
        assert_eq!(f.s.adjacent(&f.a1, -1, true), None);
        // forward from the very last item: none
        assert_eq!(f.s.adjacent(&f.leaf, 1, false), None);
        assert_eq!(f.s.adjacent(&f.leaf, 1, true), None);
    }

    #[test]
    fn test_skip_steps_through_pass_through_playlists() {
        let f = fixture();
        // backward from the merged list with skip: a2 directly (the
        // pass-through candidate is already resolved to its tail)
        assert_eq!(f.s.adjacent(&f.merged, -1, true), Some(f.a2.clone()));
        // backward from a1 lands on the containing playlist; with skip it
        // keeps walking and exhausts
        assert_eq!(f.s.adjacent(&f.a1, -1, true), None);
    }

    #[test]
    fn test_skip_empty_playlist() {
        // root -> [ first, empty playlist, last ]
        let mut m = StaticMedia::new();
        m.insert_duration("first.mp4", 10.0);
        m.insert_duration("last.mp4", 10.0);
        let mut s = Session::new(Box::new(m));
        let first = s.add_item(ROOT_ID, 0, "first.mp4").unwrap();
        let empty = s.add_item(ROOT_ID, 0, F_PLAYLIST).unwrap();
        let last = s.add_item(ROOT_ID, 0, "last.mp4").unwrap();

        assert_eq!(s.adjacent(&first, 1, false), Some(empty.clone()));
        assert_eq!(s.adjacent(&first, 1, true), Some(last.clone()));
        assert_eq!(s.adjacent(&last, -1, true), Some(first.clone()));
    }
}
