//! Session - owns the playlist tree, the media provider and the UserData
//! memo table, and enforces the invalidation discipline.
//!
//! Every mutation goes through a Session method: the write and the cache
//! invalidation walk happen together, synchronously, before the method
//! returns. Readers therefore never observe stale ancestor timing. Derived
//! data is pull-based: invalidation discards memo entries, the next
//! `resolve` call recomputes them bottom-up.
//!
//! Edits are applied optimistically (the session is marked dirty); when the
//! remote authority pushes its own state, `apply_snapshot` replaces the
//! arena outright and every memo entry is dropped - there is no incremental
//! reconciliation and no rollback path.

use log::{debug, info};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::config::{Tunables, ROOT_ID};
use crate::entities::keys::{A_UPLOAD_ID, COSMETIC_KEYS, F_PLAYLIST};
use crate::entities::{AttrValue, Item, UserData};
use crate::media::{MediaProvider, TransferMap, TransferStatus};
use crate::tree::{Placement, Tree, TreeError};

pub struct Session {
    tree: Tree,
    media: Box<dyn MediaProvider>,
    tunables: Tunables,
    /// Memoized derived timing, keyed by item id. Entries are discarded on
    /// invalidation and rebuilt lazily by `resolve`.
    pub(crate) user_data: RefCell<HashMap<String, UserData>>,
    /// Count of fresh (non-memoized) resolutions, for cache discipline
    /// checks and stats.
    pub(crate) resolves: Cell<u64>,
    uploads: TransferMap,
    downloads: TransferMap,
    /// Locally edited since the last authoritative snapshot.
    dirty: bool,
}

impl Session {
    pub fn new(media: Box<dyn MediaProvider>) -> Self {
        Self::with_tunables(media, Tunables::default())
    }

    pub fn with_tunables(media: Box<dyn MediaProvider>, tunables: Tunables) -> Self {
        Self {
            tree: Tree::new(),
            media,
            tunables,
            user_data: RefCell::new(HashMap::new()),
            resolves: Cell::new(0),
            uploads: TransferMap::new(),
            downloads: TransferMap::new(),
            dirty: false,
        }
    }

    /// Build a session from a flat item list (loaded session file).
    pub fn from_items(items: Vec<Item>, media: Box<dyn MediaProvider>) -> Self {
        let mut session = Self::new(media);
        session.tree = Tree::from_items(items);
        session
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn item(&self, id: &str) -> Option<&Item> {
        self.tree.get(id)
    }

    pub fn tunables(&self) -> &Tunables {
        &self.tunables
    }

    pub(crate) fn media(&self) -> &dyn MediaProvider {
        self.media.as_ref()
    }

    /// Ordered direct children, both tracks.
    pub fn children(&self, id: &str) -> Vec<String> {
        self.tree.children(id)
    }

    /// Ordered direct children on one track.
    pub fn children_on_track(&self, id: &str, track: u8) -> Vec<String> {
        self.tree.children_on_track(id, track)
    }

    /// Locally edited since the last authoritative snapshot.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Fresh resolutions performed so far (cache misses).
    pub fn resolved_count(&self) -> u64 {
        self.resolves.get()
    }

    // === Invalidation ===

    /// Invalidation hook: discard the item's memoized timing and every
    /// ancestor's, up to the root. Call after any raw non-cosmetic write
    /// that bypassed the mutation methods below.
    pub fn touch(&self, id: &str) {
        let mut table = self.user_data.borrow_mut();
        table.remove(id);
        for anc in self.tree.ancestors(id) {
            table.remove(&anc);
        }
    }

    fn forget(&self, id: &str) {
        self.user_data.borrow_mut().remove(id);
    }

    // === Property mutations ===

    /// Set one property override. Cosmetic keys (label, color) are written
    /// without touching derived timing; everything else invalidates the
    /// item and its ancestor chain synchronously.
    pub fn set_attr(
        &mut self,
        id: &str,
        key: &str,
        value: AttrValue,
    ) -> Result<(), TreeError> {
        let item = self
            .tree
            .get_mut(id)
            .ok_or_else(|| TreeError::NotFound(id.to_string()))?;
        item.attrs.set(key, value);
        self.dirty = true;
        if !COSMETIC_KEYS.contains(&key) {
            self.touch(id);
        }
        Ok(())
    }

    /// Point the item at a different media reference / sentinel.
    pub fn set_filename(&mut self, id: &str, filename: &str) -> Result<(), TreeError> {
        let item = self
            .tree
            .get_mut(id)
            .ok_or_else(|| TreeError::NotFound(id.to_string()))?;
        item.filename = filename.to_string();
        self.dirty = true;
        self.touch(id);
        Ok(())
    }

    /// Remove one property override (reverts to the intrinsic value).
    pub fn clear_attr(&mut self, id: &str, key: &str) -> Result<(), TreeError> {
        let item = self
            .tree
            .get_mut(id)
            .ok_or_else(|| TreeError::NotFound(id.to_string()))?;
        if item.attrs.remove(key).is_some() {
            self.dirty = true;
            if !COSMETIC_KEYS.contains(&key) {
                self.touch(id);
            }
        }
        Ok(())
    }

    // === Structural mutations ===

    /// Append a new item at the end of (parent, track). Returns its id.
    pub fn add_item(
        &mut self,
        parent: &str,
        track: u8,
        filename: &str,
    ) -> Result<String, TreeError> {
        let mut item = Item::new(parent, filename);
        item.track = track;
        item.index = self.tree.children_on_track(parent, track).len() as i32;
        let id = item.id.clone();
        self.insert_item(item)?;
        Ok(id)
    }

    /// Insert a fully-placed item (drag-drop, clipboard paste).
    pub fn insert_item(&mut self, item: Item) -> Result<(), TreeError> {
        let id = item.id.clone();
        let parent = item.parent.clone();
        self.tree.insert(item)?;
        if let Some(p) = &parent {
            self.tree.normalize_indices(p);
        }
        self.dirty = true;
        self.touch(&id);
        debug!("session: added {} under {:?}", id, parent);
        Ok(())
    }

    /// Remove an item and its subtree.
    pub fn remove_item(&mut self, id: &str) -> Result<(), TreeError> {
        let parent = self
            .tree
            .get(id)
            .and_then(|i| i.parent.clone())
            .ok_or_else(|| TreeError::NotFound(id.to_string()))?;
        // ancestor chain must be dropped before the item leaves the arena
        self.touch(id);
        let removed = self.tree.remove(id)?;
        for rid in &removed {
            self.forget(rid);
        }
        self.tree.normalize_indices(&parent);
        self.dirty = true;
        Ok(())
    }

    /// Reparent/reorder a batch of items. The whole batch is validated
    /// against cycles first; on rejection the tree is unchanged.
    pub fn move_items(&mut self, moves: &[Placement]) -> Result<(), TreeError> {
        self.tree.check_moves(moves)?;
        // pre-image chains: the old parents lose a descendant
        let mut stale: Vec<String> = Vec::new();
        for mv in moves {
            stale.push(mv.id.clone());
            stale.extend(self.tree.ancestors(&mv.id));
        }
        self.tree.apply_moves(moves)?;
        for id in &stale {
            self.forget(id);
        }
        // post-image chains: the new parents gained one
        for mv in moves {
            self.touch(&mv.id);
        }
        self.dirty = true;
        Ok(())
    }

    /// Wrap a run of siblings in a new sub-playlist placed where the first
    /// of them was. Returns the new container id.
    pub fn group(&mut self, ids: &[String]) -> Result<String, TreeError> {
        let first = ids
            .first()
            .ok_or_else(|| TreeError::NotFound(String::from("<empty selection>")))?;
        let anchor = self
            .tree
            .get(first)
            .ok_or_else(|| TreeError::NotFound(first.clone()))?;
        let parent = anchor.parent.clone().unwrap_or_else(|| ROOT_ID.to_string());
        let mut container = Item::new(parent.clone(), F_PLAYLIST);
        container.track = anchor.track;
        container.index = anchor.index;
        let cid = container.id.clone();
        self.insert_item(container)?;

        let moves: Vec<Placement> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| Placement {
                id: id.clone(),
                parent: cid.clone(),
                track: 0,
                index: i as i32,
            })
            .collect();
        if let Err(e) = self.move_items(&moves) {
            // leave the tree as it was before the group
            let _ = self.remove_item(&cid);
            return Err(e);
        }
        self.tree.normalize_indices(&parent);
        info!("session: grouped {} items into {}", ids.len(), cid);
        Ok(cid)
    }

    /// Splice a container's children into its place and remove it.
    pub fn breakdown(&mut self, id: &str) -> Result<(), TreeError> {
        let (parent, base_index) = match self.tree.get(id) {
            Some(item) => match &item.parent {
                Some(p) => (p.clone(), item.index),
                None => return Err(TreeError::RootImmutable),
            },
            None => return Err(TreeError::NotFound(id.to_string())),
        };
        let kids = self.tree.children(id);
        let moves: Vec<Placement> = kids
            .iter()
            .enumerate()
            .map(|(i, cid)| {
                let track = self.tree.get(cid).map(|c| c.track).unwrap_or(0);
                Placement {
                    id: cid.clone(),
                    parent: parent.clone(),
                    track,
                    index: base_index + 1 + i as i32,
                }
            })
            .collect();
        self.move_items(&moves)?;
        self.remove_item(id)?;
        info!("session: broke down {} into {} items", id, kids.len());
        Ok(())
    }

    // === Authoritative state ===

    /// Replace the whole arena with server-pushed state and drop every
    /// memo entry. No incremental reconciliation.
    pub fn apply_snapshot(&mut self, items: Vec<Item>) {
        info!("session: applying authoritative snapshot ({} items)", items.len());
        self.tree.replace_all(items);
        self.user_data.borrow_mut().clear();
        self.dirty = false;
    }

    // === Transfers & diagnostics ===

    pub fn set_upload(&mut self, key: impl Into<String>, status: TransferStatus) {
        self.uploads.insert(key.into(), status);
    }

    pub fn set_download(&mut self, key: impl Into<String>, status: TransferStatus) {
        self.downloads.insert(key.into(), status);
    }

    /// "Possibly missing media" diagnostic for one item. Suppressed for
    /// sentinels and while an upload/download for the item is in flight.
    pub fn media_warning(&self, id: &str) -> Option<String> {
        let item = self.tree.get(id)?;
        if item.is_special() {
            return None;
        }
        if self.media.info(&item.filename).exists {
            return None;
        }
        let key = item.attrs.get_str(A_UPLOAD_ID).unwrap_or(id);
        let in_flight = self
            .uploads
            .get(key)
            .map(|t| t.in_flight())
            .unwrap_or(false)
            || self
                .downloads
                .get(key)
                .map(|t| t.in_flight())
                .unwrap_or(false);
        if in_flight {
            None
        } else {
            Some(format!("possibly missing media: {}", item.filename))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::keys::*;
    use crate::media::{StaticMedia, TransferState};

    fn media() -> Box<StaticMedia> {
        let mut m = StaticMedia::new();
        m.insert_duration("a.mp4", 10.0);
        m.insert_duration("b.mp4", 20.0);
        Box::new(m)
    }

    fn session_with_list() -> (Session, String, String, String) {
        let mut s = Session::new(media());
        let list = s.add_item(ROOT_ID, 0, F_PLAYLIST).unwrap();
        let a = s.add_item(&list, 0, "a.mp4").unwrap();
        let b = s.add_item(&list, 0, "b.mp4").unwrap();
        (s, list, a, b)
    }

    #[test]
    fn test_invalidation_propagates_to_all_ancestors() {
        let (mut s, list, a, _b) = session_with_list();
        assert_eq!(s.resolve(ROOT_ID).duration, 30.0);
        assert_eq!(s.resolve(&list).duration, 30.0);

        // override the leaf: every ancestor re-reads the new value with no
        // manual cache clear
        s.set_attr(&a, A_DURATION, AttrValue::Float(40.0)).unwrap();
        assert_eq!(s.resolve(&a).duration, 40.0);
        assert_eq!(s.resolve(&list).duration, 60.0);
        assert_eq!(s.resolve(ROOT_ID).duration, 60.0);
    }

    #[test]
    fn test_cosmetic_writes_keep_cache() {
        let (mut s, list, a, _b) = session_with_list();
        let before = s.resolve(&list);
        let misses = s.resolved_count();
        s.set_attr(&a, A_LABEL, AttrValue::Str("opener".into())).unwrap();
        s.set_attr(&a, A_COLOR, AttrValue::Str("#123456".into())).unwrap();
        assert_eq!(s.resolve(&list), before);
        assert_eq!(s.resolved_count(), misses);
        // cosmetic overrides never mark the item as modified
        assert!(!s.resolve(&a).is_modified);
    }

    #[test]
    fn test_remove_item_updates_parent_timing() {
        let (mut s, list, a, b) = session_with_list();
        assert_eq!(s.resolve(&list).duration, 30.0);
        s.remove_item(&a).unwrap();
        assert_eq!(s.resolve(&list).duration, 20.0);
        // sibling indices renumbered dense
        assert_eq!(s.item(&b).unwrap().index, 0);
    }

    #[test]
    fn test_group_and_breakdown_roundtrip() {
        let (mut s, list, a, b) = session_with_list();
        let grp = s.group(&[a.clone(), b.clone()]).unwrap();
        assert_eq!(s.children(&grp), vec![a.clone(), b.clone()]);
        assert_eq!(s.resolve(&grp).duration, 30.0);
        assert_eq!(s.resolve(&list).duration, 30.0);

        s.breakdown(&grp).unwrap();
        assert!(s.item(&grp).is_none());
        assert_eq!(s.children(&list), vec![a, b]);
        assert_eq!(s.resolve(&list).duration, 30.0);
    }

    #[test]
    fn test_cycle_move_rejected_and_timing_intact() {
        let (mut s, list, a, _b) = session_with_list();
        assert_eq!(s.resolve(&list).duration, 30.0);
        let err = s
            .move_items(&[Placement {
                id: list.clone(),
                parent: a.clone(),
                track: 0,
                index: 0,
            }])
            .unwrap_err();
        assert_eq!(err, TreeError::Cycle(list.clone()));
        assert_eq!(s.item(&a).unwrap().parent.as_deref(), Some(list.as_str()));
        assert_eq!(s.resolve(&list).duration, 30.0);
    }

    #[test]
    fn test_snapshot_overwrites_and_clears_dirty() {
        let (mut s, _list, a, _b) = session_with_list();
        s.set_attr(&a, A_DURATION, AttrValue::Float(99.0)).unwrap();
        assert!(s.is_dirty());

        let mut fresh = Item::new(ROOT_ID, "b.mp4");
        fresh.index = 0;
        let fresh_id = fresh.id.clone();
        s.apply_snapshot(vec![fresh]);

        assert!(!s.is_dirty());
        assert!(s.item(&a).is_none());
        assert_eq!(s.resolve(ROOT_ID).duration, 20.0);
        assert_eq!(s.resolve(&fresh_id).duration, 20.0);
    }

    #[test]
    fn test_media_warning_suppressed_while_transferring() {
        let mut s = Session::new(media());
        let missing = s.add_item(ROOT_ID, 0, "pending.mp4").unwrap();
        assert!(s.media_warning(&missing).is_some());

        s.set_upload(
            missing.clone(),
            TransferStatus {
                state: TransferState::Active,
                bytes: 512,
                total: 4096,
            },
        );
        assert!(s.media_warning(&missing).is_none());

        s.set_upload(
            missing.clone(),
            TransferStatus {
                state: TransferState::Failed,
                bytes: 512,
                total: 4096,
            },
        );
        assert!(s.media_warning(&missing).is_some());

        // sentinels never warn
        let empty = s.add_item(ROOT_ID, 0, F_EMPTY).unwrap();
        assert!(s.media_warning(&empty).is_none());
    }
}
