//! Tree - flat id-keyed arena of items with a cached children index.
//!
//! The playlist is a forest rooted at the single root item: every item holds
//! a parent id, placement is a `(track, index)` pair. Children lists are
//! derived from the flat collection on demand and cached per parent; any
//! structural edit (add / remove / reparent / reorder) drops the affected
//! cache entries before it returns.
//!
//! Reparenting is validated with a global reachability check across the
//! whole batch of moves: a move set that would make any item its own
//! ancestor is rejected before commit and the tree is left unchanged.

use indexmap::IndexMap;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;

use crate::config::ROOT_ID;
use crate::entities::Item;

/// Structural mutation failures. Everything else in the engine degrades to
/// values; these are the only hard rejections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// Referenced item id is not in the arena.
    NotFound(String),
    /// The move batch would make this item its own ancestor.
    Cycle(String),
    /// The root cannot be moved or removed.
    RootImmutable,
}

impl std::fmt::Display for TreeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TreeError::NotFound(id) => write!(f, "item not found: {}", id),
            TreeError::Cycle(id) => write!(f, "move would make {} its own ancestor", id),
            TreeError::RootImmutable => write!(f, "the root item cannot be moved or removed"),
        }
    }
}

impl std::error::Error for TreeError {}

/// One placement change inside a move batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub id: String,
    pub parent: String,
    pub track: u8,
    pub index: i32,
}

/// Flat arena of items plus the derived, cached "children of" index.
#[derive(Debug, Serialize, Deserialize)]
pub struct Tree {
    items: IndexMap<String, Item>,
    /// Per-parent ordered child ids, (track, index) ascending. Lazily
    /// rebuilt after invalidation; RefCell because reads are &self and the
    /// engine is single-threaded by contract.
    #[serde(skip)]
    children: RefCell<HashMap<String, Vec<String>>>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Empty tree holding only the root.
    pub fn new() -> Self {
        let mut items = IndexMap::new();
        items.insert(ROOT_ID.to_string(), Item::root());
        Self {
            items,
            children: RefCell::new(HashMap::new()),
        }
    }

    /// Build from a flat item list (session load / authoritative snapshot).
    /// A missing root is supplied; items pointing at unknown parents are
    /// reparented under the root rather than dropped.
    pub fn from_items(items: Vec<Item>) -> Self {
        let mut map: IndexMap<String, Item> = IndexMap::with_capacity(items.len() + 1);
        if !items.iter().any(|i| i.id == ROOT_ID) {
            map.insert(ROOT_ID.to_string(), Item::root());
        }
        for item in items {
            map.insert(item.id.clone(), item);
        }
        let known: Vec<String> = map.keys().cloned().collect();
        for item in map.values_mut() {
            if item.id == ROOT_ID {
                item.parent = None;
                continue;
            }
            match &item.parent {
                Some(p) if known.contains(p) => {}
                _ => item.parent = Some(ROOT_ID.to_string()),
            }
        }
        Self {
            items: map,
            children: RefCell::new(HashMap::new()),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Item> {
        self.items.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.len() <= 1
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    /// Flat snapshot of all items in arena order.
    pub fn snapshot(&self) -> Vec<Item> {
        self.items.values().cloned().collect()
    }

    /// Ordered direct children of `id`, both tracks, `(track, index)`
    /// ascending. An embedded child list on the item overrides the derived
    /// lookup verbatim.
    pub fn children(&self, id: &str) -> Vec<String> {
        if let Some(item) = self.items.get(id) {
            if let Some(embedded) = &item.embedded {
                return embedded.clone();
            }
        }
        if let Some(cached) = self.children.borrow().get(id) {
            return cached.clone();
        }
        let mut kids: Vec<&Item> = self
            .items
            .values()
            .filter(|i| i.parent.as_deref() == Some(id))
            .collect();
        // stable sort: insertion order breaks (track, index) ties
        kids.sort_by_key(|i| (i.track, i.index));
        let ids: Vec<String> = kids.into_iter().map(|i| i.id.clone()).collect();
        trace!("tree: index rebuilt for {} ({} children)", id, ids.len());
        self.children.borrow_mut().insert(id.to_string(), ids.clone());
        ids
    }

    /// Ordered direct children on one track.
    pub fn children_on_track(&self, id: &str, track: u8) -> Vec<String> {
        self.children(id)
            .into_iter()
            .filter(|cid| self.items.get(cid).map(|i| i.track) == Some(track))
            .collect()
    }

    pub(crate) fn invalidate_children(&self, id: &str) {
        self.children.borrow_mut().remove(id);
    }

    /// Parent chain of `id`, nearest first, root last. Empty for the root
    /// or an unknown id.
    pub fn ancestors(&self, id: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut cur = self.items.get(id).and_then(|i| i.parent.clone());
        // loop bound guards a corrupted arena; a healthy tree exits early
        for _ in 0..self.items.len() {
            match cur {
                Some(p) => {
                    cur = self.items.get(&p).and_then(|i| i.parent.clone());
                    out.push(p);
                }
                None => break,
            }
        }
        out
    }

    /// All ids in the subtree under `id`, excluding `id` itself.
    pub fn descendants(&self, id: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut stack = self.children(id);
        while let Some(cid) = stack.pop() {
            stack.extend(self.children(&cid));
            out.push(cid);
        }
        out
    }

    /// Insert a new item. Its parent must exist.
    pub fn insert(&mut self, item: Item) -> Result<(), TreeError> {
        let parent = match &item.parent {
            Some(p) => p.clone(),
            None => return Err(TreeError::RootImmutable),
        };
        if !self.items.contains_key(&parent) {
            return Err(TreeError::NotFound(parent));
        }
        debug!("tree: insert {} under {}", item.id, parent);
        self.items.insert(item.id.clone(), item);
        self.invalidate_children(&parent);
        Ok(())
    }

    /// Remove an item and its whole subtree. Returns the removed ids
    /// (the item first, then descendants).
    pub fn remove(&mut self, id: &str) -> Result<Vec<String>, TreeError> {
        if id == ROOT_ID {
            return Err(TreeError::RootImmutable);
        }
        let parent = match self.items.get(id) {
            Some(item) => item.parent.clone(),
            None => return Err(TreeError::NotFound(id.to_string())),
        };
        let mut removed = vec![id.to_string()];
        removed.extend(self.descendants(id));
        for rid in &removed {
            self.items.shift_remove(rid);
            self.invalidate_children(rid);
        }
        if let Some(p) = parent {
            self.invalidate_children(&p);
        }
        debug!("tree: removed {} ({} items)", id, removed.len());
        Ok(removed)
    }

    /// Validate a move batch: every moved item's new parent chain, with the
    /// whole batch applied, must reach the root without passing through the
    /// item itself.
    pub fn check_moves(&self, moves: &[Placement]) -> Result<(), TreeError> {
        let reassigned: HashMap<&str, &str> = moves
            .iter()
            .map(|m| (m.id.as_str(), m.parent.as_str()))
            .collect();
        for mv in moves {
            if mv.id == ROOT_ID {
                return Err(TreeError::RootImmutable);
            }
            if !self.items.contains_key(&mv.id) {
                return Err(TreeError::NotFound(mv.id.clone()));
            }
            if !self.items.contains_key(&mv.parent) {
                return Err(TreeError::NotFound(mv.parent.clone()));
            }
            let mut cur = mv.parent.as_str();
            for _ in 0..=self.items.len() {
                if cur == mv.id {
                    return Err(TreeError::Cycle(mv.id.clone()));
                }
                if cur == ROOT_ID {
                    break;
                }
                cur = match reassigned.get(cur) {
                    Some(p) => p,
                    None => match self.items.get(cur).and_then(|i| i.parent.as_deref()) {
                        Some(p) => p,
                        None => break,
                    },
                };
            }
        }
        Ok(())
    }

    /// Apply a validated move batch. Returns the set of parents whose
    /// children changed (old and new), for cache invalidation upstream.
    pub fn apply_moves(&mut self, moves: &[Placement]) -> Result<Vec<String>, TreeError> {
        self.check_moves(moves)?;
        let mut touched = Vec::new();
        for mv in moves {
            let item = self
                .items
                .get_mut(&mv.id)
                .ok_or_else(|| TreeError::NotFound(mv.id.clone()))?;
            if let Some(old) = item.parent.clone() {
                if !touched.contains(&old) {
                    touched.push(old);
                }
            }
            item.parent = Some(mv.parent.clone());
            item.track = mv.track;
            item.index = mv.index;
            if !touched.contains(&mv.parent) {
                touched.push(mv.parent.clone());
            }
        }
        for p in &touched {
            self.invalidate_children(p);
            self.normalize_indices(p);
        }
        debug!("tree: moved {} items, {} parents touched", moves.len(), touched.len());
        Ok(touched)
    }

    /// Re-number sibling indices to dense 0..n-1 per track, preserving the
    /// current order. Keeps the "ties only as a degenerate case" invariant.
    pub fn normalize_indices(&mut self, parent: &str) {
        for track in 0..=1u8 {
            let ordered = self.children_on_track(parent, track);
            for (i, cid) in ordered.iter().enumerate() {
                if let Some(item) = self.items.get_mut(cid) {
                    item.index = i as i32;
                }
            }
        }
        self.invalidate_children(parent);
    }

    /// Replace the whole arena (authoritative snapshot). All child caches
    /// are dropped.
    pub fn replace_all(&mut self, items: Vec<Item>) {
        *self = Tree::from_items(items);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placed(parent: &str, filename: &str, track: u8, index: i32) -> Item {
        let mut item = Item::new(parent, filename);
        item.track = track;
        item.index = index;
        item
    }

    fn build() -> (Tree, String, String, String) {
        let mut tree = Tree::new();
        let list = placed(ROOT_ID, crate::entities::keys::F_PLAYLIST, 0, 0);
        let list_id = list.id.clone();
        tree.insert(list).unwrap();
        let a = placed(&list_id, "a.mp4", 0, 0);
        let a_id = a.id.clone();
        tree.insert(a).unwrap();
        let b = placed(&list_id, "b.mp4", 0, 1);
        let b_id = b.id.clone();
        tree.insert(b).unwrap();
        (tree, list_id, a_id, b_id)
    }

    #[test]
    fn test_children_ordered_by_track_then_index() {
        let mut tree = Tree::new();
        let ids: Vec<String> = [(1u8, 1), (0, 1), (1, 0), (0, 0)]
            .iter()
            .map(|(t, i)| {
                let item = placed(ROOT_ID, "x.mp4", *t, *i);
                let id = item.id.clone();
                tree.insert(item).unwrap();
                id
            })
            .collect();
        let kids = tree.children(ROOT_ID);
        assert_eq!(kids, vec![ids[3].clone(), ids[1].clone(), ids[2].clone(), ids[0].clone()]);
        assert_eq!(tree.children_on_track(ROOT_ID, 1).len(), 2);
    }

    #[test]
    fn test_embedded_list_overrides_derived_lookup() {
        let (mut tree, list_id, a_id, b_id) = build();
        tree.get_mut(&list_id).unwrap().embedded = Some(vec![b_id.clone(), a_id.clone()]);
        assert_eq!(tree.children(&list_id), vec![b_id, a_id]);
    }

    #[test]
    fn test_reparent_invalidates_both_parents() {
        let (mut tree, list_id, a_id, _b) = build();
        assert_eq!(tree.children(&list_id).len(), 2);
        assert_eq!(tree.children(ROOT_ID).len(), 1);

        tree.apply_moves(&[Placement {
            id: a_id.clone(),
            parent: ROOT_ID.to_string(),
            track: 0,
            index: 5,
        }])
        .unwrap();

        assert_eq!(tree.children(&list_id).len(), 1);
        let root_kids = tree.children(ROOT_ID);
        assert_eq!(root_kids.len(), 2);
        // indices renumbered dense after the move
        assert_eq!(tree.get(&a_id).unwrap().index, 1);
    }

    #[test]
    fn test_cycle_rejected_and_tree_unchanged() {
        let (mut tree, list_id, a_id, _b) = build();
        let before = tree.snapshot();

        // direct cycle: parent under its own child
        let err = tree
            .apply_moves(&[Placement {
                id: list_id.clone(),
                parent: a_id.clone(),
                track: 0,
                index: 0,
            }])
            .unwrap_err();
        assert_eq!(err, TreeError::Cycle(list_id.clone()));
        assert_eq!(tree.snapshot(), before);

        // self cycle
        let err = tree
            .apply_moves(&[Placement {
                id: a_id.clone(),
                parent: a_id.clone(),
                track: 0,
                index: 0,
            }])
            .unwrap_err();
        assert_eq!(err, TreeError::Cycle(a_id.clone()));
    }

    #[test]
    fn test_batch_cycle_across_two_moves() {
        // A under B and B under A in the same batch: each edge is fine
        // against the pre-image, only the batch-aware walk catches it.
        let (mut tree, _list, a_id, b_id) = build();
        let err = tree
            .apply_moves(&[
                Placement {
                    id: a_id.clone(),
                    parent: b_id.clone(),
                    track: 0,
                    index: 0,
                },
                Placement {
                    id: b_id.clone(),
                    parent: a_id.clone(),
                    track: 0,
                    index: 0,
                },
            ])
            .unwrap_err();
        assert!(matches!(err, TreeError::Cycle(_)));
    }

    #[test]
    fn test_remove_subtree() {
        let (mut tree, list_id, a_id, b_id) = build();
        let removed = tree.remove(&list_id).unwrap();
        assert_eq!(removed.len(), 3);
        assert!(!tree.contains(&a_id));
        assert!(!tree.contains(&b_id));
        assert!(tree.children(ROOT_ID).is_empty());
        assert_eq!(tree.remove("ghost"), Err(TreeError::NotFound("ghost".into())));
        assert_eq!(tree.remove(ROOT_ID), Err(TreeError::RootImmutable));
    }

    #[test]
    fn test_orphans_reattached_on_snapshot_load() {
        let mut orphan = Item::new("missing-parent", "x.mp4");
        orphan.index = 0;
        let id = orphan.id.clone();
        let tree = Tree::from_items(vec![orphan]);
        assert_eq!(tree.get(&id).unwrap().parent.as_deref(), Some(ROOT_ID));
    }
}
