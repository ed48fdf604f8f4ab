//! Mutation transport types: property-bag diffs keyed by item id.
//!
//! Edits leave the engine as [`ItemPatch`] values handed to an external
//! request layer, and come back either as the same patches (optimistic echo)
//! or as a full authoritative snapshot (`Session::apply_snapshot`). The
//! engine applies patches locally and immediately - invalidation runs as
//! part of the apply, and the session stays marked dirty until the
//! authority confirms with a snapshot.

use serde::{Deserialize, Serialize};

use crate::entities::AttrValue;
use crate::session::Session;
use crate::tree::{Placement, TreeError};

/// A sparse diff against one item. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemPatch {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Property overrides to set, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub set: Vec<(String, AttrValue)>,
    /// Property overrides to remove.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unset: Vec<String>,
}

impl ItemPatch {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn set(mut self, key: impl Into<String>, value: AttrValue) -> Self {
        self.set.push((key.into(), value));
        self
    }

    pub fn unset(mut self, key: impl Into<String>) -> Self {
        self.unset.push(key.into());
        self
    }

    pub fn place(mut self, parent: impl Into<String>, track: u8, index: i32) -> Self {
        self.parent = Some(parent.into());
        self.track = Some(track);
        self.index = Some(index);
        self
    }

    fn is_structural(&self) -> bool {
        self.parent.is_some() || self.track.is_some() || self.index.is_some()
    }
}

impl Session {
    /// Apply one patch locally. Structural parts go through the validated
    /// move path (cycles rejected, tree unchanged); property parts run the
    /// usual write-plus-invalidate.
    pub fn apply_patch(&mut self, patch: &ItemPatch) -> Result<(), TreeError> {
        let (cur_parent, cur_track, cur_index) = {
            let item = self
                .item(&patch.id)
                .ok_or_else(|| TreeError::NotFound(patch.id.clone()))?;
            (item.parent.clone(), item.track, item.index)
        };

        if patch.is_structural() {
            let placement = Placement {
                id: patch.id.clone(),
                parent: patch
                    .parent
                    .clone()
                    .or(cur_parent)
                    .ok_or(TreeError::RootImmutable)?,
                track: patch.track.unwrap_or(cur_track),
                index: patch.index.unwrap_or(cur_index),
            };
            self.move_items(&[placement])?;
        }

        if let Some(filename) = &patch.filename {
            self.set_filename(&patch.id, filename)?;
        }
        for (key, value) in &patch.set {
            self.set_attr(&patch.id, key, value.clone())?;
        }
        for key in &patch.unset {
            self.clear_attr(&patch.id, key)?;
        }
        Ok(())
    }

    /// Apply a batch in order, stopping at the first rejection.
    pub fn apply_patches(&mut self, patches: &[ItemPatch]) -> Result<(), TreeError> {
        for patch in patches {
            self.apply_patch(patch)?;
        }
        Ok(())
    }
}
