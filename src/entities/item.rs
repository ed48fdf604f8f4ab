//! Item - one entry in the playlist tree.
//!
//! Items are stored flat in the session arena, keyed by id, with parent
//! pointers instead of nested ownership. Placement inside the parent is a
//! `(track, index)` pair: up to two parallel tracks, siblings ordered by
//! index within a track. An item is either a concrete media reference or
//! one of a small set of sentinel filenames (empty slot, macro, intertitle,
//! live input, exit marker, sub-playlist).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::ROOT_ID;

use super::attrs::Attrs;
use super::keys::*;

/// What kind of entry an item's filename denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    /// Concrete media reference (file path / URI)
    Media,
    /// Empty slot placeholder
    Empty,
    /// Macro action
    Macro,
    /// Intertitle / title-card
    Intertitle,
    /// RTMP live input
    Live,
    /// Playlist exit marker
    Exit,
    /// Sub-playlist container
    SubPlaylist,
}

/// One playlist entry: identity, placement, filename, property overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Stable unique id. The root is always `"0"`.
    pub id: String,
    /// Containing item id. `None` only for the root.
    #[serde(default)]
    pub parent: Option<String>,
    /// Which of the two parallel tracks this item occupies (0 or 1).
    #[serde(default)]
    pub track: u8,
    /// Position among siblings sharing (parent, track).
    #[serde(default)]
    pub index: i32,
    /// Media reference or sentinel (see `entities::keys::F_*`).
    pub filename: String,
    /// Optional property overrides.
    #[serde(default)]
    pub attrs: Attrs,
    /// Private child-order override: when set, this exact ordered id list
    /// replaces the derived (track, index) lookup. Used for clipboard and
    /// preview copies; pre-sorted at construction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedded: Option<Vec<String>>,
}

impl Item {
    /// Create a new item with a fresh uuid, unplaced (index 0, track 0).
    pub fn new(parent: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            parent: Some(parent.into()),
            track: 0,
            index: 0,
            filename: filename.into(),
            attrs: Attrs::new(),
            embedded: None,
        }
    }

    /// The distinguished root item.
    pub fn root() -> Self {
        Self {
            id: ROOT_ID.to_string(),
            parent: None,
            track: 0,
            index: 0,
            filename: F_PLAYLIST.to_string(),
            attrs: Attrs::new(),
            embedded: None,
        }
    }

    pub fn is_root(&self) -> bool {
        self.id == ROOT_ID
    }

    pub fn kind(&self) -> ItemKind {
        match self.filename.as_str() {
            F_EMPTY => ItemKind::Empty,
            F_MACRO => ItemKind::Macro,
            F_INTERTITLE => ItemKind::Intertitle,
            F_LIVE => ItemKind::Live,
            F_EXIT => ItemKind::Exit,
            F_PLAYLIST => ItemKind::SubPlaylist,
            _ => ItemKind::Media,
        }
    }

    /// True for any sentinel filename (non-media entry).
    pub fn is_special(&self) -> bool {
        self.kind() != ItemKind::Media
    }

    /// Exit markers stop track aggregation early.
    pub fn is_exit(&self) -> bool {
        self.kind() == ItemKind::Exit
    }

    pub fn is_sub_playlist(&self) -> bool {
        self.kind() == ItemKind::SubPlaylist
    }

    /// Playlist mode: MODE_NORMAL / MODE_MERGED / MODE_DUAL_TRACK.
    pub fn playlist_mode(&self) -> i32 {
        self.attrs.get_i32_or(A_MODE, MODE_NORMAL)
    }

    /// Any non-zero mode merges children into one continuous timeline.
    pub fn is_merged(&self) -> bool {
        self.playlist_mode() != MODE_NORMAL
    }

    pub fn end_on_shortest(&self) -> bool {
        self.attrs.get_bool_or(A_END_ON_SHORTEST, false)
    }

    /// Display name: sentinel kinds have fixed names, media names come
    /// from the filename stem. The cosmetic label attr is deliberately not
    /// consulted here - it must never feed derived (cached) data.
    pub fn display_name(&self) -> String {
        match self.kind() {
            ItemKind::Empty => "Empty".to_string(),
            ItemKind::Macro => "Macro".to_string(),
            ItemKind::Intertitle => "Intertitle".to_string(),
            ItemKind::Live => "Live".to_string(),
            ItemKind::Exit => "Exit".to_string(),
            ItemKind::SubPlaylist => "Playlist".to_string(),
            ItemKind::Media => {
                let base = self
                    .filename
                    .rsplit(['/', '\\'])
                    .next()
                    .unwrap_or(&self.filename);
                match base.rsplit_once('.') {
                    Some((stem, _ext)) if !stem.is_empty() => stem.to_string(),
                    _ => base.to_string(),
                }
            }
        }
    }

    /// Whether any non-cosmetic override is set.
    pub fn is_modified(&self) -> bool {
        self.attrs.has_non_cosmetic()
    }
}
