//! cuelist - playlist timeline resolution engine.
//!
//! Turns a mutable playlist tree (items on up to two tracks, sub-playlists,
//! clip/loop overrides) into concrete play-time intervals, merged-timeline
//! chapters and clip segment schedules, with lazy memoized resolution and
//! synchronous cache invalidation under arbitrary structural edits.

pub mod cli;
pub mod clip;
pub mod config;
pub mod entities;
pub mod media;
pub mod navigator;
pub mod resolver;
pub mod session;
pub mod sync;
pub mod tree;

// Re-export commonly used types
pub use clip::{Clipping, Segment};
pub use entities::{AttrValue, Attrs, Chapter, Item, ItemKind, UserData};
pub use media::{MediaInfo, MediaProvider, StaticMedia, TransferState, TransferStatus};
pub use session::Session;
pub use sync::ItemPatch;
pub use tree::{Placement, Tree, TreeError};
