//! Entities module - the playlist data model.
//!
//! Items live in a flat id-keyed arena with parent pointers (see
//! `crate::tree`); derived timing lives in per-item `UserData` bundles
//! memoized by the session.

pub mod attrs;
pub mod item;
pub mod keys;
pub mod user_data;

pub use attrs::{AttrValue, Attrs};
pub use item::{Item, ItemKind};
pub use user_data::{Chapter, UserData};
