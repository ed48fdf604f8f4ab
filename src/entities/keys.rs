//! Attribute key constants for Attrs access.
//!
//! Avoid string typos, enable IDE autocomplete.
//! Usage: `item.attrs.get_f64(A_DURATION)`

// === Playlist mode constants (i32) ===
/// Normal playlist - children form a navigable sub-menu
pub const MODE_NORMAL: i32 = 0;
/// Merged playlist - children presented as one continuous timeline
pub const MODE_MERGED: i32 = 1;
/// Dual-track playlist - two parallel child tracks played together
pub const MODE_DUAL_TRACK: i32 = 2;

// === Timing overrides ===
/// Explicit play duration in seconds (overrides media duration)
pub const A_DURATION: &str = "duration";
/// Clip subrange start within the source (seconds)
pub const A_CLIP_START: &str = "clip_start";
/// Clip subrange end within the source (seconds)
pub const A_CLIP_END: &str = "clip_end";
/// Starting phase within the clip subrange (seconds)
pub const A_CLIP_OFFSET: &str = "clip_offset";
/// Loop count over the clip subrange (may be fractional)
pub const A_CLIP_LOOPS: &str = "clip_loops";

// === Playlist behavior ===
/// Playlist mode (MODE_NORMAL / MODE_MERGED / MODE_DUAL_TRACK)
pub const A_MODE: &str = "playlist_mode";
/// Dual-track: end when the shortest track runs out
pub const A_END_ON_SHORTEST: &str = "end_on_shortest_track";

// === Cosmetic (never affect timing, excluded from is_modified) ===
/// User-facing label
pub const A_LABEL: &str = "label";
/// Display color
pub const A_COLOR: &str = "color";

// === Transfers ===
/// Upload slot id when the media is still being transferred
pub const A_UPLOAD_ID: &str = "upload_id";

/// Keys that are purely presentational. Writing one never invalidates
/// derived timing and never marks the item as modified.
pub const COSMETIC_KEYS: &[&str] = &[A_LABEL, A_COLOR];

// === Special filename sentinels ===
/// Empty slot placeholder
pub const F_EMPTY: &str = "!empty";
/// Macro action slot
pub const F_MACRO: &str = "!macro";
/// Intertitle / title-card
pub const F_INTERTITLE: &str = "!intertitle";
/// RTMP live input placeholder
pub const F_LIVE: &str = "!live";
/// Playlist exit marker - aggregation stops here
pub const F_EXIT: &str = "!exit";
/// Sub-playlist container marker
pub const F_PLAYLIST: &str = "!playlist";
