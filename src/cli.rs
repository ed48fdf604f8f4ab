use clap::Parser;
use std::path::PathBuf;

/// Playlist timeline resolver
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Session file: JSON array of playlist items
    #[arg(value_name = "SESSION")]
    pub session: PathBuf,

    /// Media metadata table: JSON map of filename -> info
    /// (e.g. {"a.mp4": {"exists": true, "duration": 12.5}})
    #[arg(short = 'm', long = "media", value_name = "FILE")]
    pub media: Option<PathBuf>,

    /// Item to inspect (default: the root playlist)
    #[arg(short = 'n', long = "node", value_name = "ID")]
    pub node: Option<String>,

    /// Print the chapter list of the inspected item
    #[arg(short = 'c', long = "chapters")]
    pub chapters: bool,

    /// Print clip segments of the inspected item (if clipped)
    #[arg(short = 's', long = "segments")]
    pub segments: bool,

    /// Print the resolved tree (durations per item)
    #[arg(short = 't', long = "tree")]
    pub tree: bool,

    /// Print "possibly missing media" warnings
    #[arg(short = 'w', long = "warnings")]
    pub warnings: bool,
}
