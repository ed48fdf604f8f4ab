use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use cuelist::cli::Args;
use cuelist::config::ROOT_ID;
use cuelist::entities::Item;
use cuelist::media::{MediaInfo, StaticMedia};
use cuelist::session::Session;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let raw = std::fs::read_to_string(&args.session)
        .with_context(|| format!("reading session {}", args.session.display()))?;
    let items: Vec<Item> = serde_json::from_str(&raw).context("parsing session JSON")?;
    info!("loaded {} items from {}", items.len(), args.session.display());

    let mut media = StaticMedia::new();
    if let Some(path) = &args.media {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading media table {}", path.display()))?;
        let table: std::collections::HashMap<String, MediaInfo> =
            serde_json::from_str(&raw).context("parsing media JSON")?;
        for (filename, entry) in table {
            media.insert(filename, entry);
        }
    }

    let session = Session::from_items(items, Box::new(media));
    let node = args.node.as_deref().unwrap_or(ROOT_ID);
    let ud = session.resolve(node);

    println!(
        "{}: duration {:.3}s  media {:.3}s  timeline {:.0}s{}",
        ud.name,
        ud.duration,
        ud.media_duration,
        ud.timeline_duration,
        if ud.is_modified { "  [modified]" } else { "" }
    );

    if args.chapters {
        for ch in &ud.chapters {
            println!(
                "  chapter {:>3}  {:>9.3} .. {:<9.3}  {}",
                ch.index,
                ch.start,
                ch.end,
                ch.title.as_deref().or(ch.id.as_deref()).unwrap_or("-")
            );
        }
    }

    if args.segments {
        match &ud.clipping {
            Some(clipping) => {
                for (i, seg) in clipping.segments().iter().enumerate() {
                    println!(
                        "  segment {:>3}  {:>9.3} .. {:<9.3}  ({:.3}s)",
                        i, seg.start, seg.end, seg.duration
                    );
                }
            }
            None => println!("  (not clipped)"),
        }
    }

    if args.tree {
        print_subtree(&session, node, 1);
    }

    if args.warnings {
        for item in session.tree().iter() {
            if let Some(warning) = session.media_warning(&item.id) {
                println!("  warning: {}: {}", item.id, warning);
            }
        }
    }

    Ok(())
}

fn print_subtree(session: &Session, id: &str, depth: usize) {
    for cid in session.children(id) {
        let ud = session.resolve(&cid);
        let track = session.item(&cid).map(|i| i.track).unwrap_or(0);
        println!(
            "{}[{}] {}  {:.3}s @ {:.3}",
            "  ".repeat(depth),
            track,
            ud.name,
            ud.duration,
            ud.start
        );
        print_subtree(session, &cid, depth + 1);
    }
}
