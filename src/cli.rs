// Just Label It CLI binary

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};

use jli_lib::commands::{
    self, AddLabelRequest, KeyframeTimestampRequest, ListFilesRequest, SearchLabelsQuery,
    UpdateDescriptionRequest,
};
use jli_lib::constants::DEFAULT_LIST_LIMIT;
use jli_lib::db::schema::{Keyframe, Label, Navigation};
use jli_lib::{scanner, LibraryConfig, Store};

#[derive(Parser)]
#[command(name = "jli")]
#[command(about = "Just Label It - describe and label images, video and audio", long_about = None)]
#[command(version)]
struct Cli {
    /// Media root (defaults to current directory)
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,

    /// Database file (overrides JLI_DB and <root>/jli.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the media root and add new files to the catalogue
    Scan,

    /// List catalogued files
    List {
        /// Maximum files to show
        #[arg(long, default_value_t = DEFAULT_LIST_LIMIT)]
        limit: i64,
        #[arg(long, default_value = "0")]
        offset: i64,
    },

    /// Show a file with its labels, keyframes and neighbours
    Show {
        /// File ID (defaults to the first file)
        id: Option<i64>,
    },

    /// Set a file description
    Describe {
        /// File ID
        id: i64,
        description: String,
    },

    /// Attach a label to a file, or to a keyframe with --keyframe
    Label {
        /// File ID, or keyframe ID with --keyframe
        id: i64,
        name: String,
        #[arg(short, long)]
        keyframe: bool,
    },

    /// Detach a label from a file, or from a keyframe with --keyframe
    Unlabel {
        /// File ID, or keyframe ID with --keyframe
        id: i64,
        label_id: i64,
        #[arg(short, long)]
        keyframe: bool,
    },

    /// Search labels by prefix
    Labels {
        #[arg(default_value = "")]
        prefix: String,
    },

    /// Manage keyframes of video and audio files
    Keyframe {
        #[command(subcommand)]
        action: KeyframeAction,
    },
}

#[derive(Subcommand)]
enum KeyframeAction {
    /// Add a keyframe at a timestamp
    Add {
        /// File ID
        file_id: i64,
        /// Timestamp in milliseconds
        timestamp_ms: i64,
    },
    /// Move a keyframe to a new timestamp
    Move { id: i64, timestamp_ms: i64 },
    /// Set a keyframe description
    Describe { id: i64, description: String },
    /// Delete a keyframe
    Rm { id: i64 },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = LibraryConfig::resolve(cli.root, cli.db)?;
    let store = Store::open(&config.db_path)?;

    match cli.command {
        Commands::Scan => cmd_scan(&store, &config),
        Commands::List { limit, offset } => cmd_list(&store, limit, offset),
        Commands::Show { id } => cmd_show(&store, id),
        Commands::Describe { id, description } => {
            commands::update_file_description(&store, id, &UpdateDescriptionRequest { description })?;
            println!("Updated description of file {}", id);
            Ok(())
        }
        Commands::Label { id, name, keyframe } => cmd_label(&store, id, name, keyframe),
        Commands::Unlabel {
            id,
            label_id,
            keyframe,
        } => {
            if keyframe {
                commands::remove_keyframe_label(&store, id, label_id)?;
            } else {
                commands::remove_file_label(&store, id, label_id)?;
            }
            println!("Detached label {}", label_id);
            Ok(())
        }
        Commands::Labels { prefix } => cmd_labels(&store, prefix),
        Commands::Keyframe { action } => cmd_keyframe(&store, action),
    }
}

fn cmd_scan(store: &Store, config: &LibraryConfig) -> Result<()> {
    println!("Scanning {}", config.media_root.display());

    let started = Instant::now();
    let summary = store.ingest(scanner::scan(&config.media_root)?)?;

    println!();
    println!("Scan complete:");
    println!("  Files found:  {}", summary.seen);
    println!("  New:          {}", summary.inserted);
    println!("  Catalogue:    {}", summary.total);
    println!("  Took:         {}", format_duration(started.elapsed().as_millis() as i64));

    Ok(())
}

fn cmd_list(store: &Store, limit: i64, offset: i64) -> Result<()> {
    let page = commands::list_files(
        store,
        &ListFilesRequest {
            limit: Some(limit),
            offset: Some(offset),
        },
    )?;

    println!("Catalogue: {} files total", page.total);
    println!();

    if page.files.is_empty() {
        println!("No files found. Use 'jli scan' to add media.");
        return Ok(());
    }

    println!("{:>5}  {:>6}  {}", "ID", "Type", "Path");
    println!("{}", "-".repeat(70));

    for file in &page.files {
        println!("{:>5}  {:>6}  {}", file.id, file.media_type, file.path);
    }

    let shown = offset + page.files.len() as i64;
    if shown < page.total {
        println!();
        println!("Showing {} of {} files. Use --offset to see more.", shown, page.total);
    }

    Ok(())
}

fn cmd_show(store: &Store, id: Option<i64>) -> Result<()> {
    let id = match id {
        Some(id) => id,
        None => match commands::first_file(store)? {
            Some(file) => file.id,
            None => {
                println!("Catalogue is empty. Use 'jli scan' to add media.");
                return Ok(());
            }
        },
    };

    let view = commands::view_file(store, id)?;
    let file = &view.file;

    println!("File #{}", file.id);
    println!();
    println!("Path:        {}", file.path);
    println!("Type:        {}", file.media_type);
    if !file.description.is_empty() {
        println!("Description: {}", file.description);
    }
    println!("Created:     {}", file.created_at.to_rfc3339());
    println!("Updated:     {}", file.updated_at.to_rfc3339());
    println!("Labels:      {}", format_labels(&view.labels));

    if !view.keyframes.is_empty() {
        println!();
        println!("Keyframes:");
        for kf in &view.keyframes {
            print_keyframe(kf);
        }
    }

    println!();
    println!("{}", format_position(&view.navigation));

    Ok(())
}

fn cmd_label(store: &Store, id: i64, name: String, keyframe: bool) -> Result<()> {
    let req = AddLabelRequest { name };
    let label = if keyframe {
        commands::add_keyframe_label(store, id, &req)?
    } else {
        commands::add_file_label(store, id, &req)?
    };
    println!("Attached label '{}' (#{})", label.name, label.id);
    Ok(())
}

fn cmd_labels(store: &Store, prefix: String) -> Result<()> {
    let labels = commands::search_labels(store, &SearchLabelsQuery { q: prefix })?;
    if labels.is_empty() {
        println!("No labels found.");
        return Ok(());
    }
    for label in labels {
        println!("{:>5}  {}", label.id, label.name);
    }
    Ok(())
}

fn cmd_keyframe(store: &Store, action: KeyframeAction) -> Result<()> {
    match action {
        KeyframeAction::Add {
            file_id,
            timestamp_ms,
        } => {
            let kf = commands::create_keyframe(
                store,
                file_id,
                &KeyframeTimestampRequest { timestamp_ms },
            )?;
            println!("Created keyframe #{} at {}", kf.id, format_timestamp(kf.timestamp_ms));
        }
        KeyframeAction::Move { id, timestamp_ms } => {
            commands::move_keyframe(store, id, &KeyframeTimestampRequest { timestamp_ms })?;
            println!("Moved keyframe #{} to {}", id, format_timestamp(timestamp_ms));
        }
        KeyframeAction::Describe { id, description } => {
            commands::update_keyframe_description(store, id, &UpdateDescriptionRequest { description })?;
            println!("Updated description of keyframe #{}", id);
        }
        KeyframeAction::Rm { id } => {
            commands::delete_keyframe(store, id)?;
            println!("Deleted keyframe #{}", id);
        }
    }
    Ok(())
}

// --- Helper Functions ---

fn print_keyframe(kf: &Keyframe) {
    let pin = if kf.pinned { "*" } else { " " };
    let mut line = format!(
        "  {}{:>5}  {:>10}  {}",
        pin,
        kf.id,
        format_timestamp(kf.timestamp_ms),
        format_labels(&kf.labels)
    );
    if !kf.description.is_empty() {
        line.push_str(&format!("  \"{}\"", kf.description));
    }
    println!("{}", line);
}

fn format_labels(labels: &[Label]) -> String {
    if labels.is_empty() {
        return "-".to_string();
    }
    labels
        .iter()
        .map(|l| format!("[{}]", l.name))
        .collect::<Vec<_>>()
        .join(" ")
}

/// `index` is already 1-based.
fn format_position(nav: &Navigation) -> String {
    format!(
        "{} of {}  (prev #{}, next #{})",
        nav.index, nav.total, nav.prev_id, nav.next_id
    )
}

fn format_duration(ms: i64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else {
        format!("{:.1}s", ms as f64 / 1000.0)
    }
}

fn format_timestamp(ms: i64) -> String {
    let total_seconds = ms / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    let millis = ms % 1000;

    if hours > 0 {
        format!("{}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
    } else {
        format!("{}:{:02}.{:03}", minutes, seconds, millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_position_single_file() {
        let nav = Navigation {
            prev_id: 1,
            next_id: 1,
            index: 1,
            total: 1,
        };
        assert_eq!(format_position(&nav), "1 of 1  (prev #1, next #1)");
    }

    #[test]
    fn test_format_position_last_file() {
        let store = Store::open_in_memory().unwrap();
        for path in ["a.jpg", "b.jpg", "c.jpg"] {
            store.upsert_media_file(path, jli_lib::db::schema::MediaType::Image).unwrap();
        }
        let last = store.get_media_file_by_path("c.jpg").unwrap().unwrap().id;
        let first = store.get_media_file_by_path("a.jpg").unwrap().unwrap().id;

        let line = format_position(&store.navigation(last).unwrap());
        assert!(line.starts_with("3 of 3"), "{}", line);
        assert!(line.ends_with(&format!("next #{})", first)), "{}", line);
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "0:00.000");
        assert_eq!(format_timestamp(61_250), "1:01.250");
        assert_eq!(format_timestamp(3_723_004), "1:02:03.004");
    }
}
