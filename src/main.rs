use std::fs::File;
use std::path::PathBuf;

use clap::Parser;
use cxview::core::config::{CliOverrides, load_config, resolve};
use cxview::core::snapshot::{Snapshot, load_feed, load_snapshot};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

#[derive(Parser)]
#[command(name = "cxview", about = "Terminal dashboard for agent conversation contexts")]
struct Args {
    /// Snapshot file (contexts plus conversation items)
    #[arg(short, long)]
    snapshot: Option<PathBuf>,

    /// Event feed to replay (JSON lines)
    #[arg(short, long)]
    events: Option<PathBuf>,

    /// Config file (defaults to ~/.cxview/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Render child_context_id references as plain text
    #[arg(long)]
    no_links: bool,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to cxview.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();

    if let Ok(log_file) = File::create("cxview.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    log::info!("cxview starting up");

    let file_config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e}");
            eprintln!("cxview: {e}");
            std::process::exit(1);
        }
    };
    let config = resolve(
        &file_config,
        &CliOverrides {
            snapshot: args.snapshot,
            events: args.events,
            no_links: args.no_links,
        },
    );

    let snapshot = match config.snapshot_path.as_deref() {
        Some(path) => match load_snapshot(path) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::error!("Failed to load snapshot {}: {e}", path.display());
                eprintln!("cxview: {}: {e}", path.display());
                std::process::exit(1);
            }
        },
        None => {
            log::info!("No snapshot configured, starting empty");
            Snapshot::default()
        }
    };

    let feed = match config.events_path.as_deref() {
        Some(path) => match load_feed(path) {
            Ok(feed) => feed,
            Err(e) => {
                log::error!("Failed to load event feed {}: {e}", path.display());
                eprintln!("cxview: {}: {e}", path.display());
                std::process::exit(1);
            }
        },
        None => Vec::new(),
    };

    cxview::tui::run(config, snapshot, feed)
}
