mod cli;

use clap::{CommandFactory, FromArgMatches};
use cli::Cli;
use mimalloc::MiMalloc;
use script_tree::Script;
use session::{EditSession, SessionConfig};
use std::error::Error;
use std::time::{Duration, Instant};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = Cli::command().get_matches();
    let args = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());
    let changes = args.changes(&matches);
    let config = SessionConfig::default().with_debounce(Duration::from_millis(args.debounce_ms));

    if args.new {
        Script::new_empty().save(&args.path)?;
        log::info!("created {}", args.path.display());
    }
    let mut session = EditSession::open(&args.path, config)?;

    // replayed changes arrive as one burst, reconciled as the burst breaks
    // and once more at the end
    let now = Instant::now();
    for change in changes {
        if let Some(outcome) = session.record_change(change, now)? {
            log::info!("updated {}", outcome.node_id);
        }
    }
    if let Some(outcome) = session.flush() {
        log::info!("updated {}", outcome.node_id);
    }
    if session.is_diverged() {
        log::warn!("some changes fell outside every body and were discarded");
        session.resync()?;
    }

    if args.outline {
        for entry in session.outline() {
            println!("{}{} ({})", "  ".repeat(entry.depth), entry.label, entry.id);
        }
    } else {
        if let Some(title) = session.script().title() {
            println!("# {title}\n");
        }
        print!("{}", session.text());
    }

    // loading may have assigned ids; persist them
    session.save(&args.path)?;
    Ok(())
}
