use anyhow::{Context, Result};
use changes_config::FilePreferenceStore;
use changes_viewer::{
    ChangesAction, ChangesController, ChangesEvent, ChangesSession, DiffFetcher, LayoutStyle,
    LoadState, ScrollEmitter,
};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

mod fetchers;
mod logger;
mod render;

use fetchers::{FileDiffFetcher, GhCliDiffFetcher};

/// Show the files changed between two revisions of a repository.
#[derive(Parser, Debug)]
#[command(name = "pr-changes", version, about)]
struct Args {
    /// Repository as OWNER/NAME
    #[arg(long, required_unless_present = "diff_file")]
    repo: Option<String>,

    /// Base revision of the comparison
    #[arg(long)]
    target: Option<String>,

    /// Head revision of the comparison
    #[arg(long)]
    source: Option<String>,

    /// Read the diff from a local file instead of fetching it
    #[arg(long, value_name = "PATH")]
    diff_file: Option<PathBuf>,

    /// GitHub host for Enterprise installations
    #[arg(long)]
    hostname: Option<String>,

    /// Layout to store and use: side-by-side or line-by-line
    #[arg(long)]
    layout: Option<LayoutStyle>,

    /// Wrap long lines (stored for next time)
    #[arg(long)]
    line_breaks: Option<bool>,

    /// Simulated scroll offset of the page
    #[arg(long, value_name = "OFFSET")]
    scroll: Option<u32>,

    /// User whose preferences are read and written
    #[arg(long)]
    user: Option<String>,

    /// Print every hunk after the file list
    #[arg(long)]
    hunks: bool,

    /// Render without review affordances
    #[arg(long)]
    read_only: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    match logger::init() {
        Ok(path) => log::info!("Starting pr-changes, logging to {:?}", path),
        Err(e) => eprintln!("Warning: logging disabled: {:#}", e),
    }

    let user = args
        .user
        .clone()
        .unwrap_or_else(changes_config::current_user);
    let store = FilePreferenceStore::open_for_user(&user)
        .with_context(|| format!("Failed to open preferences for {}", user))?;
    log::debug!("Using preferences at {:?}", store.path());

    let controller = ChangesController::new(store).with_read_only(args.read_only);

    let fetcher: Arc<dyn DiffFetcher> = match &args.diff_file {
        Some(path) => Arc::new(FileDiffFetcher::new(path)),
        None => Arc::new(GhCliDiffFetcher::new(args.hostname.clone())),
    };
    let mut session = ChangesSession::new(controller, fetcher);
    let emitter = ScrollEmitter::new();
    session.mount(&emitter);

    if let Some(style) = args.layout {
        session.dispatch(ChangesAction::SetLayoutStyle(style));
    }
    if let Some(enabled) = args.line_breaks {
        session.dispatch(ChangesAction::SetLineBreaks(enabled));
    }

    session.dispatch(ChangesAction::SetComparison {
        repository: args.repo.clone().unwrap_or_else(|| "local".to_string()),
        target: args.target.clone(),
        source: args.source.clone(),
    });

    for event in session.settle().await {
        if let ChangesEvent::LoadFailed(error) = event {
            log::error!("Failed to load changes: {}", error);
        }
    }

    if let Some(offset) = args.scroll {
        emitter.emit(offset);
        for event in session.drain_pending() {
            if let ChangesEvent::StickyChanged(stuck) = event {
                log::debug!("Scrolled to {}, sticky: {}", offset, stuck);
            }
        }
    }

    let controller = session.controller();
    if matches!(controller.load_state(), LoadState::Idle) {
        println!("Select a target and a source revision to compare.");
        return Ok(ExitCode::SUCCESS);
    }

    print!(
        "{}",
        render::render(&controller.view_model(), controller.comparison(), args.hunks)
    );

    session.unmount();
    log::info!("Exiting pr-changes");

    if matches!(session.controller().load_state(), LoadState::Error(_)) {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
