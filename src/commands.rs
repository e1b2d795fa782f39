//! # Commands
//!
//! One function per CLI subcommand. Each takes the data paths and the
//! collaborators it needs explicitly, prints progress for the user, and
//! returns a typed result so tests can check the outcome.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use log::{info, warn};
use tokio::runtime::Handle;

use crate::core::config::{ConfigError, DataPaths, ResolvedConfig, create_data_dir};
use crate::core::link::Link;
use crate::core::store::{LinkStore, RecordStore, StoreError, StoreStats};
use crate::pocket::{PocketClient, PocketError};
use crate::probe::{self, HttpChecker, ProbeReport, Prober};
use crate::tui;

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum CommandError {
    /// `init` found an existing store.
    AlreadyInitialized(PathBuf),
    /// No store yet; `init` has not run.
    NotInitialized(PathBuf),
    /// Pocket consumer key or access token not configured.
    MissingCredentials,
    Io(io::Error),
    Config(ConfigError),
    Store(StoreError),
    Pocket(PocketError),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::AlreadyInitialized(path) => write!(
                f,
                "link store already exists at {}, try \"pocketmanager reset\" to fully recreate it",
                path.display()
            ),
            CommandError::NotInitialized(path) => write!(
                f,
                "no link store at {}, run \"pocketmanager init\" first",
                path.display()
            ),
            CommandError::MissingCredentials => write!(
                f,
                "Pocket credentials missing (set [pocket] consumer_key/access_token in config.toml \
                 or POCKET_CONSUMER_KEY/POCKET_ACCESS_TOKEN)"
            ),
            CommandError::Io(e) => write!(f, "I/O error: {e}"),
            CommandError::Config(e) => write!(f, "{e}"),
            CommandError::Store(e) => write!(f, "{e}"),
            CommandError::Pocket(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for CommandError {}

impl From<io::Error> for CommandError {
    fn from(e: io::Error) -> Self {
        CommandError::Io(e)
    }
}

impl From<ConfigError> for CommandError {
    fn from(e: ConfigError) -> Self {
        CommandError::Config(e)
    }
}

impl From<StoreError> for CommandError {
    fn from(e: StoreError) -> Self {
        CommandError::Store(e)
    }
}

impl From<PocketError> for CommandError {
    fn from(e: PocketError) -> Self {
        CommandError::Pocket(e)
    }
}

// ============================================================================
// Setup
// ============================================================================

/// Create the data directory, an empty store and an empty sync state.
pub fn init(paths: &DataPaths) -> Result<(), CommandError> {
    if !paths.dir.exists() {
        println!("Creating app home directory at {}", paths.dir.display());
        create_data_dir(&paths.dir)?;
    }
    if paths.store.exists() {
        return Err(CommandError::AlreadyInitialized(paths.store.clone()));
    }
    fs::write(&paths.state, "")?;
    println!("Creating link store {}", paths.store.display());
    LinkStore::create(&paths.store)?;
    Ok(())
}

/// Throw away the store and sync state, then `init` again.
pub fn reset(paths: &DataPaths) -> Result<(), CommandError> {
    for path in [&paths.state, &paths.store] {
        if path.exists() {
            info!("Removing {}", path.display());
            fs::remove_file(path)?;
        }
    }
    init(paths)
}

pub fn open_store(paths: &DataPaths) -> Result<LinkStore, CommandError> {
    if !paths.store.exists() {
        return Err(CommandError::NotInitialized(paths.store.clone()));
    }
    Ok(LinkStore::open(&paths.store)?)
}

pub fn pocket_client(config: &ResolvedConfig) -> Result<PocketClient, CommandError> {
    match (&config.consumer_key, &config.access_token) {
        (Some(key), Some(token)) => Ok(PocketClient::new(
            key.clone(),
            token.clone(),
            Some(config.base_url.clone()),
        )),
        _ => Err(CommandError::MissingCredentials),
    }
}

pub fn build_prober(config: &ResolvedConfig) -> Prober {
    Prober::new(
        Arc::new(HttpChecker::new()),
        config.probe_concurrency,
        config.probe_timeout,
    )
}

// ============================================================================
// Commands
// ============================================================================

pub fn stat(paths: &DataPaths) -> Result<StoreStats, CommandError> {
    let stats = open_store(paths)?.stats();
    println!("Total links: {}", stats.total);
    println!("Unread links: {}", stats.unread);
    println!("Archived links: {}", stats.archived);
    Ok(stats)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateSummary {
    pub changed: usize,
    pub created: usize,
    pub removed: usize,
}

/// Pull every item changed since the last sync into the store.
pub async fn update(paths: &DataPaths, client: &PocketClient) -> Result<UpdateSummary, CommandError> {
    let mut store = open_store(paths)?;
    let started_at = Utc::now().timestamp();
    let since = read_last_sync(&paths.state);

    let items = client.retrieve(since).await?;
    let changed = items.len();
    println!("{changed} links changed, loading them to the store");

    let links: Vec<Link> = items
        .into_iter()
        .filter_map(|item| {
            let item_id = item.item_id.clone();
            let link = item.into_link();
            if link.is_none() {
                warn!("Skipping Pocket item with invalid id {:?}", item_id);
            }
            link
        })
        .collect();
    let created = store.upsert_all(links)?;
    println!(
        "Successfully loaded {} links: {} new, {} updated",
        changed,
        created,
        changed - created
    );

    let removed = store.remove_deleted()?;
    if removed > 0 {
        println!("Removed {removed} links");
    }

    fs::write(&paths.state, started_at.to_string())?;
    Ok(UpdateSummary {
        changed,
        created,
        removed,
    })
}

/// Unix timestamp of the last successful sync, if any.
fn read_last_sync(path: &Path) -> Option<i64> {
    fs::read_to_string(path).ok()?.trim().parse().ok()
}

/// Probe every stored link and record the results.
pub async fn check(paths: &DataPaths, prober: &Prober) -> Result<ProbeReport, CommandError> {
    let mut store = open_store(paths)?;
    let records = store.ordered_records();
    println!("Checking http status of {} saved links...", records.len());

    let report = prober.probe(records).await;

    println!("Updating links data in the store");
    for (status, links) in &report {
        println!("  status {}: {} links", status, links.len());
    }
    let updated = probe::apply_results(&mut store, &report, Utc::now());
    println!("Done! {updated} links updated");
    Ok(report)
}

/// Open the interactive viewer. Blocks until the user quits.
pub fn display(paths: &DataPaths, config: &ResolvedConfig, runtime: Handle) -> Result<(), CommandError> {
    let store = open_store(paths)?;
    let client = pocket_client(config)?;
    tui::run(store, Arc::new(client), build_prober(config), runtime)?;
    Ok(())
}
