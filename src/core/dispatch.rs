//! # Dispatcher
//!
//! Runs the interactive loop: block on the next key, resolve it to an
//! [`Action`], run the action to completion, re-render, repeat.
//!
//! ```text
//!   ┌──────────────┐  Key   ┌────────────┐  Action  ┌─────────────────────┐
//!   │ TerminalPort │ ─────▶ │ from_key() │ ───────▶ │ Dispatcher::handle  │
//!   └──────▲───────┘        └────────────┘          │  Viewport / Store / │
//!          │ render(Screen)                          │  Prober / Remote    │
//!          └─────────────────────────────────────────┴─────────────────────┘
//! ```
//!
//! Reading the next key is the only place the loop waits. Actions never
//! overlap, so the viewport and the record cache need no locking. Probe
//! batches and remote deletes are async underneath; the dispatcher blocks
//! on them through the runtime handle, so no input is read until they settle.
//!
//! Nothing here knows about a concrete terminal library: the adapter in
//! `tui` implements [`TerminalPort`].

use std::fmt;
use std::io;
use std::sync::Arc;

use chrono::Utc;
use log::{debug, info, warn};
use tokio::runtime::Handle;

use crate::core::action::{Action, Effect, Key};
use crate::core::link::Link;
use crate::core::store::{RecordStore, StoreError};
use crate::core::viewport::Viewport;
use crate::pocket::{PocketError, RemoteDeleter};
use crate::probe::{self, Prober};

/// Rows below the record list reserved for the status line.
pub const STATUS_LINE_HEIGHT: u16 = 2;

/// Record rows available in a terminal with `rows` lines.
pub fn window_height(rows: u16) -> usize {
    usize::from(rows.saturating_sub(STATUS_LINE_HEIGHT)).max(1)
}

/// Everything a render pass needs, borrowed from the dispatcher.
#[derive(Debug)]
pub struct Screen<'a> {
    /// Records in the visible window, top to bottom.
    pub rows: &'a [Link],
    /// Selected row within `rows`.
    pub selected_row: Option<usize>,
    /// Size of the whole collection.
    pub total: usize,
    /// Transient status text; `None` shows the default line.
    pub status_message: Option<&'a str>,
}

/// Platform-bound terminal I/O.
pub trait TerminalPort {
    /// Visible `(rows, cols)`.
    fn size(&self) -> io::Result<(u16, u16)>;

    fn render(&mut self, screen: &Screen<'_>) -> io::Result<()>;

    /// Block until the next key arrives.
    fn read_key(&mut self) -> io::Result<Key>;
}

/// Opens a URL outside the terminal (the system browser).
pub trait LinkOpener {
    fn open(&self, url: &str) -> io::Result<()>;
}

/// Why the selected record was not deleted.
#[derive(Debug)]
pub enum DeleteError {
    /// The remote side did not confirm the delete.
    RemoteDeleteUnconfirmed,
    /// The remote request itself failed.
    Remote(PocketError),
    /// Remote delete succeeded but the local record could not be removed.
    Store(StoreError),
}

impl fmt::Display for DeleteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeleteError::RemoteDeleteUnconfirmed => {
                write!(f, "delete was not confirmed by Pocket")
            }
            DeleteError::Remote(e) => write!(f, "{e}"),
            DeleteError::Store(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for DeleteError {}

/// Collaborators the dispatcher drives besides the store.
pub struct Services {
    pub remote: Arc<dyn RemoteDeleter>,
    pub opener: Box<dyn LinkOpener>,
    pub prober: Prober,
    pub runtime: Handle,
}

pub struct Dispatcher<S: RecordStore> {
    store: S,
    services: Services,
    /// Ordered snapshot of the store, refreshed after every mutation.
    records: Vec<Link>,
    viewport: Viewport,
    status_message: Option<String>,
}

impl<S: RecordStore> Dispatcher<S> {
    pub fn new(store: S, services: Services, window_height: usize) -> Self {
        let records = store.ordered_records();
        Self {
            store,
            services,
            records,
            viewport: Viewport::new(window_height),
            status_message: None,
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn records(&self) -> &[Link] {
        &self.records
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn selected(&self) -> Option<&Link> {
        self.viewport
            .selected_index(self.records.len())
            .and_then(|idx| self.records.get(idx))
    }

    pub fn screen(&self) -> Screen<'_> {
        let len = self.records.len();
        let range = self.viewport.visible_range(len);
        Screen {
            rows: &self.records[range],
            selected_row: self
                .viewport
                .selected_index(len)
                .map(|_| self.viewport.selection()),
            total: len,
            status_message: self.status_message.as_deref(),
        }
    }

    fn render<P: TerminalPort>(&self, port: &mut P) -> io::Result<()> {
        port.render(&self.screen())
    }

    /// The blocking interaction loop. Returns when the user quits.
    pub fn run<P: TerminalPort>(&mut self, port: &mut P) -> io::Result<()> {
        info!("Viewer started with {} links", self.records.len());
        self.render(port)?;
        loop {
            let key = port.read_key()?;
            let Some(action) = Action::from_key(key) else {
                continue;
            };
            if self.handle(action, port)? == Effect::Quit {
                info!("Viewer quit");
                return Ok(());
            }
            self.render(port)?;
        }
    }

    /// Run one action to completion. Only terminal I/O errors escape; every
    /// other failure ends up on the status line.
    pub fn handle<P: TerminalPort>(&mut self, action: Action, port: &mut P) -> io::Result<Effect> {
        debug!("Dispatching {:?}", action);
        self.status_message = None;
        let len = self.records.len();
        match action {
            Action::Quit => return Ok(Effect::Quit),
            Action::MoveUp => self.viewport.move_up(),
            Action::MoveDown => self.viewport.move_down(len),
            Action::PageUp => self.viewport.page_up(len),
            Action::PageDown => self.viewport.page_down(len),
            Action::JumpFirst => self.viewport.jump_to_first(),
            Action::JumpLast => self.viewport.jump_to_last(len),
            Action::OpenSelected => self.open_selected(),
            Action::DeleteSelected => {
                let Some(link) = self.selected().cloned() else {
                    return Ok(Effect::None);
                };
                self.status_message = Some(format!(
                    "Deleting link \"{}\"",
                    collapse_whitespace(link.title())
                ));
                self.render(port)?;
                self.status_message = match self.delete(&link) {
                    Ok(()) => None,
                    Err(e) => {
                        warn!("Delete of link {} failed: {}", link.id, e);
                        Some(format!("Delete failed: {e}"))
                    }
                };
            }
            Action::CheckLinks => {
                if self.records.is_empty() {
                    return Ok(Effect::None);
                }
                self.status_message = Some(format!("Checking {} links...", self.records.len()));
                self.render(port)?;
                let summary = self.check_links();
                self.status_message = Some(summary);
            }
        }
        Ok(Effect::None)
    }

    /// Remove `link` remotely, and locally only once the remote side
    /// confirmed. The store is left untouched on any failure.
    fn delete(&mut self, link: &Link) -> Result<(), DeleteError> {
        let remote = self.services.remote.clone();
        let confirmation = self
            .services
            .runtime
            .block_on(remote.request_remote_delete(link.id))
            .map_err(DeleteError::Remote)?;
        if !confirmation.confirmed {
            return Err(DeleteError::RemoteDeleteUnconfirmed);
        }
        self.store.delete(link.id).map_err(DeleteError::Store)?;
        info!("Deleted link {}", link.id);
        self.reload();
        Ok(())
    }

    fn open_selected(&mut self) {
        let Some(url) = self.selected().and_then(|l| l.url()).map(String::from) else {
            return;
        };
        if let Err(e) = self.services.opener.open(&url) {
            warn!("Failed to open {}: {}", url, e);
            self.status_message = Some(format!("Failed to open link: {e}"));
        }
    }

    /// Probe every record, write the results back and return a summary.
    fn check_links(&mut self) -> String {
        let prober = self.services.prober.clone();
        let report = self
            .services
            .runtime
            .block_on(prober.probe(self.records.clone()));
        let updated = probe::apply_results(&mut self.store, &report, Utc::now());
        debug!("Recorded {} probe results", updated);
        self.reload();
        probe::summarize(&report)
    }

    /// Re-read the store and pull the viewport back into range.
    fn reload(&mut self) {
        self.records = self.store.ordered_records();
        self.viewport.clamp(self.records.len());
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
