//! # TUI Adapter
//!
//! The ratatui-specific layer. Implements [`TerminalPort`] on top of a
//! crossterm terminal, draws the [`Screen`] the dispatcher hands it, and
//! translates keyboard events into [`Key`] values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Redraw Strategy
//!
//! There is no animation and no background work, so the screen is drawn
//! only when the dispatcher asks: once at startup and after every action.
//! Between actions the process sits in a blocking `event::read()`.

mod component;
pub mod components;
mod event;
mod ui;

use log::{info, warn};
use std::io::{self, stdout};
use std::sync::Arc;

use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use ratatui::DefaultTerminal;
use tokio::runtime::Handle;

use crate::core::action::Key;
use crate::core::dispatch::{
    Dispatcher, LinkOpener, Screen, Services, TerminalPort, window_height,
};
use crate::core::store::RecordStore;
use crate::pocket::RemoteDeleter;
use crate::probe::Prober;

/// Hides the cursor for the lifetime of the viewer and restores the
/// terminal (raw mode, alternate screen, cursor) on drop, including when
/// the loop exits through an error.
struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> Self {
        if let Err(e) = execute!(stdout(), Hide) {
            warn!("Failed to hide cursor: {}", e);
        }
        Self
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), Show);
        ratatui::restore();
    }
}

/// [`TerminalPort`] backed by ratatui's default crossterm terminal.
pub struct RatatuiPort {
    terminal: DefaultTerminal,
}

impl TerminalPort for RatatuiPort {
    fn size(&self) -> io::Result<(u16, u16)> {
        let size = self.terminal.size()?;
        Ok((size.height, size.width))
    }

    fn render(&mut self, screen: &Screen<'_>) -> io::Result<()> {
        self.terminal.draw(|f| ui::draw_ui(f, screen))?;
        Ok(())
    }

    fn read_key(&mut self) -> io::Result<Key> {
        event::read_key()
    }
}

/// Opens links in the user's default browser.
pub struct SystemBrowser;

impl LinkOpener for SystemBrowser {
    fn open(&self, url: &str) -> io::Result<()> {
        info!("Opening {} in browser", url);
        webbrowser::open(url)
    }
}

/// Run the interactive viewer until the user quits.
pub fn run<S: RecordStore>(
    store: S,
    remote: Arc<dyn RemoteDeleter>,
    prober: Prober,
    runtime: Handle,
) -> io::Result<()> {
    let terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();
    let mut port = RatatuiPort { terminal };

    let (rows, cols) = port.size()?;
    info!("Terminal size {}x{}", cols, rows);

    let services = Services {
        remote,
        opener: Box::new(SystemBrowser),
        prober,
        runtime,
    };
    let mut dispatcher = Dispatcher::new(store, services, window_height(rows));
    dispatcher.run(&mut port)
}
