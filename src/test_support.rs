//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::core::action::Key;
use crate::core::dispatch::{LinkOpener, Screen, Services, TerminalPort};
use crate::core::link::Link;
use crate::pocket::{DeleteConfirmation, PocketError, RemoteDeleter};
use crate::probe::{DEFAULT_TIMEOUT, LinkChecker, ProbeError, Prober};

/// A link created `secs` after the epoch, with no URLs.
pub fn dated_link(id: u64, secs: i64) -> Link {
    Link {
        given_title: Some(format!("Link {id}")),
        created_at: Utc.timestamp_opt(secs, 0).single(),
        ..Link::new(id)
    }
}

/// A dated link (ordered by id) with a resolved URL, ready to probe.
pub fn probed_link(id: u64, url: &str) -> Link {
    Link {
        resolved_url: Some(url.to_string()),
        ..dated_link(id, 1_700_000_000 + id as i64)
    }
}

/// Answers every check with the same outcome.
pub struct FixedChecker(pub Result<u16, ProbeError>);

#[async_trait]
impl LinkChecker for FixedChecker {
    async fn check(&self, _url: &str) -> Result<u16, ProbeError> {
        self.0.clone()
    }
}

/// Remote deleter with a canned answer.
pub struct FakeRemote {
    answer: Option<bool>,
}

impl FakeRemote {
    pub fn confirming() -> Self {
        Self { answer: Some(true) }
    }

    pub fn refusing() -> Self {
        Self { answer: Some(false) }
    }

    pub fn failing() -> Self {
        Self { answer: None }
    }
}

#[async_trait]
impl RemoteDeleter for FakeRemote {
    async fn request_remote_delete(&self, _id: u64) -> Result<DeleteConfirmation, PocketError> {
        match self.answer {
            Some(confirmed) => Ok(DeleteConfirmation { confirmed }),
            None => Err(PocketError::Network("connection refused".to_string())),
        }
    }
}

/// Remembers every URL it was asked to open.
#[derive(Default)]
pub struct RecordingOpener {
    pub opened: Arc<Mutex<Vec<String>>>,
}

impl LinkOpener for RecordingOpener {
    fn open(&self, url: &str) -> io::Result<()> {
        if let Ok(mut opened) = self.opened.lock() {
            opened.push(url.to_string());
        }
        Ok(())
    }
}

/// What one render pass showed.
#[derive(Debug, Clone)]
pub struct RenderedScreen {
    pub row_ids: Vec<u64>,
    pub selected_row: Option<usize>,
    pub status: Option<String>,
}

/// Feeds a fixed key sequence and records every render. Runs dry with
/// `UnexpectedEof` once the keys are used up.
pub struct ScriptedPort {
    keys: VecDeque<Key>,
    pub renders: Vec<RenderedScreen>,
}

impl ScriptedPort {
    pub fn new(keys: Vec<Key>) -> Self {
        Self {
            keys: keys.into(),
            renders: Vec::new(),
        }
    }
}

impl TerminalPort for ScriptedPort {
    fn size(&self) -> io::Result<(u16, u16)> {
        Ok((24, 80))
    }

    fn render(&mut self, screen: &Screen<'_>) -> io::Result<()> {
        self.renders.push(RenderedScreen {
            row_ids: screen.rows.iter().map(|l| l.id).collect(),
            selected_row: screen.selected_row,
            status: screen.status_message.map(String::from),
        });
        Ok(())
    }

    fn read_key(&mut self) -> io::Result<Key> {
        self.keys
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no more keys"))
    }
}

/// Services wired to fakes. The returned runtime must outlive the services.
pub fn test_services(remote: FakeRemote) -> (Services, tokio::runtime::Runtime) {
    let runtime = tokio::runtime::Runtime::new().expect("test runtime");
    let services = Services {
        remote: Arc::new(remote),
        opener: Box::new(RecordingOpener::default()),
        prober: Prober::new(Arc::new(FixedChecker(Ok(200))), 4, DEFAULT_TIMEOUT),
        runtime: runtime.handle().clone(),
    };
    (services, runtime)
}
