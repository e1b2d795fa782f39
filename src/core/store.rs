//! # Record Store
//!
//! The keyed table of links. Components never share a global handle: the
//! dispatcher, the viewer and the CLI commands each receive a store value
//! explicitly.
//!
//! [`LinkStore`] keeps records in a `BTreeMap` keyed by id and persists the
//! whole table to a single JSON file after every mutation. Writes use
//! atomic rename (write `.tmp`, then `rename()`) for crash safety.
//!
//! A mutation is applied to a copy of the table, the copy is written, and
//! only then does it replace the in-memory table. A failed write leaves
//! both the file and the store as they were. Batch operations write once.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::core::link::{Link, LinkStatus, display_order};

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum StoreError {
    Io(io::Error),
    Parse(serde_json::Error),
    /// No record with this id.
    NotFound(u64),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "store I/O error: {e}"),
            StoreError::Parse(e) => write!(f, "store parse error: {e}"),
            StoreError::NotFound(id) => write!(f, "link {id} not found"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        StoreError::Io(e)
    }
}

// ============================================================================
// Store Interface
// ============================================================================

/// The operations the viewer and the prober's caller need from storage.
pub trait RecordStore {
    /// All records in display order (see [`display_order`]).
    fn ordered_records(&self) -> Vec<Link>;

    /// Remove a record. Fails with `NotFound` if the id is absent.
    fn delete(&mut self, id: u64) -> Result<(), StoreError>;

    /// Record a probe outcome. `last_check` is always refreshed; the stored
    /// result is only overwritten when it differs.
    fn update_check_result(
        &mut self,
        id: u64,
        status_code: i32,
        checked_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Record a whole batch of `(id, status_code)` outcomes, all stamped
    /// with `checked_at`, in one write. Ids no longer in the store are
    /// skipped. Returns the number of records updated.
    fn update_check_results(
        &mut self,
        results: &[(u64, i32)],
        checked_at: DateTime<Utc>,
    ) -> Result<usize, StoreError>;
}

/// Per-status record counts for the `stat` command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub total: usize,
    pub unread: usize,
    pub archived: usize,
}

#[derive(Serialize, Deserialize, Default)]
struct StoreFile {
    links: Vec<Link>,
}

/// JSON-file backed link table. `path == None` keeps everything in memory.
#[derive(Debug, Default)]
pub struct LinkStore {
    links: BTreeMap<u64, Link>,
    path: Option<PathBuf>,
    writes: usize,
}

impl LinkStore {
    /// A store that never touches the filesystem.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Create an empty store file at `path`, replacing nothing: the caller
    /// checks for an existing file first.
    pub fn create(path: &Path) -> Result<Self, StoreError> {
        let mut store = Self {
            links: BTreeMap::new(),
            path: Some(path.to_path_buf()),
            writes: 0,
        };
        store.write(&BTreeMap::new())?;
        info!("Created link store at {}", path.display());
        Ok(store)
    }

    /// Load an existing store file.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let json = fs::read_to_string(path)?;
        let file: StoreFile = serde_json::from_str(&json).map_err(StoreError::Parse)?;
        let links = file.links.into_iter().map(|l| (l.id, l)).collect();
        let store = Self {
            links,
            path: Some(path.to_path_buf()),
            writes: 0,
        };
        debug!("Loaded {} links from {}", store.len(), path.display());
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&Link> {
        self.links.get(&id)
    }

    /// Insert a new record or replace the remote-owned fields of an existing
    /// one. Probe metadata of an existing record is preserved. Returns `true`
    /// when the record was newly created.
    pub fn upsert(&mut self, link: Link) -> Result<bool, StoreError> {
        self.commit(|links| Ok(upsert_into(links, link)))
    }

    /// Like [`LinkStore::upsert`] for a whole batch, saving once at the end.
    /// Returns the number of newly created records.
    pub fn upsert_all(&mut self, links: impl IntoIterator<Item = Link>) -> Result<usize, StoreError> {
        self.commit(|table| {
            let mut created = 0;
            for link in links {
                if upsert_into(table, link) {
                    created += 1;
                }
            }
            Ok(created)
        })
    }

    /// Drop every record the remote side marked as deleted.
    pub fn remove_deleted(&mut self) -> Result<usize, StoreError> {
        if !self.links.values().any(|l| l.status == LinkStatus::Deleted) {
            return Ok(0);
        }
        self.commit(|links| {
            let before = links.len();
            links.retain(|_, l| l.status != LinkStatus::Deleted);
            Ok(before - links.len())
        })
    }

    pub fn stats(&self) -> StoreStats {
        let count = |status| self.links.values().filter(|l| l.status == status).count();
        StoreStats {
            total: self.links.len(),
            unread: count(LinkStatus::Unread),
            archived: count(LinkStatus::Archived),
        }
    }

    /// Number of times the table was written to disk.
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Apply `mutate` to a copy of the table, write the copy, then keep it.
    /// On any error the store is left untouched.
    fn commit<T>(
        &mut self,
        mutate: impl FnOnce(&mut BTreeMap<u64, Link>) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut links = self.links.clone();
        let value = mutate(&mut links)?;
        self.write(&links)?;
        self.links = links;
        Ok(value)
    }

    fn write(&mut self, links: &BTreeMap<u64, Link>) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let file = StoreFile {
            links: links.values().cloned().collect(),
        };
        atomic_write_json(path, &file)?;
        self.writes += 1;
        Ok(())
    }
}

/// Insert `link` or replace the remote-owned fields of the existing record.
fn upsert_into(links: &mut BTreeMap<u64, Link>, link: Link) -> bool {
    match links.get_mut(&link.id) {
        Some(existing) => {
            let last_check = existing.last_check;
            let check_result = existing.check_result;
            *existing = Link {
                last_check,
                check_result,
                ..link
            };
            false
        }
        None => {
            links.insert(link.id, link);
            true
        }
    }
}

fn record_check(link: &mut Link, status_code: i32, checked_at: DateTime<Utc>) {
    link.last_check = Some(checked_at);
    if link.check_result != Some(status_code) {
        link.check_result = Some(status_code);
    }
}

impl RecordStore for LinkStore {
    fn ordered_records(&self) -> Vec<Link> {
        let mut links: Vec<Link> = self.links.values().cloned().collect();
        links.sort_by(display_order);
        links
    }

    fn delete(&mut self, id: u64) -> Result<(), StoreError> {
        if !self.links.contains_key(&id) {
            return Err(StoreError::NotFound(id));
        }
        self.commit(|links| {
            links.remove(&id);
            Ok(())
        })?;
        debug!("Deleted link {id}");
        Ok(())
    }

    fn update_check_result(
        &mut self,
        id: u64,
        status_code: i32,
        checked_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        if !self.links.contains_key(&id) {
            return Err(StoreError::NotFound(id));
        }
        self.commit(|links| {
            if let Some(link) = links.get_mut(&id) {
                record_check(link, status_code, checked_at);
            }
            Ok(())
        })
    }

    fn update_check_results(
        &mut self,
        results: &[(u64, i32)],
        checked_at: DateTime<Utc>,
    ) -> Result<usize, StoreError> {
        let updated = self.commit(|links| {
            let mut updated = 0;
            for &(id, status_code) in results {
                match links.get_mut(&id) {
                    Some(link) => {
                        record_check(link, status_code, checked_at);
                        updated += 1;
                    }
                    None => debug!("Skipping result for missing link {id}"),
                }
            }
            Ok(updated)
        })?;
        debug!("Recorded {} check results in one write", updated);
        Ok(updated)
    }
}

/// Atomically write `data` as JSON to `path` (via `.tmp` + rename).
fn atomic_write_json<T: Serialize>(path: &Path, data: &T) -> Result<(), StoreError> {
    let tmp_path = path.with_extension("tmp");
    let json = serde_json::to_string_pretty(data).map_err(StoreError::Parse)?;
    fs::write(&tmp_path, json)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::dated_link;

    fn store_with(ids: &[u64]) -> LinkStore {
        let mut store = LinkStore::in_memory();
        for &id in ids {
            store.upsert(dated_link(id, id as i64 * 100)).unwrap();
        }
        store
    }

    #[test]
    fn test_ordered_records_by_created_at() {
        let mut store = LinkStore::in_memory();
        store.upsert(dated_link(1, 300)).unwrap();
        store.upsert(dated_link(2, 100)).unwrap();
        store.upsert(dated_link(3, 200)).unwrap();
        let ids: Vec<u64> = store.ordered_records().iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let mut store = store_with(&[1]);
        assert!(matches!(store.delete(42), Err(StoreError::NotFound(42))));
        assert!(store.delete(1).is_ok());
        assert!(store.is_empty());
    }

    #[test]
    fn test_update_check_result_refreshes_timestamp_when_unchanged() {
        let mut store = store_with(&[1]);
        let first = Utc::now();
        store.update_check_result(1, 200, first).unwrap();
        let later = first + chrono::Duration::seconds(30);
        store.update_check_result(1, 200, later).unwrap();
        let link = store.get(1).unwrap();
        assert_eq!(link.check_result, Some(200));
        assert_eq!(link.last_check, Some(later));

        store.update_check_result(1, -1, later).unwrap();
        assert_eq!(store.get(1).unwrap().check_result, Some(-1));
    }

    #[test]
    fn test_update_check_result_missing_id() {
        let mut store = LinkStore::in_memory();
        assert!(matches!(
            store.update_check_result(5, 200, Utc::now()),
            Err(StoreError::NotFound(5))
        ));
    }

    #[test]
    fn test_upsert_preserves_probe_metadata() {
        let mut store = store_with(&[1]);
        let now = Utc::now();
        store.update_check_result(1, 404, now).unwrap();

        let mut changed = dated_link(1, 100);
        changed.resolved_title = Some("New title".to_string());
        assert!(!store.upsert(changed).unwrap());

        let link = store.get(1).unwrap();
        assert_eq!(link.title(), "New title");
        assert_eq!(link.check_result, Some(404));
        assert_eq!(link.last_check, Some(now));
    }

    #[test]
    fn test_remove_deleted_and_stats() {
        let mut store = store_with(&[1, 2, 3, 4]);
        let mut archived = dated_link(2, 200);
        archived.status = LinkStatus::Archived;
        let mut deleted = dated_link(3, 300);
        deleted.status = LinkStatus::Deleted;
        assert_eq!(store.upsert_all(vec![archived, deleted]).unwrap(), 0);

        assert_eq!(store.remove_deleted().unwrap(), 1);
        assert_eq!(
            store.stats(),
            StoreStats {
                total: 3,
                unread: 2,
                archived: 1
            }
        );
    }

    #[test]
    fn test_update_check_results_writes_once_per_batch() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = LinkStore::create(&dir.path().join("links.json")).unwrap();
        store
            .upsert_all((1..=50).map(|id| dated_link(id, id as i64)))
            .unwrap();
        let before = store.writes();

        let results: Vec<(u64, i32)> = (1..=50).map(|id| (id, 200)).chain([(99, 404)]).collect();
        let checked_at = Utc::now();
        assert_eq!(store.update_check_results(&results, checked_at).unwrap(), 50);

        assert_eq!(store.writes(), before + 1);
        let reopened = LinkStore::open(&dir.path().join("links.json")).unwrap();
        assert!(
            reopened
                .ordered_records()
                .iter()
                .all(|l| l.check_result == Some(200) && l.last_check == Some(checked_at))
        );
    }

    #[test]
    fn test_failed_write_keeps_records() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        fs::create_dir(&data_dir).unwrap();
        let mut store = LinkStore::create(&data_dir.join("links.json")).unwrap();
        store.upsert(dated_link(1, 100)).unwrap();
        store.update_check_result(1, 200, Utc::now()).unwrap();

        // Nowhere left to write the table
        fs::remove_dir_all(&data_dir).unwrap();

        assert!(matches!(store.delete(1), Err(StoreError::Io(_))));
        assert!(store.get(1).is_some());

        assert!(store.update_check_result(1, 404, Utc::now()).is_err());
        assert_eq!(store.get(1).unwrap().check_result, Some(200));

        assert!(store.update_check_results(&[(1, 500)], Utc::now()).is_err());
        assert_eq!(store.get(1).unwrap().check_result, Some(200));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("links.json");
        {
            let mut store = LinkStore::create(&path).unwrap();
            store.upsert(dated_link(7, 700)).unwrap();
            store.update_check_result(7, 301, Utc::now()).unwrap();
        }
        let reopened = LinkStore::open(&path).unwrap();
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.get(7).unwrap().check_result, Some(301));
        assert!(!path.with_extension("tmp").exists());
    }
}
