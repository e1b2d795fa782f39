//! # Link Prober
//!
//! Checks the live reachability of many links at once, without letting a
//! large collection exhaust file descriptors or hammer remote hosts.
//!
//! ```text
//!   queue of (url, link) ──▶ worker 1 ─┐
//!                        ──▶ worker 2 ─┼──▶ result channel ──▶ ProbeReport
//!                        ──▶ worker n ─┘     (code, link)       code → [links]
//! ```
//!
//! At most `concurrency` workers exist, so at most that many requests are in
//! flight. Each request runs in its own task under its own timeout; a slow or
//! failing link only ever affects its own result. [`Prober::probe`] returns
//! once every request has settled and never fails as a whole: non-HTTP
//! outcomes are recorded as negative sentinel codes.
//!
//! The prober never touches the store. [`apply_results`] writes a finished
//! report back, one record at a time.

mod checker;

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::core::link::Link;
use crate::core::store::RecordStore;

pub use checker::{
    CANCELLED, CONNECTION_ERROR, HttpChecker, LinkChecker, ProbeError, TIMEOUT, UNKNOWN_ERROR,
};

pub const DEFAULT_CONCURRENCY: usize = 100;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Probed links grouped by status code (HTTP status or sentinel).
pub type ProbeReport = BTreeMap<i32, Vec<Link>>;

type Job = (String, Link);

#[derive(Clone)]
pub struct Prober {
    checker: Arc<dyn LinkChecker>,
    concurrency: usize,
    timeout: Duration,
}

impl Prober {
    pub fn new(checker: Arc<dyn LinkChecker>, concurrency: usize, timeout: Duration) -> Self {
        Self {
            checker,
            concurrency: concurrency.max(1),
            timeout,
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Probe every link that has a resolved URL. Links without one are left
    /// out of the report entirely.
    pub async fn probe(&self, links: Vec<Link>) -> ProbeReport {
        let jobs: VecDeque<Job> = links
            .into_iter()
            .filter_map(|link| {
                let url = link.probe_url()?.to_string();
                Some((url, link))
            })
            .collect();
        let total = jobs.len();
        let workers = self.concurrency.min(total);
        info!(
            "Probing {} links ({} workers, {}s timeout)",
            total,
            workers,
            self.timeout.as_secs_f32()
        );

        let queue = Arc::new(Mutex::new(jobs));
        let (tx, mut rx) = mpsc::unbounded_channel::<(i32, Link)>();
        let mut pool = JoinSet::new();
        for _ in 0..workers {
            let queue = queue.clone();
            let tx = tx.clone();
            let checker = self.checker.clone();
            let timeout = self.timeout;
            pool.spawn(async move {
                while let Some((url, link)) = next_job(&queue) {
                    let code = probe_one(checker.clone(), url, timeout).await;
                    if tx.send((code, link)).is_err() {
                        warn!("Probe result dropped: collector closed");
                        return;
                    }
                }
            });
        }
        drop(tx);

        while let Some(joined) = pool.join_next().await {
            if let Err(e) = joined {
                warn!("Probe worker failed: {}", e);
            }
        }

        let mut report = ProbeReport::new();
        while let Some((code, link)) = rx.recv().await {
            report.entry(code).or_default().push(link);
        }
        info!(
            "Probe finished: {} results in {} groups",
            report.values().map(Vec::len).sum::<usize>(),
            report.len()
        );
        report
    }
}

fn next_job(queue: &Mutex<VecDeque<Job>>) -> Option<Job> {
    queue.lock().ok()?.pop_front()
}

/// Run a single request in its own task so a panic or cancellation there is
/// reported as a sentinel instead of taking the worker down.
async fn probe_one(checker: Arc<dyn LinkChecker>, url: String, timeout: Duration) -> i32 {
    let target = url.clone();
    let request =
        tokio::spawn(async move { tokio::time::timeout(timeout, checker.check(&target)).await });
    let outcome = match request.await {
        Ok(Ok(result)) => result,
        Ok(Err(_elapsed)) => Err(ProbeError::Timeout),
        Err(e) if e.is_cancelled() => Err(ProbeError::Cancelled),
        Err(e) => Err(ProbeError::Unknown(e.to_string())),
    };
    match outcome {
        Ok(status) => i32::from(status),
        Err(e) => {
            debug!("Probe of {} gave {}: {}", url, e.sentinel(), e);
            e.sentinel()
        }
    }
}

/// Write a report back to the store as one batch, stamping every record
/// with `checked_at`. Records that vanished meanwhile are skipped. Returns
/// the number of records updated; zero if the write failed.
pub fn apply_results<S: RecordStore>(
    store: &mut S,
    report: &ProbeReport,
    checked_at: DateTime<Utc>,
) -> usize {
    let results: Vec<(u64, i32)> = report
        .iter()
        .flat_map(|(&code, links)| links.iter().map(move |link| (link.id, code)))
        .collect();
    debug!("Writing {} results in {} status groups", results.len(), report.len());
    match store.update_check_results(&results, checked_at) {
        Ok(updated) => updated,
        Err(e) => {
            warn!("Failed to record {} probe results: {}", results.len(), e);
            0
        }
    }
}

/// One-line summary such as `200: 12 | 404: 1 | -1: 3`.
pub fn summarize(report: &ProbeReport) -> String {
    if report.is_empty() {
        return "No links to check".to_string();
    }
    report
        .iter()
        .rev()
        .map(|(code, links)| format!("{}: {}", code, links.len()))
        .collect::<Vec<_>>()
        .join(" | ")
}
