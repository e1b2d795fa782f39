//! # Link Records
//!
//! One saved bookmark, as mirrored from the remote collection.
//!
//! Identity (`id`) is assigned remotely and never changes. The probe fields
//! (`last_check`, `check_result`) stay `None` until a probe batch has been
//! applied to the record.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reading state of a link, as reported by the remote collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    #[default]
    Unread,
    Archived,
    Deleted,
}

impl LinkStatus {
    /// Map the remote numeric status (`"0"`, `"1"`, `"2"`) to a variant.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(LinkStatus::Unread),
            1 => Some(LinkStatus::Archived),
            2 => Some(LinkStatus::Deleted),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub id: u64,
    pub given_title: Option<String>,
    pub resolved_title: Option<String>,
    pub given_url: Option<String>,
    pub resolved_url: Option<String>,
    pub excerpt: Option<String>,
    #[serde(default)]
    pub status: LinkStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub last_check: Option<DateTime<Utc>>,
    pub check_result: Option<i32>,
}

impl Link {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// Resolved title if present, else the title the user saved, else "".
    pub fn title(&self) -> &str {
        non_empty(self.resolved_title.as_deref())
            .or_else(|| non_empty(self.given_title.as_deref()))
            .unwrap_or("")
    }

    /// URL to show or open: resolved if present, else the saved one.
    pub fn url(&self) -> Option<&str> {
        non_empty(self.resolved_url.as_deref()).or_else(|| non_empty(self.given_url.as_deref()))
    }

    /// URL a reachability probe is issued against. Only the resolved URL
    /// qualifies; links without one are not probed.
    pub fn probe_url(&self) -> Option<&str> {
        non_empty(self.resolved_url.as_deref())
    }

    /// Host part of [`Link::url`], used for the domain column.
    pub fn domain(&self) -> String {
        self.url()
            .and_then(|u| url::Url::parse(u).ok())
            .and_then(|u| u.host_str().map(String::from))
            .unwrap_or_default()
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.trim().is_empty())
}

/// Display order: ascending `created_at`, undated links first, ties by id.
pub fn display_order(a: &Link, b: &Link) -> Ordering {
    match (a.created_at, b.created_at) {
        (None, None) => a.id.cmp(&b.id),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => x.cmp(&y).then(a.id.cmp(&b.id)),
    }
}
