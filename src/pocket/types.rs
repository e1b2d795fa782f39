//! Wire types for the Pocket v3 API.
//!
//! Pocket sends almost every scalar as a string (`"item_id": "229279689"`,
//! `"status": "0"`), and an empty `list` arrives as `[]` instead of `{}`.

use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::core::link::{Link, LinkStatus};

#[derive(Debug, Serialize)]
pub struct RetrieveRequest<'a> {
    pub consumer_key: &'a str,
    pub access_token: &'a str,
    pub state: &'a str,
    #[serde(rename = "detailType")]
    pub detail_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct RetrieveResponse {
    #[serde(default)]
    pub list: ItemList,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ItemList {
    Items(BTreeMap<String, PocketItem>),
    Empty(Vec<serde_json::Value>),
}

impl Default for ItemList {
    fn default() -> Self {
        ItemList::Empty(Vec::new())
    }
}

impl ItemList {
    pub fn into_items(self) -> Vec<PocketItem> {
        match self {
            ItemList::Items(map) => map.into_values().collect(),
            ItemList::Empty(_) => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PocketItem {
    pub item_id: String,
    pub given_title: Option<String>,
    pub resolved_title: Option<String>,
    pub given_url: Option<String>,
    pub resolved_url: Option<String>,
    pub excerpt: Option<String>,
    pub status: Option<String>,
    pub time_added: Option<String>,
}

impl PocketItem {
    /// Convert to a store record. Returns `None` when the item id is not a
    /// number, which Pocket never sends for real items.
    pub fn into_link(self) -> Option<Link> {
        let id = self.item_id.trim().parse().ok()?;
        let status = self
            .status
            .as_deref()
            .and_then(|s| s.trim().parse::<u8>().ok())
            .and_then(LinkStatus::from_code)
            .unwrap_or_default();
        let created_at = self
            .time_added
            .as_deref()
            .and_then(|s| s.trim().parse::<i64>().ok())
            .filter(|secs| *secs > 0)
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single());
        Some(Link {
            id,
            given_title: self.given_title,
            resolved_title: self.resolved_title,
            given_url: self.given_url,
            resolved_url: self.resolved_url,
            excerpt: self.excerpt,
            status,
            created_at,
            last_check: None,
            check_result: None,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct SendRequest<'a> {
    pub consumer_key: &'a str,
    pub access_token: &'a str,
    pub actions: Vec<SendAction>,
}

#[derive(Debug, Serialize)]
pub struct SendAction {
    pub action: &'static str,
    pub item_id: String,
    pub time: String,
}

#[derive(Debug, Deserialize)]
pub struct SendResponse {
    #[serde(default)]
    pub action_results: Vec<serde_json::Value>,
    #[serde(default)]
    pub status: i64,
}

impl SendResponse {
    /// Confirmed only when the batch status is 1 and the first action result
    /// is truthy. Every other shape counts as not confirmed.
    pub fn confirmed(&self) -> bool {
        self.status == 1 && self.action_results.first().is_some_and(truthy)
    }
}

fn truthy(value: &serde_json::Value) -> bool {
    use serde_json::Value;
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
