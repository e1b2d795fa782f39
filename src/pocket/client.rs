use std::fmt;

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info};

use super::types::{PocketItem, RetrieveRequest, RetrieveResponse, SendAction, SendRequest, SendResponse};

pub const DEFAULT_BASE_URL: &str = "https://getpocket.com/v3";

/// Errors talking to the Pocket API.
#[derive(Debug)]
pub enum PocketError {
    /// Network-level failure (timeout, DNS, connection refused).
    Network(String),
    /// API answered with a non-success status.
    Api { status: u16, message: String },
    /// Response body was not what we expected.
    Parse(String),
}

impl fmt::Display for PocketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PocketError::Network(msg) => write!(f, "network error: {msg}"),
            PocketError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            PocketError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for PocketError {}

/// Outcome of a remote delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteConfirmation {
    pub confirmed: bool,
}

/// Asks the remote collection to delete a link. The viewer only removes
/// the local record after a confirmed answer.
#[async_trait]
pub trait RemoteDeleter: Send + Sync {
    async fn request_remote_delete(&self, id: u64) -> Result<DeleteConfirmation, PocketError>;
}

pub struct PocketClient {
    client: reqwest::Client,
    consumer_key: String,
    access_token: String,
    base_url: String,
}

impl PocketClient {
    pub fn new(consumer_key: String, access_token: String, base_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            consumer_key,
            access_token,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        }
    }

    /// Fetch every item changed since `since` (unix seconds), or the whole
    /// collection when `since` is `None`.
    pub async fn retrieve(&self, since: Option<i64>) -> Result<Vec<PocketItem>, PocketError> {
        let body = RetrieveRequest {
            consumer_key: &self.consumer_key,
            access_token: &self.access_token,
            state: "all",
            detail_type: "complete",
            since,
        };
        info!("Querying Pocket for links changed since {:?}", since);
        let response = self
            .client
            .post(format!("{}/get", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| PocketError::Network(e.to_string()))?;
        let response = check_status(response)?;
        let parsed: RetrieveResponse = response
            .json()
            .await
            .map_err(|e| PocketError::Parse(e.to_string()))?;
        let items = parsed.list.into_items();
        debug!("Pocket returned {} changed items", items.len());
        Ok(items)
    }

    /// Ask Pocket to delete one item.
    pub async fn delete(&self, id: u64) -> Result<SendResponse, PocketError> {
        let body = SendRequest {
            consumer_key: &self.consumer_key,
            access_token: &self.access_token,
            actions: vec![SendAction {
                action: "delete",
                item_id: id.to_string(),
                time: Utc::now().timestamp().to_string(),
            }],
        };
        let response = self
            .client
            .post(format!("{}/send", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| PocketError::Network(e.to_string()))?;
        let response = check_status(response)?;
        response
            .json()
            .await
            .map_err(|e| PocketError::Parse(e.to_string()))
    }
}

#[async_trait]
impl RemoteDeleter for PocketClient {
    async fn request_remote_delete(&self, id: u64) -> Result<DeleteConfirmation, PocketError> {
        let response = self.delete(id).await?;
        let confirmed = response.confirmed();
        debug!("Remote delete of {} confirmed: {}", id, confirmed);
        Ok(DeleteConfirmation { confirmed })
    }
}

/// Pocket reports the failure reason in the `X-Error` header.
fn check_status(response: reqwest::Response) -> Result<reqwest::Response, PocketError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response
        .headers()
        .get("X-Error")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error"))
        .to_string();
    Err(PocketError::Api {
        status: status.as_u16(),
        message,
    })
}
