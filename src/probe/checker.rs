use std::fmt;

use async_trait::async_trait;

/// Sentinel stored when a probe exceeded its timeout.
pub const TIMEOUT: i32 = -1;
/// Sentinel stored when the connection could not be established.
pub const CONNECTION_ERROR: i32 = -2;
/// Sentinel stored when the probe task was cancelled before settling.
pub const CANCELLED: i32 = -10;
/// Sentinel stored for any other failure.
pub const UNKNOWN_ERROR: i32 = -11;

/// Why a single probe produced no HTTP status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    Timeout,
    Connection(String),
    Cancelled,
    Unknown(String),
}

impl ProbeError {
    /// The negative `check_result` this outcome is recorded as.
    pub fn sentinel(&self) -> i32 {
        match self {
            ProbeError::Timeout => TIMEOUT,
            ProbeError::Connection(_) => CONNECTION_ERROR,
            ProbeError::Cancelled => CANCELLED,
            ProbeError::Unknown(_) => UNKNOWN_ERROR,
        }
    }
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeError::Timeout => write!(f, "timed out"),
            ProbeError::Connection(msg) => write!(f, "connection error: {msg}"),
            ProbeError::Cancelled => write!(f, "cancelled"),
            ProbeError::Unknown(msg) => write!(f, "probe failed: {msg}"),
        }
    }
}

impl std::error::Error for ProbeError {}

impl From<reqwest::Error> for ProbeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProbeError::Timeout
        } else if err.is_connect() {
            ProbeError::Connection(err.to_string())
        } else {
            ProbeError::Unknown(err.to_string())
        }
    }
}

/// One reachability request against one URL.
#[async_trait]
pub trait LinkChecker: Send + Sync {
    /// Returns the HTTP status the URL answered with.
    async fn check(&self, url: &str) -> Result<u16, ProbeError>;
}

/// Checks links with a plain HTTP GET, following redirects.
pub struct HttpChecker {
    client: reqwest::Client,
}

impl HttpChecker {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LinkChecker for HttpChecker {
    async fn check(&self, url: &str) -> Result<u16, ProbeError> {
        let response = self.client.get(url).send().await?;
        Ok(response.status().as_u16())
    }
}
