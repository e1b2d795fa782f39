//! # Pocket API
//!
//! The remote side of the mirror: `retrieve` feeds the `update` command,
//! and [`RemoteDeleter`] gates local deletes in the viewer.

pub mod client;
pub mod types;

pub use client::{DEFAULT_BASE_URL, DeleteConfirmation, PocketClient, PocketError, RemoteDeleter};
pub use types::PocketItem;
