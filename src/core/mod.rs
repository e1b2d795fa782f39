//! # Core Application Logic
//!
//! The link collection and everything the viewer does with it.
//! It knows nothing about any specific terminal library.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • Link / RecordStore   │
//!                    │  • Viewport (indices)   │
//!                    │  • Action (key mapping) │
//!                    │  • Dispatcher (loop)    │
//!                    └───────────┬─────────────┘
//!                                │ TerminalPort
//!                                ▼
//!                         ┌────────────┐
//!                         │    TUI     │
//!                         │  Adapter   │
//!                         │ (ratatui)  │
//!                         └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`link`]: The `Link` record and its display order
//! - [`store`]: The `RecordStore` interface and the JSON-backed `LinkStore`
//! - [`viewport`]: Scroll and selection state over the ordered records
//! - [`action`]: Input codes and the `Action` enum they resolve to
//! - [`dispatch`]: The blocking interaction loop
//! - [`config`]: Settings and data paths

pub mod action;
pub mod config;
pub mod dispatch;
pub mod link;
pub mod store;
pub mod viewport;
