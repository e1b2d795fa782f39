//! Pocket Manager library exports for the binary and integration tests

pub mod commands;
pub mod core;
pub mod pocket;
pub mod probe;
pub mod tui;

#[cfg(test)]
pub mod test_support;
