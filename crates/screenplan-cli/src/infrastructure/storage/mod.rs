//! Storage infrastructure: configuration file persistence.
//!
//! The `config` sub-module reads editor settings from the platform config
//! directory, writes them back, and falls back to defaults on first run.

pub mod config;
