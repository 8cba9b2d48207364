//! Storage infrastructure: configuration file persistence.
//!
//! The `config` sub-module reads the TOML configuration file, from an
//! explicit path or the platform-appropriate directory, and falls back to
//! defaults when no file exists yet.

pub mod config;
