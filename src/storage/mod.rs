//! # Storage Layer
//!
//! Everything docsync reads from or writes to disk or the wire.
//!
//! ## Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Addon config | TOML | `<data dir>/docsync.toml` |
//! | Global config | TOML | `~/.config/docsync/config.toml` |
//! | API key | Plain text, first line | `<data dir>/addon.key` |
//! | Records | JSON objects | request and response bodies |
//!
//! ## Key Types
//!
//! - [`Config`] - Addon and global configuration
//! - [`WireConverter`] - Record ⇄ JSON payload
//! - [`read_key`] - Loads the API key

mod config;
mod key;
mod wire;

pub use config::{
    Config, ConfigError, GlobalConfig, OutputFormat, SyncConfig, CONFIG_FILE, DEFAULT_API_URL,
};
pub use key::{read_key, DEFAULT_KEY_FILE};
pub use wire::WireConverter;
