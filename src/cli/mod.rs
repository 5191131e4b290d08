//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Commands
//!
//! | Command | Network | Purpose |
//! |---------|---------|---------|
//! | `init` | no | Write a default `docsync.toml` |
//! | `check` | yes | Validate the API key |
//! | `inspect --registry <file>` | no | Print the records a snapshot yields |
//! | `diff --registry <file>` | read only | Show what a sync would upload |
//! | `sync --registry <file>` | yes | Check, download, reconcile, upload |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Logging
//!
//! Logs go to stderr. `--verbose` raises the level to debug; `DOCSYNC_LOG`
//! accepts any `tracing` filter directive:
//! ```bash
//! DOCSYNC_LOG=docsync=trace docsync diff --registry registry.json
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod sync_cmd;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
