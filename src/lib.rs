//! docsync - Keeps a scripting addon's syntax documentation in sync
//!
//! Extracts every registered syntax element of an addon into a normalized
//! record, compares the records against what the docs site already
//! publishes, and uploads only what is new or changed.
//!
//! - [`domain`] - records, categories, pattern normalization, reconciliation
//! - [`source`] - host seams and field extraction
//! - [`storage`] - wire format, key file, configuration
//! - [`sync`] - the docs service client and the orchestrator

pub mod cli;
pub mod domain;
pub mod source;
pub mod storage;
pub mod sync;

pub use domain::{Field, Record, RecordSet, SyntaxCategory};
pub use sync::{DocSync, SyncError};
