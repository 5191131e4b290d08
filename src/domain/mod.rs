//! Domain models for docsync
//!
//! Contains the record model and the reconciliation logic without any I/O
//! concerns.

mod category;
pub mod pattern;
mod record;
mod reconcile;

pub use category::{CategoryError, Field, FieldShape, SyntaxCategory};
pub use record::{FieldValue, Record, RecordError, RecordSet, DEFAULT_SINCE};
pub use reconcile::{classify, find_counterpart, reconcile, Outcome, ReconcileSummary};
