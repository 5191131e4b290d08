//! Documentation sync
//!
//! Pushes an addon's syntax records to the remote docs service.
//!
//! - [`DocSync`] - key state machine, download, reconcile and upload
//! - [`DocsApi`] / [`HttpDocsApi`] - the service calls
//! - [`Scheduler`] - where delayed uploads run

mod client;
mod error;
mod orchestrator;
mod scheduler;

pub use client::{encode_form_body, DocsApi, HttpDocsApi, USER_AGENT};
pub use error::{Precondition, SyncError, SyncResult};
pub use orchestrator::{DocSync, KeyState, SyncSettings, UploadPlan, UploadReport};
pub use scheduler::{Scheduler, Task, ThreadScheduler};
