//! Syntax sources
//!
//! The host-facing half of docsync: the shapes syntax metadata arrives in,
//! the host and type registry seams, and the extraction that turns a source
//! into a [`Record`](crate::domain::Record).

mod extractor;
mod host;
mod metadata;
mod snapshot;

pub use extractor::{extract_record, DefaultExtractor, FieldExtractor};
pub use host::{AddonIdentity, SyntaxHost, TypeRegistry};
pub use metadata::{
    ChangeCapability, ChangeMode, ClassInfoSource, ClassMetadata, ElementInfo, EventInfo, Marker,
    ProbeError, SyntaxSource, NO_DOC,
};
pub use snapshot::{RegistrySnapshot, SnapshotError};
