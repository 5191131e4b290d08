//! Registry snapshots
//!
//! A JSON dump of a host's syntax registry. The CLI drives the pipeline from
//! a snapshot when no live host is attached.
//!
//! ```json
//! {
//!   "addon": { "name": "MyAddon", "package": "com.example.addon" },
//!   "accepting_registrations": false,
//!   "registered_addons": ["MyAddon"],
//!   "types": { "org.bukkit.entity.Player": "player" },
//!   "sources": [ { "kind": "event", "name": "Jump", ... } ]
//! }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::host::{AddonIdentity, SyntaxHost, TypeRegistry};
use super::metadata::SyntaxSource;
use crate::domain::SyntaxCategory;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Failed to read registry snapshot {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid registry snapshot: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A frozen view of a host registry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySnapshot {
    /// The addon being documented
    pub addon: AddonIdentity,

    /// Whether the host was still accepting registrations
    pub accepting_registrations: bool,

    /// Addons registered with the host
    pub registered_addons: Vec<String>,

    /// Runtime type name to registry code name
    pub types: HashMap<String, String>,

    /// Every registered syntax element
    pub sources: Vec<SyntaxSource>,
}

impl RegistrySnapshot {
    /// Loads a snapshot from a JSON file
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let content = fs::read_to_string(path).map_err(|source| SnapshotError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Parses a snapshot from JSON text
    pub fn from_json(content: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(content)?)
    }
}

impl TypeRegistry for RegistrySnapshot {
    fn exact_code_name(&self, type_name: &str) -> Option<String> {
        self.types.get(type_name).cloned()
    }
}

impl SyntaxHost for RegistrySnapshot {
    fn types(&self) -> &dyn TypeRegistry {
        self
    }

    fn sources(&self, category: SyntaxCategory) -> Vec<SyntaxSource> {
        self.sources
            .iter()
            .filter(|source| source.category() == Some(category))
            .cloned()
            .collect()
    }

    fn is_accepting_registrations(&self) -> bool {
        self.accepting_registrations
    }

    fn is_registered_addon(&self, addon: &str) -> bool {
        self.registered_addons.iter().any(|name| name == addon)
    }
}
