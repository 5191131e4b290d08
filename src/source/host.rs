//! Host runtime interface
//!
//! Everything docsync needs from the process it runs in: the registered
//! syntax elements per category, the type registry, and the registration
//! lifecycle.

use serde::{Deserialize, Serialize};

use super::metadata::SyntaxSource;
use crate::domain::SyntaxCategory;

/// The addon whose syntax is being documented
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddonIdentity {
    /// Addon name as published on the docs site
    pub name: String,

    /// Base package of the addon's main class; elements under it belong to it
    pub package: String,
}

impl AddonIdentity {
    pub fn new(name: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: package.into(),
        }
    }

    /// Returns true if `package` is the addon's package or nested below it
    pub fn owns_package(&self, package: &str) -> bool {
        if self.package.is_empty() {
            return false;
        }
        package == self.package
            || package
                .strip_prefix(self.package.as_str())
                .is_some_and(|rest| rest.starts_with('.'))
    }
}

/// Resolves runtime types to the registry's code names
pub trait TypeRegistry: Send + Sync {
    /// Code name of the type registered for exactly `type_name`
    fn exact_code_name(&self, type_name: &str) -> Option<String>;
}

/// The host process that owns the syntax registry
pub trait SyntaxHost: Send + Sync {
    /// The host's type registry
    fn types(&self) -> &dyn TypeRegistry;

    /// Registered syntax elements of one category
    fn sources(&self, category: SyntaxCategory) -> Vec<SyntaxSource>;

    /// True while the host still accepts new syntax registrations
    fn is_accepting_registrations(&self) -> bool;

    /// True if `addon` is registered with the host as an addon
    fn is_registered_addon(&self, addon: &str) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owns_nested_packages() {
        let addon = AddonIdentity::new("MyAddon", "com.example.addon");

        assert!(addon.owns_package("com.example.addon"));
        assert!(addon.owns_package("com.example.addon.effects"));
        assert!(!addon.owns_package("com.example.addonextra"));
        assert!(!addon.owns_package("com.example"));
        assert!(!addon.owns_package(""));
    }

    #[test]
    fn empty_package_owns_nothing() {
        let addon = AddonIdentity::new("MyAddon", "");
        assert!(!addon.owns_package("com.example"));
        assert!(!addon.owns_package(""));
    }
}
