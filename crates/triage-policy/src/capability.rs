//! Capability strings and sets.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Namespace segment reserved for system capabilities.
pub const SYSTEM_NAMESPACE: &str = "system";

/// A capability string an operation requires, namespaced by dot-separated
/// segments (`read.users`, `system.purge_data`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capability(String);

impl Capability {
    /// Create a capability from a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The capability name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is a system capability.
    ///
    /// System capabilities are recognized structurally: the first
    /// dot-separated segment is literally `system`. This predicate is the
    /// single place the convention lives.
    pub fn is_system(&self) -> bool {
        self.0.split('.').next() == Some(SYSTEM_NAMESPACE)
    }
}

impl From<&str> for Capability {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Capability {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An unordered, duplicate-free set of capabilities held by a principal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilitySet(HashSet<Capability>);

impl CapabilitySet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a capability. Duplicates are no-ops.
    pub fn insert(&mut self, capability: Capability) -> bool {
        self.0.insert(capability)
    }

    /// Whether the set contains a capability.
    pub fn contains(&self, capability: &Capability) -> bool {
        self.0.contains(capability)
    }

    /// First entry of `required` that is a member of this set.
    ///
    /// `required` is ordered; the match reported in a Decision is the first
    /// requirement satisfied, not an arbitrary set element.
    pub fn first_match<'a>(&self, required: &'a [Capability]) -> Option<&'a Capability> {
        required.iter().find(|c| self.0.contains(c))
    }

    /// Iterate over the capabilities.
    pub fn iter(&self) -> impl Iterator<Item = &Capability> {
        self.0.iter()
    }

    /// Number of capabilities.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Capability names, sorted, for event payloads.
    pub fn sorted_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.0.iter().map(|c| c.as_str().to_string()).collect();
        names.sort();
        names
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<&'a str> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self(iter.into_iter().map(Capability::from).collect())
    }
}

/// Capability names used by the admin back-end's route classes.
///
/// Call sites pass declarative lists built from these rather than
/// re-spelling strings per guard.
pub mod catalog {
    /// List and read user accounts.
    pub const READ_USERS: &str = "read.users";
    /// Create, update, and deactivate user accounts.
    pub const MANAGE_USERS: &str = "manage.users";
    /// Read patient records.
    pub const READ_PATIENTS: &str = "read.patients";
    /// Create and update patient records.
    pub const MANAGE_PATIENTS: &str = "manage.patients";
    /// Read doctor records.
    pub const READ_DOCTORS: &str = "read.doctors";
    /// Create and update doctor records.
    pub const MANAGE_DOCTORS: &str = "manage.doctors";
    /// Read analyses.
    pub const READ_ANALYSES: &str = "read.analyses";
    /// Create, update, and validate analyses.
    pub const MANAGE_ANALYSES: &str = "manage.analyses";
    /// Read rooms and services.
    pub const READ_SERVICES: &str = "read.services";
    /// Manage rooms and services.
    pub const MANAGE_SERVICES: &str = "manage.services";
    /// Export data documents.
    pub const EXPORT_DATA: &str = "export.data";
    /// Bypass maintenance-mode restrictions.
    pub const SYSTEM_BYPASS_RESTRICTIONS: &str = "system.bypass_restrictions";
    /// Purge data outside retention rules.
    pub const SYSTEM_PURGE_DATA: &str = "system.purge_data";
    /// Manage maintenance-mode schedules.
    pub const SYSTEM_MAINTENANCE: &str = "system.maintenance";
}
