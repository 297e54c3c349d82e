//! Process-wide extension identity ledger.

use crate::extension::manifest::Ecosystem;
use indexmap::IndexMap;

/// One registered extension identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    pub id: String,
    pub origin: Ecosystem,
}

/// Insertion-ordered map of extension id to originating ecosystem.
///
/// Append-only for the lifetime of the owner: entries are never removed.
/// Re-registering an id updates its origin in place and keeps its original
/// position.
#[derive(Debug, Default)]
pub struct ExtensionRegistry {
    entries: IndexMap<String, Ecosystem>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `id`, returning the previous origin when the id was taken.
    pub fn register(&mut self, id: impl Into<String>, origin: Ecosystem) -> Option<Ecosystem> {
        self.entries.insert(id.into(), origin)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<Ecosystem> {
        self.entries.get(id).copied()
    }

    /// Returns all entries in first-registration order.
    pub fn summarize(&self) -> Vec<RegistryEntry> {
        self.entries
            .iter()
            .map(|(id, origin)| RegistryEntry {
                id: id.clone(),
                origin: *origin,
            })
            .collect()
    }

    /// Renders the summary as ` - <id> from <origin>` lines.
    pub fn summary_lines(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|(id, origin)| format!(" - {id} from {origin}"))
            .collect()
    }
}
