//! Per-archive symbol resolution context.
//!
//! # Invariants
//! - One loader per archive; loaders are never shared across archives.
//! - Resolution is parent-first: a host definition shadows an archive one.

use crate::extension::manifest::Ecosystem;
use crate::extension::symbols::{ArchiveKey, HostRuntime, SymbolTable, TypeDefinition};
use std::path::Path;

/// Where a resolved symbol was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolOrigin {
    Host,
    Archive,
}

/// Loading context scoped to exactly one extension archive.
#[derive(Debug)]
pub struct IsolatedLoader<'rt> {
    archive: ArchiveKey,
    parent: &'rt SymbolTable,
    local: Option<&'rt SymbolTable>,
}

impl<'rt> IsolatedLoader<'rt> {
    /// Builds the context for the `ecosystem` archive at `archive_path`.
    ///
    /// Archive identity is the ecosystem plus the file name, matching the
    /// keys used by `HostRuntime::define_in_archive`.
    pub fn new(ecosystem: Ecosystem, archive_path: &Path, runtime: &'rt HostRuntime) -> Self {
        let file_name = archive_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| archive_path.display().to_string());
        let archive = ArchiveKey::new(ecosystem, file_name);
        let local = runtime.archive_symbols(&archive);
        Self {
            archive,
            parent: runtime.host_symbols(),
            local,
        }
    }

    pub fn archive(&self) -> &ArchiveKey {
        &self.archive
    }

    /// Resolves `name`, delegating to the host table first.
    pub fn resolve(&self, name: &str) -> Option<(&'rt TypeDefinition, SymbolOrigin)> {
        if let Some(definition) = self.parent.get(name) {
            return Some((definition, SymbolOrigin::Host));
        }
        self.local
            .and_then(|table| table.get(name))
            .map(|definition| (definition, SymbolOrigin::Archive))
    }
}
