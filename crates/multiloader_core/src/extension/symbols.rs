//! Entrypoint symbol definitions and host runtime symbol tables.
//!
//! # Responsibility
//! - Define the extension-author contract (`Runnable`, `ModInitializer`).
//! - Hold constructible type definitions keyed by fully-qualified name.
//! - Keep archive-scoped tables apart so same-named symbols never collide.
//!
//! # Invariants
//! - The activation capability of a type is fixed when it is defined.
//! - Archive tables are keyed by `ArchiveKey` (ecosystem plus file name) and
//!   never unloaded while the runtime lives.

use crate::extension::manifest::Ecosystem;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Error type surfaced by extension code.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Preferred activation capability: a no-argument `run`.
pub trait Runnable {
    fn run(&mut self) -> Result<(), BoxError>;
}

/// Fallback activation capability: the conventional `onInitialize` hook.
pub trait ModInitializer {
    fn on_initialize(&mut self) -> Result<(), BoxError>;
}

type Constructor<T> = Box<dyn Fn() -> Result<Box<T>, BoxError>>;

/// Activation capability of one type, resolved at definition time.
pub enum Activatable {
    /// Construct, then call `Runnable::run`.
    RunInvoker(Constructor<dyn Runnable>),
    /// Construct, then call `ModInitializer::on_initialize`.
    NamedMethodInvoker(Constructor<dyn ModInitializer>),
    /// Constructible but exposes neither capability.
    Inert(Box<dyn Fn() -> Result<(), BoxError>>),
}

impl Activatable {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RunInvoker(_) => "run",
            Self::NamedMethodInvoker(_) => "on_initialize",
            Self::Inert(_) => "inert",
        }
    }
}

/// One constructible entrypoint type.
pub struct TypeDefinition {
    name: String,
    activatable: Activatable,
}

impl TypeDefinition {
    pub fn new(name: impl Into<String>, activatable: Activatable) -> Self {
        Self {
            name: name.into(),
            activatable,
        }
    }

    /// Defines a `Runnable` type built through its `Default` impl.
    pub fn runnable<T>(name: impl Into<String>) -> Self
    where
        T: Runnable + Default + 'static,
    {
        Self::runnable_with(name, || Ok(T::default()))
    }

    /// Defines a `Runnable` type with a fallible zero-argument constructor.
    pub fn runnable_with<T, F>(name: impl Into<String>, construct: F) -> Self
    where
        T: Runnable + 'static,
        F: Fn() -> Result<T, BoxError> + 'static,
    {
        Self::new(
            name,
            Activatable::RunInvoker(Box::new(move || {
                construct().map(|value| Box::new(value) as Box<dyn Runnable>)
            })),
        )
    }

    /// Defines a `ModInitializer` type built through its `Default` impl.
    pub fn initializer<T>(name: impl Into<String>) -> Self
    where
        T: ModInitializer + Default + 'static,
    {
        Self::initializer_with(name, || Ok(T::default()))
    }

    /// Defines a `ModInitializer` type with a fallible zero-argument constructor.
    pub fn initializer_with<T, F>(name: impl Into<String>, construct: F) -> Self
    where
        T: ModInitializer + 'static,
        F: Fn() -> Result<T, BoxError> + 'static,
    {
        Self::new(
            name,
            Activatable::NamedMethodInvoker(Box::new(move || {
                construct().map(|value| Box::new(value) as Box<dyn ModInitializer>)
            })),
        )
    }

    /// Defines a type with neither activation capability.
    pub fn inert(name: impl Into<String>) -> Self {
        Self::new(name, Activatable::Inert(Box::new(|| Ok(()))))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn activatable(&self) -> &Activatable {
        &self.activatable
    }
}

impl std::fmt::Debug for TypeDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeDefinition")
            .field("name", &self.name)
            .field("activatable", &self.activatable.kind())
            .finish()
    }
}

/// Name-keyed table of type definitions.
#[derive(Debug, Default)]
pub struct SymbolTable {
    types: IndexMap<String, TypeDefinition>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one definition; a later definition with the same name replaces it.
    pub fn define(&mut self, definition: TypeDefinition) -> &mut Self {
        self.types.insert(definition.name.clone(), definition);
        self
    }

    pub fn get(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Identity of one archive within its ecosystem directory.
///
/// Each ecosystem scans a single flat directory, so the pair is unique even
/// when the Fabric and Quilt directories hold archives with the same name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArchiveKey {
    pub ecosystem: Ecosystem,
    pub file_name: String,
}

impl ArchiveKey {
    pub fn new(ecosystem: Ecosystem, file_name: impl Into<String>) -> Self {
        Self {
            ecosystem,
            file_name: file_name.into(),
        }
    }
}

impl Display for ArchiveKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.ecosystem, self.file_name)
    }
}

/// Symbols the embedding host makes available to extension archives.
///
/// `host` plays the role of the enclosing loading context; archive tables
/// hold code that only one archive provides.
#[derive(Debug, Default)]
pub struct HostRuntime {
    host: SymbolTable,
    archives: HashMap<ArchiveKey, SymbolTable>,
}

impl HostRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines a symbol visible to every archive.
    pub fn define_host(&mut self, definition: TypeDefinition) -> &mut Self {
        self.host.define(definition);
        self
    }

    /// Defines a symbol visible only to `archive`.
    pub fn define_in_archive(&mut self, archive: ArchiveKey, definition: TypeDefinition) -> &mut Self {
        self.archives
            .entry(archive)
            .or_default()
            .define(definition);
        self
    }

    pub fn host_symbols(&self) -> &SymbolTable {
        &self.host
    }

    pub fn archive_symbols(&self, archive: &ArchiveKey) -> Option<&SymbolTable> {
        self.archives.get(archive)
    }
}
