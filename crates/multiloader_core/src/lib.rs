//! Core extension loading pipeline for multiloader.
//! Discovers Fabric and Quilt extension archives, normalizes their manifests
//! and activates their entrypoints with per-entrypoint failure isolation.

pub mod archive;
pub mod bootstrap;
pub mod ecosystem;
pub mod extension;
pub mod logging;
pub mod transform;

pub use archive::{ArchiveError, ExtensionArchive, MAX_ENTRY_BYTES};
pub use bootstrap::{Bootstrap, BootstrapConfig, BootstrapError, BootstrapReport};
pub use ecosystem::{
    ArchiveLoadError, ArchiveOutcome, ArchiveStatus, EcosystemLoader, EcosystemProfile,
    LoadContext, ScanReport, ARCHIVE_SUFFIX, FABRIC, QUILT,
};
pub use extension::activator::{
    activate_entrypoints, ActivationError, ActivationReport, EntrypointOutcome, Invoker,
};
pub use extension::isolation::{IsolatedLoader, SymbolOrigin};
pub use extension::manifest::{
    parse_manifest, Ecosystem, EntrypointRef, ExtensionDescriptor, ManifestError,
};
pub use extension::registry::{ExtensionRegistry, RegistryEntry};
pub use extension::symbols::{
    Activatable, ArchiveKey, BoxError, HostRuntime, ModInitializer, Runnable, SymbolTable,
    TypeDefinition,
};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use transform::{ConfigLedger, TransformError, TransformationSubsystem};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
