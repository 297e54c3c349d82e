//! Directory scanning and per-archive loading for one plugin ecosystem.
//!
//! # Responsibility
//! - Describe each supported ecosystem with an `EcosystemProfile`.
//! - Run scan → parse → register → declare → isolate → activate for every
//!   archive in one directory.
//!
//! # Invariants
//! - Archives are processed one at a time, sorted by file name.
//! - A failing archive is logged and never aborts the rest of the scan; this
//!   includes panics raised while reading or parsing it.
//! - Registration happens before entrypoint activation.
//! - The archive handle is dropped before the next archive is opened.

use crate::archive::{ArchiveError, ExtensionArchive};
use crate::extension::activator::{activate_entrypoints, ActivationReport};
use crate::extension::isolation::IsolatedLoader;
use crate::extension::manifest::{
    fabric_identity, parse_manifest, quilt_identity, Ecosystem, ManifestError,
};
use crate::extension::registry::ExtensionRegistry;
use crate::extension::symbols::HostRuntime;
use crate::logging::describe_panic_payload;
use crate::transform::{TransformError, TransformationSubsystem};
use log::{debug, error, info, warn};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};

/// File suffix that marks a candidate extension archive.
pub const ARCHIVE_SUFFIX: &str = ".jar";

/// Static description of one ecosystem's conventions.
#[derive(Clone, Copy)]
pub struct EcosystemProfile {
    pub ecosystem: Ecosystem,
    /// Manifest entry name inside the archive.
    pub manifest_entry: &'static str,
    /// Conventional scan directory name.
    pub directory: &'static str,
    /// Dotted path of the identity field, for diagnostics.
    pub identity_field: &'static str,
    pub extract_id: fn(&Value) -> Option<&str>,
}

impl std::fmt::Debug for EcosystemProfile {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EcosystemProfile")
            .field("ecosystem", &self.ecosystem)
            .field("manifest_entry", &self.manifest_entry)
            .field("directory", &self.directory)
            .field("identity_field", &self.identity_field)
            .finish_non_exhaustive()
    }
}

impl EcosystemProfile {
    pub fn label(&self) -> &'static str {
        self.ecosystem.as_str()
    }
}

pub const FABRIC: EcosystemProfile = EcosystemProfile {
    ecosystem: Ecosystem::Fabric,
    manifest_entry: "fabric.mod.json",
    directory: "fabric_mods",
    identity_field: "id",
    extract_id: fabric_identity,
};

pub const QUILT: EcosystemProfile = EcosystemProfile {
    ecosystem: Ecosystem::Quilt,
    manifest_entry: "quilt.mod.json",
    directory: "quilt_mods",
    identity_field: "quilt_loader.id",
    extract_id: quilt_identity,
};

/// Shared collaborators every archive load writes to.
pub struct LoadContext<'a> {
    pub runtime: &'a HostRuntime,
    pub transform: &'a mut dyn TransformationSubsystem,
    pub registry: &'a mut ExtensionRegistry,
}

/// What happened to one archive.
#[derive(Debug)]
pub enum ArchiveStatus {
    Loaded {
        id: String,
        transformation_configs: Vec<String>,
        activation: ActivationReport,
    },
    /// Archive has no manifest for this ecosystem.
    Skipped,
    Failed(ArchiveLoadError),
}

#[derive(Debug)]
pub struct ArchiveOutcome {
    pub file_name: String,
    pub status: ArchiveStatus,
}

/// Result of scanning one ecosystem directory.
#[derive(Debug)]
pub struct ScanReport {
    pub ecosystem: Ecosystem,
    pub directory: PathBuf,
    pub archives: Vec<ArchiveOutcome>,
    /// Set when the directory could not be created or listed.
    pub directory_error: Option<String>,
}

impl ScanReport {
    fn empty(ecosystem: Ecosystem, directory: &Path) -> Self {
        Self {
            ecosystem,
            directory: directory.to_path_buf(),
            archives: Vec::new(),
            directory_error: None,
        }
    }

    /// Ids of archives that reached registration, in scan order.
    pub fn loaded_ids(&self) -> Vec<&str> {
        self.archives
            .iter()
            .filter_map(|archive| match &archive.status {
                ArchiveStatus::Loaded { id, .. } => Some(id.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn failed_count(&self) -> usize {
        self.archives
            .iter()
            .filter(|archive| matches!(archive.status, ArchiveStatus::Failed(_)))
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.archives
            .iter()
            .filter(|archive| matches!(archive.status, ArchiveStatus::Skipped))
            .count()
    }

    pub fn archive(&self, file_name: &str) -> Option<&ArchiveOutcome> {
        self.archives
            .iter()
            .find(|archive| archive.file_name == file_name)
    }
}

/// Generic ecosystem loader parameterized by a profile.
#[derive(Debug, Clone, Copy)]
pub struct EcosystemLoader {
    profile: EcosystemProfile,
    suffix: &'static str,
}

impl EcosystemLoader {
    pub fn new(profile: EcosystemProfile) -> Self {
        Self {
            profile,
            suffix: ARCHIVE_SUFFIX,
        }
    }

    /// Overrides the archive suffix (default `.jar`).
    pub fn with_suffix(mut self, suffix: &'static str) -> Self {
        self.suffix = suffix;
        self
    }

    pub fn profile(&self) -> &EcosystemProfile {
        &self.profile
    }

    /// Loads every candidate archive in `dir`, creating `dir` if absent.
    ///
    /// Never fails as a whole: directory problems are reported through
    /// `ScanReport::directory_error`, archive problems per archive.
    pub fn load_dir(&self, dir: &Path, ctx: &mut LoadContext<'_>) -> ScanReport {
        let label = self.profile.label();
        let mut report = ScanReport::empty(self.profile.ecosystem, dir);

        let candidates = match self.list_candidates(dir) {
            Ok(candidates) => candidates,
            Err(err) => {
                error!(
                    "event=scan_dir module=ecosystem status=error loader={label} dir={} error={err}",
                    dir.display()
                );
                report.directory_error = Some(err.to_string());
                return report;
            }
        };
        debug!(
            "event=scan_dir module=ecosystem status=ok loader={label} dir={} candidates={}",
            dir.display(),
            candidates.len()
        );

        for path in candidates {
            let file_name = file_name_of(&path);
            let attempt = catch_unwind(AssertUnwindSafe(|| self.load_archive(&path, ctx)))
                .unwrap_or_else(|payload| {
                    Err(ArchiveLoadError::Panicked(describe_panic_payload(
                        payload.as_ref(),
                    )))
                });
            let status = match attempt {
                Ok(Some(loaded)) => loaded,
                Ok(None) => {
                    debug!(
                        "event=archive_skip module=ecosystem status=skip loader={label} archive={file_name} missing={}",
                        self.profile.manifest_entry
                    );
                    ArchiveStatus::Skipped
                }
                Err(err) => {
                    error!(
                        "event=archive_load module=ecosystem status=error loader={label} archive={file_name} error={err}"
                    );
                    ArchiveStatus::Failed(err)
                }
            };
            report.archives.push(ArchiveOutcome { file_name, status });
        }

        report
    }

    fn list_candidates(&self, dir: &Path) -> std::io::Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;
        let mut candidates = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            let matches_suffix = entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.ends_with(self.suffix));
            // Follows symlinks, so linked archives are picked up too.
            if matches_suffix && path.is_file() {
                candidates.push(path);
            }
        }
        candidates.sort();
        Ok(candidates)
    }

    /// Loads one archive; `Ok(None)` when the manifest entry is absent.
    fn load_archive(
        &self,
        path: &Path,
        ctx: &mut LoadContext<'_>,
    ) -> Result<Option<ArchiveStatus>, ArchiveLoadError> {
        let label = self.profile.label();
        let manifest = {
            let mut archive = ExtensionArchive::open(path)?;
            match archive.read_entry(self.profile.manifest_entry)? {
                Some(bytes) => bytes,
                None => return Ok(None),
            }
        };

        let descriptor = parse_manifest(&manifest, &self.profile)?;

        if let Some(previous) = ctx.registry.register(descriptor.id.as_str(), descriptor.origin) {
            warn!(
                "event=registry_collision module=ecosystem loader={label} id={} previous={previous} current={}",
                descriptor.id, descriptor.origin
            );
        }
        info!(
            "event=extension_loading module=ecosystem loader={label} id={} archive={}",
            descriptor.id,
            file_name_of(path)
        );

        for config in &descriptor.transformation_configs {
            ctx.transform.declare_config(config)?;
            info!(
                "event=transform_config module=ecosystem loader={label} id={} config={config}",
                descriptor.id
            );
        }

        let loader = IsolatedLoader::new(self.profile.ecosystem, path, ctx.runtime);
        let activation = activate_entrypoints(&descriptor, &loader, label);

        Ok(Some(ArchiveStatus::Loaded {
            id: descriptor.id,
            transformation_configs: descriptor.transformation_configs,
            activation,
        }))
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Archive-level failures. Contained by `EcosystemLoader::load_dir`.
#[derive(Debug)]
pub enum ArchiveLoadError {
    Unreadable(ArchiveError),
    MalformedManifest(ManifestError),
    Transform(TransformError),
    /// Reading or parsing the archive panicked; holds the panic message.
    Panicked(String),
}

impl Display for ArchiveLoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unreadable(err) => write!(f, "{err}"),
            Self::MalformedManifest(err) => write!(f, "{err}"),
            Self::Transform(err) => write!(f, "{err}"),
            Self::Panicked(payload) => write!(f, "archive load panicked: {payload}"),
        }
    }
}

impl Error for ArchiveLoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Unreadable(err) => Some(err),
            Self::MalformedManifest(err) => Some(err),
            Self::Transform(err) => Some(err),
            Self::Panicked(_) => None,
        }
    }
}

impl From<ArchiveError> for ArchiveLoadError {
    fn from(value: ArchiveError) -> Self {
        Self::Unreadable(value)
    }
}

impl From<ManifestError> for ArchiveLoadError {
    fn from(value: ManifestError) -> Self {
        Self::MalformedManifest(value)
    }
}

impl From<TransformError> for ArchiveLoadError {
    fn from(value: TransformError) -> Self {
        Self::Transform(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{EcosystemLoader, LoadContext, FABRIC, QUILT};
    use crate::extension::registry::ExtensionRegistry;
    use crate::extension::symbols::HostRuntime;
    use crate::transform::{ConfigLedger, TransformationSubsystem};

    #[test]
    fn profiles_describe_conventional_layout() {
        assert_eq!(FABRIC.manifest_entry, "fabric.mod.json");
        assert_eq!(FABRIC.directory, "fabric_mods");
        assert_eq!(QUILT.manifest_entry, "quilt.mod.json");
        assert_eq!(QUILT.directory, "quilt_mods");
        assert_eq!(QUILT.label(), "Quilt");
    }

    #[test]
    fn creates_missing_directory_and_ignores_non_archives() {
        let root = tempfile::tempdir().expect("temp dir");
        let dir = root.path().join("fabric_mods");
        let runtime = HostRuntime::new();
        let mut ledger = ConfigLedger::new();
        ledger.initialize().expect("init");
        let mut registry = ExtensionRegistry::new();
        let mut ctx = LoadContext {
            runtime: &runtime,
            transform: &mut ledger,
            registry: &mut registry,
        };

        let first = EcosystemLoader::new(FABRIC).load_dir(&dir, &mut ctx);
        assert!(dir.is_dir());
        assert!(first.archives.is_empty());
        assert!(first.directory_error.is_none());

        std::fs::write(dir.join("readme.txt"), b"not an archive").expect("write txt");
        std::fs::write(dir.join("mod.jar.bak"), b"stale").expect("write bak");
        std::fs::create_dir(dir.join("folder.jar")).expect("create dir");

        let second = EcosystemLoader::new(FABRIC).load_dir(&dir, &mut ctx);
        assert!(second.archives.is_empty());
        assert!(second.directory_error.is_none());
        assert!(registry.is_empty());
    }
}
