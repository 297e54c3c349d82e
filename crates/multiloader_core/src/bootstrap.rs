//! One-shot startup sequence.
//!
//! # Responsibility
//! - Initialize the transformation subsystem before any declaration.
//! - Scan the Fabric directory, then the Quilt directory, sequentially.
//! - Emit the final registry summary.
//!
//! # Invariants
//! - `Bootstrap::run` consumes the bootstrap value, so it runs once.
//! - Only transformation-subsystem initialization failure is fatal; every
//!   other failure is absorbed at archive or entrypoint granularity.
//! - No timeout exists: a hung entrypoint blocks the whole sequence.

use crate::ecosystem::{EcosystemLoader, LoadContext, ScanReport, ARCHIVE_SUFFIX, FABRIC, QUILT};
use crate::extension::registry::{ExtensionRegistry, RegistryEntry};
use crate::extension::symbols::HostRuntime;
use crate::transform::{TransformError, TransformationSubsystem};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Directory layout used by one bootstrap run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapConfig {
    pub fabric_dir: PathBuf,
    pub quilt_dir: PathBuf,
    pub archive_suffix: &'static str,
}

impl BootstrapConfig {
    /// Conventional layout (`fabric_mods/`, `quilt_mods/`) under `root`.
    pub fn in_dir(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            fabric_dir: root.join(FABRIC.directory),
            quilt_dir: root.join(QUILT.directory),
            archive_suffix: ARCHIVE_SUFFIX,
        }
    }
}

impl Default for BootstrapConfig {
    /// Conventional layout relative to the working directory.
    fn default() -> Self {
        Self::in_dir(".")
    }
}

/// Everything one bootstrap run produced.
#[derive(Debug)]
pub struct BootstrapReport {
    /// Fabric scan first, Quilt scan second.
    pub scans: Vec<ScanReport>,
    pub summary: Vec<RegistryEntry>,
}

impl BootstrapReport {
    pub fn summary_lines(&self) -> Vec<String> {
        self.summary
            .iter()
            .map(|entry| format!(" - {} from {}", entry.id, entry.origin))
            .collect()
    }
}

pub struct Bootstrap {
    config: BootstrapConfig,
}

impl Bootstrap {
    pub fn new(config: BootstrapConfig) -> Self {
        Self { config }
    }

    /// Runs the full startup sequence against explicit collaborators.
    ///
    /// # Errors
    /// - `TransformInit` when the transformation subsystem fails to
    ///   initialize; no directory is scanned in that case.
    pub fn run(
        self,
        runtime: &HostRuntime,
        transform: &mut dyn TransformationSubsystem,
        registry: &mut ExtensionRegistry,
    ) -> Result<BootstrapReport, BootstrapError> {
        info!("event=bootstrap_start module=bootstrap status=ok");
        transform.initialize().map_err(|err| {
            error!("event=transform_init module=bootstrap status=error error={err}");
            BootstrapError::TransformInit(err)
        })?;
        info!("event=transform_ready module=bootstrap status=ok");

        let mut ctx = LoadContext {
            runtime,
            transform,
            registry,
        };
        let scans = vec![
            EcosystemLoader::new(FABRIC)
                .with_suffix(self.config.archive_suffix)
                .load_dir(&self.config.fabric_dir, &mut ctx),
            EcosystemLoader::new(QUILT)
                .with_suffix(self.config.archive_suffix)
                .load_dir(&self.config.quilt_dir, &mut ctx),
        ];

        let summary = ctx.registry.summarize();
        info!(
            "event=bootstrap_done module=bootstrap status=ok extensions={}",
            summary.len()
        );
        for line in ctx.registry.summary_lines() {
            info!("{line}");
        }

        Ok(BootstrapReport { scans, summary })
    }
}

/// Fatal bootstrap errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapError {
    TransformInit(TransformError),
}

impl Display for BootstrapError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TransformInit(err) => {
                write!(f, "transformation subsystem failed to initialize: {err}")
            }
        }
    }
}

impl Error for BootstrapError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::TransformInit(err) => Some(err),
        }
    }
}
