//! Extension manifest parsing and normalized descriptor model.
//!
//! # Responsibility
//! - Decode `fabric.mod.json` / `quilt.mod.json` documents.
//! - Normalize both formats into one `ExtensionDescriptor`.
//!
//! # Invariants
//! - Entrypoint groups and refs keep manifest declaration order.
//! - Omitted `mixins` / `entrypoints` fields yield empty collections.
//! - Parsing is pure: no registry, filesystem or logging side effects.

use crate::ecosystem::EcosystemProfile;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Plugin ecosystem an extension was authored for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ecosystem {
    Fabric,
    Quilt,
}

impl Ecosystem {
    /// Human-facing origin label used in logs and registry summaries.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fabric => "Fabric",
            Self::Quilt => "Quilt",
        }
    }
}

impl Display for Ecosystem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to one piece of initialization code declared by a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EntrypointRef {
    /// Fully-qualified symbol name, e.g. `com.example.ExampleMod`.
    #[serde(rename = "value")]
    pub target: String,
}

impl EntrypointRef {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }
}

/// Normalized view of one extension manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionDescriptor {
    pub id: String,
    /// Transformation config paths, in manifest order.
    pub transformation_configs: Vec<String>,
    /// Entrypoint groups keyed by group name, in manifest order.
    pub entrypoint_groups: IndexMap<String, Vec<EntrypointRef>>,
    pub origin: Ecosystem,
}

impl ExtensionDescriptor {
    /// Total number of entrypoint refs across all groups.
    pub fn entrypoint_count(&self) -> usize {
        self.entrypoint_groups.values().map(Vec::len).sum()
    }
}

/// Parses raw manifest bytes using the identity rule of `profile`.
///
/// # Errors
/// - `InvalidJson` when the bytes are not a JSON document.
/// - `NotAnObject` when the document root is not an object.
/// - `MissingIdentity` when the identity field is absent or not a string.
/// - `InvalidField` when `mixins` / `entrypoints` have the wrong shape.
pub fn parse_manifest(
    bytes: &[u8],
    profile: &EcosystemProfile,
) -> Result<ExtensionDescriptor, ManifestError> {
    let document: Value =
        serde_json::from_slice(bytes).map_err(|err| ManifestError::InvalidJson(err.to_string()))?;
    if !document.is_object() {
        return Err(ManifestError::NotAnObject);
    }

    let id = (profile.extract_id)(&document)
        .ok_or(ManifestError::MissingIdentity(profile.identity_field))?
        .to_string();

    // Both formats share the `mixins` / `entrypoints` shapes.
    let transformation_configs = decode_field(&document, "mixins")?.unwrap_or_default();
    let entrypoint_groups = decode_field(&document, "entrypoints")?.unwrap_or_default();

    Ok(ExtensionDescriptor {
        id,
        transformation_configs,
        entrypoint_groups,
        origin: profile.ecosystem,
    })
}

/// Identity rule for Fabric manifests: top-level `id`.
pub fn fabric_identity(document: &Value) -> Option<&str> {
    document.get("id")?.as_str()
}

/// Identity rule for Quilt manifests: nested `quilt_loader.id`.
pub fn quilt_identity(document: &Value) -> Option<&str> {
    document.get("quilt_loader")?.get("id")?.as_str()
}

fn decode_field<T>(document: &Value, field: &'static str) -> Result<Option<T>, ManifestError>
where
    T: for<'de> Deserialize<'de>,
{
    let Some(raw) = document.get(field) else {
        return Ok(None);
    };
    T::deserialize(raw)
        .map(Some)
        .map_err(|err| ManifestError::InvalidField {
            field,
            reason: err.to_string(),
        })
}

/// Malformed manifest errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestError {
    InvalidJson(String),
    NotAnObject,
    MissingIdentity(&'static str),
    InvalidField { field: &'static str, reason: String },
}

impl Display for ManifestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidJson(reason) => write!(f, "manifest is not valid JSON: {reason}"),
            Self::NotAnObject => write!(f, "manifest root must be a JSON object"),
            Self::MissingIdentity(field) => {
                write!(f, "manifest missing string identity field `{field}`")
            }
            Self::InvalidField { field, reason } => {
                write!(f, "manifest field `{field}` has invalid shape: {reason}")
            }
        }
    }
}

impl Error for ManifestError {}
