//! Zip-packaged extension archive access.
//!
//! # Responsibility
//! - Open one extension archive from disk.
//! - Read a named entry, distinguishing "absent" from "unreadable".
//!
//! # Invariants
//! - The file handle lives exactly as long as the `ExtensionArchive` value.
//! - Entry reads never trust the size recorded in the zip headers; at most
//!   `MAX_ENTRY_BYTES` are buffered.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use zip::result::ZipError;
use zip::ZipArchive;

/// Upper bound on a single entry read. Manifests are a few KiB in practice.
pub const MAX_ENTRY_BYTES: u64 = 1024 * 1024;

/// One opened extension archive.
pub struct ExtensionArchive {
    path: PathBuf,
    zip: ZipArchive<File>,
}

impl ExtensionArchive {
    /// Opens the archive at `path`.
    ///
    /// # Errors
    /// - `Io` when the file cannot be opened.
    /// - `Format` when the file is not a readable zip container.
    pub fn open(path: &Path) -> Result<Self, ArchiveError> {
        let file = File::open(path).map_err(|err| ArchiveError::Io {
            path: path.to_path_buf(),
            source: err,
        })?;
        let zip = ZipArchive::new(file).map_err(|err| ArchiveError::Format {
            path: path.to_path_buf(),
            source: err,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            zip,
        })
    }

    /// Reads entry `name` fully; `Ok(None)` when the archive has no such entry.
    ///
    /// # Errors
    /// - `EntryTooLarge` when the entry holds more than `MAX_ENTRY_BYTES`.
    pub fn read_entry(&mut self, name: &str) -> Result<Option<Vec<u8>>, ArchiveError> {
        let mut entry = match self.zip.by_name(name) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(err) => {
                return Err(ArchiveError::Format {
                    path: self.path.clone(),
                    source: err,
                })
            }
        };

        // Header sizes are attacker-controlled; only use them as a capped hint.
        let hint = usize::try_from(entry.size().min(MAX_ENTRY_BYTES)).unwrap_or(0);
        let mut bytes = Vec::with_capacity(hint);
        (&mut entry)
            .take(MAX_ENTRY_BYTES + 1)
            .read_to_end(&mut bytes)
            .map_err(|err| ArchiveError::Io {
                path: self.path.clone(),
                source: err,
            })?;
        if bytes.len() as u64 > MAX_ENTRY_BYTES {
            return Err(ArchiveError::EntryTooLarge {
                path: self.path.clone(),
                entry: name.to_string(),
                limit: MAX_ENTRY_BYTES,
            });
        }
        Ok(Some(bytes))
    }
}

/// Archive could not be opened or read.
#[derive(Debug)]
pub enum ArchiveError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Format {
        path: PathBuf,
        source: ZipError,
    },
    EntryTooLarge {
        path: PathBuf,
        entry: String,
        limit: u64,
    },
}

impl Display for ArchiveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read archive `{}`: {source}", path.display())
            }
            Self::Format { path, source } => {
                write!(f, "invalid archive `{}`: {source}", path.display())
            }
            Self::EntryTooLarge { path, entry, limit } => write!(
                f,
                "entry `{entry}` in archive `{}` exceeds {limit} bytes",
                path.display()
            ),
        }
    }
}

impl Error for ArchiveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Format { source, .. } => Some(source),
            Self::EntryTooLarge { .. } => None,
        }
    }
}
