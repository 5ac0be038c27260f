// crates/roidota-core/src/store.rs
// ============================================================================
// Module: Roidota Manifest Store
// Description: Shared, persisted device-to-firmware mapping.
// Purpose: Serve lock-light reads and atomic wholesale replacement.
// Dependencies: serde_json, thiserror, tracing
// ============================================================================

//! ## Overview
//! [`ManifestStore`] is a cloneable handle over one shared mapping. Readers
//! clone the current [`Arc<Manifest>`] under a short read lock; replacement
//! swaps in a fully built manifest and then persists it.
//! Invariants:
//! - A reader sees the mapping entirely before or entirely after a replacement.
//! - Reads never touch the filesystem.
//! - Replacements are serialized so the file matches the most recent swap.
//! - A failed persist leaves the new mapping in memory and is reported.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::RwLock;

use thiserror::Error;
use tracing::info;
use tracing::warn;

use crate::identifiers::DeviceId;
use crate::identifiers::FirmwareRef;
use crate::manifest::Manifest;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum persisted manifest size accepted on load.
pub const MAX_MANIFEST_FILE_BYTES: usize = 16 * 1024 * 1024;

/// Read cap one byte past the limit so growth after the size check is caught.
const READ_LIMIT_BYTES: u64 = MAX_MANIFEST_FILE_BYTES as u64 + 1;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Non-fatal load failure; the store starts empty.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceWarning {
    /// Manifest file does not exist.
    #[error("manifest file not found: {path}")]
    Missing {
        /// Manifest path.
        path: String,
    },
    /// Manifest file could not be read.
    #[error("manifest file unreadable: {path}: {reason}")]
    Unreadable {
        /// Manifest path.
        path: String,
        /// I/O failure detail.
        reason: String,
    },
    /// Manifest file exceeds [`MAX_MANIFEST_FILE_BYTES`].
    #[error("manifest file exceeds {max} bytes: {path}")]
    TooLarge {
        /// Manifest path.
        path: String,
        /// Maximum accepted size.
        max: usize,
    },
    /// Manifest file content is not a valid manifest.
    #[error("manifest file malformed: {path}: {reason}")]
    Malformed {
        /// Manifest path.
        path: String,
        /// Validation failure detail.
        reason: String,
    },
}

/// Failure to persist a replaced manifest.
///
/// The in-memory mapping has already been replaced when this is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    /// Manifest could not be serialized.
    #[error("manifest serialization failed: {0}")]
    Serialize(String),
    /// Manifest could not be written.
    #[error("failed to save manifest to {path}: {reason}")]
    Write {
        /// Manifest path.
        path: String,
        /// I/O failure detail.
        reason: String,
    },
}

// ============================================================================
// SECTION: Manifest Store
// ============================================================================

/// Shared state behind every store handle.
#[derive(Debug)]
struct StoreInner {
    /// Persisted manifest path.
    path: PathBuf,
    /// Current mapping; swapped as a whole.
    current: RwLock<Arc<Manifest>>,
    /// Serializes replace-and-persist sequences.
    writer: Mutex<()>,
}

/// Cloneable handle to the process-wide manifest.
///
/// # Invariants
/// - All clones observe the same mapping.
#[derive(Debug, Clone)]
pub struct ManifestStore {
    /// Shared store state.
    inner: Arc<StoreInner>,
}

impl ManifestStore {
    /// Creates a store over `path` seeded with `manifest`, without touching disk.
    #[must_use]
    pub fn with_manifest(path: impl Into<PathBuf>, manifest: Manifest) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                path: path.into(),
                current: RwLock::new(Arc::new(manifest)),
                writer: Mutex::new(()),
            }),
        }
    }

    /// Loads the store from the persisted manifest at `path`.
    ///
    /// Load failures never abort: the store starts empty and the warning is
    /// returned alongside it.
    #[must_use]
    pub fn load(path: impl Into<PathBuf>) -> (Self, Option<PersistenceWarning>) {
        let path = path.into();
        match read_manifest_file(&path) {
            Ok(manifest) => {
                info!(path = %path.display(), entries = manifest.len(), "manifest loaded");
                (Self::with_manifest(path, manifest), None)
            }
            Err(warning) => {
                warn!(%warning, "starting with an empty manifest");
                (Self::with_manifest(path, Manifest::new()), Some(warning))
            }
        }
    }

    /// Returns the persisted manifest path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Returns an immutable snapshot of the current mapping.
    #[must_use]
    pub fn get_all(&self) -> Arc<Manifest> {
        let current = self.inner.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&current)
    }

    /// Returns the firmware reference mapped to `device`, if any.
    #[must_use]
    pub fn resolve(&self, device: &DeviceId) -> Option<FirmwareRef> {
        let current = self.inner.current.read().unwrap_or_else(PoisonError::into_inner);
        current.get(device).cloned()
    }

    /// Swaps in `manifest` as the current mapping, then persists it.
    ///
    /// The swap happens before the write; a failed write leaves the new
    /// mapping in memory so the caller can retry the save.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the manifest cannot be written.
    pub fn replace(&self, manifest: Manifest) -> Result<(), PersistenceError> {
        let _writer = self.inner.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let next = Arc::new(manifest);
        {
            let mut current = self.inner.current.write().unwrap_or_else(PoisonError::into_inner);
            *current = Arc::clone(&next);
        }
        info!(entries = next.len(), "manifest replaced");
        match write_manifest_file(&self.inner.path, &next) {
            Ok(()) => {
                info!(path = %self.inner.path.display(), "manifest saved");
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "manifest replaced in memory but not saved");
                Err(err)
            }
        }
    }
}

// ============================================================================
// SECTION: Persistence
// ============================================================================

/// Reads and validates a persisted manifest file.
///
/// # Errors
///
/// Returns [`PersistenceWarning`] describing why the file could not be used.
pub fn read_manifest_file(path: &Path) -> Result<Manifest, PersistenceWarning> {
    let label = path.display().to_string();
    let unreadable = |err: std::io::Error| PersistenceWarning::Unreadable {
        path: label.clone(),
        reason: err.to_string(),
    };
    let file = fs::File::open(path).map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            PersistenceWarning::Missing {
                path: label.clone(),
            }
        } else {
            unreadable(err)
        }
    })?;
    let too_large = || PersistenceWarning::TooLarge {
        path: label.clone(),
        max: MAX_MANIFEST_FILE_BYTES,
    };
    let declared = file.metadata().map_err(unreadable)?.len();
    let within_limit = usize::try_from(declared).is_ok_and(|len| len <= MAX_MANIFEST_FILE_BYTES);
    if !within_limit {
        return Err(too_large());
    }
    let mut bytes = Vec::new();
    file.take(READ_LIMIT_BYTES).read_to_end(&mut bytes).map_err(unreadable)?;
    if bytes.len() > MAX_MANIFEST_FILE_BYTES {
        return Err(too_large());
    }
    let content = std::str::from_utf8(&bytes).map_err(|_| PersistenceWarning::Malformed {
        path: label.clone(),
        reason: "manifest file must be utf-8".to_string(),
    })?;
    Manifest::from_json_slice(content.as_bytes()).map_err(|err| PersistenceWarning::Malformed {
        path: label,
        reason: err.to_string(),
    })
}

/// Writes a manifest as pretty-printed JSON via a synced temporary file.
///
/// # Errors
///
/// Returns [`PersistenceError`] when serialization or any filesystem step fails.
pub fn write_manifest_file(path: &Path, manifest: &Manifest) -> Result<(), PersistenceError> {
    let mut contents =
        manifest.to_pretty_json().map_err(|err| PersistenceError::Serialize(err.to_string()))?;
    contents.push('\n');
    let temp_path = path.with_extension("tmp");
    let write_error = |err: std::io::Error| PersistenceError::Write {
        path: path.display().to_string(),
        reason: err.to_string(),
    };
    let result = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&temp_path)
        .and_then(|mut file| {
            file.write_all(contents.as_bytes())?;
            file.sync_all()
        })
        .and_then(|()| fs::rename(&temp_path, path));
    if let Err(err) = result {
        let _ = fs::remove_file(&temp_path);
        return Err(write_error(err));
    }
    Ok(())
}
