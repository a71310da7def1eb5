//! Versioned singleton store for the booking policy.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::observability::metrics;
use crate::policy::types::{PolicyDocument, PolicyPatch};
use crate::policy::validation::{apply_patch, validate_policy, FieldError};

/// Errors raised by the policy store.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("invalid config: {}", join(.0))]
    InvalidConfig(Vec<FieldError>),

    #[error("config version conflict: expected {expected}, current {current}")]
    VersionConflict { expected: u64, current: u64 },

    #[error("config persistence failed: {0}")]
    Storage(#[from] std::io::Error),

    #[error("config document is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

fn join(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Holds the one policy document.
///
/// Reads are lock-free snapshots; writes are serialized and checked against
/// the document version before they are published.
pub struct PolicyStore {
    current: ArcSwap<PolicyDocument>,
    write_lock: Mutex<()>,
    persistence_path: Option<PathBuf>,
}

impl PolicyStore {
    /// In-memory store starting from the default policy.
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(PolicyDocument::default()),
            write_lock: Mutex::new(()),
            persistence_path: None,
        }
    }

    /// Load from `path` if the file exists; later writes are saved there.
    pub fn load_from_file(path: &Path) -> Result<Self, PolicyError> {
        let mut store = Self::new();
        store.persistence_path = Some(path.to_path_buf());

        if path.exists() {
            let reader = BufReader::new(File::open(path)?);
            let doc: PolicyDocument = serde_json::from_reader(reader)?;
            let errors = validate_policy(&doc.policy);
            if !errors.is_empty() {
                return Err(PolicyError::InvalidConfig(errors));
            }
            tracing::info!(path = %path.display(), version = doc.version, "Loaded booking policy");
            metrics::record_config_version(doc.version);
            store.current.store(Arc::new(doc));
        }
        Ok(store)
    }

    /// Current policy snapshot. Falls back to defaults when never written.
    pub fn get(&self) -> Arc<PolicyDocument> {
        self.current.load_full()
    }

    /// Merge `patch` into the stored policy and publish the result.
    pub fn set(&self, patch: &PolicyPatch, now: DateTime<Utc>) -> Result<Arc<PolicyDocument>, PolicyError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let current = self.current.load_full();

        if let Some(expected) = patch.version {
            if expected != current.version {
                return Err(PolicyError::VersionConflict {
                    expected,
                    current: current.version,
                });
            }
        }

        let policy = apply_patch(&current.policy, patch).map_err(PolicyError::InvalidConfig)?;
        let next = Arc::new(PolicyDocument {
            policy,
            version: current.version + 1,
            updated_at: Some(now),
        });

        self.save_to_file(&next)?;
        self.current.store(next.clone());

        metrics::record_config_version(next.version);
        tracing::info!(version = next.version, "Booking policy updated");
        Ok(next)
    }

    fn save_to_file(&self, doc: &PolicyDocument) -> Result<(), PolicyError> {
        let Some(path) = &self.persistence_path else {
            return Ok(());
        };

        // Write to a sibling file first so a failed write leaves the old document intact.
        let tmp = path.with_extension("json.tmp");
        {
            let writer = BufWriter::new(File::create(&tmp)?);
            serde_json::to_writer_pretty(writer, doc)?;
        }
        std::fs::rename(&tmp, path)?;
        Ok(())
    }
}

impl Default for PolicyStore {
    fn default() -> Self {
        Self::new()
    }
}
