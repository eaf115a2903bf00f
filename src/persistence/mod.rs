//! Whole-document JSON persistence.
//!
//! The entire application state is one JSON document rewritten on every
//! save. Loading is fail-soft: a missing file is initialized with the
//! empty default, and a corrupt file yields the in-memory default
//! without being overwritten. Single writer assumed; two store
//! instances racing on `save` is last-write-wins.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::{CallRequest, Claim, Policy, SessionState, User};
use crate::error::{PersistenceError, PersistenceResult};

/// Root persisted object holding all entities and session state.
///
/// Collections are newest-first: the domain store prepends new records.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub users: Vec<User>,
    pub policies: Vec<Policy>,
    pub claims: Vec<Claim>,
    pub call_requests: Vec<CallRequest>,
    pub session: SessionState,
}

/// File-backed adapter for a single [`Document`].
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    /// Create a store adapter for the given file path, ensuring the
    /// parent directory exists.
    pub fn new(path: impl Into<PathBuf>) -> PersistenceResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| PersistenceError::Directory {
                    message: format!("Failed to create store directory: {}", e),
                })?;
            }
        }
        Ok(Self { path })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document from disk.
    ///
    /// Missing file: the empty default is written out and returned.
    /// Unreadable or unparsable file: the empty default is returned
    /// WITHOUT touching the file on disk, so a corrupt store is never
    /// destroyed by a read. This method does not error.
    pub fn load(&self) -> Document {
        match fs::read_to_string(&self.path) {
            Ok(raw) => match serde_json::from_str::<Document>(&raw) {
                Ok(doc) => doc,
                Err(e) => {
                    warn!(
                        path = %self.path.display(),
                        error = %e,
                        "Store file is unparsable; using empty default without overwriting"
                    );
                    Document::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let doc = Document::default();
                if let Err(e) = self.save(&doc) {
                    warn!(
                        path = %self.path.display(),
                        error = %e,
                        "Failed to initialize empty store file"
                    );
                } else {
                    info!(path = %self.path.display(), "Initialized empty store file");
                }
                doc
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to read store file; using empty default"
                );
                Document::default()
            }
        }
    }

    /// Serialize and write the whole document.
    ///
    /// Writes to a sibling temp file then renames over the target, so a
    /// reader never observes a partial write.
    pub fn save(&self, doc: &Document) -> PersistenceResult<()> {
        let payload = serde_json::to_string_pretty(doc)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, payload).map_err(|e| PersistenceError::Write {
            message: format!("Failed to write {}: {}", tmp.display(), e),
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| PersistenceError::Write {
            message: format!("Failed to replace {}: {}", self.path.display(), e),
        })?;
        Ok(())
    }
}
