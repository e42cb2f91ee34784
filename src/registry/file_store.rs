//! registry::file_store
//!
//! File-backed registry.
//!
//! # Storage
//!
//! - Submissions live in a JSON file, `~/.nrl/registry.json` by default
//! - All writes are atomic (write to temp file, then rename)
//! - Mutations hold an exclusive OS lock on `<file>.lock`
//!
//! Lookups read without locking. Because writes replace the file by
//! rename, a reader always sees either the old or the new contents.
//!
//! # Invariants
//!
//! - A code appears at most once
//! - `Processed` is terminal: a consumed code is never reset
//!
//! # Example
//!
//! ```no_run
//! use refcode::core::types::ReferenceCode;
//! use refcode::registry::FileRegistry;
//!
//! let registry = FileRegistry::new().unwrap();
//! let code = ReferenceCode::parse("NRL0ABCDEFGHIJKL042").unwrap();
//! registry.record(&code, None).unwrap();
//! registry.consume(&code).unwrap();
//! ```

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use fs2::FileExt;
use serde::{Deserialize, Serialize};

use super::traits::{
    new_form_id, Registry, RegistryError, RegistryStatus, Submission, SubmissionStatus,
};
use crate::core::types::{Identity, ReferenceCode};

/// On-disk format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RegistryFile {
    submissions: BTreeMap<String, Submission>,
}

/// File-backed registry.
#[derive(Debug, Clone)]
pub struct FileRegistry {
    path: PathBuf,
}

impl FileRegistry {
    /// Create a registry at the default location, `~/.nrl/registry.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, RegistryError> {
        let home = dirs::home_dir()
            .ok_or_else(|| RegistryError::Storage("cannot determine home directory".into()))?;
        Ok(Self::with_path(home.join(".nrl").join("registry.json")))
    }

    /// Create a registry at a custom path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the path to the registry file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record `code` as a pending submission.
    ///
    /// Idempotent: recording a known code returns the stored submission
    /// unchanged.
    pub fn record(
        &self,
        code: &ReferenceCode,
        form_id: Option<String>,
    ) -> Result<Submission, RegistryError> {
        self.mutate(|file| {
            let submission = file
                .submissions
                .entry(code.to_string())
                .or_insert_with(|| Submission {
                    code: code.clone(),
                    form_id: form_id.unwrap_or_else(new_form_id),
                    submission_time: Utc::now(),
                    status: SubmissionStatus::Pending,
                })
                .clone();
            tracing::debug!(code = %code, status = %submission.status, "recorded submission");
            submission
        })
    }

    /// Promote a pending submission to `Validated`.
    ///
    /// Returns the resulting status. Validated and processed submissions
    /// are left as they are.
    pub fn mark_validated(&self, code: &ReferenceCode) -> Result<RegistryStatus, RegistryError> {
        self.mutate(|file| match file.submissions.get_mut(code.as_str()) {
            None => RegistryStatus::NotFound,
            Some(s) => {
                if s.status == SubmissionStatus::Pending {
                    s.status = SubmissionStatus::Validated;
                }
                RegistryStatus::from_submission(s.clone())
            }
        })
    }

    /// Consume `code`, marking it `Processed`.
    ///
    /// Returns the status before consumption: `Available` on success,
    /// `AlreadyUsed` if it was consumed before, `NotFound` if unknown.
    /// Only the `Available` case changes the file.
    pub fn consume(&self, code: &ReferenceCode) -> Result<RegistryStatus, RegistryError> {
        self.mutate(|file| match file.submissions.get_mut(code.as_str()) {
            None => RegistryStatus::NotFound,
            Some(s) if s.is_processed() => RegistryStatus::AlreadyUsed(s.clone()),
            Some(s) => {
                let before = s.clone();
                s.status = SubmissionStatus::Processed;
                tracing::debug!(code = %code, "consumed submission");
                RegistryStatus::Available(before)
            }
        })
    }

    /// List all submissions, ordered by code.
    pub fn list(&self) -> Result<Vec<Submission>, RegistryError> {
        Ok(self.read()?.submissions.into_values().collect())
    }

    /// Read the registry file. A missing file is an empty registry.
    fn read(&self) -> Result<RegistryFile, RegistryError> {
        if !self.path.exists() {
            return Ok(RegistryFile::default());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            RegistryError::Storage(format!("cannot read {}: {}", self.path.display(), e))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            RegistryError::Storage(format!("cannot parse {}: {}", self.path.display(), e))
        })
    }

    /// Apply `f` to the registry under the write lock and persist it.
    ///
    /// Nothing is written when `f` leaves the registry unchanged.
    fn mutate<T>(&self, f: impl FnOnce(&mut RegistryFile) -> T) -> Result<T, RegistryError> {
        let _lock = RegistryLock::acquire(&self.path)?;
        let before = self.read()?;
        let mut file = before.clone();
        let result = f(&mut file);
        if file != before {
            self.write(&file)?;
        }
        Ok(result)
    }

    /// Write the registry file atomically.
    fn write(&self, contents: &RegistryFile) -> Result<(), RegistryError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| RegistryError::Storage(format!("cannot create directory: {}", e)))?;
        }

        let json = serde_json::to_string_pretty(contents)
            .map_err(|e| RegistryError::Storage(format!("cannot serialize registry: {}", e)))?;

        let temp_path = self.path.with_extension("json.tmp");
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .map_err(|e| RegistryError::Storage(format!("cannot create temp file: {}", e)))?;

            file.write_all(json.as_bytes())
                .map_err(|e| RegistryError::Storage(format!("cannot write temp file: {}", e)))?;

            file.sync_all()
                .map_err(|e| RegistryError::Storage(format!("cannot sync temp file: {}", e)))?;
        }

        fs::rename(&temp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            RegistryError::Storage(format!("cannot replace registry file: {}", e))
        })
    }
}

#[async_trait]
impl Registry for FileRegistry {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn lookup(
        &self,
        code: &ReferenceCode,
        _identity: &Identity,
    ) -> Result<RegistryStatus, RegistryError> {
        let mut file = self.read()?;
        Ok(match file.submissions.remove(code.as_str()) {
            Some(submission) => RegistryStatus::from_submission(submission),
            None => RegistryStatus::NotFound,
        })
    }
}

/// Exclusive lock on a registry file.
///
/// Held for the duration of a read-modify-write. Released on drop.
#[derive(Debug)]
struct RegistryLock {
    file: File,
}

impl RegistryLock {
    /// Acquire the lock next to `registry_path` without blocking.
    fn acquire(registry_path: &Path) -> Result<Self, RegistryError> {
        if let Some(parent) = registry_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| RegistryError::Storage(format!("cannot create directory: {}", e)))?;
        }

        let lock_path = registry_path.with_extension("json.lock");
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| {
                RegistryError::Storage(format!("cannot open {}: {}", lock_path.display(), e))
            })?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Self { file }),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Err(RegistryError::Storage(
                "registry is locked by another nrl process".into(),
            )),
            Err(e) => Err(RegistryError::Storage(format!("cannot lock registry: {}", e))),
        }
    }
}

impl Drop for RegistryLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
