//! registry::mock
//!
//! In-memory registry for deterministic testing.
//!
//! # Design
//!
//! `MemoryRegistry` keeps submissions in a map behind `Arc<Mutex<...>>`, so
//! clones share state. It can be told to fail, to answer slowly (for
//! timeout tests), and it records every operation for later inspection.
//!
//! # Example
//!
//! ```
//! use refcode::core::types::{Identity, ReferenceCode};
//! use refcode::registry::mock::MemoryRegistry;
//! use refcode::registry::{Registry, RegistryStatus};
//!
//! # tokio_test::block_on(async {
//! let registry = MemoryRegistry::new();
//! let code = ReferenceCode::parse("NRL0ABCDEFGHIJKL042").unwrap();
//! registry.insert(code.clone());
//!
//! let status = registry.lookup(&code, &Identity::default()).await.unwrap();
//! assert!(matches!(status, RegistryStatus::Available(_)));
//! # });
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use super::traits::{Registry, RegistryError, RegistryStatus, Submission, SubmissionStatus};
use crate::core::types::{Identity, ReferenceCode};

/// In-memory registry.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping.
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
    inner: Arc<Mutex<MemoryRegistryInner>>,
}

#[derive(Debug, Default)]
struct MemoryRegistryInner {
    submissions: HashMap<ReferenceCode, Submission>,
    /// Failure to inject into lookups.
    fail_on: Option<FailOn>,
    /// Artificial delay before each lookup answers.
    latency: Option<Duration>,
    operations: Vec<MockOperation>,
}

/// Failure injection for lookups.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Every lookup fails with the given error.
    Always(RegistryError),
    /// The next `n` lookups fail, later ones succeed.
    Times(usize, RegistryError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    Lookup { code: ReferenceCode },
    Insert { code: ReferenceCode },
    Consume { code: ReferenceCode },
}

impl MemoryRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with pre-existing submissions.
    pub fn with_submissions(submissions: Vec<Submission>) -> Self {
        let registry = Self::new();
        {
            let mut inner = registry.lock();
            inner.submissions = submissions
                .into_iter()
                .map(|s| (s.code.clone(), s))
                .collect();
        }
        registry
    }

    /// Configure failure injection.
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        self.lock().fail_on = Some(fail_on);
        self
    }

    /// Configure an artificial lookup delay.
    pub fn with_latency(self, latency: Duration) -> Self {
        self.lock().latency = Some(latency);
        self
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        self.lock().fail_on = None;
    }

    /// Register `code` as a pending submission.
    ///
    /// Re-inserting an existing code keeps the original submission.
    pub fn insert(&self, code: ReferenceCode) -> Submission {
        let mut inner = self.lock();
        inner.operations.push(MockOperation::Insert { code: code.clone() });
        inner
            .submissions
            .entry(code.clone())
            .or_insert_with(|| Submission::pending(code, Utc::now()))
            .clone()
    }

    /// Mark `code` as consumed.
    ///
    /// Returns the prior status: `NotFound` for unknown codes,
    /// `AlreadyUsed` if it was consumed before, else `Available`.
    pub fn consume(&self, code: &ReferenceCode) -> RegistryStatus {
        let mut inner = self.lock();
        inner.operations.push(MockOperation::Consume { code: code.clone() });
        match inner.submissions.get_mut(code) {
            None => RegistryStatus::NotFound,
            Some(s) if s.is_processed() => RegistryStatus::AlreadyUsed(s.clone()),
            Some(s) => {
                let before = s.clone();
                s.status = SubmissionStatus::Processed;
                RegistryStatus::Available(before)
            }
        }
    }

    /// Get a submission by code.
    pub fn get(&self, code: &ReferenceCode) -> Option<Submission> {
        self.lock().submissions.get(code).cloned()
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.lock().operations.clone()
    }

    /// Number of lookups performed so far.
    pub fn lookup_count(&self) -> usize {
        self.lock()
            .operations
            .iter()
            .filter(|op| matches!(op, MockOperation::Lookup { .. }))
            .count()
    }

    /// Clear recorded operations.
    pub fn clear_operations(&self) {
        self.lock().operations.clear();
    }

    fn lock(&self) -> MutexGuard<'_, MemoryRegistryInner> {
        // A panicking test thread must not wedge every other caller.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record a lookup and decide whether it should fail.
    fn begin_lookup(&self, code: &ReferenceCode) -> (Option<Duration>, Result<(), RegistryError>) {
        let mut inner = self.lock();
        inner.operations.push(MockOperation::Lookup { code: code.clone() });

        let failure = match inner.fail_on.take() {
            Some(FailOn::Always(e)) => {
                inner.fail_on = Some(FailOn::Always(e.clone()));
                Err(e)
            }
            Some(FailOn::Times(0, _)) | None => Ok(()),
            Some(FailOn::Times(n, e)) => {
                inner.fail_on = Some(FailOn::Times(n - 1, e.clone()));
                Err(e)
            }
        };
        (inner.latency, failure)
    }
}

#[async_trait]
impl Registry for MemoryRegistry {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn lookup(
        &self,
        code: &ReferenceCode,
        _identity: &Identity,
    ) -> Result<RegistryStatus, RegistryError> {
        let (latency, failure) = self.begin_lookup(code);
        if let Some(delay) = latency {
            tokio::time::sleep(delay).await;
        }
        failure?;

        Ok(match self.get(code) {
            Some(submission) => RegistryStatus::from_submission(submission),
            None => RegistryStatus::NotFound,
        })
    }
}
