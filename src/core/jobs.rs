// Active-job registry: job id -> cancellation token of the task owning the process

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Opaque identifier of one download attempt
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new() -> Self {
        JobId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(value: &str) -> Self {
        JobId(value.to_string())
    }
}

impl From<String> for JobId {
    fn from(value: String) -> Self {
        JobId(value)
    }
}

/// Registry of live jobs.
///
/// Every operation takes the lock exactly once, so no caller can observe a
/// half-registered job.
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: Mutex<HashMap<JobId, CancellationToken>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a job. Returns false if the id is already active.
    pub fn register(&self, id: JobId, token: CancellationToken) -> bool {
        let mut jobs = self.jobs.lock();
        if jobs.contains_key(&id) {
            return false;
        }
        jobs.insert(id, token);
        true
    }

    /// Remove a job after its process was reaped
    pub fn deregister(&self, id: &JobId) -> bool {
        self.jobs.lock().remove(id).is_some()
    }

    /// Remove a job and fire its cancellation token.
    ///
    /// Returns whether a live job was found.
    pub fn cancel(&self, id: &JobId) -> bool {
        let token = self.jobs.lock().remove(id);
        match token {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancel every live job, returning how many were signalled
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<CancellationToken> = self.jobs.lock().drain().map(|(_, t)| t).collect();
        for token in &drained {
            token.cancel();
        }
        drained.len()
    }

    pub fn is_active(&self, id: &JobId) -> bool {
        self.jobs.lock().contains_key(id)
    }

    pub fn ids(&self) -> Vec<JobId> {
        let mut ids: Vec<JobId> = self.jobs.lock().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.jobs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.lock().is_empty()
    }
}
