use std::collections::BTreeMap;
use std::sync::Arc;

use super::{builtin, Job, JobError, JobId, JobResult};

/// Explicit mapping from job identifier to its capability set.
///
/// Built once at startup and injected into the engine's request layer and
/// into every worker, so both sides resolve the same functions.
#[derive(Debug, Clone, Default)]
pub struct JobRegistry {
    jobs: BTreeMap<JobId, Arc<Job>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the jobs shipped with the server
    pub fn with_builtin_jobs() -> Self {
        let mut registry = Self::new();
        for job in builtin::all() {
            // Built-in ids and endpoints are distinct.
            registry.jobs.insert(job.id, Arc::new(job));
        }
        registry
    }

    /// Register a job; ids and endpoints must be unique
    pub fn register(&mut self, job: Job) -> JobResult<()> {
        if self.jobs.contains_key(&job.id) {
            return Err(JobError::DuplicateJob(job.id));
        }
        if self.jobs.values().any(|j| j.endpoint == job.endpoint) {
            return Err(JobError::DuplicateEndpoint(job.endpoint));
        }
        self.jobs.insert(job.id, Arc::new(job));
        Ok(())
    }

    pub fn get(&self, id: JobId) -> Option<Arc<Job>> {
        self.jobs.get(&id).cloned()
    }

    /// Resolve a job by numeric id or by name
    pub fn find(&self, id_or_name: &str) -> JobResult<Arc<Job>> {
        let by_id = id_or_name
            .parse::<JobId>()
            .ok()
            .and_then(|id| self.get(id));

        by_id
            .or_else(|| {
                self.jobs
                    .values()
                    .find(|job| job.name == id_or_name)
                    .cloned()
            })
            .ok_or_else(|| JobError::UnknownJob(id_or_name.to_string()))
    }

    /// Jobs in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Job>> {
        self.jobs.values()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
