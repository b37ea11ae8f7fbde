use thiserror::Error;

use super::JobId;

pub type JobResult<T> = Result<T, JobError>;

/// Failures raised by job functions and by the job registry
#[derive(Debug, Error)]
pub enum JobError {
    #[error("record is missing field `{field}`")]
    MissingField { field: &'static str },

    #[error("invalid record: {0}")]
    InvalidRecord(String),

    #[error("invalid group: {0}")]
    InvalidGroup(String),

    #[error("group {key} has no {what}")]
    EmptyGroup { key: String, what: &'static str },

    #[error("job {0} is already registered")]
    DuplicateJob(JobId),

    #[error("endpoint {0} is already served by another job")]
    DuplicateEndpoint(String),

    #[error("no job registered as `{0}`")]
    UnknownJob(String),
}
