use std::path::PathBuf;
use thiserror::Error;

use crate::job::{JobError, JobId};
use crate::store::StoreError;
use crate::subprocess::{ExitStatus, ProcessError};

/// Failures of a single chunk's worker, on either side of the process boundary
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("failed to spawn {role} worker `{program}`")]
    Spawn {
        role: &'static str,
        program: PathBuf,
        #[source]
        source: ProcessError,
    },

    #[error("worker for {unit} exited with {status} before signaling completion")]
    ExitedWithoutSignal { unit: String, status: ExitStatus },

    #[error("worker task for {unit} ended without signaling completion")]
    Abandoned { unit: String },

    #[error("no payload stored at {key}")]
    MissingPayload { key: String },

    #[error("job {0} is not registered")]
    UnknownJob(JobId),

    #[error("job function failed on element {index}")]
    Job {
        index: usize,
        #[source]
        source: JobError,
    },

    #[error("store operation failed")]
    Store(#[from] StoreError),

    #[error("worker process I/O failed")]
    Process(#[from] ProcessError),
}
