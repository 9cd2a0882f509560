use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Failed to start the single-flight worker: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("Worker is gone, job `{0}` did not report a result")]
    WorkerGone(String),
    #[error("Interrupted while waiting for job `{0}`")]
    Interrupted(String),
    #[error("Job `{name}` failed, see logs for details")]
    Failed {
        name: String,
        #[source]
        source: BoxError,
    },
    #[error("Job `{name}` panicked: {message}")]
    Panicked { name: String, message: String },
}

impl SchedulerError {
    /// The job's own error, if the job ran and failed.
    pub fn into_job_error(self) -> std::result::Result<BoxError, Self> {
        match self {
            Self::Failed { source, .. } => Ok(source),
            other => Err(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
