use pw_core::{CoreError, JobId};
use pw_eval::EvalError;
use pw_race::RaceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The request failed validation; nothing was enqueued.
    #[error("invalid request: {0}")]
    Race(#[from] RaceError),

    #[error("invalid request: {0}")]
    Eval(#[from] EvalError),

    #[error("trial override must be at least 1")]
    ZeroTrials,

    #[error("job queue is full ({limit} waiting)")]
    QueueFull { limit: usize },

    #[error("scheduler is shut down")]
    ShutDown,

    #[error("unknown job {0}")]
    UnknownJob(JobId),

    #[error("{0} finished without a report")]
    Disconnected(JobId),

    #[error("{id} still running after waiting {waited_ms} ms")]
    JoinTimeout {
        id:        JobId,
        waited_ms: u64,
    },

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

pub type SchedResult<T> = Result<T, SchedError>;
