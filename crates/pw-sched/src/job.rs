//! Job requests, statuses, and reports.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use pw_core::{Circuit, CompoundTable, JobId};
use pw_eval::{EvalError, Evaluation, OptimizationOutcome, OptimizerConstraints};
use pw_model::ModelError;
use pw_race::{RaceError, RaceState, Strategy};

// ── Request ───────────────────────────────────────────────────────────────────

/// What a job computes.
#[derive(Clone, Debug)]
pub enum JobTask {
    /// Score one strategy.
    Evaluate { strategy: Strategy, wet: bool },
    /// Search for the best strategies.
    Optimize(OptimizerConstraints),
}

/// A unit of work for the scheduler.
///
/// Reference data is shared behind `Arc`; submitting many jobs for one
/// circuit copies nothing.
#[derive(Clone, Debug)]
pub struct JobRequest {
    pub circuit:      Arc<Circuit>,
    pub compounds:    Arc<CompoundTable>,
    pub task:         JobTask,
    /// Run seed.  `None` derives one from the scheduler seed and the job id.
    pub seed:         Option<u64>,
    /// Trials per strategy.  `None` uses the engine default.
    pub trials:       Option<u32>,
    /// Keep per-trial results in an evaluation's output.
    pub keep_results: bool,
}

impl JobRequest {
    pub fn evaluate(circuit: Arc<Circuit>, compounds: Arc<CompoundTable>, strategy: Strategy) -> Self {
        Self::new(circuit, compounds, JobTask::Evaluate { strategy, wet: false })
    }

    pub fn optimize(circuit: Arc<Circuit>, compounds: Arc<CompoundTable>, constraints: OptimizerConstraints) -> Self {
        Self::new(circuit, compounds, JobTask::Optimize(constraints))
    }

    fn new(circuit: Arc<Circuit>, compounds: Arc<CompoundTable>, task: JobTask) -> Self {
        Self { circuit, compounds, task, seed: None, trials: None, keep_results: false }
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn trials(mut self, trials: u32) -> Self {
        self.trials = Some(trials);
        self
    }

    pub fn keep_results(mut self, keep: bool) -> Self {
        self.keep_results = keep;
        self
    }

    /// Race condition for either task kind.
    pub fn wet(mut self, is_wet: bool) -> Self {
        match &mut self.task {
            JobTask::Evaluate { wet, .. } => *wet = is_wet,
            JobTask::Optimize(constraints) => constraints.wet = is_wet,
        }
        self
    }

    pub fn kind(&self) -> &'static str {
        match self.task {
            JobTask::Evaluate { .. } => "evaluate",
            JobTask::Optimize(_) => "optimize",
        }
    }
}

// ── Status ────────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Failed,
    Cancelled,
    TimedOut,
}

impl JobStatus {
    /// No further transitions happen from this status.
    #[inline]
    pub fn is_terminal(self) -> bool {
        !matches!(self, JobStatus::Queued | JobStatus::Running)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Queued    => "queued",
            JobStatus::Running   => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed    => "failed",
            JobStatus::Cancelled => "cancelled",
            JobStatus::TimedOut  => "timed_out",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Report ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum JobOutput {
    Evaluation(Evaluation),
    Optimization(OptimizationOutcome),
}

/// Diagnostics for a trial that produced a non-finite value.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NumericFailure {
    pub lap:   u32,
    /// Model term that went non-finite.
    pub term:  String,
    pub value: f64,
    /// Race state on entry to the failing lap.
    pub state: RaceState,
}

impl NumericFailure {
    pub(crate) fn from_error(err: &EvalError) -> Option<Self> {
        match err {
            EvalError::Race(RaceError::Numeric {
                lap,
                source: ModelError::NonFinite { term, value },
                state,
            }) => Some(NumericFailure {
                lap:   *lap,
                term:  (*term).to_owned(),
                value: *value,
                state: state.as_ref().clone(),
            }),
            _ => None,
        }
    }
}

/// Final word on a job, delivered through its [`JobHandle`][crate::JobHandle].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JobReport {
    pub id:          JobId,
    pub status:      JobStatus,
    pub seed:        u64,
    /// Position in the order jobs started running; `None` if it never ran.
    pub start_order: Option<u64>,
    pub run_time:    Duration,
    /// Present for completed, timed-out, and running-then-cancelled jobs.
    /// Statistics in a stopped job's output are flagged partial.
    pub output:      Option<JobOutput>,
    /// Failure message for `Failed` jobs.
    pub error:       Option<String>,
    /// Lap, term and race state when the failure was numeric.
    pub failure:     Option<NumericFailure>,
}
