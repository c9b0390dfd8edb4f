//! Worker pool, FIFO queue, and the job table.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError, bounded, unbounded};
use pw_core::{Circuit, CompoundTable, EngineConfig, JobId, derive_seed};
use pw_eval::{EvaluatorConfig, StrategyEvaluator, StrategyOptimizer};
use pw_race::{CancelToken, RaceBuilder, RacePlan, StopReason};
use tracing::{error, info, warn};

use crate::{JobOutput, JobReport, JobRequest, JobStatus, JobTask, NumericFailure, SchedError, SchedResult};

// ── Queued work ───────────────────────────────────────────────────────────────

/// A validated job, ready for a worker.
enum Work {
    Evaluate {
        plan:      RacePlan,
        evaluator: StrategyEvaluator,
    },
    Optimize {
        circuit:   Arc<Circuit>,
        compounds: Arc<CompoundTable>,
        optimizer: StrategyOptimizer,
    },

    /// Occupies a worker until released or stopped.
    #[cfg(test)]
    Hold { release: Receiver<()> },

    #[cfg(test)]
    Panic,
}

struct Queued {
    id:     JobId,
    seed:   u64,
    work:   Work,
    cancel: CancelToken,
    reply:  Sender<JobReport>,
}

// ── Job table ─────────────────────────────────────────────────────────────────

struct Entry {
    status: JobStatus,
    cancel: CancelToken,
}

/// Status and cancellation token of every job not yet forgotten.
///
/// The only mutable state shared between the submitting side and the
/// workers.  Status transitions happen under the lock so a cancel racing a
/// job start resolves one way or the other, never both.
#[derive(Default)]
struct JobTable {
    jobs:    Mutex<HashMap<JobId, Entry>>,
    started: AtomicU64,
}

impl JobTable {
    fn lock(&self) -> MutexGuard<'_, HashMap<JobId, Entry>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn status(&self, id: JobId) -> Option<JobStatus> {
        self.lock().get(&id).map(|e| e.status)
    }

    /// Queued → Running.  Returns the start position, or `None` if the job
    /// was cancelled while it waited.
    fn begin(&self, id: JobId) -> Option<u64> {
        let mut jobs = self.lock();
        let entry = jobs.get_mut(&id)?;
        if entry.status != JobStatus::Queued || entry.cancel.is_cancelled() {
            return None;
        }
        entry.status = JobStatus::Running;
        Some(self.started.fetch_add(1, Ordering::Relaxed))
    }

    fn finish(&self, id: JobId, status: JobStatus) {
        if let Some(entry) = self.lock().get_mut(&id) {
            entry.status = status;
        }
    }

    fn cancel(&self, id: JobId) -> SchedResult<JobStatus> {
        let mut jobs = self.lock();
        let entry = jobs.get_mut(&id).ok_or(SchedError::UnknownJob(id))?;
        if entry.status.is_terminal() {
            return Ok(entry.status);
        }
        entry.cancel.cancel();
        if entry.status == JobStatus::Queued {
            entry.status = JobStatus::Cancelled;
        }
        Ok(entry.status)
    }

    fn count(&self, status: JobStatus) -> usize {
        self.lock().values().filter(|e| e.status == status).count()
    }
}

// ── JobHandle ─────────────────────────────────────────────────────────────────

/// Caller's side of one submitted job.
pub struct JobHandle {
    id:    JobId,
    seed:  u64,
    table: Arc<JobTable>,
    rx:    Receiver<JobReport>,
}

impl JobHandle {
    #[inline]
    pub fn id(&self) -> JobId {
        self.id
    }

    /// Run seed the job uses, given or derived.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn status(&self) -> Option<JobStatus> {
        self.table.status(self.id)
    }

    /// Cancel the job.  See [`SimulationScheduler::cancel`].
    pub fn cancel(&self) -> SchedResult<JobStatus> {
        self.table.cancel(self.id)
    }

    /// Wait for the report.
    pub fn join(self) -> SchedResult<JobReport> {
        self.rx.recv().map_err(|_| SchedError::Disconnected(self.id))
    }

    /// Wait up to `timeout`.  The handle stays usable after a timeout.
    pub fn join_timeout(&self, timeout: Duration) -> SchedResult<JobReport> {
        self.rx.recv_timeout(timeout).map_err(|err| match err {
            RecvTimeoutError::Timeout => SchedError::JoinTimeout {
                id:        self.id,
                waited_ms: timeout.as_millis().min(u128::from(u64::MAX)) as u64,
            },
            RecvTimeoutError::Disconnected => SchedError::Disconnected(self.id),
        })
    }
}

// ── SimulationScheduler ───────────────────────────────────────────────────────

/// Bounded pool running evaluation and optimization jobs.
///
/// Dropping the scheduler cancels every unfinished job, lets running jobs
/// stop at their next lap boundary, and joins the workers.
pub struct SimulationScheduler {
    config:      EngineConfig,
    timeout:     Duration,
    tx:          Option<Sender<Queued>>,
    workers:     Vec<JoinHandle<()>>,
    table:       Arc<JobTable>,
    next_id:     AtomicU64,
}

impl SimulationScheduler {
    /// Start `max_concurrent_simulations` workers with the configured
    /// per-job timeout.
    pub fn new(config: EngineConfig) -> SchedResult<Self> {
        let timeout = config.simulation_timeout();
        Self::with_timeout(config, timeout)
    }

    /// Like [`new`][Self::new] with an explicit per-job deadline.
    pub fn with_timeout(config: EngineConfig, timeout: Duration) -> SchedResult<Self> {
        config.validate()?;
        let (tx, rx) = match config.queue_limit {
            Some(limit) => bounded::<Queued>(limit),
            None => unbounded::<Queued>(),
        };
        let table = Arc::new(JobTable::default());

        let mut workers = Vec::with_capacity(config.max_concurrent_simulations);
        for idx in 0..config.max_concurrent_simulations {
            let rx = rx.clone();
            let table = Arc::clone(&table);
            let handle = thread::Builder::new()
                .name(format!("pitwall-worker-{idx}"))
                .spawn(move || worker_loop(rx, table, timeout))?;
            workers.push(handle);
        }
        info!(
            workers = config.max_concurrent_simulations,
            queue_limit = ?config.queue_limit,
            timeout_ms = timeout.as_millis() as u64,
            "scheduler started"
        );

        Ok(Self { config, timeout, tx: Some(tx), workers, table, next_id: AtomicU64::new(0) })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Validate and enqueue a job.
    ///
    /// Validation failures and a full queue are reported here, synchronously;
    /// nothing is enqueued in either case.
    pub fn submit(&self, request: JobRequest) -> SchedResult<JobHandle> {
        let trials = request.trials.unwrap_or(self.config.trials);
        if trials == 0 {
            return Err(SchedError::ZeroTrials);
        }
        let kind = request.kind();
        let id = JobId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let seed = request.seed.unwrap_or_else(|| derive_seed(self.config.seed, id.0));
        let evaluator = StrategyEvaluator::new(EvaluatorConfig { trials, seed, keep_results: request.keep_results });

        let work = match request.task {
            JobTask::Evaluate { strategy, wet } => {
                let plan = RaceBuilder::new(request.circuit, &request.compounds, strategy)
                    .config(&self.config)
                    .wet(wet)
                    .build()?;
                Work::Evaluate { plan, evaluator }
            }
            JobTask::Optimize(constraints) => {
                constraints.validate()?;
                request.circuit.validate()?;
                let optimizer = StrategyOptimizer::new(evaluator, constraints, self.config.constants.clone());
                Work::Optimize { circuit: request.circuit, compounds: request.compounds, optimizer }
            }
        };

        let handle = self.enqueue(id, seed, work)?;
        info!(%id, kind, seed, trials, "job queued");
        Ok(handle)
    }

    fn enqueue(&self, id: JobId, seed: u64, work: Work) -> SchedResult<JobHandle> {
        let tx = self.tx.as_ref().ok_or(SchedError::ShutDown)?;
        let cancel = CancelToken::new();
        let (reply, rx) = bounded::<JobReport>(1);

        self.table.lock().insert(id, Entry { status: JobStatus::Queued, cancel: cancel.clone() });
        let queued = Queued { id, seed, work, cancel, reply };
        if let Err(err) = tx.try_send(queued) {
            self.table.lock().remove(&id);
            return Err(match err {
                TrySendError::Full(_) => SchedError::QueueFull { limit: self.config.queue_limit.unwrap_or(0) },
                TrySendError::Disconnected(_) => SchedError::ShutDown,
            });
        }
        Ok(JobHandle { id, seed, table: Arc::clone(&self.table), rx })
    }

    pub fn status(&self, id: JobId) -> Option<JobStatus> {
        self.table.status(id)
    }

    /// Cancel a queued or running job and return its status afterwards.
    ///
    /// A queued job becomes `Cancelled` at once and never runs.  A running
    /// job stays `Running` until its trials reach a lap boundary.  Finished
    /// jobs are left as they are.
    pub fn cancel(&self, id: JobId) -> SchedResult<JobStatus> {
        let status = self.table.cancel(id)?;
        info!(%id, %status, "cancel requested");
        Ok(status)
    }

    pub fn queued(&self) -> usize {
        self.table.count(JobStatus::Queued)
    }

    pub fn running(&self) -> usize {
        self.table.count(JobStatus::Running)
    }

    /// Drop finished jobs from the table; returns how many were removed.
    pub fn forget_finished(&self) -> usize {
        let mut jobs = self.table.lock();
        let before = jobs.len();
        jobs.retain(|_, e| !e.status.is_terminal());
        before - jobs.len()
    }

    /// Enqueue a job that holds its worker until `release` fires or the job
    /// is stopped.
    #[cfg(test)]
    pub(crate) fn submit_hold(&self) -> SchedResult<(JobHandle, Sender<()>)> {
        let id = JobId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (release_tx, release) = bounded::<()>(1);
        let handle = self.enqueue(id, derive_seed(self.config.seed, id.0), Work::Hold { release })?;
        Ok((handle, release_tx))
    }

    #[cfg(test)]
    pub(crate) fn submit_panic(&self) -> SchedResult<JobHandle> {
        let id = JobId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.enqueue(id, derive_seed(self.config.seed, id.0), Work::Panic)
    }
}

impl Drop for SimulationScheduler {
    fn drop(&mut self) {
        for entry in self.table.lock().values_mut() {
            if !entry.status.is_terminal() {
                entry.cancel.cancel();
            }
        }
        // Close the channel: workers drain the (now cancelled) queue and exit.
        self.tx = None;
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
        info!("scheduler stopped");
    }
}

// ── Worker ────────────────────────────────────────────────────────────────────

fn worker_loop(rx: Receiver<Queued>, table: Arc<JobTable>, timeout: Duration) {
    for job in rx.iter() {
        let report = run_job(job.id, job.seed, job.work, &job.cancel, &table, timeout);
        // The caller may have dropped its handle.
        let _ = job.reply.send(report);
    }
}

fn run_job(
    id:      JobId,
    seed:    u64,
    work:    Work,
    cancel:  &CancelToken,
    table:   &JobTable,
    timeout: Duration,
) -> JobReport {
    let Some(start_order) = table.begin(id) else {
        info!(%id, "job cancelled before it started");
        table.finish(id, JobStatus::Cancelled);
        return JobReport {
            id,
            status: JobStatus::Cancelled,
            seed,
            start_order: None,
            run_time: Duration::ZERO,
            output: None,
            error: None,
            failure: None,
        };
    };

    cancel.arm_deadline(timeout);
    info!(%id, start_order, "job started");
    let started = Instant::now();

    // A panic must not take the worker down with it or strand the job
    // in `Running`.
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| match work {
        Work::Evaluate { plan, evaluator } => evaluator
            .evaluate(&plan, cancel)
            .map(|e| (e.stopped, Some(JobOutput::Evaluation(e)))),
        Work::Optimize { circuit, compounds, optimizer } => optimizer
            .optimize(&circuit, &compounds, cancel)
            .map(|o| (o.stopped, Some(JobOutput::Optimization(o)))),
        #[cfg(test)]
        Work::Hold { release } => Ok((hold(&release, cancel), None)),
        #[cfg(test)]
        Work::Panic => panic!("job panicked on purpose"),
    }));
    let run_time = started.elapsed();

    let (status, output, error, failure) = match outcome {
        Ok(Ok((None, output))) => (JobStatus::Completed, output, None, None),
        Ok(Ok((Some(StopReason::TimedOut), output))) => {
            warn!(%id, run_ms = run_time.as_millis() as u64, "job timed out, results are partial");
            (JobStatus::TimedOut, output, None, None)
        }
        Ok(Ok((Some(StopReason::Cancelled), output))) => {
            warn!(%id, "job cancelled while running");
            (JobStatus::Cancelled, output, None, None)
        }
        Ok(Err(e)) => {
            let failure = NumericFailure::from_error(&e);
            error!(%id, error = %e, state = ?failure.as_ref().map(|f| &f.state), "job failed");
            (JobStatus::Failed, None, Some(e.to_string()), failure)
        }
        Err(payload) => {
            let message = format!("job panicked: {}", panic_message(payload.as_ref()));
            error!(%id, error = %message, "job failed");
            (JobStatus::Failed, None, Some(message), None)
        }
    };
    table.finish(id, status);
    info!(%id, %status, run_ms = run_time.as_millis() as u64, "job finished");

    JobReport { id, status, seed, start_order: Some(start_order), run_time, output, error, failure }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "non-string payload"
    }
}

#[cfg(test)]
fn hold(release: &Receiver<()>, cancel: &CancelToken) -> Option<StopReason> {
    loop {
        if let Some(reason) = cancel.check() {
            return Some(reason);
        }
        match release.recv_timeout(Duration::from_millis(2)) {
            Err(RecvTimeoutError::Timeout) => continue,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => return None,
        }
    }
}
