//! Many seeded trials of one strategy, reduced to statistics.

use pw_core::EngineConfig;
use pw_race::{
    CancelToken, NoopObserver, RacePlan, RaceResult, RaceStateMachine, SimulationResult, StopReason,
    Strategy, TerminalStatus,
};
use tracing::{debug, info};

use crate::{EvalResult, StatsAccumulator, StrategyStatistics};

/// How an evaluation is run.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EvaluatorConfig {
    /// Trials per strategy.
    pub trials:       u32,
    /// Run seed; trial `k` uses `TrialRng::new(seed, k)`.
    pub seed:         u64,
    /// Keep each trial's full `SimulationResult` in the evaluation.
    pub keep_results: bool,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self { trials: 5, seed: 42, keep_results: false }
    }
}

impl From<&EngineConfig> for EvaluatorConfig {
    fn from(config: &EngineConfig) -> Self {
        Self { trials: config.trials, seed: config.seed, keep_results: false }
    }
}

/// Outcome of evaluating one strategy.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Evaluation {
    pub strategy:   Strategy,
    pub statistics: StrategyStatistics,
    /// Trials requested.
    pub requested:  u32,
    /// Why trials were left out, if any were.
    pub stopped:    Option<StopReason>,
    /// Per-trial results in trial order; empty unless `keep_results` is set.
    pub results:    Vec<SimulationResult>,
}

/// Runs the trials of one plan and reduces their totals.
#[derive(Clone, Debug, Default)]
pub struct StrategyEvaluator {
    config: EvaluatorConfig,
}

impl StrategyEvaluator {
    pub fn new(config: EvaluatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Run every trial of `plan`.
    ///
    /// Trials that the token stops are excluded from the statistics, which
    /// are then flagged `partial`.  A numeric failure in any trial fails the
    /// whole evaluation.
    pub fn evaluate(&self, plan: &RacePlan, cancel: &CancelToken) -> EvalResult<Evaluation> {
        let outcomes = self.run_trials(plan, cancel);

        // ── Fold in trial order for bit-stable statistics ─────────────────
        let mut acc = StatsAccumulator::new();
        let mut stopped = None;
        let mut results = Vec::new();
        for outcome in outcomes {
            let result = outcome?;
            match result.status {
                TerminalStatus::Completed => acc.push(result.total_time_s),
                TerminalStatus::Cancelled => { stopped.get_or_insert(StopReason::Cancelled); }
                TerminalStatus::TimedOut  => { stopped.get_or_insert(StopReason::TimedOut); }
            }
            if self.config.keep_results {
                results.push(result);
            }
        }

        let statistics = acc.finish(stopped.is_some());
        info!(
            strategy = %plan.strategy,
            trials = statistics.trials,
            mean_s = statistics.mean,
            stdev_s = statistics.stdev,
            partial = statistics.partial,
            "strategy evaluated"
        );
        Ok(Evaluation {
            strategy: plan.strategy.clone(),
            statistics,
            requested: self.config.trials,
            stopped,
            results,
        })
    }

    fn run_trials(&self, plan: &RacePlan, cancel: &CancelToken) -> Vec<RaceResult<SimulationResult>> {
        let seed = self.config.seed;
        let keep = self.config.keep_results;
        let run_one = |trial: u32| {
            debug!(strategy = %plan.strategy, trial, "trial start");
            RaceStateMachine::for_trial(plan, seed, trial)
                .record_laps(keep)
                .run(&mut NoopObserver, cancel)
        };

        #[cfg(not(feature = "parallel"))]
        {
            (0..self.config.trials).map(run_one).collect()
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            // Indexed collect keeps trial order.
            (0..self.config.trials).into_par_iter().map(run_one).collect()
        }
    }
}
