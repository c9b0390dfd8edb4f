//! Bounded strategy search.
//!
//! # Search
//!
//! ```text
//! ① Filter   — compounds suitable for the race condition at the circuit's
//!              typical tyre temperature.
//! ② Coarse   — for each stop count, every compound sequence with the race
//!              split into equal stints.
//! ③ Refine   — from each of the best K candidates, hill-climb: shift one
//!              pit lap by ± grid step, move to the best improving
//!              neighbour, repeat for a bounded number of rounds.
//! ④ Rank     — mean total time, then stdev; keep the top N.
//! ```
//!
//! Every candidate is evaluated at most once (memoized by stint layout) and
//! the whole search stops at `max_evaluations`.  Candidates the builder
//! rejects (dual-compound rule) are never evaluated and never returned.

use std::collections::HashMap;
use std::sync::Arc;

use pw_core::{Circuit, CompoundTable, EngineConfig, SimConstants, StrategyId};
use pw_model::is_suitable;
use pw_race::{CancelToken, RaceBuilder, RaceError, StopReason, Stint, Strategy};
use tracing::{debug, info, warn};

use crate::{EvalError, EvalResult, StrategyEvaluator, StrategyStatistics};

// ── Constraints ───────────────────────────────────────────────────────────────

/// Limits on the strategy space and on the search effort.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OptimizerConstraints {
    pub min_stops:             u32,
    /// At most [`EngineConfig::MAX_SUPPORTED_STOPS`].
    pub max_stops:             u32,
    pub wet:                   bool,
    pub enforce_dual_compound: bool,
    /// Shortest stint the search will generate.
    pub min_stint_laps:        u32,
    /// Pit-lap shift used by refinement.
    pub lap_grid_step:         u32,
    /// Coarse candidates refined.
    pub refine_top_k:          usize,
    /// Hill-climb rounds per refined candidate.
    pub refine_rounds:         u32,
    /// Hard cap on evaluated candidates.
    pub max_evaluations:       usize,
    /// Ranked strategies returned.
    pub top_n:                 usize,
}

impl Default for OptimizerConstraints {
    fn default() -> Self {
        Self {
            min_stops:             0,
            max_stops:             EngineConfig::MAX_SUPPORTED_STOPS,
            wet:                   false,
            enforce_dual_compound: true,
            min_stint_laps:        5,
            lap_grid_step:         3,
            refine_top_k:          3,
            refine_rounds:         4,
            max_evaluations:       1_000,
            top_n:                 10,
        }
    }
}

impl From<&EngineConfig> for OptimizerConstraints {
    fn from(config: &EngineConfig) -> Self {
        Self {
            max_stops:             config.max_stops,
            enforce_dual_compound: config.enforce_dual_compound,
            top_n:                 config.top_n,
            ..Self::default()
        }
    }
}

impl OptimizerConstraints {
    pub fn validate(&self) -> EvalResult<()> {
        if self.max_stops > EngineConfig::MAX_SUPPORTED_STOPS {
            return Err(EvalError::Constraints(format!(
                "max_stops {} exceeds {}",
                self.max_stops,
                EngineConfig::MAX_SUPPORTED_STOPS
            )));
        }
        if self.min_stops > self.max_stops {
            return Err(EvalError::Constraints(format!(
                "min_stops {} exceeds max_stops {}",
                self.min_stops, self.max_stops
            )));
        }
        if self.min_stint_laps == 0 || self.lap_grid_step == 0 {
            return Err(EvalError::Constraints("min_stint_laps and lap_grid_step must be positive".into()));
        }
        if self.max_evaluations == 0 || self.top_n == 0 {
            return Err(EvalError::Constraints("max_evaluations and top_n must be positive".into()));
        }
        Ok(())
    }
}

// ── Outcome ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankedStrategy {
    /// 1-based position in the ranking.
    pub rank:       usize,
    pub strategy:   Strategy,
    pub statistics: StrategyStatistics,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptimizationOutcome {
    /// Best first, at most `top_n`.
    pub ranked:    Vec<RankedStrategy>,
    /// Candidates evaluated.
    pub evaluated: usize,
    /// Generated candidates the builder rejected.
    pub rejected:  usize,
    /// The search or some evaluation was cut short.
    pub partial:   bool,
    pub stopped:   Option<StopReason>,
}

// ── StrategyOptimizer ─────────────────────────────────────────────────────────

/// Searches the strategy space of one race.
#[derive(Clone, Debug)]
pub struct StrategyOptimizer {
    evaluator:   StrategyEvaluator,
    constraints: OptimizerConstraints,
    constants:   SimConstants,
}

/// Memo entry: `None` for a layout the builder rejected.
type Scored = Option<(Strategy, StrategyStatistics)>;

/// Search bookkeeping for one `optimize` call.
struct Search<'a> {
    optimizer: &'a StrategyOptimizer,
    circuit:   &'a Arc<Circuit>,
    compounds: &'a CompoundTable,
    cancel:    &'a CancelToken,
    memo:      HashMap<Vec<Stint>, Scored>,
    next_id:   StrategyId,
    evaluated: usize,
    rejected:  usize,
    partial:   bool,
    stopped:   Option<StopReason>,
}

impl StrategyOptimizer {
    pub fn new(evaluator: StrategyEvaluator, constraints: OptimizerConstraints, constants: SimConstants) -> Self {
        Self { evaluator, constraints, constants }
    }

    pub fn constraints(&self) -> &OptimizerConstraints {
        &self.constraints
    }

    /// Run the bounded search and return the ranking.
    ///
    /// Cancellation or expiry ends the search early; what was evaluated so
    /// far is still ranked and the outcome is flagged `partial`.
    pub fn optimize(
        &self,
        circuit:   &Arc<Circuit>,
        compounds: &CompoundTable,
        cancel:    &CancelToken,
    ) -> EvalResult<OptimizationOutcome> {
        self.constraints.validate()?;
        circuit.validate()?;
        let c = &self.constraints;

        // ── ① Candidate compounds ─────────────────────────────────────────
        let tyre_temp = circuit.typical_temp + self.constants.tyre_temp_offset;
        let names: Vec<String> = compounds
            .iter()
            .filter(|tc| is_suitable(tc, tyre_temp, c.wet))
            .map(|tc| tc.name.clone())
            .collect();
        if names.is_empty() {
            return Err(EvalError::NoSuitableCompounds {
                condition: if c.wet { "wet" } else { "dry" },
                tyre_temp,
            });
        }
        debug!(compounds = ?names, tyre_temp, "optimizer compound pool");

        let mut search = Search {
            optimizer: self,
            circuit,
            compounds,
            cancel,
            memo: HashMap::new(),
            next_id: StrategyId(0),
            evaluated: 0,
            rejected: 0,
            partial: false,
            stopped: None,
        };

        // ── ② Coarse grid ─────────────────────────────────────────────────
        'coarse: for stops in c.min_stops..=c.max_stops {
            let stints = stops + 1;
            let Some(lengths) = even_split(circuit.total_laps, stints, c.min_stint_laps) else {
                debug!(stops, "race too short for this stop count");
                continue;
            };
            for sequence in sequences(&names, stints as usize) {
                let layout: Vec<Stint> = sequence
                    .into_iter()
                    .zip(&lengths)
                    .map(|(compound, &laps)| Stint { compound, laps })
                    .collect();
                if !search.score(layout)? {
                    break 'coarse;
                }
            }
        }

        // ── ③ Refinement ──────────────────────────────────────────────────
        let seeds: Vec<Vec<Stint>> = search
            .ranking()
            .into_iter()
            .take(c.refine_top_k)
            .map(|(s, _)| s.stints)
            .collect();
        'refine: for mut current in seeds {
            for _ in 0..c.refine_rounds {
                let mut best = search.stats_of(&current);
                let mut improved = None;
                for neighbour in shifts(&current, c.lap_grid_step, c.min_stint_laps) {
                    if !search.score(neighbour.clone())? {
                        break 'refine;
                    }
                    if let Some(stats) = search.stats_of(&neighbour) {
                        if best.is_none_or(|b| stats.rank_cmp(&b).is_lt()) {
                            best = Some(stats);
                            improved = Some(neighbour);
                        }
                    }
                }
                match improved {
                    Some(next) => current = next,
                    None => break,
                }
            }
        }

        // ── ④ Rank ────────────────────────────────────────────────────────
        let ranked: Vec<RankedStrategy> = search
            .ranking()
            .into_iter()
            .take(c.top_n)
            .enumerate()
            .map(|(i, (strategy, statistics))| RankedStrategy { rank: i + 1, strategy, statistics })
            .collect();

        if let Some(reason) = search.stopped {
            warn!(?reason, evaluated = search.evaluated, "optimization stopped early");
        }
        let best = ranked.first().map(|r| r.strategy.label()).unwrap_or_default();
        info!(
            circuit = %circuit.name,
            evaluated = search.evaluated,
            rejected = search.rejected,
            best = %best,
            "optimization finished"
        );
        Ok(OptimizationOutcome {
            ranked,
            evaluated: search.evaluated,
            rejected:  search.rejected,
            partial:   search.partial,
            stopped:   search.stopped,
        })
    }
}

impl Search<'_> {
    /// Evaluate `layout` unless already seen.  Returns `false` once the
    /// search must end (budget spent or token fired).
    fn score(&mut self, layout: Vec<Stint>) -> EvalResult<bool> {
        if self.memo.contains_key(&layout) {
            return Ok(true);
        }
        if self.evaluated >= self.optimizer.constraints.max_evaluations {
            return Ok(false);
        }
        if let Some(reason) = self.cancel.check() {
            self.stopped = Some(reason);
            self.partial = true;
            return Ok(false);
        }

        let c = &self.optimizer.constraints;
        let strategy = Strategy::new(self.next_id, layout.clone());
        self.next_id = self.next_id.next();

        let plan = RaceBuilder::new(Arc::clone(self.circuit), self.compounds, strategy)
            .constants(self.optimizer.constants.clone())
            .wet(c.wet)
            .enforce_dual_compound(c.enforce_dual_compound)
            .max_stops(c.max_stops)
            .build();
        let plan = match plan {
            Ok(plan) => plan,
            Err(RaceError::DualCompoundViolation { .. }) => {
                self.rejected += 1;
                self.memo.insert(layout, None);
                return Ok(true);
            }
            Err(e) => return Err(e.into()),
        };

        let evaluation = self.optimizer.evaluator.evaluate(&plan, self.cancel)?;
        self.evaluated += 1;
        if let Some(reason) = evaluation.stopped {
            self.stopped.get_or_insert(reason);
            self.partial = true;
        }
        let keep = evaluation.statistics.trials > 0;
        debug!(strategy = %evaluation.strategy, mean_s = evaluation.statistics.mean, "candidate scored");
        self.memo.insert(layout, keep.then(|| (evaluation.strategy, evaluation.statistics)));
        Ok(!self.partial)
    }

    fn stats_of(&self, layout: &[Stint]) -> Option<StrategyStatistics> {
        self.memo.get(layout).and_then(|s| s.as_ref().map(|(_, stats)| *stats))
    }

    /// Every scored candidate, best first.  Ids break exact ties so the order
    /// never depends on map iteration.
    fn ranking(&self) -> Vec<(Strategy, StrategyStatistics)> {
        let mut all: Vec<(Strategy, StrategyStatistics)> = self.memo.values().flatten().cloned().collect();
        all.sort_by(|a, b| a.1.rank_cmp(&b.1).then(a.0.id.cmp(&b.0.id)));
        all
    }
}

// ── Candidate generation ──────────────────────────────────────────────────────

/// Split `total` laps into `stints` near-equal parts, longer parts first.
/// `None` if any part would fall below `min_laps`.
pub(crate) fn even_split(total: u32, stints: u32, min_laps: u32) -> Option<Vec<u32>> {
    if stints == 0 {
        return None;
    }
    let base = total / stints;
    if base < min_laps.max(1) {
        return None;
    }
    let extra = total % stints;
    Some((0..stints).map(|i| base + u32::from(i < extra)).collect())
}

/// Every length-`len` sequence over `names`, in lexicographic order.
pub(crate) fn sequences(names: &[String], len: usize) -> Vec<Vec<String>> {
    let mut out: Vec<Vec<String>> = vec![Vec::new()];
    for _ in 0..len {
        out = out
            .into_iter()
            .flat_map(|prefix| {
                names.iter().map(move |n| {
                    let mut next = prefix.clone();
                    next.push(n.clone());
                    next
                })
            })
            .collect();
    }
    out
}

/// Layouts one pit-lap shift away: boundary `i` moved by `±step`, keeping
/// every stint at least `min_laps` long.
pub(crate) fn shifts(layout: &[Stint], step: u32, min_laps: u32) -> Vec<Vec<Stint>> {
    let mut out = Vec::new();
    for i in 0..layout.len().saturating_sub(1) {
        let (a, b) = (layout[i].laps, layout[i + 1].laps);
        // Earlier stop.
        if a >= min_laps + step {
            let mut n = layout.to_vec();
            n[i].laps -= step;
            n[i + 1].laps += step;
            out.push(n);
        }
        // Later stop.
        if b >= min_laps + step {
            let mut n = layout.to_vec();
            n[i].laps += step;
            n[i + 1].laps -= step;
            out.push(n);
        }
    }
    out
}
