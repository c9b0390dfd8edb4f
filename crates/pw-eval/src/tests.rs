//! Unit tests for pw-eval.

use std::collections::BTreeSet;
use std::sync::Arc;

use pw_core::{Circuit, CompoundTable, SimConstants, StrategyId};
use pw_race::{CancelToken, RaceBuilder, RacePlan, Strategy};

use crate::{EvaluatorConfig, OptimizerConstraints, StrategyEvaluator, StrategyOptimizer};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn circuit() -> Arc<Circuit> {
    Arc::new(Circuit::new("Test Ring", 5.0, 60, 90.0))
}

fn plan(pairs: &[(&str, u32)]) -> RacePlan {
    RaceBuilder::new(circuit(), &CompoundTable::standard(), Strategy::from_pairs(StrategyId(0), pairs))
        .build()
        .unwrap()
}

fn evaluator(trials: u32, keep_results: bool) -> StrategyEvaluator {
    StrategyEvaluator::new(EvaluatorConfig { trials, seed: 42, keep_results })
}

/// A cheap search: at most two stops, coarse grid plus a short climb.
fn small_constraints() -> OptimizerConstraints {
    OptimizerConstraints {
        max_stops:       2,
        refine_top_k:    2,
        refine_rounds:   2,
        lap_grid_step:   5,
        max_evaluations: 200,
        top_n:           5,
        ..OptimizerConstraints::default()
    }
}

fn optimizer(constraints: OptimizerConstraints) -> StrategyOptimizer {
    StrategyOptimizer::new(evaluator(3, false), constraints, SimConstants::default())
}

// ── StatsAccumulator ──────────────────────────────────────────────────────────

#[cfg(test)]
mod stats {
    use crate::StatsAccumulator;

    #[test]
    fn sample_statistics() {
        let mut acc = StatsAccumulator::new();
        for v in [1.0, 2.0, 3.0, 4.0] {
            acc.push(v);
        }
        let s = acc.finish(false);
        assert_eq!(s.trials, 4);
        assert_eq!(s.mean, 2.5);
        assert_eq!((s.min, s.max), (1.0, 4.0));
        // Sample stdev of 1..=4 is sqrt(5/3).
        assert!((s.stdev - (5.0f64 / 3.0).sqrt()).abs() < 1e-12);
        assert!(!s.partial);
    }

    #[test]
    fn single_value_has_zero_spread() {
        let mut acc = StatsAccumulator::new();
        acc.push(5_500.0);
        assert_eq!(acc.finish(false).stdev, 0.0);
    }

    #[test]
    fn empty_reports_zero_trials() {
        let s = StatsAccumulator::new().finish(true);
        assert_eq!(s.trials, 0);
        assert!(s.partial);
        assert_eq!(s.mean, 0.0);
    }

    #[test]
    fn merge_matches_sequential_push() {
        let values = [5_510.2, 5_498.7, 5_533.1, 5_502.9, 5_520.0, 5_489.4];
        let mut all = StatsAccumulator::new();
        values.iter().for_each(|&v| all.push(v));

        let (mut a, mut b) = (StatsAccumulator::new(), StatsAccumulator::new());
        values[..2].iter().for_each(|&v| a.push(v));
        values[2..].iter().for_each(|&v| b.push(v));
        let mut ab = a;
        ab.merge(&b);
        let mut ba = b;
        ba.merge(&a);

        for merged in [ab, ba] {
            let (m, s) = (merged.finish(false), all.finish(false));
            assert_eq!(m.trials, s.trials);
            assert!((m.mean - s.mean).abs() < 1e-9);
            assert!((m.stdev - s.stdev).abs() < 1e-6);
            assert_eq!((m.min, m.max), (s.min, s.max));
        }
    }

    #[test]
    fn merging_empty_is_identity() {
        let mut acc = StatsAccumulator::new();
        acc.push(3.0);
        let before = acc;
        acc.merge(&StatsAccumulator::new());
        assert_eq!(acc, before);
    }
}

// ── StrategyEvaluator ─────────────────────────────────────────────────────────

#[cfg(test)]
mod evaluator {
    use super::*;
    use pw_race::StopReason;

    #[test]
    fn runs_requested_trials() {
        let e = evaluator(5, true).evaluate(&plan(&[("C3", 30), ("C2", 30)]), &CancelToken::new()).unwrap();
        assert_eq!(e.requested, 5);
        assert_eq!(e.statistics.trials, 5);
        assert!(!e.statistics.partial);
        assert_eq!(e.results.len(), 5);
        let trials: Vec<u32> = e.results.iter().map(|r| r.trial).collect();
        assert_eq!(trials, vec![0, 1, 2, 3, 4]);
        assert!(e.statistics.min <= e.statistics.mean && e.statistics.mean <= e.statistics.max);
    }

    #[test]
    fn results_dropped_unless_kept() {
        let e = evaluator(3, false).evaluate(&plan(&[("C3", 30), ("C2", 30)]), &CancelToken::new()).unwrap();
        assert!(e.results.is_empty());
        assert_eq!(e.statistics.trials, 3);
    }

    #[test]
    fn evaluation_is_reproducible() {
        let p = plan(&[("C4", 20), ("C3", 40)]);
        let a = evaluator(6, false).evaluate(&p, &CancelToken::new()).unwrap();
        let b = evaluator(6, false).evaluate(&p, &CancelToken::new()).unwrap();
        assert_eq!(a.statistics.mean.to_bits(), b.statistics.mean.to_bits());
        assert_eq!(a.statistics.stdev.to_bits(), b.statistics.stdev.to_bits());
    }

    #[test]
    fn strategies_share_trial_seeds() {
        let a = evaluator(4, true).evaluate(&plan(&[("C3", 30), ("C2", 30)]), &CancelToken::new()).unwrap();
        let b = evaluator(4, true).evaluate(&plan(&[("C5", 15), ("C1", 45)]), &CancelToken::new()).unwrap();
        for (x, y) in a.results.iter().zip(&b.results) {
            assert_eq!(x.seed, y.seed);
            assert_eq!(x.weather, y.weather);
        }
    }

    #[test]
    fn cancelled_evaluation_is_partial() {
        let token = CancelToken::new();
        token.cancel();
        let e = evaluator(4, false).evaluate(&plan(&[("C3", 30), ("C2", 30)]), &token).unwrap();
        assert_eq!(e.statistics.trials, 0);
        assert!(e.statistics.partial);
        assert_eq!(e.stopped, Some(StopReason::Cancelled));
    }

    #[test]
    fn numeric_failure_fails_evaluation() {
        let mut table = CompoundTable::standard();
        let mut brittle = pw_core::TireCompound::new("BRITTLE", 1.0, 0.03, 5);
        brittle.cliff_factor = f64::INFINITY;
        table.insert(brittle).unwrap();
        let p = RaceBuilder::new(circuit(), &table, Strategy::from_pairs(StrategyId(0), &[("BRITTLE", 30), ("C2", 30)]))
            .build()
            .unwrap();
        let err = evaluator(2, false).evaluate(&p, &CancelToken::new()).unwrap_err();
        assert!(matches!(err, crate::EvalError::Race(pw_race::RaceError::Numeric { .. })));
    }
}

// ── Candidate generation ──────────────────────────────────────────────────────

#[cfg(test)]
mod generation {
    use crate::optimizer::{even_split, sequences, shifts};
    use pw_race::Stint;

    #[test]
    fn even_split_front_loads_remainder() {
        assert_eq!(even_split(60, 2, 5), Some(vec![30, 30]));
        assert_eq!(even_split(58, 3, 5), Some(vec![20, 19, 19]));
        assert_eq!(even_split(60, 1, 5), Some(vec![60]));
        assert_eq!(even_split(12, 4, 5), None);
        assert_eq!(even_split(60, 0, 5), None);
    }

    #[test]
    fn sequences_enumerate_all_orders() {
        let names: Vec<String> = ["A", "B", "C"].iter().map(|s| s.to_string()).collect();
        let seqs = sequences(&names, 2);
        assert_eq!(seqs.len(), 9);
        assert_eq!(seqs[0], vec!["A", "A"]);
        assert_eq!(seqs[8], vec!["C", "C"]);
        assert_eq!(sequences(&names, 0), vec![Vec::<String>::new()]);
    }

    #[test]
    fn shifts_preserve_total_and_minimum() {
        let layout = vec![Stint::new("C3", 8), Stint::new("C2", 30), Stint::new("C1", 22)];
        let out = shifts(&layout, 3, 5);
        // 8 − 3 = 5 still meets the minimum, so both boundaries move both ways.
        assert_eq!(out.len(), 4);
        for n in &out {
            assert_eq!(n.iter().map(|s| s.laps).sum::<u32>(), 60);
            assert!(n.iter().all(|s| s.laps >= 5));
        }
        let tight = vec![Stint::new("C3", 6), Stint::new("C2", 54)];
        assert_eq!(shifts(&tight, 3, 5).len(), 1);
    }
}

// ── StrategyOptimizer ─────────────────────────────────────────────────────────

#[cfg(test)]
mod optimizer {
    use super::*;
    use crate::EvalError;
    use pw_model::is_dry_capable;

    #[test]
    fn dry_race_ranking_respects_dual_compound_rule() {
        let table = CompoundTable::standard();
        let constraints = OptimizerConstraints { min_stops: 1, ..small_constraints() };
        let out = optimizer(constraints).optimize(&circuit(), &table, &CancelToken::new()).unwrap();
        assert!(!out.ranked.is_empty());
        assert!(out.rejected > 0, "single-compound layouts are generated and rejected");
        for r in &out.ranked {
            let dry: BTreeSet<&str> = r
                .strategy
                .compounds()
                .filter(|name| is_dry_capable(table.get(name).unwrap()))
                .collect();
            assert!(dry.len() >= 2, "{} uses one dry compound", r.strategy);
            assert_eq!(r.strategy.total_laps(), 60);
            assert!((1..=2).contains(&r.strategy.pit_stop_count()), "{} stop count", r.strategy);
        }
    }

    #[test]
    fn ranking_is_sorted_and_capped() {
        let out = optimizer(small_constraints())
            .optimize(&circuit(), &CompoundTable::standard(), &CancelToken::new())
            .unwrap();
        assert!(out.ranked.len() <= 5);
        for (i, pair) in out.ranked.windows(2).enumerate() {
            assert!(pair[0].statistics.rank_cmp(&pair[1].statistics).is_le());
            assert_eq!(pair[0].rank, i + 1);
        }
    }

    #[test]
    fn search_is_reproducible() {
        let run = || {
            optimizer(small_constraints())
                .optimize(&circuit(), &CompoundTable::standard(), &CancelToken::new())
                .unwrap()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn evaluation_budget_is_respected() {
        let constraints = OptimizerConstraints { max_evaluations: 7, ..small_constraints() };
        let out = optimizer(constraints)
            .optimize(&circuit(), &CompoundTable::standard(), &CancelToken::new())
            .unwrap();
        assert_eq!(out.evaluated, 7);
        assert!(!out.partial);
    }

    #[test]
    fn wet_race_uses_wet_compounds_only() {
        let constraints = OptimizerConstraints { wet: true, max_stops: 1, ..small_constraints() };
        let out = optimizer(constraints)
            .optimize(&circuit(), &CompoundTable::standard(), &CancelToken::new())
            .unwrap();
        assert!(!out.ranked.is_empty());
        for r in &out.ranked {
            assert!(r.strategy.compounds().all(|c| c == "INTERMEDIATE" || c == "WET"), "{}", r.strategy);
        }
        // A wet race may run a single compound.
        assert_eq!(out.rejected, 0);
    }

    #[test]
    fn cancelled_search_is_partial() {
        let token = CancelToken::new();
        token.cancel();
        let out = optimizer(small_constraints()).optimize(&circuit(), &CompoundTable::standard(), &token).unwrap();
        assert!(out.partial);
        assert_eq!(out.evaluated, 0);
        assert!(out.ranked.is_empty());
    }

    #[test]
    fn no_suitable_compound_is_an_error() {
        let table = CompoundTable::from_compounds([pw_core::TireCompound::preset("WET").unwrap()]).unwrap();
        let err = optimizer(small_constraints())
            .optimize(&circuit(), &table, &CancelToken::new())
            .unwrap_err();
        assert!(matches!(err, EvalError::NoSuitableCompounds { condition: "dry", .. }));
    }

    #[test]
    fn invalid_constraints_rejected() {
        let bad = OptimizerConstraints { min_stops: 3, max_stops: 1, ..OptimizerConstraints::default() };
        assert!(bad.validate().is_err());
        let bad = OptimizerConstraints { max_stops: 4, ..OptimizerConstraints::default() };
        assert!(bad.validate().is_err());
        assert!(OptimizerConstraints::default().validate().is_ok());
    }
}
